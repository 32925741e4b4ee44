pub mod mangakomi;
pub mod manganelo;
pub mod newmanganelos;

use crate::source::Source;

pub use mangakomi::Mangakomi;
pub use manganelo::Manganelo;
pub use newmanganelos::NewManganelos;

/// Every available adapter, with its default base URL.
pub fn all() -> Vec<Box<dyn Source>> {
    vec![
        Box::new(Mangakomi::new()),
        Box::new(Manganelo::new()),
        Box::new(NewManganelos::new()),
    ]
}

/// Look an adapter up by name, ignoring case.
pub fn by_name(name: &str) -> Option<Box<dyn Source>> {
    let wanted = name.trim().to_lowercase();
    all().into_iter().find(|s| s.name().to_lowercase() == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_sources_have_unique_names() {
        let mut names: Vec<&str> = all().iter().map(|s| s.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names, vec!["Mangakomi", "Manganelo", "NewManganelos"]);
    }

    #[test]
    fn test_by_name_is_case_insensitive() {
        assert_eq!(by_name("mangakomi").map(|s| s.name()), Some("Mangakomi"));
        assert_eq!(by_name(" NEWMANGANELOS ").map(|s| s.name()), Some("NewManganelos"));
        assert!(by_name("mangadex").is_none());
    }

    #[test]
    fn test_rate_limits() {
        let limits: Vec<Option<usize>> = all()
            .iter()
            .map(|s| s.rate_limit().map(|l| l.permits))
            .collect();
        assert_eq!(limits, vec![Some(1), None, Some(2)]);
    }
}
