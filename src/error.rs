/// Errors surfaced by source adapters.
///
/// Unparseable chapter numbers and dates never show up here; the parsers
/// substitute sentinels for those.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{0} is not used by this source")]
    Unsupported(&'static str),

    #[error("Licensed - No chapters to show")]
    Licensed,

    #[error("No chapters available: {0}")]
    NoChapters(String),

    #[error("Missing query parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value {value:?} for parameter {name}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("Invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, SourceError>;
