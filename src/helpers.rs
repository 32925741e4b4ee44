//! Parsing helpers shared by the site adapters
//!
//! Everything here is a pure function:
//! - CSS selection shortcuts over `scraper` elements
//! - Status, chapter-name and date normalization
//! - Chapter list deduplication and ordering
//! - URL fix-ups
//!
//! # Examples
//!
//! ```
//! use manga_sources::helpers::{derive_chapter, parse_status};
//! use manga_sources::models::MangaStatus;
//!
//! let (name, number) = derive_chapter("Solo Leveling Chapter 110 - The End", -1.0);
//! assert_eq!(name, "Chapter 110");
//! assert_eq!(number, 110.0);
//!
//! assert_eq!(parse_status(" Completed "), MangaStatus::Completed);
//! ```

use crate::models::{Chapter, MangaStatus};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use scraper::{ElementRef, Node, Selector};
use std::collections::HashMap;
use std::sync::OnceLock;
use url::Url;

/// Parse a selector literal. Only ever called with constants.
pub(crate) fn sel(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {:?}: {:?}", css, e))
}

/// Collapse runs of whitespace and trim, like a browser's rendered text.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn element_text(element: ElementRef) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// Text of every match under `scope`, joined with single spaces.
pub fn select_text(scope: ElementRef, css: &str) -> String {
    normalize_whitespace(&select_texts(scope, css).join(" "))
}

pub fn select_texts(scope: ElementRef, css: &str) -> Vec<String> {
    scope
        .select(&sel(css))
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect()
}

/// `attr` of the first match under `scope` that carries it.
pub fn select_attr(scope: ElementRef, css: &str, attr: &str) -> Option<String> {
    scope
        .select(&sel(css))
        .find_map(|e| e.value().attr(attr))
        .map(|v| v.trim().to_string())
}

/// Image URL of an `<img>`, lazy-load attributes first.
pub fn image_source(img: ElementRef) -> Option<String> {
    ["data-lazy-src", "data-src", "src"]
        .iter()
        .filter_map(|attr| img.value().attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn parse_status(status: &str) -> MangaStatus {
    match status.trim().to_lowercase().as_str() {
        "ongoing" => MangaStatus::Ongoing,
        "completed" => MangaStatus::Completed,
        _ => MangaStatus::Unknown,
    }
}

fn chapter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(Chapter)\s+(\d+(?:\.\d+)?)").expect("chapter regex"))
}

/// Normalized `Chapter <N>` name from a raw display string.
///
/// Matches `Chapter` followed by whitespace and an integer or decimal number.
/// When the text mentions several chapters the last one wins. Returns `None`
/// when nothing matches.
pub fn parse_chapter_name(raw: &str) -> Option<String> {
    chapter_regex()
        .captures_iter(raw)
        .last()
        .map(|caps| format!("{} {}", &caps[1], &caps[2]))
}

/// Second token of a normalized name as a number, or `fallback`.
pub fn chapter_number(name: &str, fallback: f32) -> f32 {
    name.split(' ')
        .nth(1)
        .and_then(|token| token.parse::<f32>().ok())
        .unwrap_or(fallback)
}

/// Name and number for a raw chapter label. Unmatched labels keep their
/// (whitespace-normalized) text and get `fallback` as the number.
pub fn derive_chapter(raw: &str, fallback: f32) -> (String, f32) {
    match parse_chapter_name(raw) {
        Some(name) => {
            let number = chapter_number(&name, fallback);
            (name, number)
        }
        None => (normalize_whitespace(raw), fallback),
    }
}

/// Dedupe by `(name, chapter_number)` and order newest first.
///
/// A later duplicate replaces the earlier one in place. Sorting is stable, so
/// chapters with equal numbers end up in reverse extraction order.
pub fn normalize_chapter_list(chapters: Vec<Chapter>) -> Vec<Chapter> {
    let mut slots: HashMap<(String, u32), usize> = HashMap::new();
    let mut out: Vec<Chapter> = Vec::with_capacity(chapters.len());

    for chapter in chapters {
        let key = (chapter.name.clone(), chapter.chapter_number.to_bits());
        match slots.get(&key) {
            Some(&idx) => out[idx] = chapter,
            None => {
                slots.insert(key, out.len());
                out.push(chapter);
            }
        }
    }

    out.sort_by(|a, b| a.chapter_number.total_cmp(&b.chapter_number));
    out.reverse();
    out
}

/// Epoch milliseconds (UTC) for `text` in a chrono `format`, or 0.
///
/// Formats without a time component are read as midnight.
pub fn parse_date_millis(text: &str, format: &str) -> i64 {
    let text = text.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
        return dt.and_utc().timestamp_millis();
    }
    NaiveDate::parse_from_str(text, format)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0)
}

/// Path, query and fragment of an absolute URL. Relative input is returned
/// as is.
pub fn url_without_domain(href: &str) -> String {
    let href = href.trim();
    match Url::parse(href) {
        Ok(url) => {
            let mut out = url.path().to_string();
            if let Some(query) = url.query() {
                out.push('?');
                out.push_str(query);
            }
            if let Some(fragment) = url.fragment() {
                out.push('#');
                out.push_str(fragment);
            }
            out
        }
        Err(_) => href.to_string(),
    }
}

/// Prefix protocol-relative URLs (`//host/...`) with `protocol` (`"http:"`).
pub fn fix_protocol_relative(url: &str, protocol: &str) -> String {
    if url.starts_with("//") {
        format!("{}{}", protocol, url)
    } else {
        url.to_string()
    }
}

/// Text that follows the child element labelled `label` (e.g. a
/// `<span>Status: </span>`) up to the next `<br>`, entities decoded.
/// `None` when no child carries the label.
pub fn text_after_label(scope: ElementRef, label: &str) -> Option<String> {
    let label = label.trim();
    let mut children = scope.children();
    children
        .by_ref()
        .filter_map(ElementRef::wrap)
        .find(|child| element_text(*child) == label)?;

    let mut text = String::new();
    for node in children {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) if e.name() == "br" => break,
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(node) {
                    text.push_str(&child.text().collect::<String>());
                }
            }
            _ => {}
        }
    }
    Some(normalize_whitespace(&text))
}
