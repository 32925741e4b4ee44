// Site adapters for Mangakomi, Manganelo and NewManganelos.
// Sources build requests and parse documents; an HttpClient executes them.

pub mod config;
pub mod error;
pub mod helpers;
pub mod http_client;
pub mod models;
pub mod rate_limit;
pub mod request;
pub mod source;
pub mod sources;

pub use config::Config;
pub use error::{Result, SourceError};
pub use http_client::{Fetch, HttpClient, RawResponse};
pub use models::{Chapter, Manga, MangaStatus, MangasPage, Page};
pub use request::SourceRequest;
pub use source::Source;
