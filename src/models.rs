use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MangaStatus {
    Ongoing,
    Completed,
    Licensed,
    #[default]
    Unknown,
}

/// A title as seen by one site. `url` is relative to the site's base URL.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Manga {
    pub url: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
    pub authors: Vec<String>,
    pub genres: Vec<String>,
    pub status: MangaStatus,
    /// Numeric id some sites need to address AJAX endpoints.
    pub site_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Chapter {
    pub name: String,
    pub chapter_number: f32,
    pub url: String,
    /// Epoch milliseconds, 0 when unknown.
    pub date_upload: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    /// Chapter page the image was found on, sent as the image referer.
    pub url: String,
    pub image_url: String,
}

/// One page of a popular/latest/search listing.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct MangasPage {
    pub mangas: Vec<Manga>,
    pub has_next_page: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listing {
    Popular,
    Latest,
    Search,
}

/// "Page N of listing T", before it is turned into a wire request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationRequest {
    pub listing: Listing,
    pub page: u32,
    pub query: Option<String>,
}

impl PaginationRequest {
    pub fn popular(page: u32) -> Self {
        Self {
            listing: Listing::Popular,
            page,
            query: None,
        }
    }

    pub fn latest(page: u32) -> Self {
        Self {
            listing: Listing::Latest,
            page,
            query: None,
        }
    }

    pub fn search(page: u32, query: impl Into<String>) -> Self {
        Self {
            listing: Listing::Search,
            page,
            query: Some(query.into()),
        }
    }
}
