use crate::error::Result;
use crate::helpers::{
    chapter_number, element_text, normalize_chapter_list, parse_chapter_name, parse_date_millis,
    parse_status, sel, select_attr, select_text, select_texts, url_without_domain,
};
use crate::http_client::DESKTOP_USER_AGENT;
use crate::models::{Chapter, Manga, MangasPage, Page};
use crate::request::SourceRequest;
use crate::source::Source;
use scraper::{ElementRef, Html};
use url::Url;

pub const BASE_URL: &str = "https://manganelo.com";
const DATE_FORMAT: &str = "%b %d,%Y %H:%M";

const LISTING_ITEM: &str = "div.content-genres-item";
const SEARCH_ITEM: &str = "div.panel-search-story > div.search-story-item";
const NEXT_PAGE: &str = "a.page-select";

/// Manganelo. Plain GET pagination with the page number in the path.
pub struct Manganelo {
    base_url: String,
}

impl Manganelo {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn genre_all_url(&self, page: u32) -> String {
        if page <= 1 {
            format!("{}/genre-all", self.base_url)
        } else {
            format!("{}/genre-all/{}", self.base_url, page)
        }
    }

    fn listing_parse(
        &self,
        document: &Html,
        item_css: &str,
        parse: fn(ElementRef) -> Manga,
    ) -> MangasPage {
        MangasPage {
            mangas: document.select(&sel(item_css)).map(parse).collect(),
            has_next_page: document.select(&sel(NEXT_PAGE)).next().is_some(),
        }
    }
}

impl Default for Manganelo {
    fn default() -> Self {
        Self::new()
    }
}

/// Search slugs use underscores for spaces.
fn search_slug(query: &str) -> String {
    query.replace(' ', "_").to_lowercase()
}

fn genre_item(element: ElementRef) -> Manga {
    let link = element.select(&sel("a.genres-item-img")).next();
    Manga {
        url: link
            .and_then(|a| a.value().attr("href"))
            .map(url_without_domain)
            .unwrap_or_default(),
        title: link
            .and_then(|a| a.value().attr("title"))
            .map(|t| t.trim().to_string())
            .unwrap_or_default(),
        thumbnail_url: link.and_then(|a| select_attr(a, "img", "src")),
        ..Default::default()
    }
}

fn search_item(element: ElementRef) -> Manga {
    let link = element.select(&sel("div.item-right > h3 > a.item-title")).next();
    Manga {
        url: link
            .and_then(|a| a.value().attr("href"))
            .map(url_without_domain)
            .unwrap_or_default(),
        title: link.map(element_text).unwrap_or_default(),
        thumbnail_url: select_attr(element, "a.item-img > img", "src"),
        ..Default::default()
    }
}

/// The site's own label is kept; only the number is derived.
fn chapter_item(element: ElementRef) -> Chapter {
    let link = element.select(&sel("a.chapter-name")).next();
    let name = link.map(element_text).unwrap_or_default();
    let chapter_number = parse_chapter_name(&name)
        .map(|n| chapter_number(&n, -1.0))
        .unwrap_or(-1.0);

    Chapter {
        chapter_number,
        url: link
            .and_then(|a| a.value().attr("href"))
            .map(url_without_domain)
            .unwrap_or_default(),
        date_upload: select_attr(element, "span.chapter-time", "title")
            .map(|d| parse_date_millis(&d, DATE_FORMAT))
            .unwrap_or(0),
        name,
    }
}

/// The info-table row whose label cell holds `icon`.
fn info_row<'a>(table: ElementRef<'a>, icon: &str) -> Option<ElementRef<'a>> {
    let rows = sel("tr");
    let icon = sel(&format!("td > i.{}", icon));
    for row in table.select(&rows) {
        if row.select(&icon).next().is_some() {
            return Some(row);
        }
    }
    None
}

impl Source for Manganelo {
    fn name(&self) -> &'static str {
        "Manganelo"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn popular_manga_request(&self, page: u32) -> Result<SourceRequest> {
        Ok(
            SourceRequest::get(format!("{}?type=topview", self.genre_all_url(page)))
                .headers(self.headers()),
        )
    }

    fn popular_manga_parse(&self, document: &Html) -> MangasPage {
        self.listing_parse(document, LISTING_ITEM, genre_item)
    }

    fn latest_updates_request(&self, page: u32) -> Result<SourceRequest> {
        Ok(SourceRequest::get(self.genre_all_url(page)).headers(self.headers()))
    }

    fn latest_updates_parse(&self, document: &Html) -> MangasPage {
        self.listing_parse(document, LISTING_ITEM, genre_item)
    }

    fn search_manga_request(&self, page: u32, query: &str) -> Result<SourceRequest> {
        let mut url = Url::parse(&format!("{}/search/story", self.base_url))?;
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(&search_slug(query));
        }
        url.query_pairs_mut().append_pair("page", &page.to_string());
        Ok(SourceRequest::get(url.as_str()).headers(self.headers()))
    }

    fn search_manga_parse(&self, document: &Html) -> MangasPage {
        self.listing_parse(document, SEARCH_ITEM, search_item)
    }

    fn manga_details_parse(&self, document: &Html) -> Manga {
        let root = document.root_element();
        let info = document.select(&sel("div.story-info-right")).next();
        let table = info.and_then(|i| i.select(&sel("table > tbody")).next());
        let row_links = |icon: &str| {
            table
                .and_then(|t| info_row(t, icon))
                .map(|row| select_texts(row, "td.table-value > a"))
                .unwrap_or_default()
        };

        Manga {
            title: info.map(|i| select_text(i, "h1")).unwrap_or_default(),
            thumbnail_url: select_attr(root, "div.story-info-left > span > img", "src"),
            description: Some(select_text(root, "div.panel-story-info-description"))
                .filter(|d| !d.is_empty()),
            authors: row_links("info-author"),
            genres: row_links("info-genres"),
            status: parse_status(
                &table
                    .and_then(|t| info_row(t, "info-status"))
                    .map(|row| select_text(row, "td.table-value"))
                    .unwrap_or_default(),
            ),
            ..Default::default()
        }
    }

    fn chapter_list_parse(&self, document: &Html) -> Vec<Chapter> {
        let chapters = document
            .select(&sel("ul.row-content-chapter > li"))
            .map(chapter_item)
            .collect();
        normalize_chapter_list(chapters)
    }

    fn page_list_parse(&self, page_url: &str, document: &Html) -> Vec<Page> {
        document
            .select(&sel("div.container-chapter-reader > img"))
            .filter_map(|img| img.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .enumerate()
            .map(|(index, src)| Page {
                index,
                url: page_url.to_string(),
                image_url: src.to_string(),
            })
            .collect()
    }

    fn image_request(&self, page: &Page) -> SourceRequest {
        SourceRequest::get(page.image_url.as_str())
            .header("User-Agent", DESKTOP_USER_AGENT)
            .header("sec-fetch-dest", "image")
            .header("sec-fetch-mode", "no-cors")
            .header("sec-fetch-site", "cross-site")
            .header("Referer", page.url.as_str())
    }
}
