use crate::error::{Result, SourceError};
use crate::helpers::{
    derive_chapter, element_text, image_source, normalize_chapter_list, parse_date_millis,
    parse_status, sel, select_attr, select_text, select_texts, url_without_domain,
};
use crate::http_client::DESKTOP_USER_AGENT;
use crate::models::{Chapter, Listing, Manga, MangasPage, Page, PaginationRequest};
use crate::rate_limit::RateLimit;
use crate::request::{encode_form, SourceRequest, FORM_CONTENT_TYPE};
use crate::source::Source;
use scraper::{ElementRef, Html};
use url::Url;

pub const BASE_URL: &str = "https://mangakomi.com";
const AJAX_ENDPOINT: &str = "/wp-admin/admin-ajax.php";
/// Query parameter carrying the page number until the request is rewritten.
const PAGE_PARAM: &str = "mypagenum";
const DATE_FORMAT: &str = "%m/%d/%Y";

const LISTING_ITEM: &str = "div.page-item-detail";
const SEARCH_ITEM: &str = "div.c-tabs-item__content";
const CHAPTER_ITEM: &str = "ul.version-chap > li.wp-manga-chapter";

/// Mangakomi, a WordPress Madara site. Page 1 of a listing is plain HTML;
/// later pages only come from Madara's `madara_load_more` AJAX action.
pub struct Mangakomi {
    base_url: String,
}

impl Mangakomi {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Listing URL with the page still in [`PAGE_PARAM`].
    pub fn listing_url(&self, request: &PaginationRequest) -> Result<Url> {
        let url = match request.listing {
            Listing::Popular => Url::parse(&format!(
                "{}/?m_orderby=views&{}={}",
                self.base_url, PAGE_PARAM, request.page
            ))?,
            Listing::Latest => Url::parse(&format!(
                "{}/manga/?m_orderby=latest&{}={}",
                self.base_url, PAGE_PARAM, request.page
            ))?,
            Listing::Search => {
                let query = request
                    .query
                    .as_deref()
                    .ok_or(SourceError::MissingParameter("s"))?;
                let mut url = Url::parse(&format!("{}/", self.base_url))?;
                url.query_pairs_mut()
                    .append_pair("s", &query.to_lowercase())
                    .append_pair(PAGE_PARAM, &request.page.to_string())
                    .append_pair("post_type", "wp-manga");
                url
            }
        };
        Ok(url)
    }

    /// Turn a listing URL into the request the site actually answers.
    ///
    /// Page 1 (or 0) stays a GET with [`PAGE_PARAM`] dropped. Any later page becomes
    /// a `madara_load_more` POST against the AJAX endpoint, referred from the
    /// stripped listing URL. URLs without [`PAGE_PARAM`] are returned as GETs
    /// untouched.
    pub fn make_paginated_request(&self, url: &Url) -> Result<SourceRequest> {
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        let Some(raw_page) = query_param(&params, PAGE_PARAM) else {
            return Ok(SourceRequest::get(url.as_str()).headers(self.headers()));
        };
        let page: u32 = raw_page
            .trim()
            .parse()
            .map_err(|_| SourceError::InvalidParameter {
                name: PAGE_PARAM,
                value: raw_page.to_string(),
            })?;

        let mut original = url.clone();
        original.set_query(None);
        {
            let kept: Vec<&(String, String)> =
                params.iter().filter(|(k, _)| k != PAGE_PARAM).collect();
            if !kept.is_empty() {
                let mut pairs = original.query_pairs_mut();
                for (k, v) in kept {
                    pairs.append_pair(k, v);
                }
            }
        }

        if page <= 1 {
            return Ok(SourceRequest::get(original.as_str()).headers(self.headers()));
        }

        let fields = match query_param(&params, "s") {
            Some(query) => search_form(page, query),
            None => archive_form(page, meta_key(query_param(&params, "m_orderby"))),
        };

        Ok(
            SourceRequest::post(format!("{}{}", self.base_url, AJAX_ENDPOINT), encode_form(&fields))
                .header("x-requested-with", "XMLHttpRequest")
                .header("origin", self.base_url.as_str())
                .header("sec-fetch-site", "same-origin")
                .header("sec-fetch-mode", "cors")
                .header("sec-fetch-dest", "empty")
                .header("content-type", FORM_CONTENT_TYPE)
                .header("referer", original.as_str()),
        )
    }

    fn paginated(&self, request: PaginationRequest) -> Result<SourceRequest> {
        let url = self.listing_url(&request)?;
        self.make_paginated_request(&url)
    }

    fn listing_parse(
        &self,
        document: &Html,
        item_css: &str,
        parse: fn(ElementRef) -> Manga,
    ) -> MangasPage {
        let mangas: Vec<Manga> = document.select(&sel(item_css)).map(parse).collect();
        // Load-more responses have no pager; any item means there may be more.
        let has_next_page = !mangas.is_empty();
        MangasPage {
            mangas,
            has_next_page,
        }
    }
}

impl Default for Mangakomi {
    fn default() -> Self {
        Self::new()
    }
}

fn query_param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// Madara meta key for an `m_orderby` value.
pub fn meta_key(order_by: Option<&str>) -> &'static str {
    match order_by {
        Some("latest") => "_latest_update",
        Some("views") => "_wp_manga_views",
        _ => "",
    }
}

fn search_form(page: u32, query: &str) -> Vec<(&'static str, String)> {
    vec![
        ("action", "madara_load_more".to_string()),
        ("page", page.to_string()),
        ("template", "madara-core/content/content-search".to_string()),
        ("vars[s]", query.to_string()),
        ("vars[orderby]", String::new()),
        ("vars[paged]", "1".to_string()),
        ("vars[template]", "search".to_string()),
        ("vars[meta_query][0][relation]", "AND".to_string()),
        ("vars[meta_query][relation]", "OR".to_string()),
        ("vars[post_type]", "wp-manga".to_string()),
        ("vars[post_status]", "publish".to_string()),
        ("vars[manga_archives_item_layout]", "default".to_string()),
    ]
}

fn archive_form(page: u32, meta_key: &str) -> Vec<(&'static str, String)> {
    vec![
        ("action", "madara_load_more".to_string()),
        ("page", page.to_string()),
        ("template", "madara-core/content/content-archive".to_string()),
        ("vars[paged]", "1".to_string()),
        ("vars[orderby]", "meta_value_num".to_string()),
        ("vars[template]", "archive".to_string()),
        ("vars[sidebar]", "full".to_string()),
        ("vars[post_type]", "wp-manga".to_string()),
        ("vars[post_status]", "publish".to_string()),
        ("vars[meta_key]", meta_key.to_string()),
        ("vars[order]", "desc".to_string()),
        ("vars[meta_query][relation]", "OR".to_string()),
        ("vars[manga_archives_item_layout]", "default".to_string()),
    ]
}

/// Madara post id kept from the details page.
fn manga_id(manga: &Manga) -> Option<i64> {
    manga.site_id.as_deref()?.trim().parse().ok()
}

fn archive_item(element: ElementRef) -> Manga {
    let link = element
        .select(&sel("div.item-summary > div.post-title > h3.h5 > a"))
        .next();
    Manga {
        url: link
            .and_then(|a| a.value().attr("href"))
            .map(url_without_domain)
            .unwrap_or_default(),
        title: link.map(element_text).unwrap_or_default(),
        thumbnail_url: element
            .select(&sel("div.item-thumb > a > img"))
            .next()
            .and_then(image_source),
        ..Default::default()
    }
}

fn search_item(element: ElementRef) -> Manga {
    let link = element
        .select(&sel("div.tab-summary > div.post-title > h3.h4 > a"))
        .next();
    Manga {
        url: link
            .and_then(|a| a.value().attr("href"))
            .map(url_without_domain)
            .unwrap_or_default(),
        title: link.map(element_text).unwrap_or_default(),
        thumbnail_url: element
            .select(&sel("div.tab-thumb > a > img"))
            .next()
            .and_then(image_source),
        ..Default::default()
    }
}

fn chapter_item(element: ElementRef) -> Chapter {
    let link = element.select(&sel("a")).next();
    let raw_name = link.map(element_text).unwrap_or_default();
    let (name, chapter_number) = derive_chapter(&raw_name, -1.0);

    Chapter {
        name,
        chapter_number,
        url: link
            .and_then(|a| a.value().attr("href"))
            .map(url_without_domain)
            .unwrap_or_default(),
        date_upload: parse_date_millis(
            &select_text(element, "span.chapter-release-date > i"),
            DATE_FORMAT,
        ),
    }
}

impl Source for Mangakomi {
    fn name(&self) -> &'static str {
        "Mangakomi"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn rate_limit(&self) -> Option<RateLimit> {
        Some(RateLimit::per_second(1))
    }

    fn popular_manga_request(&self, page: u32) -> Result<SourceRequest> {
        self.paginated(PaginationRequest::popular(page))
    }

    fn popular_manga_parse(&self, document: &Html) -> MangasPage {
        self.listing_parse(document, LISTING_ITEM, archive_item)
    }

    fn latest_updates_request(&self, page: u32) -> Result<SourceRequest> {
        self.paginated(PaginationRequest::latest(page))
    }

    fn latest_updates_parse(&self, document: &Html) -> MangasPage {
        self.listing_parse(document, LISTING_ITEM, archive_item)
    }

    fn search_manga_request(&self, page: u32, query: &str) -> Result<SourceRequest> {
        self.paginated(PaginationRequest::search(page, query))
    }

    fn search_manga_parse(&self, document: &Html) -> MangasPage {
        self.listing_parse(document, SEARCH_ITEM, search_item)
    }

    fn manga_details_parse(&self, document: &Html) -> Manga {
        let root = document.root_element();
        let summary = document.select(&sel("div.tab-summary")).next();
        let from_summary = |css: &str| summary.map(|s| select_texts(s, css)).unwrap_or_default();

        Manga {
            title: select_text(root, "div.post-title > h1"),
            thumbnail_url: root
                .select(&sel("div.summary_image > a > img"))
                .next()
                .and_then(image_source),
            description: Some(select_text(root, "div.description-summary > div > p:nth-child(1)"))
                .filter(|d| !d.is_empty()),
            authors: from_summary("div.author-content > a"),
            genres: from_summary("div.genres-content > a"),
            status: parse_status(
                &summary
                    .map(|s| {
                        select_text(s, "div.post-status > div:nth-child(2) > div.summary-content")
                    })
                    .unwrap_or_default(),
            ),
            site_id: select_attr(root, "input.rating-post-id", "value").filter(|v| !v.is_empty()),
            ..Default::default()
        }
    }

    /// Chapters come from the `manga_get_chapters` AJAX action, which needs
    /// the post id found on the details page.
    fn chapter_list_request(&self, manga: &Manga) -> Result<SourceRequest> {
        let id = manga_id(manga).ok_or_else(|| {
            SourceError::NoChapters(format!("no Mangakomi post id for {}", manga.url))
        })?;

        Ok(SourceRequest::post(
            format!("{}{}", self.base_url, AJAX_ENDPOINT),
            format!("action=manga_get_chapters&manga={}", id),
        )
        .header("dnt", "1")
        .header("x-requested-with", "XMLHttpRequest")
        .header("user-agent", DESKTOP_USER_AGENT)
        .header("content-type", FORM_CONTENT_TYPE)
        .header("origin", self.base_url.as_str())
        .header("sec-fetch-site", "same-origin")
        .header("sec-fetch-mode", "cors")
        .header("sec-fetch-dest", "empty")
        .header("referer", format!("{}{}", self.base_url, manga.url)))
    }

    fn chapter_list_parse(&self, document: &Html) -> Vec<Chapter> {
        let chapters = document.select(&sel(CHAPTER_ITEM)).map(chapter_item).collect();
        normalize_chapter_list(chapters)
    }

    fn page_list_parse(&self, page_url: &str, document: &Html) -> Vec<Page> {
        document
            .select(&sel("div.reading-content > div > img.wp-manga-chapter-img"))
            .filter_map(image_source)
            .enumerate()
            .map(|(index, image_url)| Page {
                index,
                url: page_url.to_string(),
                image_url,
            })
            .collect()
    }

    fn image_request(&self, page: &Page) -> SourceRequest {
        SourceRequest::get(page.image_url.as_str())
            .header("User-Agent", DESKTOP_USER_AGENT)
            .header("sec-fetch-dest", "image")
            .header("sec-fetch-mode", "no-cors")
            .header("sec-fetch-site", "same-site")
            .header("Referer", self.base_url.as_str())
    }
}
