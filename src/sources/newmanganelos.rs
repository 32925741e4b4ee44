use crate::error::Result;
use crate::helpers::{
    derive_chapter, element_text, fix_protocol_relative, normalize_chapter_list, parse_status,
    sel, select_attr, select_text, select_texts, text_after_label, url_without_domain,
};
use crate::http_client::DESKTOP_USER_AGENT;
use crate::models::{Chapter, Manga, MangasPage, Page};
use crate::rate_limit::RateLimit;
use crate::request::SourceRequest;
use crate::source::Source;
use scraper::{ElementRef, Html};
use url::Url;

/// Scheme prepended to protocol-relative image URLs.
pub const PROTOCOL: &str = "http:";
pub const BASE_URL: &str = "http://manganelos.com";

const LISTING_ITEM: &str = "div.cate-manga > div.col-md-6";
const NEXT_PAGE: &str = "ul.pagination > li > a[rel=next]";
const CHAPTER_LINK: &str =
    "div.chapter-list:nth-child(1) > ul > li.row > div.chapter > h4 > a";

/// NewManganelos (manganelos.com). Author and status are loose text inside
/// one paragraph; page images are a comma-separated list in `#arraydata`.
pub struct NewManganelos {
    base_url: String,
}

impl NewManganelos {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Page 1 is the bare listing path; later pages are `{path_n}?page=N`.
    fn listing_request(&self, path: &str, path_n: &str, page: u32) -> Result<SourceRequest> {
        let url = if page > 1 {
            let mut url = Url::parse(&format!("{}/{}", self.base_url, path_n))?;
            url.query_pairs_mut().append_pair("page", &page.to_string());
            url
        } else {
            Url::parse(&format!("{}/{}", self.base_url, path))?
        };
        Ok(SourceRequest::get(url.as_str()).headers(self.headers()))
    }

    fn listing_parse(&self, document: &Html) -> MangasPage {
        MangasPage {
            mangas: document.select(&sel(LISTING_ITEM)).map(listing_item).collect(),
            has_next_page: document.select(&sel(NEXT_PAGE)).next().is_some(),
        }
    }
}

impl Default for NewManganelos {
    fn default() -> Self {
        Self::new()
    }
}

fn listing_item(element: ElementRef) -> Manga {
    let media = element.select(&sel("div.media")).next().unwrap_or(element);
    let link = media.select(&sel("div.media-body > a")).next();
    Manga {
        url: link
            .and_then(|a| a.value().attr("href"))
            .map(url_without_domain)
            .unwrap_or_default(),
        title: link
            .and_then(|a| a.value().attr("title"))
            .map(|t| t.trim().to_string())
            .unwrap_or_default(),
        thumbnail_url: select_attr(media, "div.cover-manga > a > img", "src")
            .map(|src| fix_protocol_relative(&src, PROTOCOL)),
        ..Default::default()
    }
}

/// `;`-separated names, blanks dropped.
fn split_names<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    values
        .into_iter()
        .flat_map(|v| v.split(';'))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn chapter_item(link: ElementRef) -> Chapter {
    let (name, chapter_number) = derive_chapter(&element_text(link), 0.0);
    Chapter {
        name,
        chapter_number,
        url: link
            .value()
            .attr("href")
            .map(url_without_domain)
            .unwrap_or_default(),
        // the chapter list carries no dates
        date_upload: 0,
    }
}

impl Source for NewManganelos {
    fn name(&self) -> &'static str {
        "NewManganelos"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn rate_limit(&self) -> Option<RateLimit> {
        Some(RateLimit::per_second(2))
    }

    fn popular_manga_request(&self, page: u32) -> Result<SourceRequest> {
        self.listing_request("popular-manga", "popular-manga/", page)
    }

    fn popular_manga_parse(&self, document: &Html) -> MangasPage {
        self.listing_parse(document)
    }

    fn latest_updates_request(&self, page: u32) -> Result<SourceRequest> {
        self.listing_request("latest-manga", "latest-manga", page)
    }

    fn latest_updates_parse(&self, document: &Html) -> MangasPage {
        self.listing_parse(document)
    }

    fn search_manga_request(&self, page: u32, query: &str) -> Result<SourceRequest> {
        let mut url = Url::parse(&format!("{}/search", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("q", &query.to_lowercase())
            .append_pair("page", &page.to_string());
        Ok(SourceRequest::get(url.as_str()).headers(self.headers()))
    }

    fn search_manga_parse(&self, document: &Html) -> MangasPage {
        self.listing_parse(document)
    }

    fn manga_details_parse(&self, document: &Html) -> Manga {
        let root = document.root_element();
        let body = document.select(&sel("div.media-body")).next();
        let update = body.and_then(|b| b.select(&sel("p.description-update")).next());

        let genres = body
            .map(|b| select_texts(b, "p.description-update > a"))
            .unwrap_or_default();
        let authors = update
            .and_then(|p| text_after_label(p, "Author(s):"))
            .map(|a| split_names([a.as_str()]))
            .unwrap_or_default();
        let status = update
            .and_then(|p| text_after_label(p, "Status:"))
            .unwrap_or_default();

        Manga {
            title: select_text(root, "div.manga-detail h1.title-manga"),
            thumbnail_url: select_attr(root, "div.manga-detail > div.cover-detail > img", "src")
                .map(|src| fix_protocol_relative(&src, PROTOCOL)),
            description: Some(select_text(root, "div.manga-content > p")).filter(|d| !d.is_empty()),
            authors,
            genres: split_names(genres.iter().map(String::as_str)),
            status: parse_status(&status),
            ..Default::default()
        }
    }

    fn chapter_list_parse(&self, document: &Html) -> Vec<Chapter> {
        let chapters = document.select(&sel(CHAPTER_LINK)).map(chapter_item).collect();
        normalize_chapter_list(chapters)
    }

    fn page_list_parse(&self, page_url: &str, document: &Html) -> Vec<Page> {
        let data = select_text(document.root_element(), "p#arraydata");
        data.split(',')
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
            .header("dnt", "1")
            .header("Referer", page.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MangaStatus;

    #[test]
    fn test_listing_requests() {
        let source = NewManganelos::new();
        assert_eq!(
            source.popular_manga_request(1).unwrap().url,
            "http://manganelos.com/popular-manga"
        );
        assert_eq!(
            source.popular_manga_request(3).unwrap().url,
            "http://manganelos.com/popular-manga/?page=3"
        );
        assert_eq!(
            source.latest_updates_request(2).unwrap().url,
            "http://manganelos.com/latest-manga?page=2"
        );
        assert_eq!(
            source.search_manga_request(1, "Kingdom Hearts").unwrap().url,
            "http://manganelos.com/search?q=kingdom+hearts&page=1"
        );
    }

    #[test]
    fn test_listing_parse_fixes_thumbnails() {
        let html = r#"
            <div class="cate-manga">
              <div class="col-md-6">
                <div class="media">
                  <div class="cover-manga"><a href="/manga/kingdom"><img src="//img.manganelos.com/kingdom.jpg"></a></div>
                  <div class="media-body"><a href="http://manganelos.com/manga/kingdom" title="Kingdom">Kingdom</a></div>
                </div>
              </div>
            </div>
            <ul class="pagination"><li><a href="?page=2" rel="next">»</a></li></ul>"#;
        let page = NewManganelos::new().popular_manga_parse(&Html::parse_document(html));
        assert!(page.has_next_page);
        assert_eq!(page.mangas.len(), 1);
        assert_eq!(page.mangas[0].title, "Kingdom");
        assert_eq!(page.mangas[0].url, "/manga/kingdom");
        assert_eq!(
            page.mangas[0].thumbnail_url.as_deref(),
            Some("http://img.manganelos.com/kingdom.jpg")
        );
    }

    #[test]
    fn test_details_parse_reads_loose_text() {
        let html = r#"
            <div class="manga-detail">
              <h1 class="title-manga">Kingdom</h1>
              <div class="cover-detail"><img src="//img.manganelos.com/kingdom.jpg"></div>
              <div class="media-body">
                <p class="description-update"><span>Author(s): </span>Hara Yasuhisa; Ohba &amp; Obata <br><span>Status: </span> Completed <br><span>Genres: </span><a href="/genre/action">Action; </a><a href="/genre/war">War; </a></p>
              </div>
            </div>
            <div class="manga-content"><p>Warring States period.</p></div>"#;
        let manga = NewManganelos::new().manga_details_parse(&Html::parse_document(html));
        assert_eq!(manga.title, "Kingdom");
        assert_eq!(manga.authors, vec!["Hara Yasuhisa", "Ohba & Obata"]);
        assert_eq!(manga.genres, vec!["Action", "War"]);
        assert_eq!(manga.status, MangaStatus::Completed);
        assert_eq!(
            manga.thumbnail_url.as_deref(),
            Some("http://img.manganelos.com/kingdom.jpg")
        );
        assert_eq!(manga.description.as_deref(), Some("Warring States period."));
    }

    #[test]
    fn test_chapter_list_parse() {
        let html = r#"
            <div class="manga-chapters">
              <div class="chapter-list">
                <ul>
                  <li class="row"><div class="chapter"><h4><a href="http://manganelos.com/kingdom/chapter-10.5">Kingdom Chapter 10.5</a></h4></div></li>
                  <li class="row"><div class="chapter"><h4><a href="http://manganelos.com/kingdom/chapter-11">Kingdom Chapter 11</a></h4></div></li>
                  <li class="row"><div class="chapter"><h4><a href="http://manganelos.com/kingdom/chapter-11-dup">Kingdom Chapter 11</a></h4></div></li>
                  <li class="row"><div class="chapter"><h4><a href="http://manganelos.com/kingdom/prologue">Prologue</a></h4></div></li>
                </ul>
              </div>
            </div>"#;
        let chapters = NewManganelos::new().chapter_list_parse(&Html::parse_document(html));
        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[0].name, "Chapter 11");
        assert_eq!(chapters[0].url, "/kingdom/chapter-11-dup");
        assert_eq!(chapters[1].chapter_number, 10.5);
        assert_eq!(chapters[2].name, "Prologue");
        assert_eq!(chapters[2].chapter_number, 0.0);
        assert!(chapters.iter().all(|c| c.date_upload == 0));
    }

    #[test]
    fn test_page_list_splits_array_data() {
        let html = r#"<p id="arraydata" style="display:none">https://img.x/1.jpg,https://img.x/2.jpg, https://img.x/3.jpg,</p>"#;
        let pages = NewManganelos::new().page_list_parse(
            "http://manganelos.com/kingdom/chapter-11",
            &Html::parse_document(html),
        );
        let urls: Vec<&str> = pages.iter().map(|p| p.image_url.as_str()).collect();
        assert_eq!(urls, vec!["https://img.x/1.jpg", "https://img.x/2.jpg", "https://img.x/3.jpg"]);
        assert_eq!(pages[2].index, 2);
        assert_eq!(pages[0].url, "http://manganelos.com/kingdom/chapter-11");
    }

    #[test]
    fn test_image_request_headers() {
        let page = Page {
            index: 0,
            url: "http://manganelos.com/kingdom/chapter-11".to_string(),
            image_url: "https://img.x/1.jpg".to_string(),
        };
        let req = NewManganelos::new().image_request(&page);
        assert_eq!(req.header_value("dnt"), Some("1"));
        assert_eq!(req.header_value("referer"), Some("http://manganelos.com/kingdom/chapter-11"));
    }
}
