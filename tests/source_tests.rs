use async_trait::async_trait;
use manga_sources::sources::{by_name, Mangakomi, Manganelo, NewManganelos};
use manga_sources::{
    Chapter, Fetch, Manga, MangaStatus, RawResponse, Result, Source, SourceError, SourceRequest,
};
use reqwest::Method;
use std::sync::Mutex;

/// Answers every request with one canned document and remembers what was asked.
struct RecordingFetch {
    body: String,
    served_from: Option<String>,
    requests: Mutex<Vec<SourceRequest>>,
}

impl RecordingFetch {
    fn new(body: &str) -> Self {
        Self {
            body: body.to_string(),
            served_from: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn served_from(mut self, url: &str) -> Self {
        self.served_from = Some(url.to_string());
        self
    }

    fn requests(&self) -> Vec<SourceRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetch for RecordingFetch {
    async fn fetch(&self, request: &SourceRequest) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(RawResponse {
            url: self.served_from.clone().unwrap_or_else(|| request.url.clone()),
            body: self.body.clone(),
        })
    }
}

fn manga(url: &str) -> Manga {
    Manga {
        url: url.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_licensed_manga_makes_no_request() {
    let fetch = RecordingFetch::new("<html></html>");
    let licensed = Manga {
        url: "/manga/licensed/".to_string(),
        status: MangaStatus::Licensed,
        site_id: Some("42".to_string()),
        ..Default::default()
    };

    for source in manga_sources::sources::all() {
        let result = source.fetch_chapter_list(&fetch, &licensed).await;
        assert!(
            matches!(result, Err(SourceError::Licensed)),
            "{} should refuse licensed titles",
            source.name()
        );
    }
    assert!(fetch.requests().is_empty());
}

#[tokio::test]
async fn test_mangakomi_chapters_need_post_id() {
    let fetch = RecordingFetch::new("<html></html>");
    let result = Mangakomi::new()
        .fetch_chapter_list(&fetch, &manga("/manga/solo-leveling/"))
        .await;

    assert!(matches!(result, Err(SourceError::NoChapters(_))));
    assert!(fetch.requests().is_empty());
}

#[tokio::test]
async fn test_mangakomi_details_then_chapters() {
    let details_html = r#"
        <div class="post-title"><h1>Solo Leveling</h1></div>
        <input class="rating-post-id" value="1234">
        <div class="tab-summary">
          <div class="author-content"><a href="/author/chugong">Chugong</a></div>
          <div class="genres-content"><a href="/genre/action">Action</a></div>
        </div>"#;
    let source = Mangakomi::new();

    let fetch = RecordingFetch::new(details_html);
    let details = source
        .fetch_manga_details(&fetch, &manga("/manga/solo-leveling/"))
        .await
        .unwrap();
    assert_eq!(details.url, "/manga/solo-leveling/");
    assert_eq!(details.title, "Solo Leveling");
    assert_eq!(details.site_id.as_deref(), Some("1234"));
    assert_eq!(fetch.requests()[0].url, "https://mangakomi.com/manga/solo-leveling/");

    let chapters_html = r#"
        <ul class="main version-chap">
          <li class="wp-manga-chapter"><a href="https://mangakomi.com/manga/solo-leveling/chapter-2/">Chapter 2</a><span class="chapter-release-date"><i>01/03/2020</i></span></li>
          <li class="wp-manga-chapter"><a href="https://mangakomi.com/manga/solo-leveling/chapter-1/">Chapter 1</a><span class="chapter-release-date"><i>01/02/2020</i></span></li>
        </ul>"#;
    let fetch = RecordingFetch::new(chapters_html);
    let chapters = source.fetch_chapter_list(&fetch, &details).await.unwrap();

    let requests = fetch.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].url, "https://mangakomi.com/wp-admin/admin-ajax.php");
    assert_eq!(
        requests[0].body.as_deref(),
        Some("action=manga_get_chapters&manga=1234")
    );

    let names: Vec<&str> = chapters.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Chapter 2", "Chapter 1"]);
    assert_eq!(chapters[1].date_upload, 1_577_923_200_000);
    assert_eq!(chapters[0].url, "/manga/solo-leveling/chapter-2/");
}

#[tokio::test]
async fn test_mangakomi_second_page_goes_through_ajax() {
    let listing_html = r#"
        <div class="page-item-detail">
          <div class="item-thumb"><a href="/manga/a/"><img data-src="https://mangakomi.com/a.jpg" src=""></a></div>
          <div class="item-summary"><div class="post-title"><h3 class="h5"><a href="https://mangakomi.com/manga/a/">A</a></h3></div></div>
        </div>"#;
    let fetch = RecordingFetch::new(listing_html);
    let page = Mangakomi::new().fetch_popular_manga(&fetch, 2).await.unwrap();

    assert!(page.has_next_page);
    assert_eq!(page.mangas[0].title, "A");
    assert_eq!(page.mangas[0].thumbnail_url.as_deref(), Some("https://mangakomi.com/a.jpg"));

    let request = &fetch.requests()[0];
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.form_value("page").as_deref(), Some("2"));
}

#[tokio::test]
async fn test_empty_listing_has_no_next_page() {
    let fetch = RecordingFetch::new("<html><body></body></html>");
    for source in manga_sources::sources::all() {
        let page = source.fetch_popular_manga(&fetch, 1).await.unwrap();
        assert!(page.mangas.is_empty(), "{}", source.name());
        assert!(!page.has_next_page, "{}", source.name());
    }
}

#[tokio::test]
async fn test_manganelo_pages_take_served_url_as_referer() {
    let html = r#"
        <div class="container-chapter-reader">
          <img src="https://s8.mkklcdnv8.com/1.jpg">
          <img src="https://s8.mkklcdnv8.com/2.jpg">
        </div>"#;
    let fetch = RecordingFetch::new(html).served_from("https://chapmanganelo.com/manga-ab1/chapter-3");
    let chapter = Chapter {
        name: "Chapter 3".to_string(),
        chapter_number: 3.0,
        url: "/chapter/ab1/chapter_3".to_string(),
        date_upload: 0,
    };
    let source = Manganelo::new();
    let pages = source.fetch_page_list(&fetch, &chapter).await.unwrap();

    assert_eq!(fetch.requests()[0].url, "https://manganelo.com/chapter/ab1/chapter_3");
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[1].index, 1);
    assert_eq!(pages[0].url, "https://chapmanganelo.com/manga-ab1/chapter-3");

    let image = source.image_request(&pages[0]);
    assert_eq!(
        image.header_value("referer"),
        Some("https://chapmanganelo.com/manga-ab1/chapter-3")
    );
}

#[tokio::test]
async fn test_newmanganelos_search_request() {
    let fetch = RecordingFetch::new("<html></html>");
    NewManganelos::new()
        .fetch_search_manga(&fetch, 2, "One Piece")
        .await
        .unwrap();

    let request = &fetch.requests()[0];
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.url, "http://manganelos.com/search?q=one+piece&page=2");
}

#[tokio::test]
async fn test_lookup_by_name_fetches_with_that_source() {
    let source = by_name("Manganelo").unwrap();
    let fetch = RecordingFetch::new("<html></html>");
    source.fetch_latest_updates(&fetch, 1).await.unwrap();
    assert!(fetch.requests()[0].url.starts_with("https://manganelo.com/"));
}
