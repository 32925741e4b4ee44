use crate::error::{Result, SourceError};
use crate::http_client::{Fetch, DESKTOP_USER_AGENT};
use crate::models::{Chapter, Manga, MangaStatus, MangasPage, Page};
use crate::rate_limit::RateLimit;
use crate::request::SourceRequest;
use async_trait::async_trait;
use scraper::Html;

/// Contract every site adapter implements.
///
/// Each operation is split into a pure request builder and a pure parser;
/// the provided `fetch_*` methods glue them to a [`Fetch`] executor.
#[async_trait]
pub trait Source: Send + Sync {
    fn name(&self) -> &'static str;

    fn lang(&self) -> &'static str {
        "en"
    }

    fn base_url(&self) -> &str;

    fn supports_latest(&self) -> bool {
        true
    }

    /// Request budget the site tolerates, applied by the executor.
    fn rate_limit(&self) -> Option<RateLimit> {
        None
    }

    /// Headers sent with plain page requests.
    fn headers(&self) -> Vec<(String, String)> {
        vec![("User-Agent".to_string(), DESKTOP_USER_AGENT.to_string())]
    }

    fn popular_manga_request(&self, page: u32) -> Result<SourceRequest>;
    fn popular_manga_parse(&self, document: &Html) -> MangasPage;

    fn latest_updates_request(&self, page: u32) -> Result<SourceRequest>;
    fn latest_updates_parse(&self, document: &Html) -> MangasPage;

    fn search_manga_request(&self, page: u32, query: &str) -> Result<SourceRequest>;
    fn search_manga_parse(&self, document: &Html) -> MangasPage;

    fn manga_details_request(&self, manga: &Manga) -> Result<SourceRequest> {
        Ok(SourceRequest::get(format!("{}{}", self.base_url(), manga.url)).headers(self.headers()))
    }

    /// Details page to a `Manga`. `url` is left empty; the caller owns it.
    fn manga_details_parse(&self, document: &Html) -> Manga;

    fn chapter_list_request(&self, manga: &Manga) -> Result<SourceRequest> {
        Ok(SourceRequest::get(format!("{}{}", self.base_url(), manga.url)).headers(self.headers()))
    }

    /// Chapters newest first, deduplicated.
    fn chapter_list_parse(&self, document: &Html) -> Vec<Chapter>;

    fn page_list_request(&self, chapter: &Chapter) -> Result<SourceRequest> {
        Ok(SourceRequest::get(format!("{}{}", self.base_url(), chapter.url)).headers(self.headers()))
    }

    /// Pages in reading order. `page_url` is where the document was served
    /// from and becomes each page's referer.
    fn page_list_parse(&self, page_url: &str, document: &Html) -> Vec<Page>;

    /// For sites that put one image per reader page. None of the current
    /// adapters do.
    fn image_url_parse(&self, _document: &Html) -> Result<String> {
        Err(SourceError::Unsupported("image_url_parse"))
    }

    fn image_request(&self, page: &Page) -> SourceRequest;

    async fn fetch_popular_manga(&self, client: &dyn Fetch, page: u32) -> Result<MangasPage> {
        let request = self.popular_manga_request(page)?;
        let response = client.fetch(&request).await?;
        let document = Html::parse_document(&response.body);
        let result = self.popular_manga_parse(&document);
        log::debug!("{}: popular page {} -> {} manga", self.name(), page, result.mangas.len());
        Ok(result)
    }

    async fn fetch_latest_updates(&self, client: &dyn Fetch, page: u32) -> Result<MangasPage> {
        if !self.supports_latest() {
            return Err(SourceError::Unsupported("latest updates"));
        }
        let request = self.latest_updates_request(page)?;
        let response = client.fetch(&request).await?;
        let document = Html::parse_document(&response.body);
        let result = self.latest_updates_parse(&document);
        log::debug!("{}: latest page {} -> {} manga", self.name(), page, result.mangas.len());
        Ok(result)
    }

    async fn fetch_search_manga(
        &self,
        client: &dyn Fetch,
        page: u32,
        query: &str,
    ) -> Result<MangasPage> {
        let request = self.search_manga_request(page, query)?;
        let response = client.fetch(&request).await?;
        let document = Html::parse_document(&response.body);
        let result = self.search_manga_parse(&document);
        log::debug!(
            "{}: search {:?} page {} -> {} manga",
            self.name(),
            query,
            page,
            result.mangas.len()
        );
        Ok(result)
    }

    async fn fetch_manga_details(&self, client: &dyn Fetch, manga: &Manga) -> Result<Manga> {
        let request = self.manga_details_request(manga)?;
        let response = client.fetch(&request).await?;
        let document = Html::parse_document(&response.body);
        let mut details = self.manga_details_parse(&document);
        details.url = manga.url.clone();
        Ok(details)
    }

    /// Licensed titles fail before any request is made.
    async fn fetch_chapter_list(&self, client: &dyn Fetch, manga: &Manga) -> Result<Vec<Chapter>> {
        if manga.status == MangaStatus::Licensed {
            return Err(SourceError::Licensed);
        }
        let request = self.chapter_list_request(manga)?;
        let response = client.fetch(&request).await?;
        let document = Html::parse_document(&response.body);
        let chapters = self.chapter_list_parse(&document);
        log::debug!("{}: {} chapters for {}", self.name(), chapters.len(), manga.url);
        Ok(chapters)
    }

    async fn fetch_page_list(&self, client: &dyn Fetch, chapter: &Chapter) -> Result<Vec<Page>> {
        let request = self.page_list_request(chapter)?;
        let response = client.fetch(&request).await?;
        let document = Html::parse_document(&response.body);
        let pages = self.page_list_parse(&response.url, &document);
        log::debug!("{}: {} pages for {}", self.name(), pages.len(), chapter.url);
        Ok(pages)
    }
}
