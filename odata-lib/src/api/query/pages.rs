//! Async iterator for feed pagination.

use log::debug;

use crate::ODataService;
use crate::api::feed::parse_feed;
use crate::api::query::Page;
use crate::error::Error;

/// Async iterator that yields one [`Page`] per request.
///
/// Follows `<link rel="next">` until the server stops sending one or the
/// page cap is reached. Stops for good after the first error.
///
/// # Example
///
/// ```ignore
/// let mut pages = service.collection("Packages")
///     .filter(Filter::eq("Id", "NUnit"))
///     .pages();
///
/// while let Some(page) = pages.next().await {
///     let page = page?;
///     for package in page.entities() {
///         println!("{:?}", package.get_string("Version"));
///     }
/// }
/// ```
#[derive(Debug)]
pub struct FeedPages {
    service: ODataService,
    /// The next path or URL to fetch.
    next_path: Option<String>,
    /// Maximum number of pages to fetch.
    max_pages: Option<usize>,
    /// Pages fetched so far.
    fetched: usize,
}

impl FeedPages {
    /// Creates an iterator starting at `path`.
    pub(crate) fn new(service: ODataService, path: String, max_pages: Option<usize>) -> Self {
        Self {
            service,
            next_path: Some(path),
            max_pages,
            fetched: 0,
        }
    }

    /// Returns the number of pages fetched so far.
    pub fn fetched(&self) -> usize {
        self.fetched
    }

    /// Fetches the next page of results.
    ///
    /// Returns `None` when all pages have been consumed.
    pub async fn next(&mut self) -> Option<Result<Page, Error>> {
        if self.max_pages.is_some_and(|max| self.fetched >= max) {
            if self.next_path.take().is_some() {
                debug!("Page cap of {} reached", self.fetched);
            }
            return None;
        }

        let path = self.next_path.take()?;

        match self.fetch_page(&path).await {
            Ok(page) => {
                self.fetched += 1;
                self.next_path = page.next_link().map(str::to_string);
                Some(Ok(page))
            }
            Err(e) => Some(Err(e)),
        }
    }

    async fn fetch_page(&self, path: &str) -> Result<Page, Error> {
        let metadata = self.service.metadata().await?;
        let body = self.service.fetch_document(path).await?;
        parse_feed(&body, &metadata, self.service.coercions())
    }
}
