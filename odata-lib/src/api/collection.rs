//! Collection handles and keyed lookup

use log::debug;

use crate::ODataService;
use crate::api::feed::parse_entry;
use crate::api::query::Filter;
use crate::api::query::QueryBuilder;
use crate::api::query::url::key_path;
use crate::error::ApiError;
use crate::error::Error;
use crate::model::Entity;
use crate::model::EntityKey;

/// A handle to one entity collection of a service.
///
/// Handles are cheap to clone and hold no query state: every option method
/// starts a fresh [`QueryBuilder`].
///
/// # Example
///
/// ```ignore
/// let courses = service.collection("Courses");
///
/// let first = courses.top(1).first().await?;
/// let scrum = courses.get("Agile Team Practices with Scrum").await?;
/// let missing = courses.get("foo").await?; // None
/// ```
#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    href: String,
    service: ODataService,
}

impl Collection {
    pub(crate) fn new(service: ODataService, name: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            href: href.into(),
            service,
        }
    }

    /// Returns the collection's title.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the collection's path relative to the service root.
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Returns the service this collection belongs to.
    pub fn service(&self) -> &ODataService {
        &self.service
    }

    /// Fetches a single entity by key.
    ///
    /// Returns `Ok(None)` if the service answers `404 Not Found`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let course = service.collection("Courses").get("Agile Team Practices with Scrum").await?;
    ///
    /// let package = service
    ///     .collection("Packages")
    ///     .get(EntityKey::composite([("Id", "NUnit"), ("Version", "2.5.7.10213")]))
    ///     .await?;
    /// ```
    pub async fn get(&self, key: impl Into<EntityKey>) -> Result<Option<Entity>, Error> {
        let path = key_path(&self.href, &key.into())?;
        let metadata = self.service.metadata().await?;

        let response = self.service.fetch(&path).await?;
        if response.is_not_found() {
            debug!("{} not found", path);
            return Ok(None);
        }
        if !response.is_success() {
            return Err(ApiError::http(response.status, response.body).into());
        }

        let entity = parse_entry(&response.body, &metadata, self.service.coercions())?;
        Ok(Some(entity))
    }

    // =========================================================================
    // Query delegations
    // =========================================================================

    /// Starts a query with no options.
    pub fn query(&self) -> QueryBuilder {
        QueryBuilder::new(self.service.clone(), self.href.clone())
    }

    /// Starts a query with `$top`.
    pub fn top(&self, n: usize) -> QueryBuilder {
        self.query().top(n)
    }

    /// Starts a query with `$skip`.
    pub fn skip(&self, n: usize) -> QueryBuilder {
        self.query().skip(n)
    }

    /// Starts a query with `$select`.
    pub fn select(&self, names: &[&str]) -> QueryBuilder {
        self.query().select(names)
    }

    /// Starts a query with `$orderby`.
    pub fn order_by(&self, names: &[&str]) -> QueryBuilder {
        self.query().order_by(names)
    }

    /// Starts a query with `$expand`.
    pub fn expand(&self, names: &[&str]) -> QueryBuilder {
        self.query().expand(names)
    }

    /// Starts a query with `$inlinecount=allpages`.
    pub fn inline_count(&self) -> QueryBuilder {
        self.query().inline_count()
    }

    /// Starts a query with `$inlinecount=none`.
    pub fn no_inline_count(&self) -> QueryBuilder {
        self.query().no_inline_count()
    }

    /// Starts a query with a filter.
    pub fn filter(&self, filter: Filter) -> QueryBuilder {
        self.query().filter(filter)
    }

    /// Starts a query with raw filter text.
    pub fn filter_raw(&self, filter: impl Into<String>) -> QueryBuilder {
        self.query().filter_raw(filter)
    }

    /// Starts a query capped at `n` pages.
    pub fn max_pages(&self, n: usize) -> QueryBuilder {
        self.query().max_pages(n)
    }
}
