//! Query builder.

use crate::ODataService;
use crate::error::Error;
use crate::model::Entity;

use super::Filter;
use super::FeedPages;
use super::Query;
use super::QueryOption;
use super::QueryOptions;
use super::url::options_to_path;

/// Builder for a collection query.
///
/// Options render in the order they are chained; nothing is reordered or
/// de-duplicated. Filters all land in a single `$filter`, joined left to
/// right with the joiner of the call that added them.
///
/// Use [`Collection::query`](crate::api::Collection::query) (or any of the
/// collection's option shortcuts) to create a builder.
///
/// # Example
///
/// ```ignore
/// let mut dogs = service.collection("Dogs")
///     .filter(Filter::eq("Name", "Bob"))
///     .or(Filter::ne("Foo", 5))
///     .order_by(&["Name desc"])
///     .top(10)
///     .build();
///
/// println!("{} dogs", dogs.len().await?);
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    service: ODataService,
    href: String,
    options: QueryOptions,
    max_pages: Option<usize>,
}

impl QueryBuilder {
    /// Creates a new query builder for a collection `href`.
    pub(crate) fn new(service: ODataService, href: impl Into<String>) -> Self {
        Self {
            service,
            href: href.into(),
            options: QueryOptions::new(),
            max_pages: None,
        }
    }

    /// Appends an option as-is.
    pub fn option(mut self, option: QueryOption) -> Self {
        self.options.push(option);
        self
    }

    /// Limits the number of entities the server returns: `$top`.
    pub fn top(self, n: usize) -> Self {
        self.option(QueryOption::Top(n))
    }

    /// Skips entities: `$skip`.
    pub fn skip(self, n: usize) -> Self {
        self.option(QueryOption::Skip(n))
    }

    /// Selects properties: `$select`.
    ///
    /// Each name may itself be a comma-separated list.
    pub fn select(self, names: &[&str]) -> Self {
        self.option(QueryOption::Select(to_strings(names)))
    }

    /// Orders results: `$orderby`.
    ///
    /// Names may carry a direction, e.g. `"Name desc"`.
    pub fn order_by(self, names: &[&str]) -> Self {
        self.option(QueryOption::OrderBy(to_strings(names)))
    }

    /// Expands navigation properties: `$expand`.
    ///
    /// Names may be paths, e.g. `"Products/Suppliers"`.
    pub fn expand(self, names: &[&str]) -> Self {
        self.option(QueryOption::Expand(to_strings(names)))
    }

    /// Asks the server for the total count: `$inlinecount=allpages`.
    ///
    /// The count is available from [`Page::total_count`](super::Page::total_count)
    /// and [`Query::total_count`].
    pub fn inline_count(self) -> Self {
        self.option(QueryOption::InlineCount(true))
    }

    /// Explicitly disables the total count: `$inlinecount=none`.
    pub fn no_inline_count(self) -> Self {
        self.option(QueryOption::InlineCount(false))
    }

    /// Adds a filter joined with `and`.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.options.push_filter_and(filter);
        self
    }

    /// Adds a filter joined with `and`.
    pub fn and(self, filter: Filter) -> Self {
        self.filter(filter)
    }

    /// Adds a filter joined with `or`.
    pub fn or(mut self, filter: Filter) -> Self {
        self.options.push_filter_or(filter);
        self
    }

    /// Adds raw filter text joined with `and`.
    pub fn filter_raw(self, filter: impl Into<String>) -> Self {
        self.filter(Filter::raw(filter))
    }

    /// Stops following next links after `n` pages.
    pub fn max_pages(mut self, n: usize) -> Self {
        self.max_pages = Some(n);
        self
    }

    /// Returns the collection href the query starts from.
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Returns the options added so far.
    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Returns the request path: the href followed by the options.
    ///
    /// This is a pure read; the builder is left unchanged.
    pub fn to_path(&self) -> String {
        options_to_path(&self.href, &self.options)
    }

    /// Finalizes the builder into a [`Query`] that fetches on first access.
    pub fn build(self) -> Query {
        let path = self.to_path();
        Query::new(self.service, path, self.max_pages)
    }

    /// Converts this builder into an async iterator over pages.
    pub fn pages(self) -> FeedPages {
        let path = self.to_path();
        FeedPages::new(self.service, path, self.max_pages)
    }

    /// Executes the query and returns every entity from every page.
    pub async fn execute(self) -> Result<Vec<Entity>, Error> {
        self.build().into_entities().await
    }

    /// Executes the query and returns the first entity.
    ///
    /// Adds `$top=1` unless the caller already set a `$top`, and fetches a
    /// single page.
    pub async fn first(self) -> Result<Option<Entity>, Error> {
        let has_top = self
            .options
            .iter()
            .any(|option| matches!(option, QueryOption::Top(_)));
        let builder = if has_top { self } else { self.top(1) };

        let entities = builder.max_pages(1).execute().await?;
        Ok(entities.into_iter().next())
    }
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}
