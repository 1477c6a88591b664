//! Query execution state machine.

use log::debug;
use log::warn;

use crate::ODataService;
use crate::error::Error;
use crate::error::QueryError;
use crate::model::Entity;

use super::FeedPages;

/// Where a [`Query`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    /// Built, nothing fetched yet.
    Built,
    /// Pages are being fetched.
    Executing,
    /// Every page was fetched.
    Done,
    /// A page fetch failed; entities from earlier pages are kept.
    Failed,
}

/// A built query and the entities it has materialized.
///
/// Nothing is fetched until the first access through one of the async
/// accessors ([`len`](Self::len), [`get`](Self::get), [`first`](Self::first),
/// [`last`](Self::last), [`entities`](Self::entities), ...). That access
/// fetches every page, following next links up to the page cap. Later
/// accesses reuse the result and never fetch again.
///
/// If a page fails, the error is returned, the query moves to
/// [`QueryState::Failed`] and entities from earlier pages stay available
/// through [`materialized`](Self::materialized). Later accesses return
/// [`QueryError::Failed`].
///
/// The accessors take `&mut self`; sharing a query between tasks needs
/// external synchronization.
///
/// # Example
///
/// ```ignore
/// let mut courses = service.collection("Courses").top(1).build();
///
/// if let Some(course) = courses.first().await? {
///     println!("{:?}", course.get_string("Title")?);
/// }
/// assert_eq!(courses.state(), QueryState::Done);
/// ```
#[derive(Debug)]
pub struct Query {
    service: ODataService,
    path: String,
    max_pages: Option<usize>,
    state: QueryState,
    entities: Vec<Entity>,
    total_count: Option<usize>,
    pages_fetched: usize,
    failure: Option<String>,
}

impl Query {
    pub(crate) fn new(service: ODataService, path: String, max_pages: Option<usize>) -> Self {
        Self {
            service,
            path,
            max_pages,
            state: QueryState::Built,
            entities: Vec::new(),
            total_count: None,
            pages_fetched: 0,
            failure: None,
        }
    }

    // =========================================================================
    // Non-fetching accessors
    // =========================================================================

    /// Returns the request path of the first page.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the page cap, if any.
    pub fn max_pages(&self) -> Option<usize> {
        self.max_pages
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> QueryState {
        self.state
    }

    /// Returns the entities materialized so far, without fetching.
    pub fn materialized(&self) -> &[Entity] {
        &self.entities
    }

    /// Returns the number of pages fetched so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Returns the server's total count from the first page, if it was
    /// requested with `$inlinecount=allpages` and the query has run.
    pub fn total_count(&self) -> Option<usize> {
        self.total_count
    }

    // =========================================================================
    // Fetching accessors
    // =========================================================================

    /// Returns the number of entities.
    pub async fn len(&mut self) -> Result<usize, Error> {
        self.execute().await?;
        Ok(self.entities.len())
    }

    /// Returns `true` if the query matched no entities.
    pub async fn is_empty(&mut self) -> Result<bool, Error> {
        self.execute().await?;
        Ok(self.entities.is_empty())
    }

    /// Returns the entity at `index`.
    pub async fn get(&mut self, index: usize) -> Result<Option<&Entity>, Error> {
        self.execute().await?;
        Ok(self.entities.get(index))
    }

    /// Returns the first entity.
    pub async fn first(&mut self) -> Result<Option<&Entity>, Error> {
        self.execute().await?;
        Ok(self.entities.first())
    }

    /// Returns the last entity.
    pub async fn last(&mut self) -> Result<Option<&Entity>, Error> {
        self.execute().await?;
        Ok(self.entities.last())
    }

    /// Returns every entity.
    pub async fn entities(&mut self) -> Result<&[Entity], Error> {
        self.execute().await?;
        Ok(&self.entities)
    }

    /// Consumes the query and returns every entity.
    pub async fn into_entities(mut self) -> Result<Vec<Entity>, Error> {
        self.execute().await?;
        Ok(self.entities)
    }

    /// Runs the query unless it already ran.
    pub async fn execute(&mut self) -> Result<(), Error> {
        match self.state {
            QueryState::Done => return Ok(()),
            QueryState::Failed => return Err(self.failed()),
            QueryState::Executing => {
                // A previous run was dropped mid-flight
                self.fail("execution was interrupted before completing".to_string());
                return Err(self.failed());
            }
            QueryState::Built => {}
        }

        self.state = QueryState::Executing;
        debug!("Executing query {}", self.path);

        let mut pages = FeedPages::new(self.service.clone(), self.path.clone(), self.max_pages);

        while let Some(result) = pages.next().await {
            match result {
                Ok(page) => {
                    if self.pages_fetched == 0 {
                        self.total_count = page.total_count();
                    }
                    self.pages_fetched += 1;
                    self.entities.extend(page.into_entities());
                }
                Err(e) => {
                    self.fail(e.to_string());
                    return Err(e);
                }
            }
        }

        debug!(
            "Query {} done: {} entities in {} pages",
            self.path,
            self.entities.len(),
            self.pages_fetched
        );
        self.state = QueryState::Done;
        Ok(())
    }

    fn fail(&mut self, message: String) {
        warn!(
            "Query {} failed after {} pages: {}",
            self.path, self.pages_fetched, message
        );
        self.failure = Some(message);
        self.state = QueryState::Failed;
    }

    fn failed(&self) -> Error {
        Error::Query(QueryError::Failed {
            message: self.failure.clone().unwrap_or_default(),
        })
    }
}
