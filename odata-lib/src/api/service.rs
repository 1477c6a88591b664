//! Service document discovery

use log::debug;

use crate::ODataService;
use crate::api::Collection;
use crate::api::feed::parse_service_document;
use crate::error::Error;

impl ODataService {
    /// Fetches the service document and returns its collections in
    /// document order.
    pub async fn collections(&self) -> Result<Vec<Collection>, Error> {
        let body = self.fetch_document("/").await?;
        let collections = parse_service_document(&body)?;
        debug!("Service {} advertises {} collections", self.root(), collections.len());

        Ok(collections
            .into_iter()
            .map(|info| Collection::new(self.clone(), info.name, info.href))
            .collect())
    }

    /// Returns the names of the advertised collections.
    pub async fn collection_names(&self) -> Result<Vec<String>, Error> {
        Ok(self
            .collections()
            .await?
            .into_iter()
            .map(|collection| collection.name().to_string())
            .collect())
    }

    /// Finds an advertised collection by name.
    pub async fn find_collection(&self, name: &str) -> Result<Option<Collection>, Error> {
        Ok(self
            .collections()
            .await?
            .into_iter()
            .find(|collection| collection.name() == name))
    }

    /// Returns a handle to a collection without fetching the service
    /// document.
    ///
    /// The name doubles as the href, which holds for services that use
    /// entity set names as collection paths.
    pub fn collection(&self, name: impl Into<String>) -> Collection {
        let name = name.into();
        Collection::new(self.clone(), name.clone(), name)
    }
}
