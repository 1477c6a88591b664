//! Error types

mod api;
mod field;
mod key;
mod materialize;
mod metadata;
mod query;

pub use api::*;
pub use field::*;
pub use key::*;
pub use materialize::*;
pub use metadata::*;
pub use query::*;

/// Top-level error returned by service, collection and query operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport or response-level failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The `$metadata` document could not be turned into entity types.
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// A feed entry could not be materialized into an entity.
    #[error(transparent)]
    Materialize(#[from] MaterializeError),

    /// Query execution failed earlier and cannot be resumed.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// An entity key could not be rendered.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// A typed property accessor failed.
    #[error(transparent)]
    Field(#[from] FieldError),
}

impl Error {
    /// Returns the HTTP status code if this error came from a non-success response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(api) => api.status_code(),
            _ => None,
        }
    }
}
