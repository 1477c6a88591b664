//! Query execution errors

/// Errors raised by a [`Query`](crate::api::query::Query) after execution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum QueryError {
    /// An earlier execution attempt failed; the query will not fetch again.
    #[error("Query failed earlier: {message}")]
    Failed { message: String },
}
