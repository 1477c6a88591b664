//! Entity key errors

/// Errors raised while converting or rendering an entity key.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KeyError {
    /// The record-like value did not serialize to a map of named fields.
    #[error("Key value is not a record of named fields (got {kind})")]
    NotARecord { kind: &'static str },

    /// A key field holds a value that has no key literal form.
    #[error("Key field '{field}' has unsupported value kind {kind}")]
    UnsupportedValue { field: String, kind: &'static str },

    /// A composite key with no fields.
    #[error("Composite key has no fields")]
    Empty,

    /// Serializing the record-like value failed.
    #[error("Key serialization failed: {0}")]
    Serialize(String),
}
