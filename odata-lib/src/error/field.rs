//! FieldError for Entity accessors

/// Error type for property access operations on an [`Entity`](crate::model::Entity).
#[derive(Debug, Clone, thiserror::Error)]
pub enum FieldError {
    /// The requested property is not declared on the entity type.
    #[error("Property '{field}' not found on entity")]
    Missing { field: String },

    /// The property exists but coerces to a different type than requested.
    #[error("Property '{field}' type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// The raw text could not be parsed as the declared type.
    #[error("Property '{field}' value {raw:?} is not a valid {type_tag}")]
    Coercion {
        field: String,
        type_tag: String,
        raw: String,
    },
}

impl FieldError {
    /// Creates a new missing field error.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing {
            field: field.into(),
        }
    }

    /// Creates a new type mismatch error.
    pub fn type_mismatch(field: impl Into<String>, expected: &'static str, actual: &'static str) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }

    /// Creates a new coercion error.
    pub fn coercion(field: impl Into<String>, type_tag: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Coercion {
            field: field.into(),
            type_tag: type_tag.into(),
            raw: raw.into(),
        }
    }
}
