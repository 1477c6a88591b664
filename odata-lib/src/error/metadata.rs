//! Metadata loading errors

/// Errors raised while building entity types from a `$metadata` document.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MetadataError {
    /// A `BaseType` reference names no known entity type.
    #[error("Entity type '{entity_type}' has unresolved base type '{base_type}'")]
    UnresolvedBaseType {
        entity_type: String,
        base_type: String,
    },

    /// Base type references form a loop.
    #[error("Inheritance cycle through entity type '{entity_type}'")]
    InheritanceCycle { entity_type: String },

    /// A required attribute is missing on a schema element.
    #[error("<{element}> is missing attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
}
