//! Entry materialization errors

/// Errors raised while turning a feed entry into an [`Entity`](crate::model::Entity).
#[derive(Debug, Clone, thiserror::Error)]
pub enum MaterializeError {
    /// The entry's type discriminator matches no known entity type.
    #[error("Unknown entity type '{type_name}'")]
    UnknownEntityType { type_name: String },

    /// The entry carries a property the resolved entity type does not declare.
    #[error("Unknown property '{property}' on entity type '{entity_type}'")]
    UnknownProperty {
        entity_type: String,
        property: String,
    },

    /// A required element or attribute is missing from the entry.
    #[error("Entry is missing {what}")]
    MissingElement { what: &'static str },
}
