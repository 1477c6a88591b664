//! Entity type descriptors

use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;

use super::PropertyList;

/// An entity type declaration as read from a schema, before its base type
/// has been resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTypeDecl {
    /// Short name (e.g. `Course`).
    pub name: String,
    /// Namespace of the declaring schema.
    pub namespace: String,
    /// Base type reference, either short or namespace-qualified.
    pub base_type_name: Option<String>,
    /// Locally declared properties, key designations already applied.
    pub properties: PropertyList,
}

impl EntityTypeDecl {
    /// Creates a declaration with no base type and no properties.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            base_type_name: None,
            properties: PropertyList::new(),
        }
    }

    /// Sets the base type reference (builder pattern).
    pub fn base_type(mut self, base_type_name: impl Into<String>) -> Self {
        self.base_type_name = Some(base_type_name.into());
        self
    }

    /// Adds a property (builder pattern).
    pub fn property(mut self, property: super::Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Returns `namespace.name`.
    pub fn full_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }

    /// Returns `true` if `reference` names this declaration.
    ///
    /// Qualified references (containing `.`) match the full name, bare ones
    /// match the short name.
    pub fn matches(&self, reference: &str) -> bool {
        if reference.contains('.') {
            self.full_name() == reference
        } else {
            self.name == reference
        }
    }
}

/// A resolved entity type.
///
/// The base type, if any, is held by reference; [`properties`](Self::properties)
/// lists the base type's properties first, followed by the locally declared
/// ones. Two entity types are equal when their full names are equal.
#[derive(Debug, Clone)]
pub struct EntityType {
    name: String,
    namespace: String,
    base_type_name: Option<String>,
    base_type: Option<Arc<EntityType>>,
    core_properties: PropertyList,
    properties: PropertyList,
}

impl EntityType {
    /// Builds a resolved entity type from its declaration and resolved base.
    pub fn new(decl: EntityTypeDecl, base_type: Option<Arc<EntityType>>) -> Self {
        let properties = match &base_type {
            Some(base) => PropertyList::concat(&base.properties, &decl.properties),
            None => decl.properties.clone(),
        };

        Self {
            name: decl.name,
            namespace: decl.namespace,
            base_type_name: decl.base_type_name,
            base_type,
            core_properties: decl.properties,
            properties,
        }
    }

    /// Returns the short name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns `namespace.name`.
    pub fn full_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }

    /// Returns the base type reference as declared.
    pub fn base_type_name(&self) -> Option<&str> {
        self.base_type_name.as_deref()
    }

    /// Returns the resolved base type.
    pub fn base_type(&self) -> Option<&Arc<EntityType>> {
        self.base_type.as_ref()
    }

    /// Returns the locally declared properties.
    pub fn core_properties(&self) -> &PropertyList {
        &self.core_properties
    }

    /// Returns all properties, base type's first.
    pub fn properties(&self) -> &PropertyList {
        &self.properties
    }

    /// Returns the key properties.
    pub fn keys(&self) -> Vec<&super::Property> {
        self.properties.keys()
    }

    /// Returns all property names, sorted.
    pub fn property_names(&self) -> Vec<String> {
        self.properties.names()
    }

    /// Returns the locally declared property names, sorted.
    pub fn core_property_names(&self) -> Vec<String> {
        self.core_properties.names()
    }

    /// Returns the names inherited from the base type, sorted.
    pub fn base_property_names(&self) -> Vec<String> {
        self.base_type
            .as_ref()
            .map(|base| base.property_names())
            .unwrap_or_default()
    }

    /// Returns `true` if this type is `other` or inherits from it.
    pub fn is_a(&self, other: &EntityType) -> bool {
        if self == other {
            return true;
        }
        self.base_type.as_ref().is_some_and(|base| base.is_a(other))
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.name == other.name
    }
}

impl Eq for EntityType {}

impl Hash for EntityType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.name.hash(state);
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full_name())
    }
}

fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}
