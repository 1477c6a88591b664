//! Service metadata: entity types and their properties.

mod entity_type;
mod property;

pub use entity_type::EntityType;
pub use entity_type::EntityTypeDecl;
pub use property::Property;
pub use property::PropertyList;

use std::sync::Arc;

use crate::error::MetadataError;

/// What to do with a `BaseType` reference that names no known entity type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BaseTypePolicy {
    /// Fail metadata loading with [`MetadataError::UnresolvedBaseType`].
    #[default]
    Strict,
    /// Log a warning and treat the type as having no base type.
    Lenient,
}

/// The entity types a service declares, with inheritance resolved.
///
/// # Example
///
/// ```
/// use odata_lib::model::metadata::{BaseTypePolicy, EntityTypeDecl, Metadata, Property};
///
/// let metadata = Metadata::resolve(
///     vec![
///         EntityTypeDecl::new("Shop", "Item").property(Property::new("Id", "Edm.Int32").with_key(true)),
///         EntityTypeDecl::new("Shop", "Book").base_type("Item").property(Property::new("Isbn", "Edm.String")),
///     ],
///     BaseTypePolicy::Strict,
/// )?;
///
/// let book = metadata.entity_type("Shop.Book").unwrap();
/// assert_eq!(book.property_names(), vec!["Id", "Isbn"]);
/// # Ok::<(), odata_lib::error::MetadataError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    namespaces: Vec<String>,
    entity_types: Vec<Arc<EntityType>>,
}

impl Metadata {
    /// Resolves every declaration's base type into a direct reference.
    ///
    /// Declarations keep their input order in [`entity_types`](Self::entity_types).
    pub fn resolve(decls: Vec<EntityTypeDecl>, policy: BaseTypePolicy) -> Result<Self, MetadataError> {
        let mut namespaces: Vec<String> = Vec::new();
        for decl in &decls {
            if !namespaces.contains(&decl.namespace) {
                namespaces.push(decl.namespace.clone());
            }
        }

        let mut resolver = Resolver {
            resolved: vec![None; decls.len()],
            visiting: vec![false; decls.len()],
            decls,
            policy,
        };

        let entity_types = (0..resolver.decls.len())
            .map(|index| resolver.resolve(index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            namespaces,
            entity_types,
        })
    }

    /// Finds an entity type by full (`Ns.Name`) or short name.
    pub fn entity_type(&self, name: &str) -> Option<&Arc<EntityType>> {
        if name.contains('.') {
            self.entity_types.iter().find(|t| t.full_name() == name)
        } else {
            self.entity_types.iter().find(|t| t.name() == name)
        }
    }

    /// Returns all entity types in declaration order.
    pub fn entity_types(&self) -> &[Arc<EntityType>] {
        &self.entity_types
    }

    /// Returns the schema namespaces in declaration order.
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }
}

struct Resolver {
    decls: Vec<EntityTypeDecl>,
    resolved: Vec<Option<Arc<EntityType>>>,
    visiting: Vec<bool>,
    policy: BaseTypePolicy,
}

impl Resolver {
    fn resolve(&mut self, index: usize) -> Result<Arc<EntityType>, MetadataError> {
        if let Some(done) = &self.resolved[index] {
            return Ok(done.clone());
        }
        if self.visiting[index] {
            return Err(MetadataError::InheritanceCycle {
                entity_type: self.decls[index].full_name(),
            });
        }
        self.visiting[index] = true;

        let base = match self.decls[index].base_type_name.clone() {
            None => None,
            Some(base_name) => match self.decls.iter().position(|d| d.matches(&base_name)) {
                Some(base_index) => Some(self.resolve(base_index)?),
                None if self.policy == BaseTypePolicy::Lenient => {
                    log::warn!(
                        "Entity type '{}' names unknown base type '{}'; ignoring",
                        self.decls[index].full_name(),
                        base_name
                    );
                    None
                }
                None => {
                    return Err(MetadataError::UnresolvedBaseType {
                        entity_type: self.decls[index].full_name(),
                        base_type: base_name,
                    });
                }
            },
        };

        let entity_type = Arc::new(EntityType::new(self.decls[index].clone(), base));
        self.visiting[index] = false;
        self.resolved[index] = Some(entity_type.clone());
        Ok(entity_type)
    }
}
