//! `$metadata` loading
//!
//! The metadata document is fetched on first need and memoized for the
//! lifetime of the service handle. Concurrent first callers share a single
//! request.

use std::sync::Arc;

use log::info;

use crate::ODataService;
use crate::error::Error;
use crate::error::MetadataError;
use crate::model::metadata::BaseTypePolicy;
use crate::model::metadata::EntityType;
use crate::model::metadata::EntityTypeDecl;
use crate::model::metadata::Metadata;
use crate::model::metadata::Property;
use crate::xml;

/// Path of the metadata document, relative to the service root.
const METADATA_PATH: &str = "$metadata";

impl ODataService {
    /// Returns the service metadata, fetching it on first call.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be fetched or parsed, or if
    /// an entity type's base type cannot be resolved under the configured
    /// [`BaseTypePolicy`]. A failed load is not memoized; the next call
    /// tries again.
    pub async fn metadata(&self) -> Result<Arc<Metadata>, Error> {
        let metadata = self
            .inner
            .metadata
            .get_or_try_init(|| async {
                let body = self.fetch_document(METADATA_PATH).await?;
                let metadata = parse_metadata(&body, self.base_type_policy())?;
                info!(
                    "Loaded metadata for {}: {} entity types in {:?}",
                    self.root(),
                    metadata.entity_types().len(),
                    metadata.namespaces()
                );
                Ok::<_, Error>(Arc::new(metadata))
            })
            .await?;

        Ok(Arc::clone(metadata))
    }

    /// Returns every entity type the service declares.
    pub async fn entity_types(&self) -> Result<Vec<Arc<EntityType>>, Error> {
        Ok(self.metadata().await?.entity_types().to_vec())
    }

    /// Looks up an entity type by full (`Ns.Name`) or short name.
    pub async fn entity_type(&self, name: &str) -> Result<Option<Arc<EntityType>>, Error> {
        Ok(self.metadata().await?.entity_type(name).cloned())
    }
}

/// Parses a `$metadata` document and resolves inheritance.
///
/// Reads every `Schema`, and within it every `EntityType` with its
/// `Property` and `Key/PropertyRef` declarations. Other schema items
/// (associations, complex types, containers) are ignored.
pub fn parse_metadata(body: &str, policy: BaseTypePolicy) -> Result<Metadata, Error> {
    let document = xml::parse(body)?;
    let mut decls = Vec::new();

    for schema in xml::descendants(document.root_element(), "Schema") {
        let namespace = required(schema, "Schema", "Namespace")?;

        for entity_type in xml::children(schema, "EntityType") {
            decls.push(parse_entity_type(entity_type, namespace)?);
        }
    }

    Ok(Metadata::resolve(decls, policy)?)
}

fn parse_entity_type(node: roxmltree::Node<'_, '_>, namespace: &str) -> Result<EntityTypeDecl, MetadataError> {
    let name = required(node, "EntityType", "Name")?;
    let mut decl = EntityTypeDecl::new(namespace, name);

    if let Some(base_type) = xml::attribute(node, "BaseType") {
        decl = decl.base_type(base_type);
    }

    for property in xml::children(node, "Property") {
        let name = required(property, "Property", "Name")?;
        let type_tag = required(property, "Property", "Type")?;
        let nullable = xml::attribute(property, "Nullable")
            .map(|value| !value.eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        decl = decl.property(Property::new(name, type_tag).with_nullable(nullable));
    }

    let key_names = xml::children(node, "Key")
        .flat_map(|key| xml::children(key, "PropertyRef"))
        .map(|property_ref| required(property_ref, "PropertyRef", "Name"))
        .collect::<Result<Vec<_>, _>>()?;

    for key_name in key_names {
        if let Some(property) = decl.properties.get_mut(key_name) {
            property.set_key(true);
        }
    }

    Ok(decl)
}

fn required<'a>(
    node: roxmltree::Node<'a, '_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<&'a str, MetadataError> {
    xml::attribute(node, attribute).ok_or(MetadataError::MissingAttribute { element, attribute })
}
