//! Entry materialization
//!
//! Turns one Atom `<entry>` into an [`Entity`] of the concrete type named by
//! its `<category term>`.

use std::sync::Arc;

use roxmltree::Document;
use roxmltree::Node;

use crate::error::MaterializeError;
use crate::model::CoercionRegistry;
use crate::model::Entity;
use crate::model::metadata::Metadata;
use crate::xml;

/// Materializes one `<entry>` element.
///
/// Properties are read from `m:properties`, either inside `<content>` or
/// directly under the entry (media link entries). Declared properties the
/// entry doesn't carry stay null.
pub fn materialize_entry<'input>(
    document: &Document<'input>,
    entry: Node<'_, 'input>,
    metadata: &Metadata,
    coercions: &Arc<CoercionRegistry>,
) -> Result<Entity, MaterializeError> {
    let type_name = xml::children(entry, "category")
        .find_map(|category| xml::attribute(category, "term"))
        .ok_or(MaterializeError::MissingElement {
            what: "a <category term> type discriminator",
        })?;

    let entity_type = metadata
        .entity_type(type_name)
        .ok_or_else(|| MaterializeError::UnknownEntityType {
            type_name: type_name.to_string(),
        })?;

    let mut properties = entity_type.properties().cleared();

    let block = xml::child(entry, "content")
        .and_then(|content| xml::child(content, "properties"))
        .or_else(|| xml::child(entry, "properties"));

    if let Some(block) = block {
        for element in block.children().filter(Node::is_element) {
            let name = element.tag_name().name();
            let property =
                properties
                    .get_mut(name)
                    .ok_or_else(|| MaterializeError::UnknownProperty {
                        entity_type: entity_type.full_name(),
                        property: name.to_string(),
                    })?;

            let raw = match xml::attribute(element, "null") {
                Some("true") => None,
                _ => Some(xml::text(element)),
            };
            property.set_raw(raw);
        }
    }

    let id = xml::child(entry, "id").map(xml::text);

    Ok(Entity::new(
        Arc::clone(entity_type),
        properties,
        id,
        xml::source(document, entry).to_string(),
        Arc::clone(coercions),
    ))
}
