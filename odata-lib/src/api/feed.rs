//! Atom feed, entry and service document parsing.

use std::sync::Arc;

use log::debug;

use crate::api::materialize::materialize_entry;
use crate::api::query::Page;
use crate::error::ApiError;
use crate::error::Error;
use crate::error::MaterializeError;
use crate::model::CoercionRegistry;
use crate::model::Entity;
use crate::model::metadata::Metadata;
use crate::xml;

/// A collection advertised by the service document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
    /// The collection's `<atom:title>`.
    pub name: String,
    /// The collection's `href`, relative to the service root.
    pub href: String,
}

/// Parses a feed document into a page of entities.
///
/// Picks up the `<link rel="next">` continuation and the `m:count` total
/// when present.
pub fn parse_feed(
    body: &str,
    metadata: &Metadata,
    coercions: &Arc<CoercionRegistry>,
) -> Result<Page, Error> {
    let document = xml::parse(body)?;
    let feed = document.root_element();

    let entities = xml::children(feed, "entry")
        .map(|entry| materialize_entry(&document, entry, metadata, coercions))
        .collect::<Result<Vec<_>, MaterializeError>>()?;

    let next_link = xml::children(feed, "link")
        .filter(|link| xml::attribute(*link, "rel") == Some("next"))
        .find_map(|link| xml::attribute(link, "href"))
        .map(str::to_string);

    let total_count = match xml::child(feed, "count") {
        Some(count) => {
            let text = xml::text(count);
            let total = text
                .trim()
                .parse::<usize>()
                .map_err(|_| ApiError::parse_with_body(format!("Invalid inline count: {}", text), body))?;
            Some(total)
        }
        None => None,
    };

    let page = Page::new(entities, next_link, total_count);

    debug!(
        "Parsed feed page: {} entities, next link: {}",
        page.len(),
        page.next_link().unwrap_or("none")
    );

    Ok(page)
}

/// Parses a single-entry document, as returned by a keyed lookup.
pub fn parse_entry(
    body: &str,
    metadata: &Metadata,
    coercions: &Arc<CoercionRegistry>,
) -> Result<Entity, Error> {
    let document = xml::parse(body)?;
    let entry = xml::descendants(document.root_element(), "entry")
        .next()
        .ok_or(MaterializeError::MissingElement { what: "an <entry>" })?;

    Ok(materialize_entry(&document, entry, metadata, coercions)?)
}

/// Parses a service document into its advertised collections, in document
/// order.
///
/// A collection without a title is named after its `href`.
pub fn parse_service_document(body: &str) -> Result<Vec<CollectionInfo>, ApiError> {
    let document = xml::parse(body)?;

    xml::descendants(document.root_element(), "collection")
        .map(|collection| -> Result<CollectionInfo, ApiError> {
            let href = xml::attribute(collection, "href").ok_or_else(|| {
                ApiError::parse_with_body("<collection> is missing attribute 'href'", body)
            })?;
            let name = xml::child(collection, "title")
                .map(xml::text)
                .unwrap_or_else(|| href.to_string());

            Ok(CollectionInfo {
                name: name.trim().to_string(),
                href: href.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE: &str = r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>
<service xml:base="http://packages.nuget.org/v1/FeedService.svc/"
         xmlns:atom="http://www.w3.org/2005/Atom"
         xmlns:app="http://www.w3.org/2007/app"
         xmlns="http://www.w3.org/2007/app">
  <workspace>
    <atom:title>Default</atom:title>
    <collection href="Packages">
      <atom:title>Packages</atom:title>
    </collection>
    <collection href="Screenshots">
      <atom:title>Screenshots</atom:title>
    </collection>
  </workspace>
</service>"#;

    #[test]
    fn test_service_document() {
        let collections = parse_service_document(SERVICE).unwrap();
        assert_eq!(
            collections,
            vec![
                CollectionInfo {
                    name: "Packages".to_string(),
                    href: "Packages".to_string(),
                },
                CollectionInfo {
                    name: "Screenshots".to_string(),
                    href: "Screenshots".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_empty_feed_with_links() {
        let body = r#"<feed xmlns="http://www.w3.org/2005/Atom"
      xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata">
  <m:count>12</m:count>
  <link rel="self" title="Dogs" href="Dogs" />
  <link rel="next" href="http://example.org/svc/Dogs?$skiptoken=10" />
</feed>"#;
        let page = parse_feed(
            body,
            &Metadata::default(),
            &Arc::new(CoercionRegistry::default()),
        )
        .unwrap();

        assert!(page.is_empty());
        assert_eq!(page.total_count(), Some(12));
        assert_eq!(page.next_link(), Some("http://example.org/svc/Dogs?$skiptoken=10"));
    }

    #[test]
    fn test_entry_document_requires_entry() {
        let result = parse_entry(
            "<error/>",
            &Metadata::default(),
            &Arc::new(CoercionRegistry::default()),
        );
        assert!(matches!(
            result,
            Err(Error::Materialize(MaterializeError::MissingElement { .. }))
        ));
    }
}
