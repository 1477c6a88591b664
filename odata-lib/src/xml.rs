//! XML document access.
//!
//! A thin layer over `roxmltree` that matches elements and attributes by
//! local name, so documents are read the same way whatever prefixes the
//! server chose (`atom:title`, `d:Title`, `m:null`, ...).

use roxmltree::Document;
use roxmltree::Node;
use roxmltree::ParsingOptions;

use crate::error::ApiError;

/// Parses a response body.
///
/// Document type declarations are accepted but never resolved.
pub fn parse(body: &str) -> Result<Document<'_>, ApiError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(body, options)
        .map_err(|e| ApiError::parse_with_body(format!("Invalid XML: {}", e), body))
}

/// Iterates the element children of `node` with the given local name.
pub fn children<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == name)
}

/// Returns the first element child of `node` with the given local name.
pub fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == name)
}

/// Iterates all element descendants of `node` (including itself) with the
/// given local name.
pub fn descendants<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.descendants()
        .filter(move |child| child.is_element() && child.tag_name().name() == name)
}

/// Returns the value of the attribute with the given local name.
pub fn attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|attr| attr.name() == name)
        .map(|attr| attr.value())
}

/// Returns the concatenated text content of `node` and its descendants.
pub fn text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// Returns the source text of `node` exactly as it appeared in the document.
pub fn source<'input>(document: &Document<'input>, node: Node<'_, 'input>) -> &'input str {
    &document.input_text()[node.range()]
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom"
      xmlns:d="http://schemas.microsoft.com/ado/2007/08/dataservices"
      xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata">
  <entry>
    <m:properties>
      <d:Name>Rex</d:Name>
      <d:Age m:null="true" />
      <d:Note><![CDATA[a & b]]></d:Note>
    </m:properties>
  </entry>
</feed>"#;

    #[test]
    fn test_local_name_matching() {
        let doc = parse(DOC).unwrap();
        let entry = child(doc.root_element(), "entry").unwrap();
        let properties = child(entry, "properties").unwrap();

        let names: Vec<_> = properties
            .children()
            .filter(|n| n.is_element())
            .map(|n| n.tag_name().name().to_string())
            .collect();
        assert_eq!(names, vec!["Name", "Age", "Note"]);

        let age = child(properties, "Age").unwrap();
        assert_eq!(attribute(age, "null"), Some("true"));
        assert_eq!(text(child(properties, "Name").unwrap()), "Rex");
        assert_eq!(text(child(properties, "Note").unwrap()), "a & b");
        assert_eq!(descendants(doc.root_element(), "Name").count(), 1);
    }

    #[test]
    fn test_source_fragment() {
        let doc = parse(DOC).unwrap();
        let entry = child(doc.root_element(), "entry").unwrap();
        let fragment = source(&doc, entry);
        assert!(fragment.starts_with("<entry>"));
        assert!(fragment.ends_with("</entry>"));
    }

    #[test]
    fn test_invalid_document() {
        assert!(matches!(parse("<feed>"), Err(ApiError::Parse { .. })));
    }
}
