//! Property declarations and property lists

use crate::error::FieldError;
use crate::model::CoercionRegistry;
use crate::model::Value;

/// A typed, nullable, possibly-key property.
///
/// The raw text is the only stored state; [`value`](Self::value) coerces it on
/// every read according to the property's type tag. Properties declared by
/// metadata have no raw text; materialized entities carry filled-in copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    name: String,
    type_tag: String,
    nullable: bool,
    key: bool,
    raw: Option<String>,
}

impl Property {
    /// Creates a nullable, non-key property with no value.
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_tag: type_tag.into(),
            nullable: true,
            key: false,
            raw: None,
        }
    }

    /// Sets whether the property accepts null (builder pattern).
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Marks the property as part of the entity key (builder pattern).
    pub fn with_key(mut self, key: bool) -> Self {
        self.key = key;
        self
    }

    /// Sets the raw text (builder pattern).
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Returns the property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type tag (e.g. `Edm.String`).
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Returns `true` if the property accepts null.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns `true` if the property is part of the entity key.
    pub fn is_key(&self) -> bool {
        self.key
    }

    /// Returns the raw text, `None` when null or absent.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Returns `true` if the property holds no text.
    pub fn is_null(&self) -> bool {
        self.raw.is_none()
    }

    pub(crate) fn set_raw(&mut self, raw: Option<String>) {
        self.raw = raw;
    }

    pub(crate) fn set_key(&mut self, key: bool) {
        self.key = key;
    }

    /// Returns a copy of this declaration with the raw text reset.
    pub fn cleared(&self) -> Self {
        Self {
            raw: None,
            ..self.clone()
        }
    }

    /// Coerces the raw text, failing when a known handler rejects it.
    ///
    /// Tags without a handler are not an error: a warning is logged and the
    /// raw text comes back as [`Value::String`].
    pub fn try_value(&self, registry: &CoercionRegistry) -> Result<Value, FieldError> {
        let Some(raw) = self.raw.as_deref() else {
            return Ok(Value::Null);
        };

        match registry.coerce(&self.type_tag, raw) {
            Some(Some(value)) => Ok(value),
            Some(None) => Err(FieldError::coercion(&self.name, &self.type_tag, raw)),
            None => {
                log::warn!(
                    "No coercion registered for type '{}' (property '{}'); returning raw text",
                    self.type_tag,
                    self.name
                );
                Ok(Value::String(raw.to_string()))
            }
        }
    }

    /// Coerces the raw text, never failing.
    ///
    /// Text a known handler rejects is logged and returned as [`Value::String`].
    pub fn value(&self, registry: &CoercionRegistry) -> Value {
        match self.try_value(registry) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("{}; returning raw text", e);
                Value::String(self.raw.clone().unwrap_or_default())
            }
        }
    }
}

/// An ordered list of properties, looked up by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyList(Vec<Property>);

impl PropertyList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds `base` followed by `core`.
    pub fn concat(base: &PropertyList, core: &PropertyList) -> Self {
        base.iter().chain(core.iter()).cloned().collect()
    }

    /// Appends a property.
    pub fn push(&mut self, property: Property) {
        self.0.push(property);
    }

    /// Finds a property by name.
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.0.iter().find(|p| p.name == name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.0.iter_mut().find(|p| p.name == name)
    }

    /// Returns `true` if a property with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates the properties in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Property> {
        self.0.iter()
    }

    /// Returns the number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no properties.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the property names, sorted alphabetically and de-duplicated.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.iter().map(|p| p.name.clone()).collect();
        names.sort();
        names.dedup();
        names
    }

    /// Returns the key properties in declaration order.
    pub fn keys(&self) -> Vec<&Property> {
        self.0.iter().filter(|p| p.key).collect()
    }

    /// Returns fresh copies of every property with the raw text reset.
    pub fn cleared(&self) -> Self {
        self.0.iter().map(Property::cleared).collect()
    }
}

impl FromIterator<Property> for PropertyList {
    fn from_iter<I: IntoIterator<Item = Property>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<Property>> for PropertyList {
    fn from(properties: Vec<Property>) -> Self {
        Self(properties)
    }
}

impl<'a> IntoIterator for &'a PropertyList {
    type Item = &'a Property;
    type IntoIter = std::slice::Iter<'a, Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::edm;

    #[test]
    fn test_value_is_view_over_raw_text() {
        let registry = CoercionRegistry::default();
        let property = Property::new("Count", edm::INT32);
        assert_eq!(property.value(&registry), Value::Null);

        let property = property.with_raw("12");
        assert_eq!(property.raw(), Some("12"));
        assert_eq!(property.value(&registry), Value::Int(12));
    }

    #[test]
    fn test_unknown_tag_returns_raw_text() {
        let registry = CoercionRegistry::default();
        let property = Property::new("Length", "Edm.Time").with_raw("PT5M");
        assert_eq!(
            property.try_value(&registry).unwrap(),
            Value::String("PT5M".to_string())
        );
    }

    #[test]
    fn test_rejected_text_degrades_to_raw() {
        let registry = CoercionRegistry::default();
        let property = Property::new("Count", edm::INT32).with_raw("lots");
        assert!(matches!(
            property.try_value(&registry),
            Err(FieldError::Coercion { .. })
        ));
        assert_eq!(property.value(&registry), Value::String("lots".to_string()));
    }

    #[test]
    fn test_cleared_keeps_declaration() {
        let property = Property::new("Id", edm::INT32)
            .with_nullable(false)
            .with_key(true)
            .with_raw("3");
        let cleared = property.cleared();
        assert_eq!(cleared.name(), "Id");
        assert!(cleared.is_key());
        assert!(!cleared.is_nullable());
        assert!(cleared.is_null());
    }

    #[test]
    fn test_list_names_sorted_and_keys() {
        let list: PropertyList = vec![
            Property::new("Title", edm::STRING).with_key(true),
            Property::new("Category", edm::STRING),
            Property::new("Title", edm::STRING),
        ]
        .into();
        assert_eq!(list.names(), vec!["Category", "Title"]);
        assert_eq!(list.keys().len(), 1);
        assert_eq!(list.iter().next().unwrap().name(), "Title");
    }
}
