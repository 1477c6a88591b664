//! Materialized entities

use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::CoercionRegistry;
use super::EntityKey;
use super::Value;
use super::metadata::EntityType;
use super::metadata::Property;
use super::metadata::PropertyList;
use crate::error::FieldError;

/// One feed entry materialized against its entity type.
///
/// Entities are read-only. Each property keeps the raw text the server sent;
/// [`get`](Self::get) and the typed getters coerce it on access according to
/// the property's declared type.
///
/// # Example
///
/// ```ignore
/// let course = service.collection("Courses").get("Agile Team Practices with Scrum").await?;
///
/// if let Some(course) = course {
///     println!("{:?}", course.get_string("Title")?);
///     println!("{}", course.entity_type().full_name());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Entity {
    entity_type: Arc<EntityType>,
    properties: PropertyList,
    id: Option<String>,
    source: String,
    coercions: Arc<CoercionRegistry>,
}

impl Entity {
    pub(crate) fn new(
        entity_type: Arc<EntityType>,
        properties: PropertyList,
        id: Option<String>,
        source: String,
        coercions: Arc<CoercionRegistry>,
    ) -> Self {
        Self {
            entity_type,
            properties,
            id,
            source,
            coercions,
        }
    }

    // =========================================================================
    // Metadata accessors
    // =========================================================================

    /// Returns the concrete entity type of this entry.
    pub fn entity_type(&self) -> &Arc<EntityType> {
        &self.entity_type
    }

    /// Returns the entry's atom id (usually its canonical URL), if present.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the raw XML of the entry this entity was built from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the filled-in properties, base type's first.
    pub fn properties(&self) -> &PropertyList {
        &self.properties
    }

    /// Returns the key of this entity, built from its key properties.
    ///
    /// A single key property gives [`EntityKey::Single`], several give
    /// [`EntityKey::Composite`]. Returns `None` if the type declares no keys.
    pub fn key(&self) -> Option<EntityKey> {
        let keys = self.properties.keys();
        match keys.as_slice() {
            [] => None,
            [only] => Some(EntityKey::Single(only.value(&self.coercions))),
            many => Some(EntityKey::Composite(
                many.iter()
                    .map(|p| (p.name().to_string(), p.value(&self.coercions)))
                    .collect(),
            )),
        }
    }

    // =========================================================================
    // Raw property access
    // =========================================================================

    /// Returns the property with the given name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Returns `true` if the entity type declares the property.
    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains(name)
    }

    /// Returns the raw text of a property; `None` if undeclared or null.
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(Property::raw)
    }

    /// Returns the coerced value of a property; `None` if undeclared.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.properties.get(name).map(|p| p.value(&self.coercions))
    }

    /// Returns the coerced value, failing on undeclared properties or text
    /// the type's handler rejects.
    pub fn try_get(&self, name: &str) -> Result<Value, FieldError> {
        self.properties
            .get(name)
            .ok_or_else(|| FieldError::missing(name))?
            .try_value(&self.coercions)
    }

    // =========================================================================
    // Typed getters
    //
    // Return Err if the property is undeclared or coerces to another type.
    // Return Ok(None) only if the property is null.
    // =========================================================================

    /// Gets a string property value.
    pub fn get_string(&self, name: &str) -> Result<Option<String>, FieldError> {
        match self.try_get(name)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Err(FieldError::type_mismatch(name, "string", other.type_name())),
        }
    }

    /// Gets a boolean property value.
    pub fn get_bool(&self, name: &str) -> Result<Option<bool>, FieldError> {
        match self.try_get(name)? {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(b)),
            other => Err(FieldError::type_mismatch(name, "bool", other.type_name())),
        }
    }

    /// Gets an i32 property value.
    pub fn get_int(&self, name: &str) -> Result<Option<i32>, FieldError> {
        match self.try_get(name)? {
            Value::Null => Ok(None),
            Value::Int(n) => Ok(Some(n)),
            other => Err(FieldError::type_mismatch(name, "int", other.type_name())),
        }
    }

    /// Gets an i64 property value.
    pub fn get_long(&self, name: &str) -> Result<Option<i64>, FieldError> {
        match self.try_get(name)? {
            Value::Null => Ok(None),
            Value::Long(n) => Ok(Some(n)),
            Value::Int(n) => Ok(Some(n as i64)), // Allow widening
            other => Err(FieldError::type_mismatch(name, "long", other.type_name())),
        }
    }

    /// Gets an f64 property value.
    pub fn get_float(&self, name: &str) -> Result<Option<f64>, FieldError> {
        match self.try_get(name)? {
            Value::Null => Ok(None),
            Value::Float(n) => Ok(Some(n)),
            other => Err(FieldError::type_mismatch(name, "float", other.type_name())),
        }
    }

    /// Gets a Decimal property value.
    pub fn get_decimal(&self, name: &str) -> Result<Option<Decimal>, FieldError> {
        match self.try_get(name)? {
            Value::Null => Ok(None),
            Value::Decimal(d) => Ok(Some(d)),
            other => Err(FieldError::type_mismatch(name, "decimal", other.type_name())),
        }
    }

    /// Gets a UUID property value.
    pub fn get_guid(&self, name: &str) -> Result<Option<Uuid>, FieldError> {
        match self.try_get(name)? {
            Value::Null => Ok(None),
            Value::Guid(g) => Ok(Some(g)),
            other => Err(FieldError::type_mismatch(name, "guid", other.type_name())),
        }
    }

    /// Gets a DateTime property value.
    pub fn get_datetime(&self, name: &str) -> Result<Option<DateTime<Utc>>, FieldError> {
        match self.try_get(name)? {
            Value::Null => Ok(None),
            Value::DateTime(dt) => Ok(Some(dt)),
            other => Err(FieldError::type_mismatch(name, "datetime", other.type_name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::edm;
    use crate::model::metadata::EntityTypeDecl;

    fn product(raw_id: Option<&str>, raw_price: Option<&str>) -> Entity {
        let entity_type = Arc::new(EntityType::new(
            EntityTypeDecl::new("Shop", "Product")
                .property(Property::new("Id", edm::INT32).with_key(true))
                .property(Property::new("Name", edm::STRING))
                .property(Property::new("Price", edm::DECIMAL)),
            None,
        ));
        let mut properties = entity_type.properties().cleared();
        if let Some(p) = properties.get_mut("Id") {
            p.set_raw(raw_id.map(str::to_string));
        }
        if let Some(p) = properties.get_mut("Price") {
            p.set_raw(raw_price.map(str::to_string));
        }
        Entity::new(
            entity_type,
            properties,
            None,
            String::new(),
            Arc::new(CoercionRegistry::default()),
        )
    }

    #[test]
    fn test_typed_getters() {
        let entity = product(Some("7"), Some("12.50"));
        assert_eq!(entity.get_int("Id").unwrap(), Some(7));
        assert_eq!(entity.get_long("Id").unwrap(), Some(7));
        assert_eq!(entity.get_decimal("Price").unwrap(), Some(Decimal::new(1250, 2)));
        assert_eq!(entity.get_string("Name").unwrap(), None);
    }

    #[test]
    fn test_missing_and_mismatch() {
        let entity = product(Some("7"), None);
        assert!(matches!(entity.get_string("Colour"), Err(FieldError::Missing { .. })));
        assert!(matches!(
            entity.get_string("Id"),
            Err(FieldError::TypeMismatch { expected: "string", actual: "int", .. })
        ));
        assert_eq!(entity.get("Colour"), None);
        assert_eq!(entity.get("Price"), Some(Value::Null));
    }

    #[test]
    fn test_key_from_key_properties() {
        let entity = product(Some("7"), None);
        assert_eq!(entity.key(), Some(EntityKey::Single(Value::Int(7))));
    }
}
