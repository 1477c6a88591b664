//! Entity keys for keyed lookup

use serde::Serialize;
use uuid::Uuid;

use super::Value;
use crate::error::KeyError;

/// The key of a single entity, as used in `Collection(<key>)` lookups.
///
/// # Example
///
/// ```
/// use odata_lib::model::{EntityKey, Value};
///
/// let by_title = EntityKey::from("Agile Team Practices with Scrum");
/// let by_id = EntityKey::from(42);
/// let by_parts = EntityKey::composite([("Id", "NUnit"), ("Version", "2.5.7.10213")]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKey {
    /// A single unnamed key value.
    Single(Value),
    /// Named key values, in the order they are rendered.
    Composite(Vec<(String, Value)>),
}

impl EntityKey {
    /// Creates a single-value key.
    pub fn single(value: impl Into<Value>) -> Self {
        Self::Single(value.into())
    }

    /// Creates a composite key from ordered name/value pairs.
    pub fn composite<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Composite(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }

    /// Builds a composite key from any record-like value.
    ///
    /// The value is serialized with serde; it must produce a map of named
    /// scalar fields. Field order is kept, so a struct's fields render in
    /// declaration order.
    ///
    /// Strings stay strings: a GUID field serialized as text renders as a
    /// quoted string, not a `guid'…'` literal. Use [`composite`](Self::composite)
    /// with a [`Value::Guid`] when the service expects the typed form.
    ///
    /// # Example
    ///
    /// ```
    /// use odata_lib::model::{EntityKey, Value};
    ///
    /// #[derive(serde::Serialize)]
    /// struct PackageKey<'a> {
    ///     #[serde(rename = "Id")]
    ///     id: &'a str,
    ///     #[serde(rename = "Version")]
    ///     version: &'a str,
    /// }
    ///
    /// let key = EntityKey::from_record(&PackageKey { id: "NUnit", version: "2.5.7.10213" })?;
    /// assert_eq!(key, EntityKey::composite([("Id", "NUnit"), ("Version", "2.5.7.10213")]));
    /// # Ok::<(), odata_lib::error::KeyError>(())
    /// ```
    pub fn from_record<T: Serialize + ?Sized>(record: &T) -> Result<Self, KeyError> {
        let json = serde_json::to_value(record).map_err(|e| KeyError::Serialize(e.to_string()))?;

        let map = match json {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(KeyError::NotARecord {
                    kind: json_kind(&other),
                });
            }
        };

        let fields = map
            .into_iter()
            .map(|(name, value)| {
                let value = json_to_value(&name, value)?;
                Ok((name, value))
            })
            .collect::<Result<Vec<_>, KeyError>>()?;

        Ok(Self::Composite(fields))
    }
}

fn json_to_value(field: &str, json: serde_json::Value) -> Result<Value, KeyError> {
    match json {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_json::Value::String(s) => Ok(Value::String(s)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i32::try_from(i).map(Value::Int).unwrap_or(Value::Long(i)))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(KeyError::UnsupportedValue {
                    field: field.to_string(),
                    kind: "number",
                })
            }
        }
        other => Err(KeyError::UnsupportedValue {
            field: field.to_string(),
            kind: json_kind(&other),
        }),
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl From<Value> for EntityKey {
    fn from(v: Value) -> Self {
        EntityKey::Single(v)
    }
}

impl From<&str> for EntityKey {
    fn from(v: &str) -> Self {
        EntityKey::Single(v.into())
    }
}

impl From<String> for EntityKey {
    fn from(v: String) -> Self {
        EntityKey::Single(v.into())
    }
}

impl From<i32> for EntityKey {
    fn from(v: i32) -> Self {
        EntityKey::Single(v.into())
    }
}

impl From<i64> for EntityKey {
    fn from(v: i64) -> Self {
        EntityKey::Single(v.into())
    }
}

impl From<Uuid> for EntityKey {
    fn from(v: Uuid) -> Self {
        EntityKey::Single(v.into())
    }
}
