//! Type-tag driven coercion of raw property text into [`Value`]s.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::DateTime;
use chrono::NaiveDateTime;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::Value;

/// Canonical EDM primitive type tags.
pub mod edm {
    pub const STRING: &str = "Edm.String";
    pub const BOOLEAN: &str = "Edm.Boolean";
    pub const DATE_TIME: &str = "Edm.DateTime";
    pub const DATE_TIME_OFFSET: &str = "Edm.DateTimeOffset";
    pub const BYTE: &str = "Edm.Byte";
    pub const INT16: &str = "Edm.Int16";
    pub const INT32: &str = "Edm.Int32";
    pub const INT64: &str = "Edm.Int64";
    pub const SINGLE: &str = "Edm.Single";
    pub const DOUBLE: &str = "Edm.Double";
    pub const DECIMAL: &str = "Edm.Decimal";
    pub const GUID: &str = "Edm.Guid";
}

/// A coercion handler. Returns `None` when the text is not a valid literal
/// of the handler's type.
pub type CoercionFn = Arc<dyn Fn(&str) -> Option<Value> + Send + Sync>;

/// Registry mapping type tags to coercion handlers.
///
/// The default registry knows the common EDM primitives. Additional tags are
/// added with [`register`](Self::register); a tag with no handler is not an
/// error, the property simply reads back as its raw text.
///
/// # Example
///
/// ```
/// use odata_lib::model::{CoercionRegistry, Value};
///
/// let registry = CoercionRegistry::default()
///     .with("Edm.Time", |raw| Some(Value::String(raw.trim().to_string())));
///
/// assert!(registry.contains("Edm.Time"));
/// assert_eq!(registry.coerce("Edm.Int32", "42"), Some(Some(Value::Int(42))));
/// ```
#[derive(Clone)]
pub struct CoercionRegistry {
    handlers: HashMap<String, CoercionFn>,
}

impl CoercionRegistry {
    /// Creates a registry with no handlers at all.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers (or replaces) the handler for a type tag.
    pub fn register<F>(&mut self, type_tag: impl Into<String>, handler: F)
    where
        F: Fn(&str) -> Option<Value> + Send + Sync + 'static,
    {
        self.handlers.insert(type_tag.into(), Arc::new(handler));
    }

    /// Registers a handler (builder pattern).
    pub fn with<F>(mut self, type_tag: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&str) -> Option<Value> + Send + Sync + 'static,
    {
        self.register(type_tag, handler);
        self
    }

    /// Returns `true` if a handler is registered for the tag.
    pub fn contains(&self, type_tag: &str) -> bool {
        self.handlers.contains_key(type_tag)
    }

    /// Runs the handler for `type_tag` over `raw`.
    ///
    /// The outer `Option` is `None` when no handler is registered; the inner
    /// one is `None` when the handler rejected the text.
    pub fn coerce(&self, type_tag: &str, raw: &str) -> Option<Option<Value>> {
        self.handlers.get(type_tag).map(|handler| handler(raw))
    }
}

impl Default for CoercionRegistry {
    fn default() -> Self {
        Self::empty()
            .with(edm::STRING, |raw| Some(Value::String(raw.to_string())))
            .with(edm::BOOLEAN, parse_bool)
            .with(edm::DATE_TIME, |raw| parse_datetime(raw).map(Value::DateTime))
            .with(edm::DATE_TIME_OFFSET, |raw| parse_datetime(raw).map(Value::DateTime))
            .with(edm::BYTE, |raw| parse::<u8>(raw).map(|n| Value::Int(n.into())))
            .with(edm::INT16, |raw| parse::<i16>(raw).map(|n| Value::Int(n.into())))
            .with(edm::INT32, |raw| parse::<i32>(raw).map(Value::Int))
            .with(edm::INT64, |raw| parse::<i64>(raw).map(Value::Long))
            .with(edm::SINGLE, |raw| parse::<f32>(raw).map(|n| Value::Float(n.into())))
            .with(edm::DOUBLE, |raw| parse::<f64>(raw).map(Value::Float))
            .with(edm::DECIMAL, parse_decimal)
            .with(edm::GUID, |raw| Uuid::parse_str(raw.trim()).ok().map(Value::Guid))
    }
}

impl fmt::Debug for CoercionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.handlers.keys().collect();
        tags.sort();
        f.debug_struct("CoercionRegistry").field("tags", &tags).finish()
    }
}

fn parse<T: FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}

fn parse_bool(raw: &str) -> Option<Value> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(Value::Bool(true)),
        "false" | "0" => Some(Value::Bool(false)),
        _ => None,
    }
}

fn parse_decimal(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
        .map(Value::Decimal)
}

/// Parses the date-time forms servers emit: RFC 3339 with an offset, or a
/// bare local timestamp which is taken as UTC.
pub(crate) fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_default_handlers() {
        let registry = CoercionRegistry::default();
        assert_eq!(
            registry.coerce(edm::STRING, "  padded "),
            Some(Some(Value::String("  padded ".to_string())))
        );
        assert_eq!(registry.coerce(edm::BOOLEAN, "true"), Some(Some(Value::Bool(true))));
        assert_eq!(registry.coerce(edm::BOOLEAN, "0"), Some(Some(Value::Bool(false))));
        assert_eq!(registry.coerce(edm::INT32, "-7"), Some(Some(Value::Int(-7))));
        assert_eq!(
            registry.coerce(edm::INT64, "9000000000"),
            Some(Some(Value::Long(9_000_000_000)))
        );
        assert_eq!(registry.coerce(edm::DOUBLE, "2.5"), Some(Some(Value::Float(2.5))));
        assert_eq!(
            registry.coerce(edm::DECIMAL, "19.99"),
            Some(Some(Value::Decimal(Decimal::new(1999, 2))))
        );
    }

    #[test]
    fn test_datetime_forms() {
        let expected = Utc.with_ymd_and_hms(2010, 9, 14, 20, 53, 31).unwrap();
        assert_eq!(parse_datetime("2010-09-14T20:53:31"), Some(expected));
        assert_eq!(parse_datetime("2010-09-14T20:53:31Z"), Some(expected));
        assert_eq!(parse_datetime("2010-09-14T22:53:31+02:00"), Some(expected));
        assert_eq!(
            parse_datetime("2010-09-14T20:53"),
            Some(Utc.with_ymd_and_hms(2010, 9, 14, 20, 53, 0).unwrap())
        );
        assert_eq!(parse_datetime("yesterday"), None);
    }

    #[test]
    fn test_rejected_text() {
        let registry = CoercionRegistry::default();
        assert_eq!(registry.coerce(edm::INT32, "twelve"), Some(None));
        assert_eq!(registry.coerce(edm::GUID, "not-a-guid"), Some(None));
    }

    #[test]
    fn test_unknown_tag_and_registration() {
        let mut registry = CoercionRegistry::default();
        assert_eq!(registry.coerce("Edm.Time", "PT1H"), None);

        registry.register("Edm.Time", |raw| Some(Value::String(format!("time:{}", raw))));
        assert_eq!(
            registry.coerce("Edm.Time", "PT1H"),
            Some(Some(Value::String("time:PT1H".to_string())))
        );
    }
}
