//! Request path and query string generation.

use chrono::DateTime;
use chrono::Timelike;
use chrono::Utc;

use crate::api::query::Filter;
use crate::api::query::FilterChain;
use crate::api::query::FilterExpr;
use crate::api::query::FilterFunction;
use crate::api::query::QueryOption;
use crate::api::query::QueryOptions;
use crate::error::KeyError;
use crate::model::EntityKey;
use crate::model::Value;

// =============================================================================
// Paths
// =============================================================================

/// Appends the options to `href` as a query string, in order.
///
/// An empty option sequence yields the bare `href`.
pub fn options_to_path(href: &str, options: &QueryOptions) -> String {
    let mut path = href.to_string();

    for (index, option) in options.iter().enumerate() {
        path.push(if index == 0 { '?' } else { '&' });
        path.push_str(option.key());
        path.push('=');
        path.push_str(&option_value(option));
    }

    path
}

/// Renders the encoded value of one option.
pub fn option_value(option: &QueryOption) -> String {
    match option {
        QueryOption::Top(n) | QueryOption::Skip(n) => n.to_string(),
        QueryOption::Select(names) => encode_list(names, encode_query_value),
        QueryOption::OrderBy(names) => encode_list(names, encode_query_value),
        QueryOption::Expand(names) => {
            encode_list(names, |item| encode_query_value(item).replace('/', "%2f"))
        }
        QueryOption::InlineCount(true) => "allpages".to_string(),
        QueryOption::InlineCount(false) => "none".to_string(),
        QueryOption::Filter(chain) => encode_query_value(&chain_to_odata(chain)),
    }
}

/// Splits every name on commas, trims the items and joins them with `%2c`.
fn encode_list(names: &[String], encode: impl Fn(&str) -> String) -> String {
    names
        .iter()
        .flat_map(|name| name.split(','))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(encode)
        .collect::<Vec<_>>()
        .join("%2c")
}

/// Percent-encodes the characters that would break a query string value.
///
/// Space and `'` are always encoded; `%`, `&`, `#` and `+` are encoded so
/// the value cannot end the parameter early or be misread by the server.
pub fn encode_query_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => encoded.push_str("%25"),
            ' ' => encoded.push_str("%20"),
            '\'' => encoded.push_str("%27"),
            '&' => encoded.push_str("%26"),
            '#' => encoded.push_str("%23"),
            '+' => encoded.push_str("%2b"),
            _ => encoded.push(c),
        }
    }
    encoded
}

// =============================================================================
// Filters
// =============================================================================

/// Renders a filter chain left to right, without grouping.
pub fn chain_to_odata(chain: &FilterChain) -> String {
    let mut rendered = String::new();

    for (index, filter) in chain.filters().iter().enumerate() {
        if index > 0 {
            rendered.push_str(if filter.joins_with_or() { " or " } else { " and " });
        }
        rendered.push_str(&filter_to_odata(filter));
    }

    rendered
}

/// Renders a single filter, ignoring its joiner.
pub fn filter_to_odata(filter: &Filter) -> String {
    match filter.expr() {
        FilterExpr::Raw(raw) => raw.clone(),
        FilterExpr::Compare { property, op, value } => {
            format!("{} {} {}", property, op.as_str(), value_to_odata(value))
        }
        FilterExpr::Function {
            property,
            function,
            value,
        } => match function {
            FilterFunction::StartsWith => {
                format!("startswith({}, {}) eq true", property, value_to_odata(value))
            }
            FilterFunction::EndsWith => {
                format!("endswith({}, {}) eq true", property, value_to_odata(value))
            }
            FilterFunction::Contains => {
                format!("substringof({}, {}) eq true", value_to_odata(value), property)
            }
        },
    }
}

/// Converts a `Value` to its literal form.
pub fn value_to_odata(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Long(n) => n.to_string(),
        Value::Float(n) => {
            // Keep the decimal point so the server reads a floating literal
            let s = n.to_string();
            if s.contains('.') || s.contains('e') || s.contains('E') || !n.is_finite() {
                s
            } else {
                format!("{}.0", s)
            }
        }
        Value::Decimal(d) => d.to_string(),
        Value::String(s) => escape_string(s),
        Value::Guid(g) => format!("guid'{}'", g),
        Value::DateTime(dt) => format!("datetime'{}'", format_datetime(dt)),
    }
}

/// Escapes a string literal.
///
/// Strings are enclosed in single quotes, with internal single quotes doubled.
pub fn escape_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Formats a date-time as `yyyy-mm-ddThh:mm:ss`, adding milliseconds when
/// the value has a fractional second.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    if dt.nanosecond() == 0 {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
    }
}

// =============================================================================
// Keys
// =============================================================================

/// Renders a key predicate: `href(<key>)`.
pub fn key_path(href: &str, key: &EntityKey) -> Result<String, KeyError> {
    Ok(format!("{}({})", href, key_to_odata(key)?))
}

/// Renders a key, percent-encoding the content of every value.
///
/// A single key renders as its literal (`'Scrum%20Basics'`, `42`); a
/// composite key as unquoted `Name1=V1,Name2=V2`.
pub fn key_to_odata(key: &EntityKey) -> Result<String, KeyError> {
    match key {
        EntityKey::Single(value) => key_value_to_odata("", value),
        EntityKey::Composite(fields) => {
            if fields.is_empty() {
                return Err(KeyError::Empty);
            }
            let parts = fields
                .iter()
                .map(|(name, value)| Ok(format!("{}={}", name, composite_value_to_odata(name, value)?)))
                .collect::<Result<Vec<_>, KeyError>>()?;
            Ok(parts.join(","))
        }
    }
}

fn key_value_to_odata(field: &str, value: &Value) -> Result<String, KeyError> {
    let encode = |s: &str| urlencoding::encode(s).into_owned();

    match value {
        Value::Null => Err(KeyError::UnsupportedValue {
            field: field.to_string(),
            kind: "null",
        }),
        Value::String(s) => Ok(format!("'{}'", encode(&s.replace('\'', "''")))),
        Value::Guid(g) => Ok(format!("guid'{}'", g)),
        Value::DateTime(dt) => Ok(format!("datetime'{}'", encode(&format_datetime(dt)))),
        other => Ok(encode(&value_to_odata(other))),
    }
}

fn composite_value_to_odata(field: &str, value: &Value) -> Result<String, KeyError> {
    let encode = |s: &str| urlencoding::encode(s).into_owned();

    match value {
        Value::Null => Err(KeyError::UnsupportedValue {
            field: field.to_string(),
            kind: "null",
        }),
        Value::String(s) => Ok(encode(s)),
        Value::Guid(g) => Ok(g.to_string()),
        Value::DateTime(dt) => Ok(encode(&format_datetime(dt))),
        other => Ok(encode(&value_to_odata(other))),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;

    fn path(build: impl FnOnce(&mut QueryOptions)) -> String {
        let mut options = QueryOptions::new();
        build(&mut options);
        options_to_path("Dogs", &options)
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_empty_options() {
        assert_eq!(path(|_| {}), "Dogs");
    }

    #[test]
    fn test_order_is_preserved() {
        let top_skip = path(|o| {
            o.push(QueryOption::Top(1));
            o.push(QueryOption::Skip(1));
        });
        assert_eq!(top_skip, "Dogs?$top=1&$skip=1");

        let skip_top = path(|o| {
            o.push(QueryOption::Skip(5));
            o.push(QueryOption::Top(3));
        });
        assert_eq!(skip_top, "Dogs?$skip=5&$top=3");
    }

    #[test]
    fn test_select_list() {
        assert_eq!(
            path(|o| o.push(QueryOption::Select(names(&["Name", "Category"])))),
            "Dogs?$select=Name%2cCategory"
        );
        assert_eq!(
            path(|o| o.push(QueryOption::Select(names(&["Name , Category", " Age"])))),
            "Dogs?$select=Name%2cCategory%2cAge"
        );
    }

    #[test]
    fn test_expand_list() {
        assert_eq!(
            path(|o| o.push(QueryOption::Expand(names(&["Name", "Products/Suppliers"])))),
            "Dogs?$expand=Name%2cProducts%2fSuppliers"
        );
    }

    #[test]
    fn test_order_by_keeps_direction() {
        assert_eq!(
            path(|o| o.push(QueryOption::OrderBy(names(&["Foo desc", "Bar"])))),
            "Dogs?$orderby=Foo%20desc%2cBar"
        );
    }

    #[test]
    fn test_inline_count() {
        assert_eq!(
            path(|o| o.push(QueryOption::InlineCount(true))),
            "Dogs?$inlinecount=allpages"
        );
        assert_eq!(
            path(|o| o.push(QueryOption::InlineCount(false))),
            "Dogs?$inlinecount=none"
        );
    }

    #[test]
    fn test_filter_joiners() {
        let mut chain = FilterChain::new();
        chain.push_and(Filter::eq("Name", "Bob"));
        chain.push_and(Filter::ne("Foo", 5));
        assert_eq!(chain_to_odata(&chain), "Name eq 'Bob' and Foo ne 5");

        let mut chain = FilterChain::new();
        chain.push_and(Filter::eq("Name", "Bob"));
        chain.push_or(Filter::ne("Foo", 5));
        assert_eq!(chain_to_odata(&chain), "Name eq 'Bob' or Foo ne 5");

        let mut chain = FilterChain::new();
        chain.push_or(Filter::eq("Name", "Bob"));
        assert_eq!(chain_to_odata(&chain), "Name eq 'Bob'");
    }

    #[test]
    fn test_filter_functions() {
        assert_eq!(
            filter_to_odata(&Filter::contains("Name", "Bob")),
            "substringof('Bob', Name) eq true"
        );
        assert_eq!(
            filter_to_odata(&Filter::starts_with("Name", "Bo")),
            "startswith(Name, 'Bo') eq true"
        );
        assert_eq!(
            filter_to_odata(&Filter::ends_with("Name", "ob")),
            "endswith(Name, 'ob') eq true"
        );
        assert_eq!(filter_to_odata(&Filter::raw("Age gt 2")), "Age gt 2");
    }

    #[test]
    fn test_filter_in_path() {
        let rendered = path(|o| {
            o.push_filter_and(Filter::eq("Name", "Bob"));
            o.push_filter_and(Filter::ne("Foo", 5));
        });
        assert_eq!(
            rendered,
            "Dogs?$filter=Name%20eq%20%27Bob%27%20and%20Foo%20ne%205"
        );
    }

    #[test]
    fn test_value_literals() {
        assert_eq!(value_to_odata(&Value::from("O'Brien")), "'O''Brien'");
        assert_eq!(value_to_odata(&Value::Null), "null");
        assert_eq!(value_to_odata(&Value::Float(2.0)), "2.0");
        assert_eq!(value_to_odata(&Value::Float(2.5)), "2.5");

        let guid = Uuid::parse_str("3f75a1fa-dc6a-4a4c-8936-516307cb78ba").unwrap();
        assert_eq!(
            value_to_odata(&Value::Guid(guid)),
            "guid'3f75a1fa-dc6a-4a4c-8936-516307cb78ba'"
        );

        let dt = Utc.with_ymd_and_hms(2011, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(value_to_odata(&Value::DateTime(dt)), "datetime'2011-01-02T03:04:05'");
    }

    #[test]
    fn test_encode_query_value() {
        assert_eq!(encode_query_value("a b'c"), "a%20b%27c");
        assert_eq!(encode_query_value("50% & #1 + 2"), "50%25%20%26%20%231%20%2b%202");
    }

    #[test]
    fn test_single_key() {
        assert_eq!(
            key_path("Courses", &EntityKey::from("Agile Team Practices with Scrum")).unwrap(),
            "Courses('Agile%20Team%20Practices%20with%20Scrum')"
        );
        assert_eq!(key_path("Dogs", &EntityKey::from(7)).unwrap(), "Dogs(7)");
    }

    #[test]
    fn test_composite_key() {
        let key = EntityKey::composite([("Id", "NUnit"), ("Version", "2.5.7.10213")]);
        assert_eq!(
            key_path("Packages", &key).unwrap(),
            "Packages(Id=NUnit,Version=2.5.7.10213)"
        );

        let key = EntityKey::composite([("Title", "Scrum Basics"), ("Part", "1/2")]);
        assert_eq!(key_to_odata(&key).unwrap(), "Title=Scrum%20Basics,Part=1%2F2");

        let key = EntityKey::composite([("Id", Value::Int(7)), ("Owner", Value::Null)]);
        assert!(matches!(
            key_to_odata(&key),
            Err(KeyError::UnsupportedValue { ref field, kind: "null" }) if field == "Owner"
        ));
    }

    #[test]
    fn test_invalid_keys() {
        assert!(matches!(
            key_to_odata(&EntityKey::Composite(Vec::new())),
            Err(KeyError::Empty)
        ));
        assert!(matches!(
            key_to_odata(&EntityKey::Single(Value::Null)),
            Err(KeyError::UnsupportedValue { kind: "null", .. })
        ));
    }
}
