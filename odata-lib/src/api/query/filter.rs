//! Filter expressions for `$filter`.

use crate::model::Value;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// `eq`
    Eq,
    /// `ne`
    Ne,
    /// `gt`
    Gt,
    /// `ge`
    Ge,
    /// `lt`
    Lt,
    /// `le`
    Le,
}

impl FilterOp {
    /// Returns the operator keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Ne => "ne",
            FilterOp::Gt => "gt",
            FilterOp::Ge => "ge",
            FilterOp::Lt => "lt",
            FilterOp::Le => "le",
        }
    }
}

/// String predicate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterFunction {
    /// `startswith(Prop, Value) eq true`
    StartsWith,
    /// `endswith(Prop, Value) eq true`
    EndsWith,
    /// `substringof(Value, Prop) eq true`
    Contains,
}

/// The predicate part of a [`Filter`].
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// Filter text passed through as-is.
    Raw(String),
    /// `property op value`
    Compare {
        property: String,
        op: FilterOp,
        value: Value,
    },
    /// A string predicate function applied to a property.
    Function {
        property: String,
        function: FilterFunction,
        value: Value,
    },
}

/// A single filter predicate together with the joiner it was appended with.
///
/// Filters are built with the constructors below and appended to a query
/// with `filter`/`and` (joined with `and`) or `or` (joined with `or`).
///
/// # Example
///
/// ```
/// use odata_lib::api::query::Filter;
///
/// let by_name = Filter::eq("Name", "Bob");
/// let not_five = Filter::ne("Foo", 5);
/// let partial = Filter::contains("Name", "Bo");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    expr: FilterExpr,
    joins_with_or: bool,
}

impl Filter {
    /// Wraps an expression; the joiner defaults to `and`.
    pub fn new(expr: FilterExpr) -> Self {
        Self {
            expr,
            joins_with_or: false,
        }
    }

    fn compare(property: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self::new(FilterExpr::Compare {
            property: property.into(),
            op,
            value: value.into(),
        })
    }

    fn function(property: impl Into<String>, function: FilterFunction, value: impl Into<Value>) -> Self {
        Self::new(FilterExpr::Function {
            property: property.into(),
            function,
            value: value.into(),
        })
    }

    /// Creates an equality filter: `property eq value`.
    pub fn eq(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(property, FilterOp::Eq, value)
    }

    /// Creates a not-equal filter: `property ne value`.
    pub fn ne(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(property, FilterOp::Ne, value)
    }

    /// Creates a greater-than filter: `property gt value`.
    pub fn gt(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(property, FilterOp::Gt, value)
    }

    /// Creates a greater-than-or-equal filter: `property ge value`.
    pub fn ge(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(property, FilterOp::Ge, value)
    }

    /// Creates a less-than filter: `property lt value`.
    pub fn lt(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(property, FilterOp::Lt, value)
    }

    /// Creates a less-than-or-equal filter: `property le value`.
    pub fn le(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(property, FilterOp::Le, value)
    }

    /// Creates a starts-with filter: `startswith(property, value) eq true`.
    pub fn starts_with(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::function(property, FilterFunction::StartsWith, value)
    }

    /// Creates an ends-with filter: `endswith(property, value) eq true`.
    pub fn ends_with(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::function(property, FilterFunction::EndsWith, value)
    }

    /// Creates a substring filter: `substringof(value, property) eq true`.
    pub fn contains(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::function(property, FilterFunction::Contains, value)
    }

    /// Creates a raw filter (escape hatch).
    ///
    /// The text is rendered verbatim.
    pub fn raw(filter: impl Into<String>) -> Self {
        Self::new(FilterExpr::Raw(filter.into()))
    }

    /// Returns the predicate.
    pub fn expr(&self) -> &FilterExpr {
        &self.expr
    }

    /// Returns `true` if this filter is joined to its predecessor with `or`.
    pub fn joins_with_or(&self) -> bool {
        self.joins_with_or
    }
}

impl From<FilterExpr> for Filter {
    fn from(expr: FilterExpr) -> Self {
        Filter::new(expr)
    }
}

/// An ordered, flat sequence of filters.
///
/// Each filter keeps the joiner it was appended with. The first filter never
/// renders a joiner. There is no grouping or precedence: the chain renders
/// left to right.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChain {
    filters: Vec<Filter>,
}

impl FilterChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a filter joined with `and`.
    pub fn push_and(&mut self, mut filter: Filter) {
        filter.joins_with_or = false;
        self.filters.push(filter);
    }

    /// Appends a filter joined with `or`.
    pub fn push_or(&mut self, mut filter: Filter) {
        filter.joins_with_or = true;
        self.filters.push(filter);
    }

    /// Returns the filters in append order.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Returns `true` if the chain has no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns the number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }
}
