//! Query options.

use super::Filter;
use super::FilterChain;

/// One path-modifying directive of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOption {
    /// `$top`
    Top(usize),
    /// `$skip`
    Skip(usize),
    /// `$select`
    Select(Vec<String>),
    /// `$orderby`; items may carry an `asc`/`desc` suffix.
    OrderBy(Vec<String>),
    /// `$expand`; items may be `/`-separated navigation paths.
    Expand(Vec<String>),
    /// `$inlinecount`: `allpages` when `true`, `none` when `false`.
    InlineCount(bool),
    /// `$filter`
    Filter(FilterChain),
}

impl QueryOption {
    /// Returns the query string key.
    pub fn key(&self) -> &'static str {
        match self {
            QueryOption::Top(_) => "$top",
            QueryOption::Skip(_) => "$skip",
            QueryOption::Select(_) => "$select",
            QueryOption::OrderBy(_) => "$orderby",
            QueryOption::Expand(_) => "$expand",
            QueryOption::InlineCount(_) => "$inlinecount",
            QueryOption::Filter(_) => "$filter",
        }
    }
}

/// Query options in the order the caller chained them.
///
/// Holds at most one [`QueryOption::Filter`]: it is placed where the first
/// filter was added, and later filters are appended to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    options: Vec<QueryOption>,
}

impl QueryOptions {
    /// Creates an empty option sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an option.
    ///
    /// Filter options are merged into the existing filter, if any.
    pub fn push(&mut self, option: QueryOption) {
        match option {
            QueryOption::Filter(chain) => {
                for filter in chain.filters().iter().cloned() {
                    if filter.joins_with_or() {
                        self.push_filter_or(filter);
                    } else {
                        self.push_filter_and(filter);
                    }
                }
            }
            other => self.options.push(other),
        }
    }

    /// Appends a filter joined with `and`.
    pub fn push_filter_and(&mut self, filter: Filter) {
        self.push_filter(filter, FilterChain::push_and);
    }

    /// Appends a filter joined with `or`.
    pub fn push_filter_or(&mut self, filter: Filter) {
        self.push_filter(filter, FilterChain::push_or);
    }

    fn push_filter(&mut self, filter: Filter, append: fn(&mut FilterChain, Filter)) {
        let existing = self.options.iter_mut().find_map(|option| match option {
            QueryOption::Filter(chain) => Some(chain),
            _ => None,
        });

        match existing {
            Some(chain) => append(chain, filter),
            None => {
                let mut chain = FilterChain::new();
                append(&mut chain, filter);
                self.options.push(QueryOption::Filter(chain));
            }
        }
    }

    /// Returns the options in order.
    pub fn iter(&self) -> std::slice::Iter<'_, QueryOption> {
        self.options.iter()
    }

    /// Returns `true` if no options were added.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Returns the number of options.
    pub fn len(&self) -> usize {
        self.options.len()
    }
}

impl<'a> IntoIterator for &'a QueryOptions {
    type Item = &'a QueryOption;
    type IntoIter = std::slice::Iter<'a, QueryOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.iter()
    }
}
