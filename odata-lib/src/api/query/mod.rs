//! Query construction and execution.
//!
//! - [`Filter`] / [`FilterChain`] - `$filter` predicates and their joiners
//! - [`QueryOption`] / [`QueryOptions`] - ordered path-modifying options
//! - [`QueryBuilder`] - fluent request specification
//! - [`Query`] - a built query that fetches lazily and keeps its entities
//! - [`FeedPages`] / [`Page`] - page-at-a-time iteration

mod builder;
mod filter;
mod option;
mod page;
mod pages;
#[allow(clippy::module_inception)]
mod query;
pub mod url;

pub use builder::QueryBuilder;
pub use filter::Filter;
pub use filter::FilterChain;
pub use filter::FilterExpr;
pub use filter::FilterFunction;
pub use filter::FilterOp;
pub use option::QueryOption;
pub use option::QueryOptions;
pub use page::Page;
pub use pages::FeedPages;
pub use query::Query;
pub use query::QueryState;
