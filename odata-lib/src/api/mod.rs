//! Service operations

mod collection;
mod feed;
mod materialize;
mod metadata;
pub mod query;
mod service;

pub use collection::*;
pub use feed::*;
pub use materialize::*;
pub use metadata::*;
