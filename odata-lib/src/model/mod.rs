//! Typed models

mod coerce;
mod entity;
mod key;
pub mod metadata;
mod value;

pub use coerce::*;
pub use entity::*;
pub use key::*;
pub use value::*;
