//! OData client library
//!
//! A Rust async client for OData v2 services speaking Atom/XML: build
//! queries with a fluent DSL, page through feeds lazily, and read entries
//! as entities typed by the service's `$metadata`, inheritance included.
//!
//! ```ignore
//! use odata_lib::ODataService;
//! use odata_lib::api::query::Filter;
//!
//! let service = ODataService::builder()
//!     .url("http://packages.nuget.org/v1/FeedService.svc/")
//!     .build()?;
//!
//! let mut packages = service
//!     .collection("Packages")
//!     .filter(Filter::eq("Id", "NUnit"))
//!     .order_by(&["Version desc"])
//!     .build();
//!
//! for package in packages.entities().await? {
//!     println!("{:?}", package.get_string("Version")?);
//! }
//! ```

pub mod api;
pub mod error;
pub mod model;
pub mod transport;
pub mod xml;

mod client;

pub use client::*;
