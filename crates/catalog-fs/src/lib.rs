//! Filesystem backend for catalog product ordering.
//!
//! Stores each category as a directory with:
//! - `products.yml`: Every product of the category, rewritten atomically per batch
//! - `events.ndjson`: Append-only log of committed order changes

pub mod atomic;
pub mod catalog;
pub mod config;
pub mod error;

pub use catalog::Catalog;
pub use config::CatalogConfig;
pub use error::{FsError, Result};
