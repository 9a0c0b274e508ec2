//! Catalog

mod cache;
mod errors;

pub use cache::*;
pub use errors::CatalogError;
