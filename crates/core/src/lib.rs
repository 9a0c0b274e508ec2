//! Apotheca
//!
//! Apotheca is the storefront domain core: product snapshots, the shopping cart, shipping and
//! totals, checkout validation against a product catalog and order payload assembly.
//!
//! Everything in this crate is synchronous and free of I/O. Network access, persistence and the
//! checkout workflow live in `apotheca-app`.

pub mod cart;
pub mod catalog;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod validation;

#[cfg(test)]
pub(crate) mod fixtures;
