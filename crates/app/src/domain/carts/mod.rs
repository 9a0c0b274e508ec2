//! Carts

mod errors;
mod store;

pub use errors::CartStoreError;
pub use store::*;
