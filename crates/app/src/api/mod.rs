//! Backend API access.

mod client;
mod errors;
mod storefront;
mod transport;
mod wire;

pub use client::*;
pub use errors::*;
pub use storefront::*;
pub use transport::*;
pub use wire::{HealthStatus, OrderConfirmation, ProductDraft, ProductPage};
