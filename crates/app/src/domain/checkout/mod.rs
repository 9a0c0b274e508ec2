//! Checkout

mod errors;
mod service;

pub use errors::CheckoutError;
pub use service::{CheckoutOutcome, CheckoutService, CheckoutState};
