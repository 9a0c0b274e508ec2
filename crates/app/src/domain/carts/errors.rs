//! Cart store errors.

use apotheca::{cart::CartError, pricing::PricingError};
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum CartStoreError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("failed to persist cart")]
    Storage(#[from] StorageError),

    #[error("cart totals could not be computed")]
    Pricing(#[from] PricingError),
}

impl CartStoreError {
    /// Message suitable for showing to a shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Cart(CartError::NotFound(_)) => {
                "This product is not available.".to_string()
            }
            Self::Cart(CartError::OutOfStock(_)) => "This product is out of stock.".to_string(),
            Self::Cart(CartError::InsufficientStock { available, .. }) => {
                format!("Only {available} left in stock.")
            }
            Self::Cart(CartError::InvalidQuantity) => "Choose at least one unit.".to_string(),
            Self::Storage(_) => "Your cart could not be saved on this device.".to_string(),
            Self::Pricing(_) => "Your cart total could not be computed.".to_string(),
        }
    }
}
