//! Checkout errors.

use apotheca::orders::OrderError;
use thiserror::Error;

use crate::{api::ApiError, domain::carts::CartStoreError};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("a checkout is already in progress")]
    InProgress,

    #[error("cannot check out an empty cart")]
    EmptyCart,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("order could not be assembled")]
    Order(#[source] OrderError),

    #[error(transparent)]
    Cart(#[from] CartStoreError),

    #[error("order submission failed")]
    Submission(#[source] ApiError),
}

impl From<OrderError> for CheckoutError {
    fn from(error: OrderError) -> Self {
        match error {
            OrderError::EmptyCart => Self::EmptyCart,
            OrderError::MissingField(field) => Self::MissingField(field),
            OrderError::Pricing(_) => Self::Order(error),
        }
    }
}

impl CheckoutError {
    /// Message suitable for showing to a shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InProgress => "Your order is already being placed.".to_string(),
            Self::EmptyCart => "Your cart is empty.".to_string(),
            Self::MissingField(field) => format!("Please fill in your {field}."),
            Self::Order(_) => "Your order total could not be computed.".to_string(),
            Self::Cart(error) => error.user_message(),
            Self::Submission(error) => format!(
                "Your order could not be placed. {} Your cart has been kept.",
                error.user_message()
            ),
        }
    }
}
