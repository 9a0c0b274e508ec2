//! Product cache errors.

use apotheca::products::ProductId;
use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product {0} not found")]
    NotFound(ProductId),

    #[error("failed to fetch products")]
    Api(#[from] ApiError),
}

impl CatalogError {
    /// Message suitable for showing to a shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) => "This product is no longer available.".to_string(),
            Self::Api(error) => error.user_message(),
        }
    }
}
