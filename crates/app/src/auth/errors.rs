//! Auth service errors.

use thiserror::Error;

use crate::{api::ApiError, storage::StorageError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0} is required")]
    MissingCredential(&'static str),

    #[error("authentication request failed")]
    Api(#[from] ApiError),

    #[error("failed to persist session")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Message suitable for showing to a shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredential(field) => format!("Please enter your {field}."),
            Self::Api(ApiError::Client { status: 400 | 401, message }) if message.is_empty() => {
                "Incorrect email or password.".to_string()
            }
            Self::Api(error) => error.user_message(),
            Self::Storage(_) => "Your session could not be saved on this device.".to_string(),
        }
    }
}
