//! API client errors.

use thiserror::Error;

use crate::api::TransportError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("request rejected with status {status}: {message}")]
    Client { status: u16, message: String },

    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("session is no longer valid")]
    Unauthenticated,

    #[error("administrator session required")]
    Forbidden,

    #[error("unexpected response body")]
    Decode(#[source] serde_json::Error),

    #[error("request body could not be encoded")]
    Encode(#[source] serde_json::Error),

    #[error("invalid {field} in response: {reason}")]
    InvalidData { field: &'static str, reason: String },
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Timeout => Self::Timeout,
            TransportError::Network(message) => Self::Network(message),
        }
    }
}

impl ApiError {
    /// Whether another attempt may succeed.
    ///
    /// Unauthenticated responses are retried so that a spurious 401 does not end a valid
    /// session; the session is only dropped once the attempts are exhausted.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout | Self::Server { .. } | Self::Unauthenticated => true,
            Self::Client { status, .. } => *status == 408,
            Self::Forbidden | Self::Decode(_) | Self::Encode(_) | Self::InvalidData { .. } => {
                false
            }
        }
    }

    /// Message suitable for showing to a shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => {
                "Unable to reach the store. Check your connection and try again.".to_string()
            }
            Self::Timeout => "The store took too long to respond. Please try again.".to_string(),
            Self::Client { status: 404, .. } => "The requested item could not be found.".to_string(),
            Self::Client { message, .. } if !message.is_empty() => message.clone(),
            Self::Client { .. } => "The request could not be processed.".to_string(),
            Self::Server { .. } => {
                "The store is temporarily unavailable. Please try again later.".to_string()
            }
            Self::Unauthenticated => "Your session has expired. Please sign in again.".to_string(),
            Self::Forbidden => "This action requires an administrator account.".to_string(),
            Self::Decode(_) | Self::Encode(_) | Self::InvalidData { .. } => {
                "Something went wrong while talking to the store.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_are_retryable() {
        assert!(ApiError::Timeout.is_retryable());
        assert!(ApiError::Network("reset".to_string()).is_retryable());
        assert!(
            ApiError::Server {
                status: 503,
                message: String::new()
            }
            .is_retryable()
        );
    }

    #[test]
    fn client_errors_are_final_except_request_timeout() {
        let client = |status| ApiError::Client {
            status,
            message: String::new(),
        };

        assert!(!client(400).is_retryable());
        assert!(!client(404).is_retryable());
        assert!(!client(429).is_retryable());
        assert!(client(408).is_retryable());
    }

    #[test]
    fn client_message_is_shown_verbatim() {
        let error = ApiError::Client {
            status: 422,
            message: "Stock insuffisant".to_string(),
        };

        assert_eq!(error.user_message(), "Stock insuffisant");
    }
}
