//! Retrying API client.

use std::{fmt, sync::Arc, time::Duration};

use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    api::{ApiError, ApiRequest, ApiResponse, Transport},
    auth::SessionStore,
};

/// Attempt budget for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,

    /// Pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// Sends requests through a [`Transport`], attaching the session token and retrying transient
/// failures.
///
/// Timeouts, network failures, 5xx and 408 responses are retried up to the policy's attempt
/// count. A 401 on a request that carried a token is retried too; only when the final attempt is
/// also rejected is the session invalidated and [`ApiError::Unauthenticated`] returned. Other
/// client errors fail on the first attempt.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    sessions: Arc<SessionStore>,
    policy: RetryPolicy,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("sessions", &self.sessions)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        sessions: Arc<SessionStore>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            sessions,
            policy,
        }
    }

    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Send `request` with the current session token, if any.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt once retries are exhausted, or the first
    /// non-retryable error.
    pub async fn call(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let token = self.sessions.token();

        self.execute(request, token).await
    }

    /// Send `request` without a session token. Used for login and registration.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::call`]. A 401 is reported as a client error and is not retried.
    pub async fn call_anonymous(&self, request: ApiRequest) -> Result<Value, ApiError> {
        self.execute(request, None).await
    }

    async fn execute(&self, request: ApiRequest, token: Option<String>) -> Result<Value, ApiError> {
        let request = match &token {
            Some(token) => request.with_session_token(token),
            None => request,
        };

        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let result = match self.transport.send(&request).await {
                Ok(response) => classify(&response, token.is_some()),
                Err(error) => Err(ApiError::from(error)),
            };

            match result {
                Ok(body) => {
                    debug!(path = %request.path, attempt, "request succeeded");
                    return Ok(body);
                }
                Err(error) if error.is_retryable() && attempt < max_attempts => {
                    warn!(
                        path = %request.path,
                        attempt,
                        max_attempts,
                        %error,
                        "request failed, retrying"
                    );

                    tokio::time::sleep(self.policy.delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    if let (ApiError::Unauthenticated, Some(token)) = (&error, &token) {
                        self.sessions.invalidate(token);
                    }

                    return Err(error);
                }
            }
        }
    }
}

fn classify(response: &ApiResponse, authenticated: bool) -> Result<Value, ApiError> {
    if response.is_success() {
        return response.json();
    }

    match response.status {
        401 if authenticated => Err(ApiError::Unauthenticated),
        403 => Err(ApiError::Forbidden),
        status @ 500.. => Err(ApiError::Server {
            status,
            message: response.error_message(),
        }),
        status => Err(ApiError::Client {
            status,
            message: response.error_message(),
        }),
    }
}
