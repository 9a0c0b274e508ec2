//! API Config

use std::time::Duration;

use clap::Args;

use crate::api::RetryPolicy;

/// Backend API settings.
#[derive(Debug, Clone, Args)]
pub struct ApiConfig {
    /// Base URL of the storefront API
    #[arg(
        long,
        env = "APOTHECA_API_URL",
        default_value = "http://localhost:5000/api"
    )]
    pub api_url: String,

    /// Per-attempt request timeout in seconds
    #[arg(long, env = "APOTHECA_API_TIMEOUT_SECONDS", default_value_t = 30u64)]
    pub api_timeout_seconds: u64,

    /// Attempts per request, including the first
    #[arg(long, env = "APOTHECA_API_ATTEMPTS", default_value_t = 3u32)]
    pub api_attempts: u32,

    /// Delay between attempts in milliseconds
    #[arg(long, env = "APOTHECA_API_RETRY_DELAY_MS", default_value_t = 2000u64)]
    pub api_retry_delay_ms: u64,
}

impl ApiConfig {
    /// Per-attempt timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_seconds)
    }

    /// Retry policy for the API client.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.api_attempts.max(1),
            delay: Duration::from_millis(self.api_retry_delay_ms),
        }
    }
}
