//! Application configuration

use clap::Args;

use crate::config::{api::ApiConfig, logging::LoggingConfig, store::StoreConfig};

pub mod api;
pub mod logging;
pub mod store;

/// Apotheca configuration, read from CLI arguments and `APOTHECA_*` environment variables.
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Backend API settings.
    #[command(flatten)]
    pub api: ApiConfig,

    /// Local store settings.
    #[command(flatten)]
    pub store: StoreConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}
