//! Store Config

use std::path::PathBuf;

use apotheca::pricing::ShippingPolicy;
use clap::Args;

/// Local persistence and pricing settings.
#[derive(Debug, Clone, Args)]
pub struct StoreConfig {
    /// Directory holding the cart, product cache and session
    #[arg(long, env = "APOTHECA_DATA_DIR", default_value = ".apotheca")]
    pub data_dir: PathBuf,

    /// ISO 4217 currency of every price
    #[arg(long, env = "APOTHECA_CURRENCY", default_value = "DZD")]
    pub currency: String,

    /// Subtotal, in minor units, from which shipping is free
    #[arg(long, env = "APOTHECA_FREE_SHIPPING_THRESHOLD", default_value_t = 5_000_00u64)]
    pub free_shipping_threshold: u64,

    /// Flat shipping fee, in minor units, below the threshold
    #[arg(long, env = "APOTHECA_SHIPPING_FEE", default_value_t = 300_00u64)]
    pub shipping_fee: u64,
}

impl StoreConfig {
    #[must_use]
    pub fn shipping_policy(&self) -> ShippingPolicy {
        ShippingPolicy::new(self.free_shipping_threshold, self.shipping_fee)
    }
}
