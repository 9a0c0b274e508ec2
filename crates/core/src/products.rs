//! Products

use std::{
    borrow::Borrow,
    fmt::{Display, Formatter, Result as FmtResult},
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product identifier as issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Wrap a backend identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ProductId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Read-only mirror of a product's server-side state.
///
/// Prices are integer minor units of the store currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    /// Product identifier
    pub id: ProductId,

    /// Display name
    pub name: String,

    /// Current selling price
    pub price: u64,

    /// Price before the running promotion, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<u64>,

    /// Whether the backend flags the product as on promotion
    #[serde(default)]
    pub promotion_active: bool,

    /// Units in stock
    pub stock: u32,

    /// Category label
    pub category: String,

    /// Image reference (URL or asset path)
    #[serde(default)]
    pub image_ref: String,

    /// Whether the product is listed
    #[serde(default = "listed")]
    pub active: bool,

    /// Brand, when the backend provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// Long description, when the backend provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

const fn listed() -> bool {
    true
}

impl ProductSnapshot {
    /// Whether at least one unit can be sold.
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Whether a promotion is running with a real markdown.
    pub fn is_on_promotion(&self) -> bool {
        self.promotion_active && self.original_price.is_some_and(|original| original > self.price)
    }

    /// Percentage taken off the original price, rounded to the nearest whole percent.
    ///
    /// Returns `None` when the product is not on promotion.
    pub fn discount_percent(&self) -> Option<Decimal> {
        if !self.is_on_promotion() {
            return None;
        }

        let original = Decimal::from(self.original_price?);
        let saving = original - Decimal::from(self.price);

        saving
            .checked_div(original)
            .map(|ratio| (ratio * Decimal::ONE_HUNDRED).round())
    }
}
