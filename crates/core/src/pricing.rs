//! Pricing

use std::num::TryFromIntError;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A sum or product of amounts exceeded the representable range.
    #[error("amount overflowed while pricing the cart")]
    Overflow,

    /// An amount could not be represented as money in the store currency.
    #[error("amount {amount} is out of range for money values")]
    OutOfRange {
        /// Offending amount in minor units
        amount: u64,

        /// Conversion failure
        #[source]
        source: TryFromIntError,
    },

    /// A decimal amount was negative or not representable in minor units.
    #[error("invalid amount {0}")]
    InvalidAmount(Decimal),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Flat-fee shipping with a free-shipping threshold, both in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingPolicy {
    free_shipping_threshold: u64,
    flat_fee: u64,
}

impl ShippingPolicy {
    /// Create a shipping policy.
    pub const fn new(free_shipping_threshold: u64, flat_fee: u64) -> Self {
        Self {
            free_shipping_threshold,
            flat_fee,
        }
    }

    /// Subtotal at or above which shipping is free.
    pub const fn free_shipping_threshold(&self) -> u64 {
        self.free_shipping_threshold
    }

    /// Fee charged below the threshold.
    pub const fn flat_fee(&self) -> u64 {
        self.flat_fee
    }

    /// Shipping cost for a subtotal.
    pub const fn shipping_cost(&self, subtotal: u64) -> u64 {
        if subtotal >= self.free_shipping_threshold {
            0
        } else {
            self.flat_fee
        }
    }

    /// How much more must be spent to ship for free, if anything.
    pub const fn remaining_for_free_shipping(&self, subtotal: u64) -> Option<u64> {
        if subtotal >= self.free_shipping_threshold {
            None
        } else {
            Some(self.free_shipping_threshold - subtotal)
        }
    }
}

impl Default for ShippingPolicy {
    /// 5 000 DZD threshold with a 300 DZD flat fee.
    fn default() -> Self {
        Self::new(5_000_00, 300_00)
    }
}

/// Derived totals of a cart, in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    /// Sum of line totals
    pub subtotal: u64,

    /// Shipping cost under the active policy
    pub shipping_cost: u64,

    /// Subtotal plus shipping
    pub total: u64,
}

impl CartTotals {
    /// Apply a shipping policy to a subtotal.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the total is not representable.
    pub fn from_subtotal(subtotal: u64, policy: &ShippingPolicy) -> Result<Self, PricingError> {
        let shipping_cost = policy.shipping_cost(subtotal);
        let total = subtotal
            .checked_add(shipping_cost)
            .ok_or(PricingError::Overflow)?;

        Ok(Self {
            subtotal,
            shipping_cost,
            total,
        })
    }
}

/// Wrap a minor-unit amount as money in `currency`.
///
/// # Errors
///
/// Returns [`PricingError::OutOfRange`] when the amount does not fit a signed 64-bit value.
pub fn money(amount: u64, currency: &'static Currency) -> Result<Money<'static, Currency>, PricingError> {
    let minor =
        i64::try_from(amount).map_err(|source| PricingError::OutOfRange { amount, source })?;

    Ok(Money::from_minor(minor, currency))
}

/// Convert a minor-unit amount to a decimal in major units (e.g. `120050` → `1200.50`).
///
/// # Errors
///
/// Returns [`PricingError::OutOfRange`] when the amount does not fit a signed 64-bit value.
pub fn to_major(amount: u64, currency: &'static Currency) -> Result<Decimal, PricingError> {
    Ok(*money(amount, currency)?.amount())
}

/// Convert a decimal amount in major units to minor units, rounding half away from zero.
///
/// # Errors
///
/// Returns [`PricingError::InvalidAmount`] for negative or oversized amounts.
pub fn to_minor(amount: Decimal, currency: &'static Currency) -> Result<u64, PricingError> {
    let factor = Decimal::from(10_u64.pow(currency.exponent));

    amount
        .checked_mul(factor)
        .map(|scaled| {
            scaled.round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        })
        .filter(|scaled| !scaled.is_sign_negative())
        .and_then(|scaled| scaled.to_u64())
        .ok_or(PricingError::InvalidAmount(amount))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn shipping_is_charged_below_threshold() {
        let policy = ShippingPolicy::new(5000, 300);

        assert_eq!(policy.shipping_cost(4800), 300);
    }

    #[test]
    fn shipping_is_free_at_or_above_threshold() {
        let policy = ShippingPolicy::new(5000, 300);

        assert_eq!(policy.shipping_cost(5200), 0);
        assert_eq!(policy.shipping_cost(5000), 0);
    }

    #[test]
    fn remaining_for_free_shipping() {
        let policy = ShippingPolicy::new(5000, 300);

        assert_eq!(policy.remaining_for_free_shipping(4800), Some(200));
        assert_eq!(policy.remaining_for_free_shipping(5000), None);
    }

    #[test]
    fn totals_add_shipping() -> TestResult {
        let totals = CartTotals::from_subtotal(4800, &ShippingPolicy::new(5000, 300))?;

        assert_eq!(totals.shipping_cost, 300);
        assert_eq!(totals.total, 5100);

        Ok(())
    }

    #[test]
    fn totals_overflow_is_reported() {
        let result = CartTotals::from_subtotal(u64::MAX - 1, &ShippingPolicy::new(u64::MAX, 2));

        assert_eq!(result, Err(PricingError::Overflow));
    }

    #[test]
    fn money_wraps_minor_units() -> TestResult {
        assert_eq!(money(120_050, iso::DZD)?, Money::from_minor(120_050, iso::DZD));

        Ok(())
    }

    #[test]
    fn money_rejects_amounts_beyond_i64() {
        assert!(matches!(
            money(u64::MAX, iso::DZD),
            Err(PricingError::OutOfRange { .. })
        ));
    }

    #[test]
    fn major_and_minor_conversions() -> TestResult {
        assert_eq!(to_major(120_050, iso::DZD)?, Decimal::new(120_050, 2));
        assert_eq!(to_minor(Decimal::new(12_005, 1), iso::DZD)?, 120_050);
        assert_eq!(to_minor(Decimal::new(19_995, 3), iso::DZD)?, 2_000);

        Ok(())
    }

    #[test]
    fn to_minor_rejects_negative_amounts() {
        let amount = Decimal::new(-100, 0);

        assert_eq!(
            to_minor(amount, iso::DZD),
            Err(PricingError::InvalidAmount(amount))
        );
    }
}
