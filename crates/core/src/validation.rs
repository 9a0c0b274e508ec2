//! Checkout validation
//!
//! Reconciles a cart against a catalog before an order is submitted. Stale lines are corrected
//! in place rather than rejected: unavailable products are dropped and over-committed quantities
//! are clamped to the stock on hand. Any correction makes the result [`Validation::Adjusted`] and
//! the cart must be shown to the customer again before checkout is retried.

use serde::Serialize;
use smallvec::SmallVec;

use crate::{cart::Cart, catalog::Catalog, products::ProductId};

/// Why a line was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    /// The product is no longer listed.
    Unavailable,

    /// The product has no stock left.
    OutOfStock,
}

/// A correction applied to the cart during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Adjustment {
    /// The line was dropped.
    Removed {
        /// Product concerned
        product_id: ProductId,

        /// Why it was dropped
        reason: RemovalReason,
    },

    /// The line's quantity was clamped to the available stock.
    QuantityReduced {
        /// Product concerned
        product_id: ProductId,

        /// Quantity before validation
        from: u32,

        /// Quantity after validation
        to: u32,
    },
}

impl Adjustment {
    /// Product the adjustment applies to.
    pub fn product_id(&self) -> &ProductId {
        match self {
            Self::Removed { product_id, .. } | Self::QuantityReduced { product_id, .. } => {
                product_id
            }
        }
    }
}

/// Adjustments collected during one validation pass.
pub type Adjustments = SmallVec<[Adjustment; 4]>;

/// Outcome of validating a cart for checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Every line is within stock; checkout may proceed.
    Valid,

    /// The cart was corrected and must be confirmed again.
    Adjusted(Adjustments),
}

impl Validation {
    /// Whether checkout may proceed.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Corrections applied, empty when valid.
    pub fn adjustments(&self) -> &[Adjustment] {
        match self {
            Self::Valid => &[],
            Self::Adjusted(adjustments) => adjustments.as_slice(),
        }
    }
}

/// Validate `cart` against `catalog`, correcting stale lines in place.
///
/// Surviving lines have their cached stock refreshed, so afterwards every line satisfies
/// `quantity <= cached_stock`.
pub fn validate_for_checkout(cart: &mut Cart, catalog: &Catalog) -> Validation {
    let mut adjustments = Adjustments::new();

    cart.retain_lines(|line| {
        let Some(product) = catalog
            .find(line.product_id.as_str())
            .filter(|product| product.active)
        else {
            adjustments.push(Adjustment::Removed {
                product_id: line.product_id.clone(),
                reason: RemovalReason::Unavailable,
            });
            return false;
        };

        if !product.is_in_stock() {
            adjustments.push(Adjustment::Removed {
                product_id: line.product_id.clone(),
                reason: RemovalReason::OutOfStock,
            });
            return false;
        }

        if line.quantity > product.stock {
            adjustments.push(Adjustment::QuantityReduced {
                product_id: line.product_id.clone(),
                from: line.quantity,
                to: product.stock,
            });
            line.quantity = product.stock;
        }

        line.cached_stock = product.stock;

        true
    });

    if adjustments.is_empty() {
        Validation::Valid
    } else {
        Validation::Adjusted(adjustments)
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use crate::{
        cart::Cart,
        fixtures::{line, snapshot},
        products::ProductSnapshot,
    };

    use super::*;

    #[test]
    fn over_committed_line_is_clamped() {
        let mut cart = Cart::from_lines([line("P1", 5, 5)]);
        let catalog = Catalog::new([snapshot("P1", 1000, 3)]);

        let validation = validate_for_checkout(&mut cart, &catalog);

        assert_eq!(
            validation,
            Validation::Adjusted(smallvec![Adjustment::QuantityReduced {
                product_id: ProductId::new("P1"),
                from: 5,
                to: 3,
            }])
        );
        assert_eq!(cart.line("P1").map(|line| line.quantity), Some(3));
    }

    #[test]
    fn unknown_product_is_removed() {
        let mut cart = Cart::from_lines([line("P1", 1, 5), line("P2", 1, 5)]);
        let catalog = Catalog::new([snapshot("P1", 1000, 3)]);

        let validation = validate_for_checkout(&mut cart, &catalog);

        assert_eq!(
            validation.adjustments(),
            [Adjustment::Removed {
                product_id: ProductId::new("P2"),
                reason: RemovalReason::Unavailable,
            }]
        );
        assert!(cart.line("P2").is_none());
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn delisted_product_is_removed_as_unavailable() {
        let mut cart = Cart::from_lines([line("P1", 1, 5)]);
        let catalog = Catalog::new([ProductSnapshot {
            active: false,
            ..snapshot("P1", 1000, 5)
        }]);

        let validation = validate_for_checkout(&mut cart, &catalog);

        assert_eq!(
            validation.adjustments(),
            [Adjustment::Removed {
                product_id: ProductId::new("P1"),
                reason: RemovalReason::Unavailable,
            }]
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn sold_out_product_is_removed() {
        let mut cart = Cart::from_lines([line("P1", 1, 5)]);
        let catalog = Catalog::new([snapshot("P1", 1000, 0)]);

        let validation = validate_for_checkout(&mut cart, &catalog);

        assert_eq!(
            validation.adjustments(),
            [Adjustment::Removed {
                product_id: ProductId::new("P1"),
                reason: RemovalReason::OutOfStock,
            }]
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn fresh_cart_is_valid_and_stock_is_refreshed() {
        let mut cart = Cart::from_lines([line("P1", 2, 2)]);
        let catalog = Catalog::new([snapshot("P1", 1000, 40)]);

        let validation = validate_for_checkout(&mut cart, &catalog);

        assert!(validation.is_valid());
        assert!(validation.adjustments().is_empty());
        assert_eq!(cart.line("P1").map(|line| line.cached_stock), Some(40));
    }

    #[test]
    fn valid_result_never_holds_over_stock_lines() {
        let stocks = [0_u32, 1, 2, 3, 7];
        let quantities = [1_u32, 2, 3, 8];

        for stock in stocks {
            for quantity in quantities {
                let mut cart = Cart::from_lines([line("P1", quantity, quantity), line("P2", 1, 1)]);
                let catalog = Catalog::new([snapshot("P1", 100, stock), snapshot("P2", 100, 1)]);

                let validation = validate_for_checkout(&mut cart, &catalog);

                for cart_line in cart.lines() {
                    let available = catalog
                        .find(cart_line.product_id.as_str())
                        .map_or(0, |product| product.stock);

                    assert!(
                        cart_line.quantity <= available,
                        "line {} holds {} with stock {available}",
                        cart_line.product_id,
                        cart_line.quantity
                    );
                }

                assert_eq!(
                    validation.is_valid(),
                    stock >= quantity,
                    "stock {stock}, quantity {quantity}"
                );
            }
        }
    }

    #[test]
    fn adjustment_serialises_with_kind_tag() -> testresult::TestResult {
        let json = serde_json::to_value(Adjustment::QuantityReduced {
            product_id: ProductId::new("P1"),
            from: 5,
            to: 3,
        })?;

        assert_eq!(json["kind"], "quantity_reduced");
        assert_eq!(json["product_id"], "P1");

        Ok(())
    }
}
