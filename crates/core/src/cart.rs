//! Cart

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    catalog::Catalog,
    pricing::{CartTotals, PricingError, ShippingPolicy},
    products::{ProductId, ProductSnapshot},
};

/// Errors raised by cart mutations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    /// The product is unknown to the catalog, or the line is not in the cart.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// The product has no stock left.
    #[error("product {0} is out of stock")]
    OutOfStock(ProductId),

    /// The requested quantity exceeds the cached stock.
    #[error("only {available} of product {product_id} available, {requested} requested")]
    InsufficientStock {
        /// Product concerned
        product_id: ProductId,

        /// Resulting quantity the caller asked for
        requested: u32,

        /// Units in stock
        available: u32,
    },

    /// Lines are added with at least one unit.
    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product identifier
    pub product_id: ProductId,

    /// Product name at the time it was added
    pub name: String,

    /// Unit price in minor units
    pub unit_price: u64,

    /// Units in the cart, at least 1
    pub quantity: u32,

    /// Stock as of the last validation
    pub cached_stock: u32,

    /// Image reference
    #[serde(default)]
    pub image_ref: String,

    /// Category label
    #[serde(default)]
    pub category: String,
}

impl CartLine {
    /// Create a line for `quantity` units of a product.
    pub fn from_snapshot(product: &ProductSnapshot, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            cached_stock: product.stock,
            image_ref: product.image_ref.clone(),
            category: product.category.clone(),
        }
    }

    /// Refresh the cached product fields from a newer snapshot.
    pub fn refresh_from(&mut self, product: &ProductSnapshot) {
        self.name.clone_from(&product.name);
        self.unit_price = product.price;
        self.cached_stock = product.stock;
        self.image_ref.clone_from(&product.image_ref);
        self.category.clone_from(&product.category);
    }

    /// Unit price times quantity, or `None` on overflow.
    pub fn line_total(&self) -> Option<u64> {
        self.unit_price.checked_mul(u64::from(self.quantity))
    }
}

/// Shopping cart: an ordered sequence of lines, unique by product id.
///
/// Serialises as a JSON array of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from lines. Lines repeating an earlier product id are merged into it,
    /// zero-quantity lines are dropped.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();

        for line in lines {
            if line.quantity == 0 {
                continue;
            }

            match cart.position(line.product_id.as_str()) {
                Some(position) => {
                    if let Some(existing) = cart.lines.get_mut(position) {
                        existing.quantity = existing.quantity.saturating_add(line.quantity);
                    }
                }
                None => cart.lines.push(line),
            }
        }

        cart
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for a product, if present.
    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|line| line.product_id.as_str() == product_id)
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Add `quantity` units of a catalog product, creating the line or growing it.
    ///
    /// The line's cached price and stock are refreshed from the catalog snapshot.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: `quantity` is zero.
    /// - [`CartError::NotFound`]: the product is not in the catalog.
    /// - [`CartError::OutOfStock`]: the product has no stock.
    /// - [`CartError::InsufficientStock`]: existing plus requested units exceed the stock.
    pub fn add_line(
        &mut self,
        product_id: &str,
        quantity: u32,
        catalog: &Catalog,
    ) -> Result<&CartLine, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let product = catalog
            .find(product_id)
            .filter(|product| product.active)
            .ok_or_else(|| CartError::NotFound(ProductId::new(product_id)))?;

        if !product.is_in_stock() {
            return Err(CartError::OutOfStock(product.id.clone()));
        }

        let existing = self.position(product_id);
        let current = existing
            .and_then(|position| self.lines.get(position))
            .map_or(0, |line| line.quantity);
        let requested = current.saturating_add(quantity);

        if requested > product.stock {
            return Err(CartError::InsufficientStock {
                product_id: product.id.clone(),
                requested,
                available: product.stock,
            });
        }

        let position = match existing {
            Some(position) => position,
            None => {
                self.lines.push(CartLine::from_snapshot(product, 0));
                self.lines.len() - 1
            }
        };

        let line = self
            .lines
            .get_mut(position)
            .ok_or_else(|| CartError::NotFound(product.id.clone()))?;

        line.refresh_from(product);
        line.quantity = requested;

        Ok(line)
    }

    /// Set a line's quantity. Zero removes the line.
    ///
    /// # Errors
    ///
    /// - [`CartError::NotFound`]: the product has no line in the cart.
    /// - [`CartError::InsufficientStock`]: `quantity` exceeds the line's cached stock; the line
    ///   is left unchanged.
    pub fn set_quantity(&mut self, product_id: &str, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            self.remove_line(product_id);
            return Ok(());
        }

        let line = self
            .lines
            .iter_mut()
            .find(|line| line.product_id.as_str() == product_id)
            .ok_or_else(|| CartError::NotFound(ProductId::new(product_id)))?;

        if quantity > line.cached_stock {
            return Err(CartError::InsufficientStock {
                product_id: line.product_id.clone(),
                requested: quantity,
                available: line.cached_stock,
            });
        }

        line.quantity = quantity;

        Ok(())
    }

    /// Remove a product's line. Removing an absent line is a no-op.
    pub fn remove_line(&mut self, product_id: &str) -> Option<CartLine> {
        self.position(product_id)
            .map(|position| self.lines.remove(position))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of line totals.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the sum is not representable.
    pub fn subtotal(&self) -> Result<u64, PricingError> {
        self.lines.iter().try_fold(0_u64, |acc, line| {
            line.line_total()
                .and_then(|total| acc.checked_add(total))
                .ok_or(PricingError::Overflow)
        })
    }

    /// Subtotal, shipping and total under a shipping policy.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if any amount is not representable.
    pub fn totals(&self, policy: &ShippingPolicy) -> Result<CartTotals, PricingError> {
        CartTotals::from_subtotal(self.subtotal()?, policy)
    }

    /// Take the units of `ordered` out of this cart. Lines left without units are dropped;
    /// units added after `ordered` was taken stay in the cart.
    pub fn deduct(&mut self, ordered: &Cart) {
        for placed in &ordered.lines {
            if let Some(line) = self
                .lines
                .iter_mut()
                .find(|line| line.product_id == placed.product_id)
            {
                line.quantity = line.quantity.saturating_sub(placed.quantity);
            }
        }

        self.lines.retain(|line| line.quantity > 0);
    }

    pub(crate) fn retain_lines<F>(&mut self, keep: F)
    where
        F: FnMut(&mut CartLine) -> bool,
    {
        self.lines.retain_mut(keep);
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.product_id.as_str() == product_id)
    }
}

impl From<Vec<CartLine>> for Cart {
    fn from(lines: Vec<CartLine>) -> Self {
        Self::from_lines(lines)
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::fixtures::{line, snapshot};

    use super::*;

    fn catalog() -> Catalog {
        Catalog::new([
            snapshot("P1", 1200, 5),
            snapshot("P2", 800, 0),
            snapshot("P3", 450, 2),
        ])
    }

    #[test]
    fn add_line_creates_line_from_snapshot() -> TestResult {
        let mut cart = Cart::new();

        let line = cart.add_line("P1", 2, &catalog())?;

        assert_eq!(line.quantity, 2);
        assert_eq!(line.unit_price, 1200);
        assert_eq!(line.cached_stock, 5);
        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn add_line_grows_existing_line() -> TestResult {
        let mut cart = Cart::new();
        let catalog = catalog();

        cart.add_line("P1", 2, &catalog)?;
        cart.add_line("P1", 3, &catalog)?;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.line("P1").map(|line| line.quantity), Some(5));

        Ok(())
    }

    #[test]
    fn add_line_unknown_product_is_not_found_and_cart_unchanged() -> TestResult {
        let mut cart = Cart::new();
        cart.add_line("P1", 1, &catalog())?;
        let before = cart.clone();

        let result = cart.add_line("P9", 2, &catalog());

        assert_eq!(
            result.map(|line| line.quantity),
            Err(CartError::NotFound(ProductId::new("P9")))
        );
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn add_line_delisted_product_is_not_found() {
        let mut cart = Cart::new();
        let catalog = Catalog::new([ProductSnapshot {
            active: false,
            ..snapshot("P1", 1200, 5)
        }]);

        let result = cart.add_line("P1", 1, &catalog).map(|line| line.quantity);

        assert_eq!(result, Err(CartError::NotFound(ProductId::new("P1"))));
        assert!(cart.is_empty());
    }

    #[test]
    fn add_line_out_of_stock() {
        let mut cart = Cart::new();

        let result = cart.add_line("P2", 1, &catalog()).map(|line| line.quantity);

        assert_eq!(result, Err(CartError::OutOfStock(ProductId::new("P2"))));
        assert!(cart.is_empty());
    }

    #[test]
    fn add_line_counts_existing_quantity_against_stock() -> TestResult {
        let mut cart = Cart::new();
        let catalog = catalog();
        cart.add_line("P3", 2, &catalog)?;

        let result = cart.add_line("P3", 1, &catalog).map(|line| line.quantity);

        assert_eq!(
            result,
            Err(CartError::InsufficientStock {
                product_id: ProductId::new("P3"),
                requested: 3,
                available: 2,
            })
        );
        assert_eq!(cart.line("P3").map(|line| line.quantity), Some(2));

        Ok(())
    }

    #[test]
    fn add_line_rejects_zero_quantity() {
        let mut cart = Cart::new();

        let result = cart.add_line("P1", 0, &catalog()).map(|line| line.quantity);

        assert_eq!(result, Err(CartError::InvalidQuantity));
    }

    #[test]
    fn set_quantity_zero_removes_line() -> TestResult {
        let mut cart = Cart::from_lines([line("P1", 2, 5)]);

        cart.set_quantity("P1", 0)?;

        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn set_quantity_above_cached_stock_leaves_line_unchanged() {
        let mut cart = Cart::from_lines([line("P1", 2, 5)]);

        let result = cart.set_quantity("P1", 6);

        assert!(matches!(result, Err(CartError::InsufficientStock { .. })));
        assert_eq!(cart.line("P1").map(|line| line.quantity), Some(2));
    }

    #[test]
    fn set_quantity_on_absent_line_is_not_found() {
        let mut cart = Cart::new();

        assert_eq!(
            cart.set_quantity("P1", 1),
            Err(CartError::NotFound(ProductId::new("P1")))
        );
    }

    #[test]
    fn deduct_keeps_units_added_later() {
        let ordered = Cart::from_lines([line("P1", 2, 5), line("P3", 1, 2)]);
        let mut current = Cart::from_lines([line("P1", 3, 5), line("P3", 1, 2), line("P4", 1, 1)]);

        current.deduct(&ordered);

        assert_eq!(current.line("P1").map(|line| line.quantity), Some(1));
        assert_eq!(current.line("P3"), None);
        assert_eq!(current.len(), 2);
    }

    #[test]
    fn remove_line_is_idempotent() {
        let mut once = Cart::from_lines([line("P1", 2, 5), line("P3", 1, 2)]);
        let mut twice = once.clone();

        once.remove_line("P1");
        twice.remove_line("P1");
        twice.remove_line("P1");

        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn from_lines_merges_duplicates_and_drops_empty_lines() {
        let cart = Cart::from_lines([line("P1", 2, 5), line("P3", 0, 2), line("P1", 1, 5)]);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn subtotal_and_totals() -> TestResult {
        let mut first = line("P1", 2, 5);
        first.unit_price = 1500;
        let mut second = line("P3", 3, 5);
        second.unit_price = 600;
        let cart = Cart::from_lines([first, second]);

        let totals = cart.totals(&ShippingPolicy::new(5000, 300))?;

        assert_eq!(totals.subtotal, 4800);
        assert_eq!(totals.shipping_cost, 300);
        assert_eq!(totals.total, 5100);

        Ok(())
    }

    #[test]
    fn subtotal_overflow_is_reported() {
        let mut huge = line("P1", 2, 5);
        huge.unit_price = u64::MAX;

        assert_eq!(
            Cart::from_lines([huge]).subtotal(),
            Err(PricingError::Overflow)
        );
    }

    #[test]
    fn serialises_as_json_array_and_round_trips() -> TestResult {
        let cart = Cart::from_lines([line("P1", 2, 5), line("P3", 1, 2)]);

        let json = serde_json::to_string(&cart)?;
        assert!(json.starts_with('['));
        assert!(json.contains("\"productId\":\"P1\""));
        assert!(json.contains("\"cachedStock\":5"));

        let restored: Cart = serde_json::from_str(&json)?;

        assert_eq!(restored, cart);

        Ok(())
    }
}
