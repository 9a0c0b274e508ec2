//! Local cart store.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use apotheca::{
    cart::{Cart, CartError, CartLine},
    pricing::{CartTotals, ShippingPolicy},
    validation::{Validation, validate_for_checkout},
};
use tracing::{debug, info, warn};

use crate::{
    domain::{carts::CartStoreError, catalog::ProductCache},
    storage::{KeyValueStore, keys, load_document, save_document},
};

/// The shopper's cart, persisted as one document after every change.
///
/// A mutation is applied to a copy which is written to the store before it replaces the
/// in-memory cart, so a failed write leaves both unchanged.
pub struct CartStore {
    store: Arc<dyn KeyValueStore>,
    products: Arc<ProductCache>,
    policy: ShippingPolicy,
    cart: Mutex<Cart>,
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("policy", &self.policy)
            .field("cart", &*self.lock())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Open the persisted cart. An unreadable cart is logged and replaced by an empty one.
    #[must_use]
    pub fn load(
        store: Arc<dyn KeyValueStore>,
        products: Arc<ProductCache>,
        policy: ShippingPolicy,
    ) -> Self {
        let cart = read_cart(store.as_ref()).unwrap_or_else(|error| {
            warn!(%error, "ignoring unreadable cart");
            Cart::new()
        });

        Self {
            store,
            products,
            policy,
            cart: Mutex::new(cart),
        }
    }

    /// Copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.lock().clone()
    }

    pub fn policy(&self) -> &ShippingPolicy {
        &self.policy
    }

    /// Subtotal, shipping and total of the current cart.
    ///
    /// # Errors
    ///
    /// Returns an error if an amount overflows.
    pub fn totals(&self) -> Result<CartTotals, CartStoreError> {
        Ok(self.lock().totals(&self.policy)?)
    }

    /// Add units of a cached product.
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] variants for unknown, sold-out or insufficiently stocked products,
    /// and a storage error if the cart cannot be persisted.
    pub fn add_line(&self, product_id: &str, quantity: u32) -> Result<CartLine, CartStoreError> {
        let line = self.mutate(|cart| {
            self.products
                .with_catalog(|catalog| cart.add_line(product_id, quantity, catalog).cloned())
        })?;

        debug!(product = product_id, quantity = line.quantity, "cart line added");

        Ok(line)
    }

    /// Set a line's quantity; zero removes it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] for a product not in the cart,
    /// [`CartError::InsufficientStock`] above the cached stock, and a storage error if the cart
    /// cannot be persisted.
    pub fn set_quantity(&self, product_id: &str, quantity: u32) -> Result<(), CartStoreError> {
        self.mutate(|cart| cart.set_quantity(product_id, quantity))?;

        debug!(product = product_id, quantity, "cart quantity set");

        Ok(())
    }

    /// Remove a line. Removing an absent line succeeds and changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn remove_line(&self, product_id: &str) -> Result<Option<CartLine>, CartStoreError> {
        let removed = self.mutate(|cart| Ok::<_, CartError>(cart.remove_line(product_id)))?;

        if removed.is_some() {
            debug!(product = product_id, "cart line removed");
        }

        Ok(removed)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn clear(&self) -> Result<(), CartStoreError> {
        self.mutate(|cart| {
            cart.clear();
            Ok::<_, CartError>(())
        })?;

        info!("cart cleared");

        Ok(())
    }

    /// Remove the units of a placed order, keeping anything added since it was taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn settle(&self, ordered: &Cart) -> Result<(), CartStoreError> {
        self.mutate(|cart| {
            cart.deduct(ordered);
            Ok::<_, CartError>(())
        })?;

        info!(lines = ordered.len(), "ordered lines removed from cart");

        Ok(())
    }

    /// Replace the in-memory cart with the persisted one, picking up changes written by another
    /// process sharing the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted cart cannot be read; the in-memory cart is kept.
    pub fn reload(&self) -> Result<(), CartStoreError> {
        let cart = read_cart(self.store.as_ref())?;

        *self.lock() = cart;

        Ok(())
    }

    /// Validate the cart against the product cache, persisting any corrections.
    ///
    /// # Errors
    ///
    /// Returns an error if the corrected cart cannot be persisted.
    pub fn validate(&self) -> Result<Validation, CartStoreError> {
        let validation = self.mutate(|cart| {
            Ok::<_, CartError>(
                self.products
                    .with_catalog(|catalog| validate_for_checkout(cart, catalog)),
            )
        })?;

        for adjustment in validation.adjustments() {
            info!(?adjustment, "cart adjusted during validation");
        }

        Ok(validation)
    }

    fn mutate<T, E>(&self, change: impl FnOnce(&mut Cart) -> Result<T, E>) -> Result<T, CartStoreError>
    where
        CartStoreError: From<E>,
    {
        let mut cart = self.lock();
        let mut next = cart.clone();

        let output = change(&mut next)?;

        save_document(self.store.as_ref(), keys::CART, &next)?;
        *cart = next;

        Ok(output)
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_cart(store: &dyn KeyValueStore) -> Result<Cart, CartStoreError> {
    Ok(load_document(store, keys::CART)?.unwrap_or_default())
}
