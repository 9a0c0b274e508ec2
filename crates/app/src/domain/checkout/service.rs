//! Checkout submitter.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use apotheca::{
    orders::{OrderDetails, OrderRequest},
    validation::{Adjustments, Validation},
};
use rusty_money::iso::Currency;
use tracing::{info, instrument, warn};

use crate::{
    api::{OrderConfirmation, StorefrontApi},
    domain::{carts::CartStore, catalog::ProductCache, checkout::CheckoutError},
};

/// Where a checkout currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    Idle,
    Validating,
    Submitting,
}

/// Result of a checkout that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The order was accepted and its lines removed from the cart.
    Placed(OrderConfirmation),

    /// The cart was corrected against fresh stock and must be reviewed before resubmitting.
    NeedsReview(Adjustments),
}

/// Marks a checkout as running; returns the submitter to idle when dropped.
#[derive(Debug)]
pub(crate) struct InFlight<'a> {
    state: &'a Mutex<CheckoutState>,
}

impl InFlight<'_> {
    fn advance(&self, next: CheckoutState) {
        *lock(self.state) = next;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *lock(self.state) = CheckoutState::Idle;
    }
}

fn lock(state: &Mutex<CheckoutState>) -> MutexGuard<'_, CheckoutState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Validates the cart against fresh stock and submits it as an order.
pub struct CheckoutService {
    api: Arc<dyn StorefrontApi>,
    products: Arc<ProductCache>,
    carts: Arc<CartStore>,
    currency: &'static Currency,
    state: Mutex<CheckoutState>,
}

impl fmt::Debug for CheckoutService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutService")
            .field("currency", &self.currency.iso_alpha_code)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl CheckoutService {
    #[must_use]
    pub fn new(
        api: Arc<dyn StorefrontApi>,
        products: Arc<ProductCache>,
        carts: Arc<CartStore>,
        currency: &'static Currency,
    ) -> Self {
        Self {
            api,
            products,
            carts,
            currency,
            state: Mutex::new(CheckoutState::Idle),
        }
    }

    pub fn state(&self) -> CheckoutState {
        *lock(&self.state)
    }

    /// Check the cart out.
    ///
    /// Refreshes the product cache (falling back to the cached stock if that fails), validates
    /// the cart and, if nothing had to be corrected, places the order. The ordered lines leave
    /// the cart only once the backend has accepted the order.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::InProgress`]: another checkout is running.
    /// - [`CheckoutError::MissingField`]: a required detail is blank.
    /// - [`CheckoutError::EmptyCart`]: there is nothing to order.
    /// - [`CheckoutError::Submission`]: the backend did not accept the order; the cart is kept.
    #[instrument(skip_all)]
    pub async fn submit(&self, details: OrderDetails) -> Result<CheckoutOutcome, CheckoutError> {
        let in_flight = self.begin()?;

        details.ensure_complete()?;

        if self.carts.snapshot().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        if let Err(error) = self.products.refresh().await {
            warn!(%error, "product refresh failed, validating against cached stock");
        }

        if let Validation::Adjusted(adjustments) = self.carts.validate()? {
            info!(adjustments = adjustments.len(), "cart needs review before checkout");
            return Ok(CheckoutOutcome::NeedsReview(adjustments));
        }

        in_flight.advance(CheckoutState::Submitting);

        let ordered = self.carts.snapshot();
        let order = OrderRequest::build(
            &ordered,
            details,
            self.carts.policy(),
            self.currency,
        )?;

        let confirmation = self
            .api
            .create_order(&order)
            .await
            .map_err(CheckoutError::Submission)?;

        info!(
            order = confirmation.reference(),
            total = %order.total,
            currency = order.currency,
            "order placed"
        );

        if let Err(error) = self.carts.settle(&ordered) {
            warn!(%error, "order placed but ordered lines could not be removed from the cart");
        }

        Ok(CheckoutOutcome::Placed(confirmation))
    }

    pub(crate) fn begin(&self) -> Result<InFlight<'_>, CheckoutError> {
        let mut state = lock(&self.state);

        if *state != CheckoutState::Idle {
            return Err(CheckoutError::InProgress);
        }

        *state = CheckoutState::Validating;

        Ok(InFlight { state: &self.state })
    }
}
