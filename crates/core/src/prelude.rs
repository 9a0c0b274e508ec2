//! Apotheca prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine},
    catalog::Catalog,
    orders::{CustomerContact, OrderDetails, OrderError, OrderLine, OrderRequest, ShippingAddress},
    pricing::{CartTotals, PricingError, ShippingPolicy},
    products::{ProductId, ProductSnapshot},
    validation::{Adjustment, RemovalReason, Validation, validate_for_checkout},
};
