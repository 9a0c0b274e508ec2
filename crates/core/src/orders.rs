//! Orders

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::Cart,
    pricing::{PricingError, ShippingPolicy, to_major},
    products::ProductId,
};

/// Errors raised while assembling an order.
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    /// Orders need at least one line.
    #[error("cannot order an empty cart")]
    EmptyCart,

    /// A required customer or address field is blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Totals could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Customer contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    /// Full name
    pub name: String,

    /// Email address, optional for guest checkout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Phone number
    pub phone: String,
}

/// Delivery address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    /// Street address
    pub address: String,

    /// City
    pub city: String,

    /// Region or province
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Postal code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

/// Everything the customer fills in at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    /// Contact details
    pub customer: CustomerContact,

    /// Delivery address
    pub shipping_address: ShippingAddress,

    /// Free-form delivery notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OrderDetails {
    /// Check the required fields are filled in.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::MissingField`] naming the first blank required field.
    pub fn ensure_complete(&self) -> Result<(), OrderError> {
        let required = [
            ("name", &self.customer.name),
            ("phone", &self.customer.phone),
            ("address", &self.shipping_address.address),
            ("city", &self.shipping_address.city),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(OrderError::MissingField(*field)),
            None => Ok(()),
        }
    }
}

/// One line of an order payload. Amounts are in major currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Product identifier
    pub product_id: ProductId,

    /// Product name
    pub name: String,

    /// Units ordered
    pub quantity: u32,

    /// Unit price
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,

    /// Unit price times quantity
    #[serde(with = "rust_decimal::serde::float")]
    pub line_total: Decimal,
}

/// Order payload submitted to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Contact details
    pub customer: CustomerContact,

    /// Delivery address
    pub shipping_address: ShippingAddress,

    /// Ordered lines
    pub items: Vec<OrderLine>,

    /// Sum of line totals
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,

    /// Shipping cost
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping_cost: Decimal,

    /// Subtotal plus shipping
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,

    /// ISO currency code of every amount
    pub currency: &'static str,

    /// Delivery notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OrderRequest {
    /// Assemble an order from a validated cart.
    ///
    /// # Errors
    ///
    /// - [`OrderError::EmptyCart`]: the cart has no lines.
    /// - [`OrderError::MissingField`]: a required detail is blank.
    /// - [`OrderError::Pricing`]: an amount could not be computed or converted.
    pub fn build(
        cart: &Cart,
        details: OrderDetails,
        policy: &ShippingPolicy,
        currency: &'static Currency,
    ) -> Result<Self, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        details.ensure_complete()?;

        let items = cart
            .lines()
            .iter()
            .map(|line| {
                let line_total = line.line_total().ok_or(PricingError::Overflow)?;

                Ok(OrderLine {
                    product_id: line.product_id.clone(),
                    name: line.name.clone(),
                    quantity: line.quantity,
                    unit_price: to_major(line.unit_price, currency)?,
                    line_total: to_major(line_total, currency)?,
                })
            })
            .collect::<Result<Vec<_>, PricingError>>()?;

        let totals = cart.totals(policy)?;

        Ok(Self {
            customer: details.customer,
            shipping_address: details.shipping_address,
            items,
            subtotal: to_major(totals.subtotal, currency)?,
            shipping_cost: to_major(totals.shipping_cost, currency)?,
            total: to_major(totals.total, currency)?,
            currency: currency.iso_alpha_code,
            notes: details.notes.filter(|notes| !notes.trim().is_empty()),
        })
    }
}
