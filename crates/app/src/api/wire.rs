//! Backend payload shapes.
//!
//! The backend is inconsistent about field names (French and English spellings, Mongo `_id`)
//! and about envelopes. Everything is normalised here, at the edge, into the core types.

use apotheca::{
    pricing::{PricingError, to_major, to_minor},
    products::{ProductId, ProductSnapshot},
};
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    api::ApiError,
    auth::{AuthSession, AuthUser, Role},
};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireCategory {
    Name(String),
    Object {
        #[serde(alias = "nom")]
        name: String,
    },
}

impl WireCategory {
    fn into_name(self) -> String {
        match self {
            Self::Name(name) | Self::Object { name } => name,
        }
    }
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireProduct {
    #[serde(alias = "_id")]
    id: String,

    #[serde(alias = "nom")]
    name: String,

    #[serde(alias = "prix")]
    price: Decimal,

    #[serde(default, alias = "prixOriginal")]
    original_price: Option<Decimal>,

    #[serde(default, alias = "enPromotion", alias = "promotion")]
    promotion_active: bool,

    #[serde(default)]
    stock: i64,

    #[serde(default, alias = "categorie")]
    category: Option<WireCategory>,

    #[serde(default, alias = "imageUrl", alias = "imageRef")]
    image: Option<String>,

    #[serde(default = "default_active", alias = "actif", alias = "isActive")]
    active: bool,

    #[serde(default, alias = "marque")]
    brand: Option<String>,

    #[serde(default)]
    description: Option<String>,
}

impl WireProduct {
    pub(crate) fn into_snapshot(
        self,
        currency: &'static Currency,
    ) -> Result<ProductSnapshot, ApiError> {
        let price = to_minor(self.price, currency).map_err(|error| ApiError::InvalidData {
            field: "price",
            reason: error.to_string(),
        })?;

        let original_price = self
            .original_price
            .map(|amount| to_minor(amount, currency))
            .transpose()
            .map_err(|error| ApiError::InvalidData {
                field: "originalPrice",
                reason: error.to_string(),
            })?;

        Ok(ProductSnapshot {
            id: ProductId::new(self.id),
            name: self.name,
            price,
            original_price,
            promotion_active: self.promotion_active,
            stock: u32::try_from(self.stock.max(0)).unwrap_or(u32::MAX),
            category: self
                .category
                .map(WireCategory::into_name)
                .unwrap_or_default(),
            image_ref: self.image.unwrap_or_default(),
            active: self.active,
            brand: self.brand,
            description: self.description,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePagination {
    #[serde(default, alias = "currentPage")]
    page: Option<u32>,

    #[serde(default, alias = "totalPages")]
    pages: Option<u32>,

    #[serde(default, alias = "totalProducts", alias = "count")]
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireProductList {
    Paged {
        #[serde(alias = "data", alias = "items")]
        products: Vec<WireProduct>,
        #[serde(default)]
        pagination: WirePagination,
    },
    Bare(Vec<WireProduct>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireProductEnvelope {
    Wrapped {
        #[serde(alias = "data")]
        product: WireProduct,
    },
    Bare(WireProduct),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireCategoryList {
    Wrapped { categories: Vec<WireCategory> },
    Bare(Vec<WireCategory>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUser {
    #[serde(alias = "_id")]
    id: String,

    #[serde(default, alias = "nom")]
    name: String,

    email: String,

    #[serde(default)]
    role: Role,
}

#[derive(Debug, Deserialize)]
struct WireAuth {
    token: String,
    user: WireUser,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireOrder {
    #[serde(alias = "_id", alias = "orderId")]
    id: String,

    #[serde(default, alias = "orderNumber", alias = "numero")]
    number: Option<String>,

    #[serde(default, alias = "statut")]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireOrderEnvelope {
    Wrapped { order: WireOrder },
    Bare(WireOrder),
}

/// One page of the product listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPage {
    pub products: Vec<ProductSnapshot>,
    pub page: u32,
    pub pages: u32,
    pub total: Option<u64>,
}

impl ProductPage {
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.page >= self.pages || self.products.is_empty()
    }
}

/// Backend acknowledgement of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderConfirmation {
    pub id: String,
    pub number: Option<String>,
    pub status: Option<String>,
}

impl OrderConfirmation {
    /// Reference to show the shopper.
    #[must_use]
    pub fn reference(&self) -> &str {
        self.number.as_deref().unwrap_or(&self.id)
    }
}

/// Backend health report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    #[serde(default = "HealthStatus::default_status")]
    pub status: String,

    #[serde(default)]
    pub message: Option<String>,
}

impl HealthStatus {
    fn default_status() -> String {
        "ok".to_string()
    }
}

/// Product fields sent by the admin create and update endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,

    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_price: Option<Decimal>,

    pub promotion_active: bool,
    pub stock: u32,
    pub category: String,
    pub image: String,
    pub active: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProductDraft {
    /// Draft carrying every field of `product`, with prices in major units.
    ///
    /// # Errors
    ///
    /// Returns an error if a price cannot be expressed in `currency`.
    pub fn from_snapshot(
        product: &ProductSnapshot,
        currency: &'static Currency,
    ) -> Result<Self, PricingError> {
        Ok(Self {
            name: product.name.clone(),
            price: to_major(product.price, currency)?,
            original_price: product
                .original_price
                .map(|amount| to_major(amount, currency))
                .transpose()?,
            promotion_active: product.promotion_active,
            stock: product.stock,
            category: product.category.clone(),
            image: product.image_ref.clone(),
            active: product.active,
            brand: product.brand.clone(),
            description: product.description.clone(),
        })
    }
}

fn decode<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(ApiError::Decode)
}

fn snapshots(
    products: Vec<WireProduct>,
    currency: &'static Currency,
) -> Result<Vec<ProductSnapshot>, ApiError> {
    products
        .into_iter()
        .map(|product| product.into_snapshot(currency))
        .collect()
}

pub(crate) fn product_page(
    body: Value,
    currency: &'static Currency,
) -> Result<ProductPage, ApiError> {
    match decode::<WireProductList>(body)? {
        WireProductList::Paged {
            products,
            pagination,
        } => {
            let page = pagination.page.unwrap_or(1);

            Ok(ProductPage {
                products: snapshots(products, currency)?,
                page,
                pages: pagination.pages.unwrap_or(page),
                total: pagination.total,
            })
        }
        WireProductList::Bare(products) => {
            let total = u64::try_from(products.len()).ok();

            Ok(ProductPage {
                products: snapshots(products, currency)?,
                page: 1,
                pages: 1,
                total,
            })
        }
    }
}

pub(crate) fn product_list(
    body: Value,
    currency: &'static Currency,
) -> Result<Vec<ProductSnapshot>, ApiError> {
    product_page(body, currency).map(|page| page.products)
}

pub(crate) fn product(body: Value, currency: &'static Currency) -> Result<ProductSnapshot, ApiError> {
    match decode::<WireProductEnvelope>(body)? {
        WireProductEnvelope::Wrapped { product } | WireProductEnvelope::Bare(product) => {
            product.into_snapshot(currency)
        }
    }
}

pub(crate) fn categories(body: Value) -> Result<Vec<String>, ApiError> {
    let (WireCategoryList::Wrapped { categories } | WireCategoryList::Bare(categories)) =
        decode(body)?;

    Ok(categories.into_iter().map(WireCategory::into_name).collect())
}

pub(crate) fn session(body: Value) -> Result<AuthSession, ApiError> {
    let WireAuth { token, user } = decode(body)?;

    Ok(AuthSession {
        token,
        user: AuthUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        },
    })
}

pub(crate) fn order_confirmation(body: Value) -> Result<OrderConfirmation, ApiError> {
    let (WireOrderEnvelope::Wrapped { order } | WireOrderEnvelope::Bare(order)) = decode(body)?;

    Ok(OrderConfirmation {
        id: order.id,
        number: order.number,
        status: order.status,
    })
}

pub(crate) fn health(body: Value) -> Result<HealthStatus, ApiError> {
    if body.is_null() {
        return Ok(HealthStatus {
            status: HealthStatus::default_status(),
            message: None,
        });
    }

    decode(body)
}
