//! Storefront endpoints.

use async_trait::async_trait;
use apotheca::{orders::OrderRequest, products::ProductSnapshot};
use mockall::automock;
use rusty_money::iso::Currency;
use serde::Serialize;

use crate::{
    api::{
        ApiClient, ApiError, ApiRequest, HealthStatus, OrderConfirmation, ProductDraft,
        ProductPage, wire,
    },
    auth::{AuthSession, LoginRequest, RegisterRequest},
};

/// Listing filters for `GET /products`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub promotion: Option<bool>,
    pub page: u32,
    pub limit: u32,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            promotion: None,
            page: 1,
            limit: 20,
        }
    }
}

impl ProductQuery {
    /// Query for page `page` of `limit` products, unfiltered.
    #[must_use]
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            ..Self::default()
        }
    }

    fn apply(&self, mut request: ApiRequest) -> ApiRequest {
        if let Some(category) = &self.category {
            request = request.with_query("category", category);
        }

        if let Some(search) = &self.search {
            request = request.with_query("search", search);
        }

        if let Some(promotion) = self.promotion {
            request = request.with_query("promotion", promotion);
        }

        request
            .with_query("page", self.page)
            .with_query("limit", self.limit)
    }
}

#[automock]
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    /// Exchange credentials for a session.
    async fn login(&self, credentials: &LoginRequest) -> Result<AuthSession, ApiError>;

    /// Create an account and return its session.
    async fn register(&self, details: &RegisterRequest) -> Result<AuthSession, ApiError>;

    /// One page of active products.
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError>;

    async fn get_product(&self, id: &str) -> Result<ProductSnapshot, ApiError>;

    async fn featured_products(&self) -> Result<Vec<ProductSnapshot>, ApiError>;

    async fn promotions(&self) -> Result<Vec<ProductSnapshot>, ApiError>;

    async fn categories(&self) -> Result<Vec<String>, ApiError>;

    /// Place an order.
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, ApiError>;

    async fn health(&self) -> Result<HealthStatus, ApiError>;

    /// Admin: create a product.
    async fn create_product(&self, draft: &ProductDraft) -> Result<ProductSnapshot, ApiError>;

    /// Admin: replace a product's fields.
    async fn update_product(
        &self,
        id: &str,
        draft: &ProductDraft,
    ) -> Result<ProductSnapshot, ApiError>;

    /// Admin: delete a product.
    async fn delete_product(&self, id: &str) -> Result<(), ApiError>;
}

/// [`StorefrontApi`] over the retrying [`ApiClient`].
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    client: ApiClient,
    currency: &'static Currency,
}

impl StorefrontClient {
    #[must_use]
    pub fn new(client: ApiClient, currency: &'static Currency) -> Self {
        Self { client, currency }
    }

    fn require_admin(&self) -> Result<(), ApiError> {
        if self.client.sessions().is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(ApiError::Encode)
}

fn product_path(id: &str) -> String {
    format!("/products/{id}")
}

#[async_trait]
impl StorefrontApi for StorefrontClient {
    async fn login(&self, credentials: &LoginRequest) -> Result<AuthSession, ApiError> {
        let body = self
            .client
            .call_anonymous(ApiRequest::post("/auth/login", encode(credentials)?))
            .await?;

        wire::session(body)
    }

    async fn register(&self, details: &RegisterRequest) -> Result<AuthSession, ApiError> {
        let body = self
            .client
            .call_anonymous(ApiRequest::post("/auth/register", encode(details)?))
            .await?;

        wire::session(body)
    }

    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let body = self
            .client
            .call(query.apply(ApiRequest::get("/products")))
            .await?;

        wire::product_page(body, self.currency)
    }

    async fn get_product(&self, id: &str) -> Result<ProductSnapshot, ApiError> {
        let body = self.client.call(ApiRequest::get(product_path(id))).await?;

        wire::product(body, self.currency)
    }

    async fn featured_products(&self) -> Result<Vec<ProductSnapshot>, ApiError> {
        let body = self
            .client
            .call(ApiRequest::get("/products/featured/all"))
            .await?;

        wire::product_list(body, self.currency)
    }

    async fn promotions(&self) -> Result<Vec<ProductSnapshot>, ApiError> {
        let body = self
            .client
            .call(ApiRequest::get("/products/promotions/all"))
            .await?;

        wire::product_list(body, self.currency)
    }

    async fn categories(&self) -> Result<Vec<String>, ApiError> {
        let body = self
            .client
            .call(ApiRequest::get("/products/categories/all"))
            .await?;

        wire::categories(body)
    }

    async fn create_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, ApiError> {
        let body = self
            .client
            .call(ApiRequest::post("/orders", encode(order)?))
            .await?;

        wire::order_confirmation(body)
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let body = self.client.call(ApiRequest::get("/health")).await?;

        wire::health(body)
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<ProductSnapshot, ApiError> {
        self.require_admin()?;

        let body = self
            .client
            .call(ApiRequest::post("/products", encode(draft)?))
            .await?;

        wire::product(body, self.currency)
    }

    async fn update_product(
        &self,
        id: &str,
        draft: &ProductDraft,
    ) -> Result<ProductSnapshot, ApiError> {
        self.require_admin()?;

        let body = self
            .client
            .call(ApiRequest::put(product_path(id), encode(draft)?))
            .await?;

        wire::product(body, self.currency)
    }

    async fn delete_product(&self, id: &str) -> Result<(), ApiError> {
        self.require_admin()?;

        self.client
            .call(ApiRequest::delete(product_path(id)))
            .await
            .map(drop)
    }
}
