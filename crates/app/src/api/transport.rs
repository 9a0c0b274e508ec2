//! HTTP transport.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::api::ApiError;

/// Header carrying the session token for backends using the custom convention.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// HTTP methods used by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

/// A request relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    #[must_use]
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path).with_body(body)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Attach a session token under both header conventions.
    #[must_use]
    pub fn with_session_token(self, token: &str) -> Self {
        self.with_header(AUTH_TOKEN_HEADER, token)
            .with_header("authorization", format!("Bearer {token}"))
    }

    /// Value of the first header named `name` (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A raw response: status and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON. An empty body decodes as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the body is not JSON.
    pub fn json(&self) -> Result<Value, ApiError> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&self.body).map_err(ApiError::Decode)
    }

    /// Human-readable error message carried by the body, if any.
    #[must_use]
    pub fn error_message(&self) -> String {
        serde_json::from_str::<Value>(&self.body)
            .ok()
            .and_then(|body| {
                ["message", "error", "msg"].iter().find_map(|field| {
                    body.get(field)
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
            })
            .unwrap_or_default()
    }
}

/// Failures below the HTTP layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(error.to_string())
        }
    }
}

#[automock]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one attempt of `request`.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// [`Transport`] over `reqwest` with a per-attempt timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base_url: String,
    http: Client,
}

impl ReqwestTransport {
    /// Create a transport for `base_url`, failing attempts that exceed `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self
            .http
            .request(request.method.into(), &url)
            .query(&request.query);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn session_token_uses_both_conventions() {
        let request = ApiRequest::get("/orders").with_session_token("abc");

        assert_eq!(request.header("X-Auth-Token"), Some("abc"));
        assert_eq!(request.header("Authorization"), Some("Bearer abc"));
    }

    #[test]
    fn empty_body_decodes_as_null() -> testresult::TestResult {
        assert_eq!(ApiResponse::new(204, "").json()?, Value::Null);

        Ok(())
    }

    #[test]
    fn error_message_prefers_message_field() {
        let body = json!({ "message": "Produit introuvable", "error": "NotFound" }).to_string();

        assert_eq!(ApiResponse::new(404, body).error_message(), "Produit introuvable");
        assert_eq!(ApiResponse::new(500, "<html>").error_message(), "");
    }

    #[test]
    fn query_values_are_stringified() {
        let request = ApiRequest::get("/products")
            .with_query("page", 2)
            .with_query("category", "Visage");

        assert_eq!(
            request.query,
            [
                ("page".to_string(), "2".to_string()),
                ("category".to_string(), "Visage".to_string())
            ]
        );
    }
}
