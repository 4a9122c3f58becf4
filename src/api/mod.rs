//! Backend collaborator contracts.
//!
//! The storefront core only talks to the commerce backend through these
//! traits. [`HttpBackend`] is the production implementation; tests use the
//! generated `Mock*` types.

pub mod envelope;
pub mod http;

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::domain::{Category, CheckoutRequest, NewProduct, Product, ProductFilter};

pub use envelope::{ApiEnvelope, ErrorEnvelope};
pub use http::HttpBackend;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response at all: connection refused, DNS, timeout.
    #[error("backend unreachable: {0}")]
    Transport(String),

    /// The backend answered with an error envelope or a non-2xx status.
    #[error("backend returned status {status}: {}", message.as_deref().unwrap_or("no message"))]
    Backend { status: u16, code: Option<i64>, message: Option<String> },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message supplied by the backend, if it sent a non-blank one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Backend { message: Some(m), .. } if !m.trim().is_empty() => Some(m.as_str()),
            _ => None,
        }
    }

    /// What to show the operator: the backend's own words, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.backend_message().unwrap_or(fallback).to_string()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() { Self::Decode(err.to_string()) } else { Self::Transport(err.to_string()) }
    }
}

/// Catalog reads and the product write.
#[automock]
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// All categories, in backend order.
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError>;

    /// Products matching `filter`; `None` fields are not sent.
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApiError>;

    /// Creates a product and returns it as stored by the backend.
    async fn create_product(&self, product: NewProduct) -> Result<Product, ApiError>;
}

/// Order submission.
#[automock]
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Submits an order and returns the backend's acknowledgement.
    async fn submit_order(&self, request: &CheckoutRequest) -> Result<bool, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_backend_text() {
        let err = ApiError::Backend { status: 400, code: Some(400), message: Some("out of stock".into()) };
        assert_eq!(err.user_message("Order creation failed!"), "out of stock");
    }

    #[test]
    fn test_user_message_falls_back() {
        let blank = ApiError::Backend { status: 500, code: None, message: Some("  ".into()) };
        assert_eq!(blank.user_message("fallback"), "fallback");
        let transport = ApiError::Transport("timed out".into());
        assert_eq!(transport.user_message("fallback"), "fallback");
    }
}
