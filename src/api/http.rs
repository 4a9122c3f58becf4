//! HTTP client for the commerce backend.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::api::{ApiEnvelope, ApiError, CatalogApi, ErrorEnvelope, OrderApi};
use crate::config::BackendConfig;
use crate::domain::{Category, CheckoutRequest, NewProduct, Product, ProductFilter};

#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    http: Client,
}

impl HttpBackend {
    /// Builds a client rooted at `{api_host}/api/` with the configured timeout.
    /// Requests default to JSON; a multipart body sets its own content type.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the TLS backend cannot be initialised.
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { base_url: config.base_url(), http })
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }

    async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let envelope: ErrorEnvelope = serde_json::from_slice(&body).unwrap_or_default();
            warn!(status = status.as_u16(), code = ?envelope.code, message = ?envelope.message, "backend rejected request");
            return Err(ApiError::Backend { status: status.as_u16(), code: envelope.code, message: envelope.message });
        }

        let envelope: ApiEnvelope<T> =
            serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
        debug!(code = envelope.code, message = %envelope.message, "backend response");
        Ok(envelope.data)
    }
}

#[async_trait]
impl CatalogApi for HttpBackend {
    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let response = self.http.get(self.url("Category")).send().await?;
        Self::read(response).await
    }

    #[instrument(skip(self))]
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApiError> {
        let response = self.http.get(self.url("Product")).query(filter).send().await?;
        Self::read(response).await
    }

    #[instrument(skip(self, product), fields(name = %product.name, category_id = %product.category_id))]
    async fn create_product(&self, product: NewProduct) -> Result<Product, ApiError> {
        let mut form = Form::new()
            .text("Name", product.name)
            .text("Price", product.price.to_string())
            .text("CategoryId", product.category_id);

        if let Some(image) = product.image {
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.content_type)?;
            form = form.part("ImageUrl", part);
        }

        let response = self.http.post(self.url("Product")).multipart(form).send().await?;
        Self::read(response).await
    }
}

#[async_trait]
impl OrderApi for HttpBackend {
    #[instrument(skip(self, request), fields(lines = request.items.len()))]
    async fn submit_order(&self, request: &CheckoutRequest) -> Result<bool, ApiError> {
        let response = self.http.post(self.url("Order")).json(request).send().await?;
        Self::read(response).await
    }
}
