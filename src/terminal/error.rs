use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::api::ApiEnvelope;
use crate::catalog::CatalogError;
use crate::checkout::CheckoutError;
use crate::domain::CartError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self { AppError::Validation(err.to_string()) }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Catalog(CatalogError::Invalid(_)) => StatusCode::BAD_REQUEST,
            AppError::Catalog(_) => StatusCode::BAD_GATEWAY,
            AppError::Cart(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Checkout(e) => match e {
                CheckoutError::EmptyCart => StatusCode::BAD_REQUEST,
                CheckoutError::Total(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutError::InProgress => StatusCode::CONFLICT,
                CheckoutError::Submission { .. } => StatusCode::BAD_GATEWAY,
            },
        }
    }

    /// Text for the operator's notification.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Catalog(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(application_error = %self, "Responding with error");
        } else {
            tracing::warn!(application_error = %self, "Rejecting request");
        }
        let body = ApiEnvelope { code: i64::from(status.as_u16()), message: self.user_message(), data: None::<()> };
        (status, Json(body)).into_response()
    }
}
