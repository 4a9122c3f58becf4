//! Local HTTP command surface for the terminal UI.
//!
//! One session per process: a single cart, catalog cache and checkout
//! orchestrator. Every cart route maps to exactly one [`CartCommand`].
//!
//! [`CartCommand`]: crate::domain::CartCommand

pub mod error;
pub mod handlers;

use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;

use crate::api::{CatalogApi, HttpBackend, OrderApi};
use crate::catalog::CatalogCache;
use crate::checkout::CheckoutOrchestrator;
use crate::config::AppConfig;
use crate::domain::{Cart, SharedCart};
use crate::format::PriceFormatter;

pub use error::AppError;

#[derive(Clone, Debug)]
pub struct TerminalState {
    pub cart: SharedCart,
    pub catalog: Arc<CatalogCache>,
    pub checkout: Arc<CheckoutOrchestrator>,
    pub formatter: Arc<PriceFormatter>,
}

impl TerminalState {
    pub fn new(catalog: Arc<dyn CatalogApi>, orders: Arc<dyn OrderApi>, formatter: PriceFormatter) -> Self {
        Self {
            cart: Cart::shared(),
            catalog: Arc::new(CatalogCache::new(catalog)),
            checkout: Arc::new(CheckoutOrchestrator::new(orders)),
            formatter: Arc::new(formatter),
        }
    }

    /// Session backed by the HTTP collaborator described in `config`.
    pub fn from_config(config: &AppConfig) -> crate::Result<Self> {
        let backend = Arc::new(HttpBackend::new(&config.backend)?);
        let formatter = PriceFormatter::default().with_suffix(config.currency_suffix.clone());
        Ok(Self::new(backend.clone(), backend, formatter))
    }
}

pub fn router(state: TerminalState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/products", get(handlers::list_products).post(handlers::create_product))
        .route("/api/cart", get(handlers::get_cart).delete(handlers::clear_cart))
        .route("/api/cart/items", post(handlers::add_item))
        .route("/api/cart/items/:product_id", put(handlers::update_item).delete(handlers::remove_item))
        .route("/api/checkout", get(handlers::checkout_status).post(handlers::checkout))
        .with_state(state)
}
