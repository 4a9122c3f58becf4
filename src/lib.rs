//! POS Storefront
//!
//! Order-aggregation core for a point-of-sale terminal.
//!
//! ## Features
//! - Catalog cache over the backend's category and product reads
//! - Cart store with merge-on-add and quantity invariants
//! - Checkout orchestration with cart-preserving failure recovery
//! - Price and cart formatting for display
//! - A local HTTP command surface for the terminal UI

pub mod api;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod domain;
pub mod format;
pub mod terminal;

use thiserror::Error;

pub use api::{ApiError, CatalogApi, HttpBackend, OrderApi};
pub use catalog::{CatalogCache, CatalogError};
pub use checkout::{CheckoutError, CheckoutOrchestrator, CheckoutOutcome, CheckoutReceipt, CheckoutState};
pub use config::{AppConfig, BackendConfig, ConfigError};
pub use domain::{Cart, CartCommand, Category, LineItem, Money, Product, ProductFilter, Quantity};
pub use format::{format_price, CartView, PriceFormatter};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Cart error: {0}")]
    Cart(#[from] domain::CartError),

    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
