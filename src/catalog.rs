//! Catalog cache.
//!
//! Read-through cache over the catalog collaborator. Product lists are keyed
//! by [`ProductFilter`]; every fetch takes a sequence number and a response
//! is only stored if it is newer than what the key already holds. The
//! visible list follows the most recently *requested* filter, so a slow
//! answer for a filter the operator has moved away from never replaces the
//! list they are looking at. Concurrent reads of the same key share one
//! backend fetch.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use validator::{Validate, ValidationErrors};

use crate::api::{ApiError, CatalogApi};
use crate::domain::{Category, NewProduct, Product, ProductFilter};

pub const CATALOG_FAILURE_MESSAGE: &str = "Failed to load the catalog.";
pub const CREATE_PRODUCT_FAILURE_MESSAGE: &str = "Failed to add product.";
pub const CREATE_PRODUCT_SUCCESS_MESSAGE: &str = "Product added successfully!";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to load categories: {0}")]
    Categories(#[source] ApiError),
    #[error("failed to load products: {0}")]
    Products(#[source] ApiError),
    #[error("invalid product: {0}")]
    Invalid(#[from] ValidationErrors),
    #[error("failed to create product: {0}")]
    Create(#[source] ApiError),
}

impl CatalogError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Categories(e) | Self::Products(e) => e.user_message(CATALOG_FAILURE_MESSAGE),
            Self::Create(e) => e.user_message(CREATE_PRODUCT_FAILURE_MESSAGE),
            Self::Invalid(e) => e.to_string(),
        }
    }
}

#[derive(Debug)]
struct ProductEntry {
    seq: u64,
    products: Vec<Product>,
    stale: bool,
}

type FetchResult = Result<Vec<Product>, ApiError>;

/// A product read that has been issued but has not answered yet.
#[derive(Debug)]
struct InFlight {
    seq: u64,
    result: watch::Receiver<Option<FetchResult>>,
}

enum Plan {
    Cached(Vec<Product>),
    Join(watch::Receiver<Option<FetchResult>>),
    Fetch(u64, watch::Sender<Option<FetchResult>>),
}

#[derive(Debug, Default)]
struct CatalogState {
    categories: Option<Vec<Category>>,
    entries: HashMap<ProductFilter, ProductEntry>,
    in_flight: HashMap<ProductFilter, InFlight>,
    next_seq: u64,
    // Fetches issued at or before this sequence started before the last
    // product write and may not include it.
    invalidated_at: u64,
    active: ProductFilter,
    visible: Vec<Product>,
}

impl CatalogState {
    fn issue(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Activates `filter` and decides how to answer it: from a fresh entry,
    /// by waiting on a fetch that is already running, or with a new fetch.
    fn plan(&mut self, filter: &ProductFilter) -> Plan {
        self.active = filter.clone();
        if let Some(entry) = self.entries.get(filter).filter(|e| !e.stale) {
            let products = entry.products.clone();
            self.visible = products.clone();
            debug!(count = products.len(), "product list served from cache");
            return Plan::Cached(products);
        }
        // A fetch issued before the last invalidation, or one whose caller
        // went away, cannot be shared.
        if let Some(flight) = self.in_flight.get(filter) {
            if flight.seq > self.invalidated_at && flight.result.has_changed().is_ok() {
                debug!(seq = flight.seq, "joining in-flight product fetch");
                return Plan::Join(flight.result.clone());
            }
        }
        let seq = self.issue();
        let (tx, rx) = watch::channel(None);
        self.in_flight.insert(filter.clone(), InFlight { seq, result: rx });
        Plan::Fetch(seq, tx)
    }

    fn store(&mut self, filter: ProductFilter, seq: u64, products: Vec<Product>) {
        if self.entries.get(&filter).is_some_and(|e| e.seq >= seq) {
            debug!(?filter, seq, "discarding out-of-date product response");
            return;
        }
        if filter == self.active {
            self.visible = products.clone();
        }
        let stale = seq <= self.invalidated_at;
        self.entries.insert(filter, ProductEntry { seq, products, stale });
    }
}

pub struct CatalogCache {
    api: Arc<dyn CatalogApi>,
    state: Mutex<CatalogState>,
}

impl std::fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCache").field("state", &*self.state.lock()).finish_non_exhaustive()
    }
}

impl CatalogCache {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self { api, state: Mutex::new(CatalogState::default()) }
    }

    /// Categories, fetched on first use and served from memory afterwards.
    pub async fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        let cached = self.state.lock().categories.clone();
        if let Some(categories) = cached {
            return Ok(categories);
        }
        self.refresh_categories().await
    }

    #[instrument(skip(self))]
    pub async fn refresh_categories(&self) -> Result<Vec<Category>, CatalogError> {
        match self.api.list_categories().await {
            Ok(categories) => {
                info!(count = categories.len(), "categories loaded");
                self.state.lock().categories = Some(categories.clone());
                Ok(categories)
            }
            Err(e) => {
                warn!(error = %e, "category fetch failed; keeping previous list");
                Err(CatalogError::Categories(e))
            }
        }
    }

    /// Products for `filter`.
    ///
    /// Makes `filter` the active one. A fresh cached list is returned without
    /// contacting the backend; a read already running for the same key is
    /// awaited rather than repeated; otherwise the list is fetched and, while
    /// that is in flight, [`visible_products`](Self::visible_products) keeps
    /// returning the previous list.
    #[instrument(skip(self))]
    pub async fn products(&self, filter: ProductFilter) -> Result<Vec<Product>, CatalogError> {
        let filter = filter.normalized();
        loop {
            let plan = self.state.lock().plan(&filter);
            match plan {
                Plan::Cached(products) => return Ok(products),
                Plan::Join(mut result) => {
                    let shared = result.wait_for(Option::is_some).await.ok().and_then(|r| (*r).clone());
                    match shared {
                        Some(result) => return result.map_err(CatalogError::Products),
                        // The fetch was abandoned before answering; plan again.
                        None => continue,
                    }
                }
                Plan::Fetch(seq, done) => return self.fetch_products(filter, seq, done).await,
            }
        }
    }

    async fn fetch_products(
        &self,
        filter: ProductFilter,
        seq: u64,
        done: watch::Sender<Option<FetchResult>>,
    ) -> Result<Vec<Product>, CatalogError> {
        let result = self.api.list_products(&filter).await;
        {
            let mut state = self.state.lock();
            if state.in_flight.get(&filter).is_some_and(|f| f.seq == seq) {
                state.in_flight.remove(&filter);
            }
            match &result {
                Ok(products) => {
                    info!(seq, count = products.len(), "products loaded");
                    state.store(filter, seq, products.clone());
                }
                Err(e) => warn!(seq, error = %e, "product fetch failed; keeping previous list"),
            }
        }
        done.send_replace(Some(result.clone()));
        result.map_err(CatalogError::Products)
    }

    /// Latest successful list for the active filter (or the previous one
    /// while its fetch is in flight).
    pub fn visible_products(&self) -> Vec<Product> { self.state.lock().visible.clone() }

    pub fn active_filter(&self) -> ProductFilter { self.state.lock().active.clone() }

    /// Marks every cached product list stale; the next read goes to the backend.
    pub fn invalidate_products(&self) {
        let mut state = self.state.lock();
        let at = state.next_seq;
        state.invalidated_at = at;
        for entry in state.entries.values_mut() {
            entry.stale = true;
        }
        debug!(at = state.invalidated_at, "product lists invalidated");
    }

    /// Creates a product through the write collaborator and invalidates the
    /// product lists. The new product only shows up through a fresh read.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        product.validate()?;
        let created = self.api.create_product(product).await.map_err(|e| {
            warn!(error = %e, "product creation failed");
            CatalogError::Create(e)
        })?;
        info!(product_id = %created.id, "product created");
        self.invalidate_products();
        Ok(created)
    }

    /// Looks a product up in the visible list, then in any cached list.
    pub fn find_product(&self, product_id: &str) -> Option<Product> {
        let state = self.state.lock();
        state.visible.iter()
            .chain(state.entries.values().flat_map(|e| e.products.iter()))
            .find(|p| p.id == *product_id)
            .cloned()
    }
}
