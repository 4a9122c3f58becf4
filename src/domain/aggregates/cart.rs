//! Cart Aggregate
//!
//! The order being assembled at the terminal. Lines keep the order in which
//! products were first added, each product appears at most once, and every
//! stored quantity is at least one. The total is derived on every read.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;
use crate::domain::aggregates::product::Product;
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::{Money, MoneyError, ProductId, Quantity};

/// Cart handle shared between the command surface and the checkout.
pub type SharedCart = Arc<Mutex<Cart>>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LineItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: Quantity,
}

impl LineItem {
    pub fn product_id(&self) -> &ProductId { &self.product.id }

    /// Unit price captured when the product was first added.
    pub fn price(&self) -> Money { self.product.price }

    pub fn line_total(&self) -> Result<Money, MoneyError> { self.product.price.multiply(self.quantity) }
}

/// One user action against the cart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CartCommand {
    Add(Product),
    UpdateQuantity { product_id: ProductId, quantity: i64 },
    Remove { product_id: ProductId },
    Clear,
}

/// What a mutation actually did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CartChange {
    Added { quantity: Quantity },
    Updated { quantity: Quantity },
    Removed,
    Cleared,
    Unchanged,
}

#[derive(Clone, Debug)]
pub struct Cart {
    id: Uuid,
    items: Vec<LineItem>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

impl Default for Cart {
    fn default() -> Self { Self::new() }
}

impl Cart {
    pub fn new() -> Self {
        let now = Utc::now();
        Self { id: Uuid::new_v4(), items: vec![], created_at: now, updated_at: now, events: vec![] }
    }

    pub fn shared() -> SharedCart { Arc::new(Mutex::new(Self::new())) }

    pub fn id(&self) -> Uuid { self.id }
    pub fn items(&self) -> &[LineItem] { &self.items }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    pub fn unit_count(&self) -> u64 { self.items.iter().map(|i| u64::from(i.quantity.value())).sum() }

    pub fn get(&self, product_id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.product.id == *product_id)
    }

    /// Adds one unit of `product`.
    ///
    /// A product already in the cart has its quantity bumped and keeps the
    /// price it was first added at; otherwise a new line is appended.
    pub fn add(&mut self, product: Product) -> Quantity {
        let product_id = product.id.clone();
        let quantity = match self.items.iter_mut().find(|i| i.product.id == product.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.increment();
                existing.quantity
            }
            None => {
                self.items.push(LineItem { product, quantity: Quantity::ONE });
                Quantity::ONE
            }
        };
        self.raise_event(CartEvent::ItemAdded { product_id, quantity });
        self.touch();
        quantity
    }

    /// Sets an absolute quantity. Zero or less removes the line; an unknown
    /// product id leaves the cart alone.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CartChange {
        let Some(quantity) = Quantity::from_requested(quantity) else {
            return if self.remove(product_id) { CartChange::Removed } else { CartChange::Unchanged };
        };
        let Some(item) = self.items.iter_mut().find(|i| i.product.id == *product_id) else {
            return CartChange::Unchanged;
        };
        item.quantity = quantity;
        let product_id = item.product.id.clone();
        self.raise_event(CartEvent::QuantityChanged { product_id, quantity });
        self.touch();
        CartChange::Updated { quantity }
    }

    pub fn remove(&mut self, product_id: &str) -> bool {
        let Some(pos) = self.items.iter().position(|i| i.product.id == *product_id) else { return false };
        let removed = self.items.remove(pos);
        self.raise_event(CartEvent::ItemRemoved { product_id: removed.product.id });
        self.touch();
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.raise_event(CartEvent::Cleared { cart_id: self.id });
        self.touch();
    }

    /// Σ price × quantity over the current lines.
    pub fn total(&self) -> Result<Money, CartError> {
        self.items.iter().try_fold(Money::ZERO, |acc, i| {
            let line = i.line_total()?;
            Ok(acc.checked_add(line)?)
        })
    }

    pub fn apply(&mut self, command: CartCommand) -> CartChange {
        match command {
            CartCommand::Add(product) => CartChange::Added { quantity: self.add(product) },
            CartCommand::UpdateQuantity { product_id, quantity } => self.update_quantity(product_id.as_str(), quantity),
            CartCommand::Remove { product_id } => {
                if self.remove(product_id.as_str()) { CartChange::Removed } else { CartChange::Unchanged }
            }
            CartCommand::Clear => { self.clear(); CartChange::Cleared }
        }
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: CartEvent) { self.events.push(DomainEvent::Cart(e)); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("cart total cannot be computed: {0}")]
    Total(#[from] MoneyError),
}
