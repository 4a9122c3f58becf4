//! Domain events
use crate::domain::value_objects::{Money, ProductId, Quantity};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomainEvent {
    Cart(CartEvent),
    Checkout(CheckoutEvent),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CartEvent {
    ItemAdded { product_id: ProductId, quantity: Quantity },
    QuantityChanged { product_id: ProductId, quantity: Quantity },
    ItemRemoved { product_id: ProductId },
    Cleared { cart_id: Uuid },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutEvent {
    Submitted { cart_id: Uuid, lines: usize, total: Money },
    Succeeded { cart_id: Uuid },
    Failed { cart_id: Uuid, message: String },
}
