//! Storefront domain: catalog data, the cart and the order projection.
pub mod aggregates;
pub mod events;
pub mod value_objects;

pub use aggregates::*;
pub use events::{CartEvent, CheckoutEvent, DomainEvent};
pub use value_objects::{Money, MoneyError, ProductId, Quantity};
