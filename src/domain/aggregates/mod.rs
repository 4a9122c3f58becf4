//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;

pub use product::{Category, NewProduct, Product, ProductFilter, ProductImage, ALL_CATEGORIES, PLACEHOLDER_IMAGE};
pub use order::{CheckoutRequest, OrderItemRequest};
pub use cart::{Cart, CartChange, CartCommand, CartError, LineItem, SharedCart};
