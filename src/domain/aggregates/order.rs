//! Order submission projection

use serde::{Deserialize, Serialize};
use crate::domain::aggregates::cart::Cart;
use crate::domain::value_objects::{Money, MoneyError, ProductId, Quantity};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub price: Money,
}

/// Read-only snapshot of a cart at submission time.
///
/// Prices are the ones held by the cart lines, so later catalog changes do
/// not reach an order that is already on its way.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<OrderItemRequest>,
}

impl CheckoutRequest {
    pub fn from_cart(cart: &Cart) -> Self {
        let items = cart.items().iter().map(|i| OrderItemRequest {
            product_id: i.product.id.clone(), quantity: i.quantity, price: i.price(),
        }).collect();
        Self { items }
    }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn total(&self) -> Result<Money, MoneyError> {
        self.items.iter().try_fold(Money::ZERO, |acc, i| acc.checked_add(i.price.multiply(i.quantity)?))
    }
}
