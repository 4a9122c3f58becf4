#![allow(dead_code)]

use pos_storefront::domain::{Cart, Category, Money, Product, ProductId, SharedCart};
use tracing_subscriber::EnvFilter;

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

pub fn category(id: &str) -> Category {
    Category { id: id.to_string(), name: format!("Category {id}") }
}

pub fn product(id: &str, price: u64) -> Product {
    Product {
        id: ProductId::from(id),
        name: format!("Product {id}"),
        price: Money::from_minor(price),
        category_id: "c1".to_string(),
        category: category("c1"),
        image_url: format!("/images/{id}.png"),
    }
}

pub fn ids(products: &[Product]) -> Vec<String> {
    products.iter().map(|p| p.id.to_string()).collect()
}

pub async fn cart_with(lines: &[(&str, u64, i64)]) -> SharedCart {
    let cart = Cart::shared();
    {
        let mut guard = cart.lock().await;
        for (id, price, quantity) in lines {
            guard.add(product(id, *price));
            guard.update_quantity(id, *quantity);
        }
        guard.take_events();
    }
    cart
}
