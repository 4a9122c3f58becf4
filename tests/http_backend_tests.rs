mod common;

use axum::extract::{Multipart, Query};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use common::{cart_with, init_test_tracing};
use pos_storefront::api::{ApiError, CatalogApi, HttpBackend, OrderApi};
use pos_storefront::config::BackendConfig;
use pos_storefront::domain::{CheckoutRequest, Money, NewProduct, ProductFilter, ProductImage};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use testresult::TestResult;
use tokio::net::TcpListener;

fn product_json(id: &str, name: &str, category_id: &str, price: u64) -> Value {
    json!({
        "id": id,
        "name": name,
        "price": price,
        "category_id": category_id,
        "category": { "id": category_id, "name": format!("Category {category_id}") },
        "image_url": ""
    })
}

async fn list_products(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let all = [("p1", "Green tea", "c1", 15000), ("p2", "Bread", "c2", 20000), ("p3", "Iced tea", "c2", 18000)];
    let data: Vec<Value> = all
        .iter()
        .filter(|(_, _, category, _)| params.get("categoryId").map_or(true, |c| c == category))
        .filter(|(_, name, _, _)| params.get("search").map_or(true, |s| name.to_lowercase().contains(&s.to_lowercase())))
        .map(|(id, name, category, price)| product_json(id, name, category, *price))
        .collect();
    Json(json!({ "code": 200, "message": "Success", "data": data }))
}

async fn create_product(headers: HeaderMap, mut multipart: Multipart) -> (StatusCode, Json<Value>) {
    let content_type = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or_default();
    if !content_type.starts_with("multipart/form-data") {
        return (StatusCode::UNSUPPORTED_MEDIA_TYPE, Json(json!({ "code": 415, "message": content_type, "data": null })));
    }
    let mut fields = HashMap::new();
    let mut image_len = 0;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "ImageUrl" {
            image_len = field.bytes().await.map(|b| b.len()).unwrap_or_default();
        } else {
            fields.insert(name, field.text().await.unwrap_or_default());
        }
    }
    let price: u64 = fields.get("Price").and_then(|p| p.parse().ok()).unwrap_or_default();
    let mut product = product_json("new", &fields["Name"], &fields["CategoryId"], price);
    product["image_url"] = json!(if image_len > 0 { format!("/uploads/{image_len}.png") } else { String::new() });
    (StatusCode::CREATED, Json(json!({ "code": 201, "message": "Created", "data": product })))
}

async fn submit_order(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["items"][0]["product_id"] == "oos" {
        return (StatusCode::BAD_REQUEST, Json(json!({ "code": 400, "message": "out of stock", "data": null })));
    }
    let ack = body["items"][0]["quantity"] == 2 && body["items"][0]["price"] == 10000;
    (StatusCode::OK, Json(json!({ "code": 200, "message": "Success", "data": ack })))
}

fn commerce_backend() -> Router {
    Router::new()
        .route(
            "/api/Category",
            get(|| async {
                Json(json!({ "code": 200, "message": "Success", "data": [
                    { "id": "c1", "name": "Drinks" },
                    { "id": "c2", "name": "Bakery" }
                ]}))
            }),
        )
        .route("/api/Product", get(list_products).post(create_product))
        .route("/api/Order", axum::routing::post(submit_order))
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test backend stopped");
    });
    format!("http://{addr}")
}

fn client(host: &str) -> HttpBackend {
    HttpBackend::new(&BackendConfig::new(host)).expect("http client")
}

#[tokio::test]
async fn base_url_is_rooted_at_api() {
    assert_eq!(client("http://pos.local:5000/").base_url(), "http://pos.local:5000/api/");
}

#[tokio::test]
async fn categories_are_unwrapped_from_the_envelope() -> TestResult {
    init_test_tracing();
    let backend = client(&serve(commerce_backend()).await);

    let categories = backend.list_categories().await?;

    assert_eq!(categories.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), ["Drinks", "Bakery"]);
    Ok(())
}

#[tokio::test]
async fn product_filter_is_sent_as_query_parameters() -> TestResult {
    let backend = client(&serve(commerce_backend()).await);

    let all = backend.list_products(&ProductFilter::all()).await?;
    let bakery = backend.list_products(&ProductFilter::new(Some("c2"), None)).await?;
    let tea_in_c2 = backend.list_products(&ProductFilter::new(Some("c2"), Some("tea"))).await?;

    assert_eq!(all.len(), 3);
    assert_eq!(bakery.len(), 2);
    assert_eq!(tea_in_c2.len(), 1);
    assert_eq!(tea_in_c2[0].name, "Iced tea");
    assert_eq!(tea_in_c2[0].price, Money::from_minor(18000));
    assert_eq!(tea_in_c2[0].image_or_placeholder(), "/placeholder.svg");
    Ok(())
}

#[tokio::test]
async fn product_is_created_with_a_multipart_form() -> TestResult {
    let backend = client(&serve(commerce_backend()).await);
    let product = NewProduct {
        name: "Croissant".to_string(),
        price: Money::from_minor(25000),
        category_id: "c2".to_string(),
        image: Some(ProductImage {
            file_name: "croissant.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }),
    };

    let created = backend.create_product(product).await?;

    assert_eq!(created.name, "Croissant");
    assert_eq!(created.category_id, "c2");
    assert_eq!(created.price, Money::from_minor(25000));
    assert_eq!(created.image_url, "/uploads/4.png");
    Ok(())
}

#[tokio::test]
async fn order_is_posted_as_json_and_acknowledged() -> TestResult {
    let backend = client(&serve(commerce_backend()).await);
    let cart = cart_with(&[("A", 10000, 2), ("B", 5000, 1)]).await;
    let request = CheckoutRequest::from_cart(&*cart.lock().await);

    assert!(backend.submit_order(&request).await?);
    Ok(())
}

#[tokio::test]
async fn requests_declare_json_content_type() -> TestResult {
    let router = Router::new().route(
        "/api/Category",
        get(|headers: HeaderMap| async move {
            let content_type = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or_default();
            let accept = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()).unwrap_or_default();
            Json(json!({ "code": 200, "message": "Success", "data": [
                { "id": content_type, "name": accept }
            ]}))
        }),
    );
    let backend = client(&serve(router).await);

    let categories = backend.list_categories().await?;

    assert_eq!(categories[0].id, "application/json");
    assert_eq!(categories[0].name, "application/json");
    Ok(())
}

#[tokio::test]
async fn error_envelope_becomes_backend_error() -> TestResult {
    let backend = client(&serve(commerce_backend()).await);
    let cart = cart_with(&[("oos", 10000, 1)]).await;
    let request = CheckoutRequest::from_cart(&*cart.lock().await);

    let err = backend.submit_order(&request).await.unwrap_err();

    assert_eq!(err, ApiError::Backend { status: 400, code: Some(400), message: Some("out of stock".to_string()) });
    assert_eq!(err.user_message("Order creation failed!"), "out of stock");
    Ok(())
}

#[tokio::test]
async fn bare_error_status_has_no_backend_message() {
    let router = Router::new().route("/api/Category", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }));
    let backend = client(&serve(router).await);

    let err = backend.list_categories().await.unwrap_err();

    assert_eq!(err, ApiError::Backend { status: 500, code: None, message: None });
    assert_eq!(err.user_message("Failed to load the catalog."), "Failed to load the catalog.");
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let router = Router::new().route("/api/Category", get(|| async { Json(json!({ "unexpected": true })) }));
    let backend = client(&serve(router).await);

    let err = backend.list_categories().await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn slow_backend_times_out_as_transport_error() {
    let router = Router::new().route(
        "/api/Category",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "code": 200, "message": "Success", "data": [] }))
        }),
    );
    let host = serve(router).await;
    let config = BackendConfig { timeout: Duration::from_millis(200), ..BackendConfig::new(host) };
    let backend = HttpBackend::new(&config).expect("http client");

    let err = backend.list_categories().await.unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    let backend = client(&format!("http://{addr}"));

    let err = backend.list_categories().await.unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
    assert_eq!(err.user_message("Failed to load the catalog."), "Failed to load the catalog.");
}
