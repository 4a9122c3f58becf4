use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

use crate::api::ApiEnvelope;
use crate::catalog::CREATE_PRODUCT_SUCCESS_MESSAGE;
use crate::checkout::{CheckoutOutcome, CheckoutReceipt, CheckoutState, CHECKOUT_SUCCESS_MESSAGE};
use crate::domain::{CartCommand, Category, DomainEvent, Money, MoneyError, NewProduct, Product, ProductFilter, ProductId, ProductImage};
use crate::format::CartView;
use crate::terminal::error::AppError;
use crate::terminal::TerminalState;

type ApiResult<T> = Result<Json<ApiEnvelope<T>>, AppError>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category_id: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemRequest {
    #[validate(length(min = 1, message = "product_id is required"))]
    pub product_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct CheckoutStatus {
    pub state: CheckoutState,
    pub last_succeeded: Option<bool>,
    pub last_message: Option<String>,
}

fn log_events(events: Vec<DomainEvent>) {
    for event in events {
        debug!(?event, "domain event");
    }
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy", "service": "pos-storefront" }))
}

pub async fn list_categories(State(state): State<TerminalState>) -> ApiResult<Vec<Category>> {
    let categories = state.catalog.categories().await?;
    Ok(Json(ApiEnvelope::ok(categories)))
}

pub async fn list_products(State(state): State<TerminalState>, Query(q): Query<ProductQuery>) -> ApiResult<Vec<Product>> {
    let filter = ProductFilter::new(q.category_id.as_deref(), q.search.as_deref());
    let products = state.catalog.products(filter).await?;
    Ok(Json(ApiEnvelope::ok(products)))
}

pub async fn create_product(
    State(state): State<TerminalState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiEnvelope<Product>>), AppError> {
    let mut name = String::new();
    let mut price = String::new();
    let mut category_id = String::new();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| AppError::Validation(e.to_string()))? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "Name" => name = field.text().await.map_err(|e| AppError::Validation(e.to_string()))?,
            "Price" => price = field.text().await.map_err(|e| AppError::Validation(e.to_string()))?,
            "CategoryId" => category_id = field.text().await.map_err(|e| AppError::Validation(e.to_string()))?,
            "ImageUrl" => {
                let file_name = field.file_name().unwrap_or("image").to_string();
                let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();
                let bytes = field.bytes().await.map_err(|e| AppError::Validation(e.to_string()))?;
                if !bytes.is_empty() {
                    image = Some(ProductImage { file_name, content_type, bytes: bytes.to_vec() });
                }
            }
            other => debug!(field = other, "ignoring unknown form field"),
        }
    }

    let price: Money = price.parse().map_err(|e: MoneyError| AppError::Validation(e.to_string()))?;
    let product = NewProduct { name, price, category_id, image };
    let created = state.catalog.create_product(product).await?;
    Ok((StatusCode::CREATED, Json(ApiEnvelope::with_message(created, CREATE_PRODUCT_SUCCESS_MESSAGE))))
}

pub async fn get_cart(State(state): State<TerminalState>) -> ApiResult<CartView> {
    let cart = state.cart.lock().await;
    Ok(Json(ApiEnvelope::ok(CartView::from_cart(&cart, &state.formatter)?)))
}

async fn dispatch(state: &TerminalState, command: CartCommand) -> ApiResult<CartView> {
    let mut cart = state.cart.lock().await;
    let change = cart.apply(command);
    info!(?change, cart_id = %cart.id(), "cart updated");
    log_events(cart.take_events());
    Ok(Json(ApiEnvelope::ok(CartView::from_cart(&cart, &state.formatter)?)))
}

pub async fn add_item(State(state): State<TerminalState>, Json(req): Json<AddItemRequest>) -> ApiResult<CartView> {
    req.validate()?;
    let product = state
        .catalog
        .find_product(&req.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product '{}' is not in the loaded catalog", req.product_id)))?;
    dispatch(&state, CartCommand::Add(product)).await
}

pub async fn update_item(
    State(state): State<TerminalState>,
    Path(product_id): Path<String>,
    Json(req): Json<UpdateQuantityRequest>,
) -> ApiResult<CartView> {
    dispatch(&state, CartCommand::UpdateQuantity { product_id: ProductId::from(product_id), quantity: req.quantity }).await
}

pub async fn remove_item(State(state): State<TerminalState>, Path(product_id): Path<String>) -> ApiResult<CartView> {
    dispatch(&state, CartCommand::Remove { product_id: ProductId::from(product_id) }).await
}

pub async fn clear_cart(State(state): State<TerminalState>) -> ApiResult<CartView> {
    dispatch(&state, CartCommand::Clear).await
}

pub async fn checkout(State(state): State<TerminalState>) -> ApiResult<CheckoutReceipt> {
    let result = state.checkout.checkout(&state.cart).await;
    log_events(state.checkout.take_events());
    log_events(state.cart.lock().await.take_events());
    let receipt = result?;
    Ok(Json(ApiEnvelope::with_message(receipt, CHECKOUT_SUCCESS_MESSAGE)))
}

pub async fn checkout_status(State(state): State<TerminalState>) -> ApiResult<CheckoutStatus> {
    let (last_succeeded, last_message) = match state.checkout.last_outcome() {
        Some(CheckoutOutcome::Succeeded(_)) => (Some(true), Some(CHECKOUT_SUCCESS_MESSAGE.to_string())),
        Some(CheckoutOutcome::Failed { message }) => (Some(false), Some(message)),
        None => (None, None),
    };
    Ok(Json(ApiEnvelope::ok(CheckoutStatus { state: state.checkout.state(), last_succeeded, last_message })))
}
