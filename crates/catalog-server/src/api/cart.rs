use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use catalog_core::{CartLine, CartStore, CartSummary, PaymentMethod};
use catalog_db::MAX_CART_QUANTITY;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AddItemBody {
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub(super) struct AddItemResult {
    session_id: String,
    product_id: i64,
    quantity: i32,
}

#[derive(Debug, Serialize)]
pub(super) struct CartItem {
    id: i64,
    product_id: i64,
    quantity: i32,
    title: String,
    slug: String,
    final_price: Decimal,
    stock: Option<String>,
    amount_stock: Option<i32>,
    main_image: Option<String>,
    brand_name: Option<String>,
    category_name: Option<String>,
    description: Option<String>,
    image_urls_thumb: Vec<String>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct CartView {
    session_id: String,
    items: Vec<CartItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QuoteBody {
    #[serde(default)]
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub selected_shipping: Decimal,
    pub payment: Option<String>,
}

pub(super) async fn add_item(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<String>,
    Json(body): Json<AddItemBody>,
) -> Result<Json<ApiResponse<AddItemResult>>, ApiError> {
    if !(1..=MAX_CART_QUANTITY).contains(&body.quantity) {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            format!(
                "quantity must be between 1 and {MAX_CART_QUANTITY}, got {}",
                body.quantity
            ),
        ));
    }

    let quantity =
        catalog_db::add_to_cart(&state.pool, &session_id, body.product_id, body.quantity)
            .await
            .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: AddItemResult {
            session_id,
            product_id: body.product_id,
            quantity,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_cart(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<CartView>>, ApiError> {
    let rows = catalog_db::get_cart(&state.pool, &session_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let items = rows
        .into_iter()
        .map(|row| CartItem {
            id: row.id,
            product_id: row.product_id,
            quantity: row.quantity,
            title: row.title,
            slug: row.slug,
            final_price: row.final_price,
            stock: row.stock,
            amount_stock: row.amount_stock,
            main_image: row.main_image,
            brand_name: row.brand_name,
            category_name: row.category_name,
            description: row.description,
            image_urls_thumb: row.image_urls_thumb.unwrap_or_default(),
            updated_at: row.updated_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data: CartView { session_id, items },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Totals for a client-held cart, using the storefront's discount and
/// free-shipping rules. Lines are bounded by [`catalog_core::CartLine::validate`]
/// so the arithmetic stays in range.
pub(super) async fn quote_cart(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<QuoteBody>,
) -> Result<Json<ApiResponse<CartSummary>>, ApiError> {
    let payment = body
        .payment
        .as_deref()
        .map(str::parse::<PaymentMethod>)
        .transpose()
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let store = CartStore::from_lines(
        body.items,
        body.selected_shipping,
        state.settings.cart_rules(),
    );
    store
        .validate()
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    Ok(Json(ApiResponse {
        data: store.summary(payment),
        meta: ResponseMeta::new(req_id.0),
    }))
}
