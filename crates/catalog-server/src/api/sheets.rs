use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use catalog_core::Supplier;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct SheetItem {
    product_id: i64,
    description: Option<String>,
    image_urls_hd: Vec<String>,
    image_urls_thumb: Vec<String>,
    original_images: serde_json::Value,
    attributes: serde_json::Value,
    updated_at: DateTime<Utc>,
}

pub(super) async fn get_sheet(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((supplier, external_id)): Path<(String, i64)>,
) -> Result<Json<ApiResponse<SheetItem>>, ApiError> {
    let supplier: Supplier = supplier
        .parse()
        .map_err(|e: catalog_core::CoreError| {
            ApiError::new(req_id.0.clone(), "bad_request", e.to_string())
        })?;

    let row = catalog_db::get_sheet_by_external_id(&state.pool, supplier, external_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("no sheet for {supplier} product {external_id}"),
            )
        })?;

    Ok(Json(ApiResponse {
        data: SheetItem {
            product_id: row.product_id,
            description: row.description,
            image_urls_hd: row.image_urls_hd,
            image_urls_thumb: row.image_urls_thumb,
            original_images: row.original_images,
            attributes: row.attributes,
            updated_at: row.updated_at,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
