use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use catalog_core::{
    id_from_legacy_slug, page_window, retail_price, total_pages, MarkupTier, PageRequest,
    PageWindow, SortOrder,
};
use catalog_db::{DbError, ListingFilter, ProductPage, StorefrontProductRow};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

const PRODUCTS_PAGE_SIZE: i64 = 12;
const CATEGORY_PAGE_SIZE: i64 = 24;

#[derive(Debug, Deserialize)]
pub(super) struct ListingQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub query: Option<String>,
    pub orden: Option<String>,
}

impl ListingQuery {
    fn filter(self, default_limit: i64, excluded: &[String]) -> ListingFilter {
        ListingFilter {
            query: self.query.filter(|q| !q.trim().is_empty()),
            sort: SortOrder::parse(self.orden.as_deref()),
            page: PageRequest::new(self.page, self.limit, default_limit),
            excluded: excluded.to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ListingResponse {
    data: Vec<ProductItem>,
    meta: ListingMeta,
}

#[derive(Debug, Serialize)]
pub(super) struct ListingMeta {
    request_id: String,
    timestamp: DateTime<Utc>,
    page: i64,
    limit: i64,
    total: i64,
    total_pages: i64,
    pager: PageWindow,
    #[serde(skip_serializing_if = "Option::is_none")]
    category_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category_slug: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ProductItem {
    id: i64,
    supplier: String,
    external_id: i64,
    title: String,
    slug: String,
    sku: Option<String>,
    main_image: Option<String>,
    stock: Option<String>,
    amount_stock: Option<i32>,
    final_price: Decimal,
    cotizacion: Option<Decimal>,
    retail_price: Decimal,
    brand_name: Option<String>,
    category_name: Option<String>,
    category_slug: Option<String>,
}

impl ProductItem {
    fn from_row(row: StorefrontProductRow, tiers: &[MarkupTier]) -> Self {
        Self {
            retail_price: retail_price(row.final_price, row.cotizacion, tiers),
            id: row.id,
            supplier: row.supplier,
            external_id: row.external_id,
            title: row.title,
            slug: row.slug,
            sku: row.sku,
            main_image: row.main_image,
            stock: row.stock,
            amount_stock: row.amount_stock,
            final_price: row.final_price,
            cotizacion: row.cotizacion,
            brand_name: row.brand_name,
            category_name: row.category_name,
            category_slug: row.category_slug,
        }
    }
}

/// The category a listing is scoped to, echoed back in the listing meta.
#[derive(Debug, Default)]
struct ListingCategory {
    name: Option<String>,
    slug: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ProductDetail {
    id: i64,
    supplier: String,
    external_id: i64,
    title: String,
    slug: String,
    sku: Option<String>,
    main_image: Option<String>,
    main_image_exp: Option<String>,
    warranty: Option<String>,
    stock: Option<String>,
    amount_stock: Option<i32>,
    high_average: Option<Decimal>,
    width_average: Option<Decimal>,
    length_average: Option<Decimal>,
    weight_average: Option<Decimal>,
    price: Decimal,
    final_price: Decimal,
    iva: Decimal,
    cotizacion: Option<Decimal>,
    retail_price: Decimal,
    attributes: Option<serde_json::Value>,
    brand_name: Option<String>,
    category_name: Option<String>,
    category_slug: Option<String>,
    updated_at: DateTime<Utc>,
}

fn listing_response(
    request_id: String,
    page: PageRequest,
    result: ProductPage,
    tiers: &[MarkupTier],
    category: ListingCategory,
) -> ListingResponse {
    let pages = total_pages(result.total, page.limit);
    ListingResponse {
        data: result
            .rows
            .into_iter()
            .map(|row| ProductItem::from_row(row, tiers))
            .collect(),
        meta: ListingMeta {
            request_id,
            timestamp: Utc::now(),
            page: page.page,
            limit: page.limit,
            total: result.total,
            total_pages: pages,
            pager: page_window(page.page, pages),
            category_name: category.name,
            category_slug: category.slug,
        },
    }
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ListingResponse>, ApiError> {
    let filter = query.filter(PRODUCTS_PAGE_SIZE, &state.settings.excluded_categories);
    let result = catalog_db::list_storefront_products(&state.pool, &filter)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(listing_response(
        req_id.0,
        filter.page,
        result,
        &state.settings.markup_tiers,
        ListingCategory::default(),
    )))
}

/// Products of one category. A category listed in `category_excluded` answers
/// 404 `not_found`, the same as an unknown slug, rather than an empty page.
pub(super) async fn list_category_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ListingResponse>, ApiError> {
    let filter = query.filter(CATEGORY_PAGE_SIZE, &state.settings.category_excluded);
    let result = catalog_db::list_category_products(&state.pool, &slug, &filter)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(listing_response(
        req_id.0,
        filter.page,
        result.products,
        &state.settings.markup_tiers,
        ListingCategory {
            name: Some(result.category.name),
            slug: result.category.slug,
        },
    )))
}

/// Product detail by slug. A slug in the older `Title_-_{id}` form that
/// matches no row is resolved through its supplier id instead.
pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<ProductDetail>>, ApiError> {
    let row = match catalog_db::get_product_by_slug(&state.pool, &slug).await {
        Err(DbError::NotFound) => match id_from_legacy_slug(&slug) {
            Some(external_id) => {
                tracing::debug!(slug = %slug, external_id, "resolving legacy product slug");
                catalog_db::get_product_by_external_id(&state.pool, external_id).await
            }
            None => Err(DbError::NotFound),
        },
        other => other,
    }
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let retail = retail_price(row.final_price, row.cotizacion, &state.settings.markup_tiers);
    let data = ProductDetail {
        id: row.id,
        supplier: row.supplier,
        external_id: row.external_id,
        title: row.title,
        slug: row.slug,
        sku: row.sku,
        main_image: row.main_image,
        main_image_exp: row.main_image_exp,
        warranty: row.warranty,
        stock: row.stock,
        amount_stock: row.amount_stock,
        high_average: row.high_average,
        width_average: row.width_average,
        length_average: row.length_average,
        weight_average: row.weight_average,
        price: row.price,
        final_price: row.final_price,
        iva: row.iva,
        cotizacion: row.cotizacion,
        retail_price: retail,
        attributes: row.attributes,
        brand_name: row.brand_name,
        category_name: row.category_name,
        category_slug: row.category_slug,
        updated_at: row.updated_at,
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use catalog_core::default_markup_tiers;

    #[test]
    fn listing_query_normalizes_paging_and_blank_search() {
        let query = ListingQuery {
            page: Some(0),
            limit: None,
            query: Some("   ".to_string()),
            orden: Some("precio_desc".to_string()),
        };
        let filter = query.filter(CATEGORY_PAGE_SIZE, &["outlet".to_string()]);

        assert_eq!(filter.page, PageRequest { page: 1, limit: 24 });
        assert_eq!(filter.query, None);
        assert_eq!(filter.sort, SortOrder::PrecioDesc);
        assert_eq!(filter.excluded, vec!["outlet".to_string()]);
    }

    #[test]
    fn empty_page_has_no_pager_entries() {
        let response = listing_response(
            "req".to_string(),
            PageRequest { page: 1, limit: 12 },
            ProductPage {
                rows: Vec::new(),
                total: 0,
            },
            &default_markup_tiers(),
            ListingCategory::default(),
        );
        assert_eq!(response.meta.total_pages, 0);
        assert!(response.meta.pager.pages.is_empty());

        let json = serde_json::to_value(&response).expect("serialize");
        assert!(json["meta"].get("category_name").is_none());
    }

    fn row(final_price: Decimal, cotizacion: Option<Decimal>) -> StorefrontProductRow {
        StorefrontProductRow {
            id: 1,
            supplier: "elit".to_string(),
            external_id: 10,
            title: "Auricular".to_string(),
            slug: "auricular-10".to_string(),
            sku: None,
            main_image: None,
            main_image_exp: None,
            warranty: None,
            stock: Some("Alto".to_string()),
            amount_stock: Some(3),
            high_average: None,
            width_average: None,
            length_average: None,
            weight_average: None,
            price: final_price,
            final_price,
            iva: Decimal::ZERO,
            cotizacion,
            utility: None,
            attributes: None,
            brand_name: None,
            category_name: Some("Audio".to_string()),
            category_slug: Some("audio".to_string()),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn category_listing_carries_retail_prices_and_category() {
        let tiers = default_markup_tiers();
        let with_rate = row(Decimal::new(100, 0), Some(Decimal::new(1000, 0)));
        let expected = retail_price(with_rate.final_price, with_rate.cotizacion, &tiers);
        let response = listing_response(
            "req".to_string(),
            PageRequest { page: 1, limit: 24 },
            ProductPage {
                rows: vec![with_rate, row(Decimal::new(50, 0), None)],
                total: 2,
            },
            &tiers,
            ListingCategory {
                name: Some("Audio".to_string()),
                slug: Some("audio".to_string()),
            },
        );

        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["meta"]["category_name"], "Audio");
        assert_eq!(json["meta"]["category_slug"], "audio");
        assert_eq!(response.data[0].retail_price, expected);
        assert_eq!(response.data[0].cotizacion, Some(Decimal::new(1000, 0)));
        assert_eq!(
            response.data[1].retail_price,
            retail_price(Decimal::new(50, 0), None, &tiers)
        );
    }
}
