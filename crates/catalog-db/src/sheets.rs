//! Database operations for `product_sheets`.

use catalog_core::{NormalizedSheet, Supplier};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `product_sheets` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductSheetRow {
    pub id: i64,
    pub product_id: i64,
    pub description: Option<String>,
    /// JSON array of `{url, checksum, order}` objects.
    pub original_images: serde_json::Value,
    pub image_urls_hd: Vec<String>,
    pub image_urls_thumb: Vec<String>,
    /// JSON object of attribute name to value.
    pub attributes: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductSheetRow {
    #[must_use]
    pub fn has_images(&self) -> bool {
        !self.image_urls_hd.is_empty() || !self.image_urls_thumb.is_empty()
    }
}

/// Inserts or replaces the sheet of `product_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails (including an unknown
/// `product_id`).
pub async fn upsert_sheet(
    pool: &PgPool,
    product_id: i64,
    sheet: &NormalizedSheet,
) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO product_sheets \
             (product_id, description, original_images, image_urls_hd, image_urls_thumb, attributes) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (product_id) DO UPDATE SET \
             description      = EXCLUDED.description, \
             original_images  = EXCLUDED.original_images, \
             image_urls_hd    = EXCLUDED.image_urls_hd, \
             image_urls_thumb = EXCLUDED.image_urls_thumb, \
             attributes       = EXCLUDED.attributes, \
             updated_at       = NOW() \
         RETURNING id",
    )
    .bind(product_id)
    .bind(&sheet.description)
    .bind(Json(&sheet.original_images))
    .bind(&sheet.image_urls_hd)
    .bind(&sheet.image_urls_thumb)
    .bind(Json(&sheet.attributes))
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Looks up a sheet through its product's supplier id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_sheet_by_external_id(
    pool: &PgPool,
    supplier: Supplier,
    external_id: i64,
) -> Result<Option<ProductSheetRow>, DbError> {
    let row = sqlx::query_as::<_, ProductSheetRow>(
        "SELECT s.id, s.product_id, s.description, s.original_images, s.image_urls_hd, \
                s.image_urls_thumb, s.attributes, s.created_at, s.updated_at \
         FROM product_sheets s \
         JOIN products p ON p.id = s.product_id \
         WHERE p.supplier = $1 AND p.external_id = $2",
    )
    .bind(supplier.as_str())
    .bind(external_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Whether `product_id` already has a sheet with at least one image.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn sheet_has_images(pool: &PgPool, product_id: i64) -> Result<bool, DbError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS ( \
             SELECT 1 FROM product_sheets \
             WHERE product_id = $1 \
               AND (cardinality(image_urls_hd) > 0 OR cardinality(image_urls_thumb) > 0) \
         )",
    )
    .bind(product_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}
