//! Database operations for the `brands` table.
//!
//! NB brands carry the supplier's numeric id and are keyed by
//! `(supplier, external_id)`. Elit only publishes a brand name, so those rows
//! are matched by exact name.

use catalog_core::{slugify, Supplier};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `brands` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandRow {
    pub id: i64,
    pub supplier: Option<String>,
    pub external_id: Option<i64>,
    pub name: String,
    pub slug: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upserts a brand by supplier id. Conflicts update `name`, `slug` and
/// `image_url`.
///
/// Returns the internal `id` of the upserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_brand_by_external_id(
    pool: &PgPool,
    supplier: Supplier,
    external_id: i64,
    name: &str,
    image_url: Option<&str>,
) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO brands (supplier, external_id, name, slug, image_url) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (supplier, external_id) DO UPDATE SET \
             name       = EXCLUDED.name, \
             slug       = EXCLUDED.slug, \
             image_url  = COALESCE(EXCLUDED.image_url, brands.image_url), \
             updated_at = NOW() \
         RETURNING id",
    )
    .bind(supplier.as_str())
    .bind(external_id)
    .bind(name.trim())
    .bind(slugify(name))
    .bind(image_url)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns every brand ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_brands(pool: &PgPool) -> Result<Vec<BrandRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandRow>(
        "SELECT id, supplier, external_id, name, slug, image_url, created_at, updated_at \
         FROM brands \
         ORDER BY name, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Finds a brand by exact name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_brand_by_name(pool: &PgPool, name: &str) -> Result<Option<BrandRow>, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(
        "SELECT id, supplier, external_id, name, slug, image_url, created_at, updated_at \
         FROM brands \
         WHERE name = $1 \
         ORDER BY id \
         LIMIT 1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the id of the brand named `name`, inserting it when missing.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the lookup or insert fails.
pub async fn get_or_create_brand_by_name(
    pool: &PgPool,
    supplier: Supplier,
    name: &str,
) -> Result<i64, DbError> {
    if let Some(existing) = find_brand_by_name(pool, name).await? {
        return Ok(existing.id);
    }

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO brands (supplier, name, slug) \
         VALUES ($1, $2, $3) \
         RETURNING id",
    )
    .bind(supplier.as_str())
    .bind(name)
    .bind(slugify(name))
    .fetch_one(pool)
    .await?;

    Ok(id)
}
