//! Catalog-wide maintenance queries.

use catalog_core::Supplier;
use sqlx::PgPool;

use crate::DbError;

/// Rows removed by [`clear_catalog`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearedCounts {
    pub products: u64,
    pub categories: u64,
    pub brands: u64,
}

/// A product image to HEAD-check.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImageTargetRow {
    pub id: i64,
    pub supplier: String,
    pub external_id: i64,
    pub main_image: String,
}

/// Deletes every product, then every category, then every brand, in one
/// transaction. Sheets and cart lines go with their products.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any delete fails; nothing is removed in that
/// case.
pub async fn clear_catalog(pool: &PgPool) -> Result<ClearedCounts, DbError> {
    let mut tx = pool.begin().await?;

    let products = sqlx::query("DELETE FROM products")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let categories = sqlx::query("DELETE FROM categories")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let brands = sqlx::query("DELETE FROM brands")
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    Ok(ClearedCounts {
        products,
        categories,
        brands,
    })
}

/// Non-deleted products with a main image, optionally for one supplier.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_image_targets(
    pool: &PgPool,
    supplier: Option<Supplier>,
) -> Result<Vec<ImageTargetRow>, DbError> {
    let rows = sqlx::query_as::<_, ImageTargetRow>(
        "SELECT id, supplier, external_id, main_image \
         FROM products \
         WHERE deleted = FALSE \
           AND main_image IS NOT NULL AND main_image <> '' \
           AND ($1::text IS NULL OR supplier = $1) \
         ORDER BY id",
    )
    .bind(supplier.map(Supplier::as_str))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
