//! Database operations for the `products` table.

use catalog_core::{NormalizedProduct, Supplier};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// The slice of a product row the sync pipelines need to decide between
/// insert and update.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SupplierProductRow {
    pub id: i64,
    pub external_id: i64,
    pub main_image: Option<String>,
    pub main_image_exp: Option<String>,
}

/// A product still waiting for a detail sheet with images.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SheetTargetRow {
    pub id: i64,
    pub external_id: i64,
    pub title: String,
    pub slug: String,
}

/// Fields rewritten for a product that already exists.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRefresh {
    pub price: Decimal,
    pub final_price: Decimal,
    pub iva: Decimal,
    pub cotizacion: Option<Decimal>,
    pub main_image: Option<String>,
    pub main_image_exp: Option<String>,
}

/// One row of a price/stock refresh batch.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceStockUpdate {
    pub external_id: i64,
    pub stock: Option<String>,
    pub amount_stock: Option<i32>,
    pub price: Decimal,
    pub final_price: Decimal,
    pub iva: Decimal,
    pub cotizacion: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Returns `(id, external_id, main_image, main_image_exp)` for every product
/// of `supplier`, deleted or not.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products_by_supplier(
    pool: &PgPool,
    supplier: Supplier,
) -> Result<Vec<SupplierProductRow>, DbError> {
    let rows = sqlx::query_as::<_, SupplierProductRow>(
        "SELECT id, external_id, main_image, main_image_exp \
         FROM products \
         WHERE supplier = $1 \
         ORDER BY external_id",
    )
    .bind(supplier.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns non-deleted products of `supplier` that have no sheet, or whose
/// sheet has neither HD nor thumbnail images.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products_without_sheet(
    pool: &PgPool,
    supplier: Supplier,
    limit: Option<i64>,
) -> Result<Vec<SheetTargetRow>, DbError> {
    let rows = sqlx::query_as::<_, SheetTargetRow>(
        "SELECT p.id, p.external_id, p.title, p.slug \
         FROM products p \
         LEFT JOIN product_sheets s ON s.product_id = p.id \
         WHERE p.supplier = $1 \
           AND p.deleted = FALSE \
           AND (s.id IS NULL \
                OR (cardinality(s.image_urls_hd) = 0 AND cardinality(s.image_urls_thumb) = 0)) \
         ORDER BY p.id \
         LIMIT $2",
    )
    .bind(supplier.as_str())
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Upserts a product row.
///
/// Conflicts on `(supplier, external_id)` overwrite every supplier-provided
/// column and set `updated_at`.
///
/// Returns the internal `id` of the upserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_product(
    pool: &PgPool,
    product: &NormalizedProduct,
    brand_id: Option<i64>,
    category_id: Option<i64>,
) -> Result<i64, DbError> {
    let attributes = (!product.attributes.is_null()).then(|| product.attributes.clone());

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO products \
             (supplier, external_id, title, slug, sku, main_image, main_image_exp, warranty, \
              stock, amount_stock, high_average, width_average, length_average, weight_average, \
              price, final_price, iva, cotizacion, utility, attributes, brand_id, category_id, \
              deleted) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, \
                 $9, $10, $11, $12, $13, $14, \
                 $15, $16, $17, $18, $19, $20, $21, $22, \
                 $23) \
         ON CONFLICT (supplier, external_id) DO UPDATE SET \
             title          = EXCLUDED.title, \
             slug           = EXCLUDED.slug, \
             sku            = EXCLUDED.sku, \
             main_image     = EXCLUDED.main_image, \
             main_image_exp = EXCLUDED.main_image_exp, \
             warranty       = EXCLUDED.warranty, \
             stock          = EXCLUDED.stock, \
             amount_stock   = EXCLUDED.amount_stock, \
             high_average   = EXCLUDED.high_average, \
             width_average  = EXCLUDED.width_average, \
             length_average = EXCLUDED.length_average, \
             weight_average = EXCLUDED.weight_average, \
             price          = EXCLUDED.price, \
             final_price    = EXCLUDED.final_price, \
             iva            = EXCLUDED.iva, \
             cotizacion     = EXCLUDED.cotizacion, \
             utility        = EXCLUDED.utility, \
             attributes     = EXCLUDED.attributes, \
             brand_id       = COALESCE(EXCLUDED.brand_id, products.brand_id), \
             category_id    = COALESCE(EXCLUDED.category_id, products.category_id), \
             deleted        = EXCLUDED.deleted, \
             updated_at     = NOW() \
         RETURNING id",
    )
    .bind(product.supplier.as_str())
    .bind(product.external_id)
    .bind(&product.title)
    .bind(&product.slug)
    .bind(&product.sku)
    .bind(&product.main_image)
    .bind(&product.main_image_exp)
    .bind(&product.warranty)
    .bind(&product.stock)
    .bind(product.amount_stock)
    .bind(product.dimensions.high)
    .bind(product.dimensions.width)
    .bind(product.dimensions.length)
    .bind(product.dimensions.weight)
    .bind(product.price)
    .bind(product.final_price)
    .bind(product.iva)
    .bind(product.cotizacion)
    .bind(product.utility)
    .bind(attributes)
    .bind(brand_id)
    .bind(category_id)
    .bind(product.deleted)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Rewrites prices and images of an existing product and clears its
/// `deleted` flag.
///
/// Returns `false` when no product matched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_product_refresh(
    pool: &PgPool,
    supplier: Supplier,
    external_id: i64,
    refresh: &ProductRefresh,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE products SET \
             price          = $1, \
             final_price    = $2, \
             iva            = $3, \
             cotizacion     = $4, \
             main_image     = $5, \
             main_image_exp = $6, \
             deleted        = FALSE, \
             updated_at     = NOW() \
         WHERE supplier = $7 AND external_id = $8",
    )
    .bind(refresh.price)
    .bind(refresh.final_price)
    .bind(refresh.iva)
    .bind(refresh.cotizacion)
    .bind(&refresh.main_image)
    .bind(&refresh.main_image_exp)
    .bind(supplier.as_str())
    .bind(external_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Applies a batch of price/stock updates inside one transaction.
///
/// Returns the number of rows updated. Any failing statement rolls back the
/// whole chunk.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the transaction cannot be opened, a
/// statement fails, or the commit fails.
pub async fn update_price_stock_chunk(
    pool: &PgPool,
    supplier: Supplier,
    updates: &[PriceStockUpdate],
) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;
    let mut updated = 0u64;

    for update in updates {
        let result = sqlx::query(
            "UPDATE products SET \
                 stock        = $1, \
                 amount_stock = $2, \
                 price        = $3, \
                 final_price  = $4, \
                 iva          = $5, \
                 cotizacion   = $6, \
                 updated_at   = NOW() \
             WHERE supplier = $7 AND external_id = $8",
        )
        .bind(&update.stock)
        .bind(update.amount_stock)
        .bind(update.price)
        .bind(update.final_price)
        .bind(update.iva)
        .bind(update.cotizacion)
        .bind(supplier.as_str())
        .bind(update.external_id)
        .execute(&mut *tx)
        .await?;
        updated += result.rows_affected();
    }

    tx.commit().await?;
    Ok(updated)
}

/// Marks every non-deleted product of `supplier` whose external id is not in
/// `keep_external_ids` as deleted.
///
/// Returns the number of rows newly marked.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn soft_delete_missing(
    pool: &PgPool,
    supplier: Supplier,
    keep_external_ids: &[i64],
) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE products SET deleted = TRUE, updated_at = NOW() \
         WHERE supplier = $1 \
           AND deleted = FALSE \
           AND NOT (external_id = ANY($2))",
    )
    .bind(supplier.as_str())
    .bind(keep_external_ids)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
