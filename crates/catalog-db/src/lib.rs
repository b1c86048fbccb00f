use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Path relative to crates/catalog-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &catalog_core::AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("sync run {id} is not in expected status '{expected_status}'")]
    InvalidSyncRunTransition {
        id: i64,
        expected_status: &'static str,
    },
    #[error("category not found: {slug}")]
    CategoryNotFound { slug: String },
    #[error("quantity must be between 1 and {max}, got {quantity}")]
    InvalidQuantity { quantity: i32, max: i32 },
    #[error("cart line for product {product_id} would exceed {max} units")]
    CartQuantityLimit { product_id: i64, max: i32 },
}

/// Connect to a Postgres pool using explicit URL and config.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Run all pending migrations against the pool.
///
/// Returns the number of migrations that were applied.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, sqlx::migrate::MigrateError> {
    // _sqlx_migrations does not exist on a fresh database; count that as zero.
    let applied_before: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    MIGRATOR.run(pool).await?;

    let applied_after: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    let delta = (applied_after - applied_before).max(0);
    Ok(usize::try_from(delta).unwrap_or(0))
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Ping the pool and return a typed error on failure.
///
/// # Errors
///
/// Returns [`DbError`] if the ping fails.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    ping(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_config_has_sane_defaults() {
        let config = PoolConfig::default();

        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.min_connections, DEFAULT_MIN_CONNECTIONS);
        assert_eq!(config.acquire_timeout_secs, DEFAULT_ACQUIRE_TIMEOUT_SECS);
    }

    #[test]
    fn db_errors_render_context() {
        let err = DbError::InvalidSyncRunTransition {
            id: 9,
            expected_status: "running",
        };
        assert_eq!(
            err.to_string(),
            "sync run 9 is not in expected status 'running'"
        );
        assert_eq!(
            DbError::InvalidQuantity {
                quantity: 0,
                max: 10
            }
            .to_string(),
            "quantity must be between 1 and 10, got 0"
        );
        assert_eq!(
            DbError::CategoryNotFound {
                slug: "notebooks".to_string()
            }
            .to_string(),
            "category not found: notebooks"
        );
    }
}

pub mod brands;
pub mod cart;
pub mod categories;
pub mod maintenance;
pub mod products;
pub mod sheets;
pub mod storefront;
pub mod sync_runs;

pub use brands::{
    find_brand_by_name, get_or_create_brand_by_name, list_brands, upsert_brand_by_external_id,
    BrandRow,
};
pub use cart::{add_to_cart, get_cart, CartItemRow, MAX_CART_QUANTITY};
pub use categories::{
    find_category_by_slug, get_or_create_category_by_name, list_categories,
    list_categories_without_slug, merge_category_into, set_category_slug,
    upsert_category_by_external_id, CategoryRow,
};
pub use maintenance::{clear_catalog, list_image_targets, ClearedCounts, ImageTargetRow};
pub use products::{
    list_products_by_supplier, list_products_without_sheet, soft_delete_missing,
    update_price_stock_chunk, update_product_refresh, upsert_product, PriceStockUpdate,
    ProductRefresh, SupplierProductRow, SheetTargetRow,
};
pub use sheets::{get_sheet_by_external_id, sheet_has_images, upsert_sheet, ProductSheetRow};
pub use storefront::{
    get_product_by_external_id, get_product_by_slug, list_categories_with_counts,
    list_category_products,
    list_storefront_products, CategoryCountRow, CategoryPage, ListingFilter, ProductPage,
    StorefrontProductRow,
};
pub use sync_runs::{
    complete_sync_run, create_sync_run, fail_sync_run, get_sync_run, list_sync_runs,
    start_sync_run, SyncRunRow,
};
