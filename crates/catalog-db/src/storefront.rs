//! Read queries behind the storefront listing, category and product pages.

use catalog_core::{PageRequest, SortOrder};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::categories::{find_category_by_slug, CategoryRow};
use crate::DbError;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Search, sort and paging for a product listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFilter {
    /// Case-insensitive substring matched against title and SKU.
    pub query: Option<String>,
    pub sort: SortOrder,
    pub page: PageRequest,
    /// Category names hidden from this listing, compared case-insensitively.
    pub excluded: Vec<String>,
}

/// A product joined with its brand and category names.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StorefrontProductRow {
    pub id: i64,
    pub supplier: String,
    pub external_id: i64,
    pub title: String,
    pub slug: String,
    pub sku: Option<String>,
    pub main_image: Option<String>,
    pub main_image_exp: Option<String>,
    pub warranty: Option<String>,
    pub stock: Option<String>,
    pub amount_stock: Option<i32>,
    pub high_average: Option<Decimal>,
    pub width_average: Option<Decimal>,
    pub length_average: Option<Decimal>,
    pub weight_average: Option<Decimal>,
    pub price: Decimal,
    pub final_price: Decimal,
    pub iva: Decimal,
    pub cotizacion: Option<Decimal>,
    pub utility: Option<Decimal>,
    pub attributes: Option<serde_json::Value>,
    pub brand_name: Option<String>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// One page of a listing plus the total number of matching rows.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub rows: Vec<StorefrontProductRow>,
    pub total: i64,
}

/// A category listing page together with the category it lists.
#[derive(Debug, Clone)]
pub struct CategoryPage {
    pub category: CategoryRow,
    pub products: ProductPage,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryCountRow {
    pub id: i64,
    pub name: String,
    pub slug: Option<String>,
    pub product_count: i64,
}

const PRODUCT_SELECT: &str = "SELECT p.id, p.supplier, p.external_id, p.title, p.slug, p.sku, \
            p.main_image, p.main_image_exp, p.warranty, p.stock, p.amount_stock, \
            p.high_average, p.width_average, p.length_average, p.weight_average, \
            p.price, p.final_price, p.iva, p.cotizacion, p.utility, p.attributes, \
            b.name AS brand_name, c.name AS category_name, c.slug AS category_slug, \
            p.updated_at \
     FROM products p \
     LEFT JOIN brands b ON b.id = p.brand_id \
     LEFT JOIN categories c ON c.id = p.category_id";

const PRODUCT_FROM: &str = "FROM products p LEFT JOIN categories c ON c.id = p.category_id";

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// Main storefront listing: in-stock, non-deleted products outside the
/// excluded categories.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn list_storefront_products(
    pool: &PgPool,
    filter: &ListingFilter,
) -> Result<ProductPage, DbError> {
    let pattern = filter.query.as_deref().and_then(like_pattern);
    let excluded = lowercase_all(&filter.excluded);
    let conditions = "p.deleted = FALSE \
         AND COALESCE(p.stock, '') <> 'Sin stock' \
         AND ($1::text IS NULL OR p.title ILIKE $1 OR p.sku ILIKE $1) \
         AND NOT (LOWER(TRIM(COALESCE(c.name, ''))) = ANY($2))";

    let total = sqlx::query_scalar::<_, i64>(&format!(
        "SELECT COUNT(*) {PRODUCT_FROM} WHERE {conditions}"
    ))
    .bind(&pattern)
    .bind(&excluded)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query_as::<_, StorefrontProductRow>(&format!(
        "{PRODUCT_SELECT} WHERE {conditions} ORDER BY {} LIMIT $3 OFFSET $4",
        filter.sort.order_by_sql()
    ))
    .bind(&pattern)
    .bind(&excluded)
    .bind(filter.page.limit)
    .bind(filter.page.offset())
    .fetch_all(pool)
    .await?;

    Ok(ProductPage { rows, total })
}

/// Listing for a single category page.
///
/// An excluded category is reported exactly like an unknown slug, so hidden
/// categories cannot be browsed by guessing their slug.
///
/// # Errors
///
/// Returns [`DbError::CategoryNotFound`] if no category has `slug` or the
/// category is in `filter.excluded`, or [`DbError::Sqlx`] if a query fails.
pub async fn list_category_products(
    pool: &PgPool,
    slug: &str,
    filter: &ListingFilter,
) -> Result<CategoryPage, DbError> {
    let not_found = || DbError::CategoryNotFound {
        slug: slug.to_string(),
    };
    let category = find_category_by_slug(pool, slug)
        .await?
        .ok_or_else(not_found)?;

    let name = category.name.trim().to_lowercase();
    if lowercase_all(&filter.excluded).contains(&name) {
        return Err(not_found());
    }

    let pattern = filter.query.as_deref().and_then(like_pattern);
    let conditions = "p.deleted = FALSE \
         AND p.category_id = $1 \
         AND ($2::text IS NULL OR p.title ILIKE $2 OR p.sku ILIKE $2)";

    let total = sqlx::query_scalar::<_, i64>(&format!(
        "SELECT COUNT(*) {PRODUCT_FROM} WHERE {conditions}"
    ))
    .bind(category.id)
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query_as::<_, StorefrontProductRow>(&format!(
        "{PRODUCT_SELECT} WHERE {conditions} ORDER BY {} LIMIT $3 OFFSET $4",
        filter.sort.order_by_sql()
    ))
    .bind(category.id)
    .bind(&pattern)
    .bind(filter.page.limit)
    .bind(filter.page.offset())
    .fetch_all(pool)
    .await?;

    Ok(CategoryPage {
        category,
        products: ProductPage { rows, total },
    })
}

/// Categories ordered by name with their count of non-deleted products.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_categories_with_counts(
    pool: &PgPool,
    excluded: &[String],
) -> Result<Vec<CategoryCountRow>, DbError> {
    let rows = sqlx::query_as::<_, CategoryCountRow>(
        "SELECT c.id, c.name, c.slug, COUNT(p.id) AS product_count \
         FROM categories c \
         LEFT JOIN products p ON p.category_id = c.id AND p.deleted = FALSE \
         WHERE NOT (LOWER(TRIM(c.name)) = ANY($1)) \
         GROUP BY c.id, c.name, c.slug \
         ORDER BY c.name, c.id",
    )
    .bind(lowercase_all(excluded))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no non-deleted product has `slug`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_product_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<StorefrontProductRow, DbError> {
    sqlx::query_as::<_, StorefrontProductRow>(&format!(
        "{PRODUCT_SELECT} WHERE p.slug = $1 AND p.deleted = FALSE ORDER BY p.id LIMIT 1"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Resolves an older `title_-_id` link, whose id is the supplier's external
/// id. NB rows win when several suppliers share the id, since those links
/// were only ever built for NB products.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no non-deleted product has
/// `external_id`, or [`DbError::Sqlx`] if the query fails.
pub async fn get_product_by_external_id(
    pool: &PgPool,
    external_id: i64,
) -> Result<StorefrontProductRow, DbError> {
    sqlx::query_as::<_, StorefrontProductRow>(&format!(
        "{PRODUCT_SELECT} WHERE p.external_id = $1 AND p.deleted = FALSE \
         ORDER BY (p.supplier = 'nb') DESC, p.id LIMIT 1"
    ))
    .bind(external_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `%query%` with LIKE wildcards escaped; `None` for a blank query.
fn like_pattern(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return None;
    }
    let escaped = trimmed
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{escaped}%"))
}

fn lowercase_all(names: &[String]) -> Vec<String> {
    names.iter().map(|n| n.trim().to_lowercase()).collect()
}
