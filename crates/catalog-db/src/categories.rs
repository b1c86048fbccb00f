//! Database operations for the `categories` table.

use catalog_core::{slugify, Supplier};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `categories` table.
///
/// `slug` is `NULL` for categories seeded from NB until
/// `backfill_category_slugs` assigns one.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub supplier: Option<String>,
    pub external_id: Option<i64>,
    pub name: String,
    pub slug: Option<String>,
    pub initial_b: i32,
    pub initial_c: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const CATEGORY_COLUMNS: &str = "id, supplier, external_id, name, slug, initial_b, initial_c, \
                                created_at, updated_at";

// ---------------------------------------------------------------------------
// Upserts
// ---------------------------------------------------------------------------

/// Upserts a category by supplier id. The slug is left untouched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_category_by_external_id(
    pool: &PgPool,
    supplier: Supplier,
    external_id: i64,
    name: &str,
    initial_b: i32,
    initial_c: i32,
) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO categories (supplier, external_id, name, initial_b, initial_c) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (supplier, external_id) DO UPDATE SET \
             name       = EXCLUDED.name, \
             initial_b  = EXCLUDED.initial_b, \
             initial_c  = EXCLUDED.initial_c, \
             updated_at = NOW() \
         RETURNING id",
    )
    .bind(supplier.as_str())
    .bind(external_id)
    .bind(name.trim())
    .bind(initial_b)
    .bind(initial_c)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns the id of the category whose `LOWER(TRIM(name))` matches `name`,
/// creating it with `slugify(name)` when none does.
///
/// A new category whose slug is already owned by a differently-named row
/// resolves to that row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the lookup or insert fails.
pub async fn get_or_create_category_by_name(
    pool: &PgPool,
    supplier: Supplier,
    name: &str,
) -> Result<i64, DbError> {
    let trimmed = name.trim();

    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM categories \
         WHERE LOWER(TRIM(name)) = LOWER($1) \
         ORDER BY id \
         LIMIT 1",
    )
    .bind(trimmed)
    .fetch_optional(pool)
    .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO categories (supplier, name, slug) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (slug) DO UPDATE SET updated_at = NOW() \
         RETURNING id",
    )
    .bind(supplier.as_str())
    .bind(trimmed)
    .bind(slugify(trimmed))
    .fetch_one(pool)
    .await?;

    Ok(id)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Returns every category ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_categories(pool: &PgPool) -> Result<Vec<CategoryRow>, DbError> {
    let rows = sqlx::query_as::<_, CategoryRow>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name, id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_categories_without_slug(pool: &PgPool) -> Result<Vec<CategoryRow>, DbError> {
    let rows = sqlx::query_as::<_, CategoryRow>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug IS NULL ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_category_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<CategoryRow>, DbError> {
    let row = sqlx::query_as::<_, CategoryRow>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

// ---------------------------------------------------------------------------
// Slug maintenance
// ---------------------------------------------------------------------------

/// # Errors
///
/// Returns [`DbError::NotFound`] if no category has the given `id`, or
/// [`DbError::Sqlx`] if the update fails (including a slug collision).
pub async fn set_category_slug(pool: &PgPool, id: i64, slug: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE categories SET slug = $1, updated_at = NOW() WHERE id = $2",
    )
    .bind(slug)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

/// Moves every product of category `duplicate_id` to `target_id` and deletes
/// the duplicate, in one transaction.
///
/// Returns the number of products moved.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either statement fails; the transaction is
/// rolled back.
pub async fn merge_category_into(
    pool: &PgPool,
    duplicate_id: i64,
    target_id: i64,
) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;

    let moved = sqlx::query(
        "UPDATE products SET category_id = $1, updated_at = NOW() WHERE category_id = $2",
    )
    .bind(target_id)
    .bind(duplicate_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(duplicate_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(moved)
}
