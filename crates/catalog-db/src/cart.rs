//! Server-side cart persistence: `cart_sessions` and `cart_items`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// Most units of one product a cart line may hold.
pub const MAX_CART_QUANTITY: i32 = 10_000;

/// A cart line joined with its product, brand, category and sheet.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartItemRow {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub title: String,
    pub slug: String,
    pub final_price: Decimal,
    pub stock: Option<String>,
    pub amount_stock: Option<i32>,
    pub main_image: Option<String>,
    pub brand_name: Option<String>,
    pub category_name: Option<String>,
    pub description: Option<String>,
    pub image_urls_thumb: Option<Vec<String>>,
    pub updated_at: DateTime<Utc>,
}

/// Adds `quantity` units of `product_id` to the cart of `session_id`.
///
/// The session row is created on first use. Adding a product already in the
/// cart increments its quantity, up to [`MAX_CART_QUANTITY`]. Returns the
/// resulting quantity.
///
/// # Errors
///
/// Returns [`DbError::InvalidQuantity`] if `quantity` is outside
/// `1..=MAX_CART_QUANTITY`, [`DbError::CartQuantityLimit`] if the increment
/// would push the line past it, [`DbError::NotFound`] if the product does not
/// exist or is deleted, or [`DbError::Sqlx`] if a statement fails.
pub async fn add_to_cart(
    pool: &PgPool,
    session_id: &str,
    product_id: i64,
    quantity: i32,
) -> Result<i32, DbError> {
    if !(1..=MAX_CART_QUANTITY).contains(&quantity) {
        return Err(DbError::InvalidQuantity {
            quantity,
            max: MAX_CART_QUANTITY,
        });
    }

    let mut tx = pool.begin().await?;

    let product_exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM products WHERE id = $1 AND deleted = FALSE)",
    )
    .bind(product_id)
    .fetch_one(&mut *tx)
    .await?;
    if !product_exists {
        return Err(DbError::NotFound);
    }

    sqlx::query("INSERT INTO cart_sessions (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
        .bind(session_id)
        .execute(&mut *tx)
        .await?;

    // The sum is widened so the limit check itself cannot overflow INTEGER.
    // A line over the limit is left untouched and returns no row.
    let total = sqlx::query_scalar::<_, i32>(
        "INSERT INTO cart_items (session_id, product_id, quantity) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (session_id, product_id) DO UPDATE SET \
             quantity   = cart_items.quantity + EXCLUDED.quantity, \
             updated_at = NOW() \
         WHERE cart_items.quantity::bigint + EXCLUDED.quantity <= $4 \
         RETURNING quantity",
    )
    .bind(session_id)
    .bind(product_id)
    .bind(quantity)
    .bind(i64::from(MAX_CART_QUANTITY))
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::CartQuantityLimit {
        product_id,
        max: MAX_CART_QUANTITY,
    })?;

    tx.commit().await?;
    Ok(total)
}

/// Returns the lines of `session_id`, oldest first. An unknown session is an
/// empty cart.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_cart(pool: &PgPool, session_id: &str) -> Result<Vec<CartItemRow>, DbError> {
    let rows = sqlx::query_as::<_, CartItemRow>(
        "SELECT ci.id, ci.product_id, ci.quantity, \
                p.title, p.slug, p.final_price, p.stock, p.amount_stock, p.main_image, \
                b.name AS brand_name, c.name AS category_name, \
                s.description, s.image_urls_thumb, ci.updated_at \
         FROM cart_items ci \
         JOIN products p ON p.id = ci.product_id \
         LEFT JOIN brands b ON b.id = p.brand_id \
         LEFT JOIN categories c ON c.id = p.category_id \
         LEFT JOIN product_sheets s ON s.product_id = p.id \
         WHERE ci.session_id = $1 \
         ORDER BY ci.created_at, ci.id",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
