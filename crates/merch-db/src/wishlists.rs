//! Database operations for `wishlist_items` (pure membership, no quantities).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A wishlist line joined with its product's display fields.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WishlistLineRow {
    pub product_id: Uuid,
    pub product_name: String,
    pub sku: String,
    pub unit_price: Decimal,
    pub discount_percent: i16,
    pub image_url: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// Returns the user's wishlist, most recently added first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_wishlist_items(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<WishlistLineRow>, DbError> {
    let rows = sqlx::query_as::<_, WishlistLineRow>(
        "SELECT p.public_id AS product_id, p.name AS product_name, p.sku, \
                p.price AS unit_price, p.discount_percent, p.image_url, \
                w.created_at AS added_at \
         FROM wishlist_items w \
         JOIN products p ON p.id = w.product_id \
         WHERE w.user_id = $1 \
         ORDER BY w.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Adds a product to the user's wishlist. Idempotent: adding a product that
/// is already present is a no-op.
///
/// Returns `false` if the product does not exist or is inactive.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn add_wishlist_item(
    pool: &PgPool,
    user_id: i64,
    product_public_id: Uuid,
) -> Result<bool, DbError> {
    let product_id = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM products WHERE public_id = $1 AND is_active = true",
    )
    .bind(product_public_id)
    .fetch_optional(pool)
    .await?;

    let Some(product_id) = product_id else {
        return Ok(false);
    };

    sqlx::query(
        "INSERT INTO wishlist_items (user_id, product_id) \
         VALUES ($1, $2) \
         ON CONFLICT (user_id, product_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(product_id)
    .execute(pool)
    .await?;

    Ok(true)
}

/// Removes a product from the user's wishlist.
///
/// Returns `true` if a line was removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn remove_wishlist_item(
    pool: &PgPool,
    user_id: i64,
    product_public_id: Uuid,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "DELETE FROM wishlist_items w \
         USING products p \
         WHERE p.id = w.product_id AND w.user_id = $1 AND p.public_id = $2",
    )
    .bind(user_id)
    .bind(product_public_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
