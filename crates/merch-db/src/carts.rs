//! Database operations for `cart_items`.
//!
//! One line per (user, product). Adding the same product again increments the
//! existing line via upsert instead of duplicating it; a line decremented to
//! zero is deleted outright.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A cart line joined with its product's display fields.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartLineRow {
    pub product_id: Uuid,
    pub product_name: String,
    pub sku: String,
    pub unit_price: Decimal,
    pub discount_percent: i16,
    pub quantity: i32,
    pub updated_at: DateTime<Utc>,
}

/// Returns the user's cart lines, oldest line first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_cart_items(pool: &PgPool, user_id: i64) -> Result<Vec<CartLineRow>, DbError> {
    let rows = sqlx::query_as::<_, CartLineRow>(
        "SELECT p.public_id AS product_id, p.name AS product_name, p.sku, \
                p.price AS unit_price, p.discount_percent, c.quantity, c.updated_at \
         FROM cart_items c \
         JOIN products p ON p.id = c.product_id \
         WHERE c.user_id = $1 \
         ORDER BY c.created_at",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Adds one unit of a product to the user's cart.
///
/// Inserts a new line with quantity 1, or increments the existing line's
/// quantity. Returns the resulting quantity, or `None` if the product does
/// not exist or is inactive.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn add_cart_item(
    pool: &PgPool,
    user_id: i64,
    product_public_id: Uuid,
) -> Result<Option<i32>, DbError> {
    let quantity = sqlx::query_scalar::<_, i32>(
        "INSERT INTO cart_items (user_id, product_id, quantity) \
         SELECT $1, p.id, 1 FROM products p \
         WHERE p.public_id = $2 AND p.is_active = true \
         ON CONFLICT (user_id, product_id) \
         DO UPDATE SET quantity = cart_items.quantity + 1, updated_at = NOW() \
         RETURNING quantity",
    )
    .bind(user_id)
    .bind(product_public_id)
    .fetch_optional(pool)
    .await?;

    Ok(quantity)
}

/// Removes one unit of a product from the user's cart.
///
/// A line whose quantity reaches zero is deleted. Returns the remaining
/// quantity (`Some(0)` means the line was removed), or `None` if no line
/// existed for the product.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn decrement_cart_item(
    pool: &PgPool,
    user_id: i64,
    product_public_id: Uuid,
) -> Result<Option<i32>, DbError> {
    let mut tx = pool.begin().await?;

    let current = sqlx::query_scalar::<_, i32>(
        "SELECT c.quantity FROM cart_items c \
         JOIN products p ON p.id = c.product_id \
         WHERE c.user_id = $1 AND p.public_id = $2 \
         FOR UPDATE",
    )
    .bind(user_id)
    .bind(product_public_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(current) = current else {
        return Ok(None);
    };

    let remaining = if current <= 1 {
        sqlx::query(
            "DELETE FROM cart_items c \
             USING products p \
             WHERE p.id = c.product_id AND c.user_id = $1 AND p.public_id = $2",
        )
        .bind(user_id)
        .bind(product_public_id)
        .execute(&mut *tx)
        .await?;
        0
    } else {
        sqlx::query(
            "UPDATE cart_items c \
             SET quantity = c.quantity - 1, updated_at = NOW() \
             FROM products p \
             WHERE p.id = c.product_id AND c.user_id = $1 AND p.public_id = $2",
        )
        .bind(user_id)
        .bind(product_public_id)
        .execute(&mut *tx)
        .await?;
        current - 1
    };

    tx.commit().await?;
    Ok(Some(remaining))
}

/// Removes a cart line entirely, regardless of quantity.
///
/// Returns `true` if a line was removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_cart_item(
    pool: &PgPool,
    user_id: i64,
    product_public_id: Uuid,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "DELETE FROM cart_items c \
         USING products p \
         WHERE p.id = c.product_id AND c.user_id = $1 AND p.public_id = $2",
    )
    .bind(user_id)
    .bind(product_public_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
