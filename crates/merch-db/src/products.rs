//! Database operations for the `products` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub public_id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    /// Whole-number percentage, 0–100.
    pub discount_percent: i16,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const PRODUCT_COLUMNS: &str = "id, public_id, sku, name, description, price, discount_percent, \
                               image_url, is_active, created_at, updated_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns active products, newest first, capped at `limit`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_products(pool: &PgPool, limit: i64) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE is_active = true \
         ORDER BY created_at DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single active product by public id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product_by_public_id(
    pool: &PgPool,
    public_id: Uuid,
) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE public_id = $1 AND is_active = true"
    ))
    .bind(public_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Creates a new product row and returns the full inserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails (including unique SKU violations).
pub async fn create_product(
    pool: &PgPool,
    sku: &str,
    name: &str,
    description: Option<&str>,
    price: Decimal,
    discount_percent: i16,
    image_url: Option<&str>,
) -> Result<ProductRow, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "INSERT INTO products (sku, name, description, price, discount_percent, image_url) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(sku)
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(discount_percent)
    .bind(image_url)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Partially updates a product. `Some(v)` sets the value, `None` preserves
/// the existing one; a single `UPDATE … RETURNING` with `COALESCE`/`CASE`
/// avoids a SELECT-then-UPDATE race.
///
/// Returns `None` if no active product matches `public_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn update_product(
    pool: &PgPool,
    public_id: Uuid,
    name: Option<&str>,
    description: Option<Option<&str>>,
    price: Option<Decimal>,
    discount_percent: Option<i16>,
    image_url: Option<Option<&str>>,
) -> Result<Option<ProductRow>, DbError> {
    // Nullable columns need "was supplied" flags to distinguish keep / clear / set.
    let description_supplied = description.is_some();
    let description_val = description.flatten();
    let image_url_supplied = image_url.is_some();
    let image_url_val = image_url.flatten();

    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "UPDATE products \
         SET name             = COALESCE($2, name), \
             price            = COALESCE($3, price), \
             discount_percent = COALESCE($4, discount_percent), \
             description      = CASE WHEN $5::BOOL THEN $6 ELSE description END, \
             image_url        = CASE WHEN $7::BOOL THEN $8 ELSE image_url END, \
             updated_at       = NOW() \
         WHERE public_id = $1 AND is_active = true \
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(public_id)
    .bind(name)
    .bind(price)
    .bind(discount_percent)
    .bind(description_supplied)
    .bind(description_val)
    .bind(image_url_supplied)
    .bind(image_url_val)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Soft-deletes a product by setting `is_active = false`.
///
/// Returns `true` if a row was deactivated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn deactivate_product(pool: &PgPool, public_id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE products \
         SET is_active = false, updated_at = NOW() \
         WHERE public_id = $1 AND is_active = true",
    )
    .bind(public_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
