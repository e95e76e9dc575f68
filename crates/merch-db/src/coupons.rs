//! Database operations for the `coupons` table.
//!
//! Codes are stored uppercase; callers normalize before lookup. There is no
//! redemption tracking, so a coupon can be validated any number of times.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `coupons` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CouponRow {
    pub id: i64,
    pub code: String,
    pub discount_percentage: Decimal,
    pub max_discount_amount: Option<Decimal>,
    pub min_order_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const COUPON_COLUMNS: &str =
    "id, code, discount_percentage, max_discount_amount, min_order_amount, created_at, updated_at";

/// Looks up a coupon by exact (already-uppercased) code.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_coupon_by_code(pool: &PgPool, code: &str) -> Result<Option<CouponRow>, DbError> {
    let row = sqlx::query_as::<_, CouponRow>(&format!(
        "SELECT {COUPON_COLUMNS} FROM coupons WHERE code = $1"
    ))
    .bind(code)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns all coupons, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_coupons(pool: &PgPool) -> Result<Vec<CouponRow>, DbError> {
    let rows = sqlx::query_as::<_, CouponRow>(&format!(
        "SELECT {COUPON_COLUMNS} FROM coupons ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Creates a coupon and returns the inserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails (including unique code violations).
pub async fn create_coupon(
    pool: &PgPool,
    code: &str,
    discount_percentage: Decimal,
    max_discount_amount: Option<Decimal>,
    min_order_amount: Decimal,
) -> Result<CouponRow, DbError> {
    let row = sqlx::query_as::<_, CouponRow>(&format!(
        "INSERT INTO coupons (code, discount_percentage, max_discount_amount, min_order_amount) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {COUPON_COLUMNS}"
    ))
    .bind(code)
    .bind(discount_percentage)
    .bind(max_discount_amount)
    .bind(min_order_amount)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Deletes a coupon by code. Returns `true` if a row was removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_coupon(pool: &PgPool, code: &str) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM coupons WHERE code = $1")
        .bind(code)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
