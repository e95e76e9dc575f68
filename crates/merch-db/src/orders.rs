//! Database operations for `orders` and `order_items`.
//!
//! An order and its items are inserted together in one transaction; no route
//! updates an order after creation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `orders` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub public_id: Uuid,
    pub user_id: i64,
    pub carrier_order_id: String,
    pub order_status: String,
    pub payment_status: String,
    pub payment_id: String,
    pub payment_order_id: String,
    pub payment_amount: Decimal,
    pub payment_method: String,
    pub payment_date: DateTime<Utc>,
    pub ship_name: String,
    pub ship_email: String,
    pub ship_phone: String,
    pub ship_address_line1: String,
    pub ship_address_line2: Option<String>,
    pub ship_city: String,
    pub ship_state: String,
    pub ship_zip: String,
    pub ship_country: String,
    pub subtotal: Decimal,
    pub created_at: DateTime<Utc>,
}

/// A row from the `order_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItemRow {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub name: String,
    pub sku: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
}

/// Everything needed to persist a verified order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i64,
    pub carrier_order_id: String,
    pub payment_status: String,
    pub payment_id: String,
    pub payment_order_id: String,
    pub payment_amount: Decimal,
    pub payment_method: String,
    pub payment_date: DateTime<Utc>,
    pub ship_name: String,
    pub ship_email: String,
    pub ship_phone: String,
    pub ship_address_line1: String,
    pub ship_address_line2: Option<String>,
    pub ship_city: String,
    pub ship_state: String,
    pub ship_zip: String,
    pub ship_country: String,
    pub subtotal: Decimal,
    pub items: Vec<NewOrderItem>,
}

/// One denormalized line of a [`NewOrder`].
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub name: String,
    pub sku: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
}

const ORDER_COLUMNS: &str = "id, public_id, user_id, carrier_order_id, order_status, \
                             payment_status, payment_id, payment_order_id, payment_amount, \
                             payment_method, payment_date, ship_name, ship_email, ship_phone, \
                             ship_address_line1, ship_address_line2, ship_city, ship_state, \
                             ship_zip, ship_country, subtotal, created_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts an order and all of its items in a single transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails; nothing is persisted in
/// that case.
pub async fn create_order(pool: &PgPool, order: &NewOrder) -> Result<OrderRow, DbError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "INSERT INTO orders \
           (user_id, carrier_order_id, payment_status, payment_id, payment_order_id, \
            payment_amount, payment_method, payment_date, ship_name, ship_email, ship_phone, \
            ship_address_line1, ship_address_line2, ship_city, ship_state, ship_zip, \
            ship_country, subtotal) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(order.user_id)
    .bind(&order.carrier_order_id)
    .bind(&order.payment_status)
    .bind(&order.payment_id)
    .bind(&order.payment_order_id)
    .bind(order.payment_amount)
    .bind(&order.payment_method)
    .bind(order.payment_date)
    .bind(&order.ship_name)
    .bind(&order.ship_email)
    .bind(&order.ship_phone)
    .bind(&order.ship_address_line1)
    .bind(order.ship_address_line2.as_deref())
    .bind(&order.ship_city)
    .bind(&order.ship_state)
    .bind(&order.ship_zip)
    .bind(&order.ship_country)
    .bind(order.subtotal)
    .fetch_one(&mut *tx)
    .await?;

    for item in &order.items {
        sqlx::query(
            "INSERT INTO order_items \
               (order_id, product_id, name, sku, quantity, unit_price, total_amount) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(row.id)
        .bind(item.product_id)
        .bind(&item.name)
        .bind(&item.sku)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.total_amount)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(row)
}

/// Returns a user's orders, newest first, capped at `limit`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_orders_for_user(
    pool: &PgPool,
    user_id: i64,
    limit: i64,
) -> Result<Vec<OrderRow>, DbError> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders \
         WHERE user_id = $1 \
         ORDER BY created_at DESC \
         LIMIT $2"
    ))
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the items for a set of orders in one query, ordered by item id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_order_items(
    pool: &PgPool,
    order_ids: &[i64],
) -> Result<Vec<OrderItemRow>, DbError> {
    let rows = sqlx::query_as::<_, OrderItemRow>(
        "SELECT id, order_id, product_id, name, sku, quantity, unit_price, total_amount \
         FROM order_items \
         WHERE order_id = ANY($1) \
         ORDER BY id",
    )
    .bind(order_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns one of the user's orders with its items, or `None` if the order
/// does not exist or belongs to someone else.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_order_for_user(
    pool: &PgPool,
    user_id: i64,
    public_id: Uuid,
) -> Result<Option<(OrderRow, Vec<OrderItemRow>)>, DbError> {
    let order = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders \
         WHERE public_id = $1 AND user_id = $2"
    ))
    .bind(public_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some(order) = order else {
        return Ok(None);
    };

    let items = sqlx::query_as::<_, OrderItemRow>(
        "SELECT id, order_id, product_id, name, sku, quantity, unit_price, total_amount \
         FROM order_items \
         WHERE order_id = $1 \
         ORDER BY id",
    )
    .bind(order.id)
    .fetch_all(pool)
    .await?;

    Ok(Some((order, items)))
}

/// Counts all orders. Used by tests asserting failed flows leave no rows.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_orders(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
