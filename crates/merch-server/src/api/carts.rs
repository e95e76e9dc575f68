//! Cart handlers, keyed by the authenticated user.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::CurrentUser;

use super::{map_db_error, ok, ApiError, AppState, Envelope};

#[derive(Debug, Serialize)]
pub(super) struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub sku: String,
    pub unit_price: Decimal,
    pub discount_percent: i16,
    pub quantity: i32,
    /// `unit_price * quantity * (1 - discount/100)`, unrounded.
    pub line_total: Decimal,
}

#[derive(Debug, Serialize)]
pub(super) struct CartView {
    pub lines: Vec<CartLine>,
    pub subtotal: Decimal,
}

#[derive(Debug, Deserialize)]
pub(super) struct AddItemRequest {
    pub product_id: Uuid,
}

#[derive(Debug, Serialize)]
pub(super) struct QuantityResult {
    pub product_id: Uuid,
    pub quantity: i32,
}

fn cart_view(rows: Vec<merch_db::CartLineRow>) -> CartView {
    let lines: Vec<CartLine> = rows
        .into_iter()
        .map(|row| {
            let quantity = u32::try_from(row.quantity).unwrap_or(0);
            let line_total =
                merch_core::money::line_total(row.unit_price, quantity, row.discount_percent);
            CartLine {
                product_id: row.product_id,
                name: row.product_name,
                sku: row.sku,
                unit_price: row.unit_price,
                discount_percent: row.discount_percent,
                quantity: row.quantity,
                line_total,
            }
        })
        .collect();

    let totals: Vec<Decimal> = lines.iter().map(|l| l.line_total).collect();
    CartView {
        subtotal: merch_core::money::subtotal(&totals),
        lines,
    }
}

/// GET /api/v1/cart — the caller's cart with per-line and aggregate totals.
pub(super) async fn get_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<(StatusCode, Json<Envelope<CartView>>), ApiError> {
    let rows = merch_db::list_cart_items(&state.pool, user.0.id)
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok(ok(cart_view(rows)))
}

/// POST /api/v1/cart/items — add one unit; an existing line is incremented.
pub(super) async fn add_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<Envelope<QuantityResult>>), ApiError> {
    let quantity = merch_db::add_cart_item(&state.pool, user.0.id, body.product_id)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::new("not_found", "product not found"))?;

    Ok(ok(QuantityResult {
        product_id: body.product_id,
        quantity,
    }))
}

/// POST /api/v1/cart/items/{product_id}/decrement — remove one unit; a line
/// reaching zero is deleted.
pub(super) async fn decrement_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(product_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Envelope<QuantityResult>>), ApiError> {
    let quantity = merch_db::decrement_cart_item(&state.pool, user.0.id, product_id)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::new("not_found", "no cart line for that product"))?;

    Ok(ok(QuantityResult {
        product_id,
        quantity,
    }))
}

/// DELETE /api/v1/cart/items/{product_id} — drop the line regardless of quantity.
pub(super) async fn delete_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(product_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Envelope<&'static str>>), ApiError> {
    let removed = merch_db::delete_cart_item(&state.pool, user.0.id, product_id)
        .await
        .map_err(|e| map_db_error(&e))?;

    if removed {
        Ok(ok("cart line removed"))
    } else {
        Err(ApiError::new("not_found", "no cart line for that product"))
    }
}
