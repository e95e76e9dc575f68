//! Wishlist handlers: pure membership, no quantities.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::CurrentUser;

use super::{map_db_error, ok, ApiError, AppState, Envelope};

#[derive(Debug, Serialize)]
pub(super) struct WishlistLine {
    pub product_id: Uuid,
    pub name: String,
    pub sku: String,
    pub unit_price: Decimal,
    pub discount_percent: i16,
    pub image_url: Option<String>,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AddItemRequest {
    pub product_id: Uuid,
}

/// GET /api/v1/wishlist — the caller's wishlist, newest first.
pub(super) async fn get_wishlist(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<(StatusCode, Json<Envelope<Vec<WishlistLine>>>), ApiError> {
    let rows = merch_db::list_wishlist_items(&state.pool, user.0.id)
        .await
        .map_err(|e| map_db_error(&e))?;

    let lines = rows
        .into_iter()
        .map(|row| WishlistLine {
            product_id: row.product_id,
            name: row.product_name,
            sku: row.sku,
            unit_price: row.unit_price,
            discount_percent: row.discount_percent,
            image_url: row.image_url,
            added_at: row.added_at,
        })
        .collect();

    Ok(ok(lines))
}

/// POST /api/v1/wishlist/items — add a product; already-present is a no-op.
pub(super) async fn add_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<Envelope<&'static str>>), ApiError> {
    let added = merch_db::add_wishlist_item(&state.pool, user.0.id, body.product_id)
        .await
        .map_err(|e| map_db_error(&e))?;

    if added {
        Ok(ok("product wishlisted"))
    } else {
        Err(ApiError::new("not_found", "product not found"))
    }
}

/// DELETE /api/v1/wishlist/items/{product_id} — remove a product.
pub(super) async fn remove_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(product_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Envelope<&'static str>>), ApiError> {
    let removed = merch_db::remove_wishlist_item(&state.pool, user.0.id, product_id)
        .await
        .map_err(|e| map_db_error(&e))?;

    if removed {
        Ok(ok("product removed from wishlist"))
    } else {
        Err(ApiError::new("not_found", "product not on wishlist"))
    }
}
