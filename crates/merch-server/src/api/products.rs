//! Catalog handlers: public reads plus protected create/update/delete.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    map_db_error, map_unique_violation, normalize_limit, ok, ok_with, ApiError, AppState, Envelope,
};

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct ProductItem {
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub discount_percent: i16,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<merch_db::ProductRow> for ProductItem {
    fn from(row: merch_db::ProductRow) -> Self {
        Self {
            product_id: row.public_id,
            sku: row.sku,
            name: row.name,
            description: row.description,
            price: row.price,
            discount_percent: row.discount_percent,
            image_url: row.image_url,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateProductRequest {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub discount_percent: Option<i16>,
    pub image_url: Option<String>,
}

// Option<Option<T>> is intentional: outer None = "not in request" (keep current),
// Some(None) = "explicitly cleared", Some(Some(v)) = "set to value" (PATCH semantics).
#[allow(clippy::option_option)]
#[derive(Debug, Deserialize)]
pub(super) struct UpdateProductRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub price: Option<Decimal>,
    pub discount_percent: Option<i16>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
}

// Serde folds a JSON null into the outer Option, losing the distinction
// between an absent field and an explicit null. Wrapping the inner value in
// Some whenever the field is present restores it.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn validate_name(value: &str) -> Result<(), ApiError> {
    if value.is_empty() || value.chars().count() > 200 {
        return Err(ApiError::new(
            "validation_error",
            "name must be 1–200 characters",
        ));
    }
    Ok(())
}

fn validate_price(value: Decimal) -> Result<(), ApiError> {
    if value < Decimal::ZERO {
        return Err(ApiError::new(
            "validation_error",
            "price must not be negative",
        ));
    }
    Ok(())
}

fn validate_discount(value: i16) -> Result<(), ApiError> {
    if matches!(value, 0..=100) {
        Ok(())
    } else {
        Err(ApiError::new(
            "validation_error",
            format!("discount_percent must be 0–100, got {value}"),
        ))
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/products — list active products.
pub(super) async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<(StatusCode, Json<Envelope<Vec<ProductItem>>>), ApiError> {
    let rows = merch_db::list_active_products(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok(ok(rows.into_iter().map(ProductItem::from).collect()))
}

/// GET /api/v1/products/{public_id} — fetch one active product.
pub(super) async fn get_product(
    State(state): State<AppState>,
    Path(public_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Envelope<ProductItem>>), ApiError> {
    let row = merch_db::get_product_by_public_id(&state.pool, public_id)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::new("not_found", "product not found"))?;

    Ok(ok(ProductItem::from(row)))
}

/// POST /api/v1/products — create a product.
pub(super) async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Envelope<ProductItem>>), ApiError> {
    let name = body.name.trim().to_owned();
    validate_name(&name)?;
    validate_price(body.price)?;
    let discount_percent = body.discount_percent.unwrap_or(0);
    validate_discount(discount_percent)?;

    let sku = body.sku.trim().to_owned();
    if sku.is_empty() {
        return Err(ApiError::new("validation_error", "sku must not be empty"));
    }

    let row = merch_db::create_product(
        &state.pool,
        &sku,
        &name,
        body.description.as_deref(),
        body.price,
        discount_percent,
        body.image_url.as_deref(),
    )
    .await
    .map_err(|e| map_unique_violation(&e, "a product with that SKU already exists"))?;

    Ok(ok_with(StatusCode::CREATED, ProductItem::from(row)))
}

/// PATCH /api/v1/products/{public_id} — partial update.
pub(super) async fn update_product(
    State(state): State<AppState>,
    Path(public_id): Path<Uuid>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<(StatusCode, Json<Envelope<ProductItem>>), ApiError> {
    if let Some(ref name) = body.name {
        validate_name(name.trim())?;
    }
    if let Some(price) = body.price {
        validate_price(price)?;
    }
    if let Some(discount) = body.discount_percent {
        validate_discount(discount)?;
    }

    let row = merch_db::update_product(
        &state.pool,
        public_id,
        body.name.as_deref(),
        body.description.as_ref().map(Option::as_deref),
        body.price,
        body.discount_percent,
        body.image_url.as_ref().map(Option::as_deref),
    )
    .await
    .map_err(|e| map_db_error(&e))?
    .ok_or_else(|| ApiError::new("not_found", "product not found"))?;

    Ok(ok(ProductItem::from(row)))
}

/// DELETE /api/v1/products/{public_id} — soft delete.
pub(super) async fn delete_product(
    State(state): State<AppState>,
    Path(public_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Envelope<&'static str>>), ApiError> {
    let removed = merch_db::deactivate_product(&state.pool, public_id)
        .await
        .map_err(|e| map_db_error(&e))?;

    if removed {
        Ok(ok("product deleted"))
    } else {
        Err(ApiError::new("not_found", "product not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_length_counts_characters_not_bytes() {
        // 150 three-byte characters must pass the 200-character cap.
        let multibyte = "ナ".repeat(150);
        assert!(validate_name(&multibyte).is_ok());
        assert!(validate_name(&"a".repeat(200)).is_ok());
        assert!(validate_name(&"a".repeat(201)).is_err());
        assert!(validate_name("").is_err());
    }
}
