//! Coupon handlers: advisory validation plus management CRUD.
//!
//! Validation only confirms the coupon applies at the given cart total; the
//! checkout pipeline recomputes discounts itself and never trusts a client
//! figure derived from this endpoint.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{map_db_error, map_unique_violation, ok, ok_with, ApiError, AppState, Envelope};

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct CouponItem {
    pub code: String,
    pub discount_percentage: Decimal,
    pub max_discount_amount: Option<Decimal>,
    pub min_order_amount: Decimal,
}

impl From<merch_db::CouponRow> for CouponItem {
    fn from(row: merch_db::CouponRow) -> Self {
        Self {
            code: row.code,
            discount_percentage: row.discount_percentage,
            max_discount_amount: row.max_discount_amount,
            min_order_amount: row.min_order_amount,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ValidateCouponRequest {
    pub code: String,
    pub cart_total: Option<Decimal>,
}

/// Validation result with the nullable fields normalized: a missing cap
/// defaults to the percentage value, a missing minimum to zero.
#[derive(Debug, Serialize)]
pub(super) struct ValidatedCoupon {
    pub code: String,
    pub discount_percentage: Decimal,
    pub max_discount_amount: Decimal,
    pub min_order_amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateCouponRequest {
    pub code: String,
    pub discount_percentage: Decimal,
    pub max_discount_amount: Option<Decimal>,
    pub min_order_amount: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/coupons/validate — advisory coupon check.
pub(super) async fn validate_coupon(
    State(state): State<AppState>,
    Json(body): Json<ValidateCouponRequest>,
) -> Result<(StatusCode, Json<Envelope<ValidatedCoupon>>), ApiError> {
    let code = body.code.trim().to_uppercase();
    if code.is_empty() {
        return Err(ApiError::new("validation_error", "code must not be empty"));
    }

    let coupon = merch_db::get_coupon_by_code(&state.pool, &code)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::new("not_found", "coupon not found"))?;

    if let Some(cart_total) = body.cart_total {
        if cart_total < coupon.min_order_amount {
            return Err(ApiError::new(
                "bad_request",
                format!(
                    "cart total must be at least {} to use this coupon",
                    coupon.min_order_amount
                ),
            ));
        }
    }

    Ok(ok(ValidatedCoupon {
        code: coupon.code,
        discount_percentage: coupon.discount_percentage,
        max_discount_amount: coupon
            .max_discount_amount
            .unwrap_or(coupon.discount_percentage),
        min_order_amount: coupon.min_order_amount,
    }))
}

/// GET /api/v1/coupons — list all coupons.
pub(super) async fn list_coupons(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Envelope<Vec<CouponItem>>>), ApiError> {
    let rows = merch_db::list_coupons(&state.pool)
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok(ok(rows.into_iter().map(CouponItem::from).collect()))
}

/// POST /api/v1/coupons — create a coupon; the code is stored uppercase.
pub(super) async fn create_coupon(
    State(state): State<AppState>,
    Json(body): Json<CreateCouponRequest>,
) -> Result<(StatusCode, Json<Envelope<CouponItem>>), ApiError> {
    let code = body.code.trim().to_uppercase();
    if code.is_empty() {
        return Err(ApiError::new("validation_error", "code must not be empty"));
    }
    if body.discount_percentage < Decimal::ZERO || body.discount_percentage > Decimal::ONE_HUNDRED {
        return Err(ApiError::new(
            "validation_error",
            "discount_percentage must be 0–100",
        ));
    }

    let row = merch_db::create_coupon(
        &state.pool,
        &code,
        body.discount_percentage,
        body.max_discount_amount,
        body.min_order_amount.unwrap_or(Decimal::ZERO),
    )
    .await
    .map_err(|e| map_unique_violation(&e, "a coupon with that code already exists"))?;

    Ok(ok_with(StatusCode::CREATED, CouponItem::from(row)))
}

/// DELETE /api/v1/coupons/{code} — remove a coupon by code.
pub(super) async fn delete_coupon(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<(StatusCode, Json<Envelope<&'static str>>), ApiError> {
    let removed = merch_db::delete_coupon(&state.pool, &code.trim().to_uppercase())
        .await
        .map_err(|e| map_db_error(&e))?;

    if removed {
        Ok(ok("coupon deleted"))
    } else {
        Err(ApiError::new("not_found", "coupon not found"))
    }
}
