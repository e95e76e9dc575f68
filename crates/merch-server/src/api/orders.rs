//! Order placement and retrieval.
//!
//! Placement is a single pass with no intermediate persistence: validate the
//! checkout fields, verify the gateway signature, confirm the payment,
//! rebuild line items from stored prices, register the shipment with the
//! carrier, then insert the order row. Every failure branch before the final
//! insert leaves the database untouched. There is no compensating action for
//! a payment already captured upstream when a later step fails; that gap is
//! logged and surfaces as a 500.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::CurrentUser;

use super::{map_db_error, normalize_limit, ok, ok_with, ApiError, AppState, Envelope};

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

/// Checkout fields as posted by the storefront after a gateway checkout.
///
/// All fields are `Option` so presence can be checked explicitly and
/// reported through the envelope rather than as a serde rejection.
#[derive(Debug, Deserialize)]
pub(super) struct PlaceOrderRequest {
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub amount: Option<Decimal>,
    pub cart: Option<Vec<CartEntry>>,
    pub address: Option<AddressInput>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CartEntry {
    pub product_id: Uuid,
    pub quantity: u32,
}

/// Shipping address as supplied with the order. Each field falls back to the
/// user's stored profile when absent.
#[derive(Debug, Default, Deserialize)]
pub(super) struct AddressInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct OrderPlaced {
    pub order_id: Uuid,
    pub carrier_order_id: String,
    pub created_at: DateTime<Utc>,
    pub payment_method: String,
}

#[derive(Debug, Serialize)]
pub(super) struct OrderSummary {
    pub order_id: Uuid,
    pub carrier_order_id: String,
    pub order_status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub subtotal: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<merch_db::OrderRow> for OrderSummary {
    fn from(row: merch_db::OrderRow) -> Self {
        Self {
            order_id: row.public_id,
            carrier_order_id: row.carrier_order_id,
            order_status: row.order_status,
            payment_status: row.payment_status,
            payment_method: row.payment_method,
            subtotal: row.subtotal,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct OrderLineItem {
    pub name: String,
    pub sku: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub(super) struct OrderDetail {
    #[serde(flatten)]
    pub summary: OrderSummary,
    pub items: Vec<OrderLineItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OrderQuery {
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn require<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::new("bad_request", format!("missing required field: {field}")))
}

struct Shipping {
    name: String,
    email: String,
    phone: String,
    address_line1: String,
    address_line2: Option<String>,
    city: String,
    state: String,
    zip: String,
    country: String,
}

/// Overlays the request address onto the user's stored profile. The request
/// value wins; a field present in neither is a 400.
fn resolve_shipping(address: AddressInput, user: &merch_db::UserRow) -> Result<Shipping, ApiError> {
    let pick = |req: Option<String>, profile: Option<&str>, field: &str| -> Result<String, ApiError> {
        req.filter(|s| !s.trim().is_empty())
            .or_else(|| profile.map(ToOwned::to_owned))
            .ok_or_else(|| {
                ApiError::new("bad_request", format!("missing shipping field: {field}"))
            })
    };

    Ok(Shipping {
        name: pick(address.name, Some(&user.name), "name")?,
        email: pick(address.email, Some(&user.email), "email")?,
        phone: pick(address.phone, user.phone.as_deref(), "phone")?,
        address_line1: pick(
            address.address_line1,
            user.address_line1.as_deref(),
            "address_line1",
        )?,
        address_line2: address.address_line2.or_else(|| user.address_line2.clone()),
        city: pick(address.city, user.city.as_deref(), "city")?,
        state: pick(address.state, user.state.as_deref(), "state")?,
        zip: pick(address.zip, user.zip.as_deref(), "zip")?,
        country: pick(address.country, user.country.as_deref(), "country")?,
    })
}

/// Splits a full name into (first, last) on the final whitespace.
fn split_name(full: &str) -> (String, String) {
    match full.trim().rsplit_once(' ') {
        Some((first, last)) => (first.to_owned(), last.to_owned()),
        None => (full.trim().to_owned(), String::new()),
    }
}

/// Maps gateway instrument codes to display strings.
fn normalize_payment_method(method: &str) -> String {
    match method {
        "upi" => "UPI".to_owned(),
        "card" => "Card".to_owned(),
        "netbanking" => "Net Banking".to_owned(),
        "wallet" => "Wallet".to_owned(),
        "emi" => "EMI".to_owned(),
        other => other.to_owned(),
    }
}

fn map_gateway_error(error: &merch_razorpay::RazorpayError) -> ApiError {
    tracing::error!(error = %error, "payment gateway call failed");
    ApiError::new("internal_error", "payment gateway call failed")
}

fn map_carrier_error(error: &merch_shiprocket::ShiprocketError) -> ApiError {
    // The payment is already captured at this point; nothing local records it.
    tracing::error!(error = %error, "carrier registration failed after payment capture");
    ApiError::new("internal_error", "carrier registration failed")
}

// Parcel defaults sent to the carrier; dimensions in cm, weight in kg.
const PARCEL_LENGTH_CM: Decimal = Decimal::from_parts(10, 0, 0, false, 0);
const PARCEL_BREADTH_CM: Decimal = Decimal::from_parts(10, 0, 0, false, 0);
const PARCEL_HEIGHT_CM: Decimal = Decimal::from_parts(5, 0, 0, false, 0);
const PARCEL_WEIGHT_KG: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/orders — verify a checkout payment and persist the order.
pub(super) async fn place_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Envelope<OrderPlaced>>), ApiError> {
    // 1. Presence checks; nothing has side effects before these pass.
    let gateway_order_id = require(body.razorpay_order_id, "razorpay_order_id")?;
    let gateway_payment_id = require(body.razorpay_payment_id, "razorpay_payment_id")?;
    let signature = require(body.razorpay_signature, "razorpay_signature")?;
    let amount = require(body.amount, "amount")?;
    let cart = require(body.cart, "cart")?;
    let address = require(body.address, "address")?;

    if cart.is_empty() {
        return Err(ApiError::new("bad_request", "cart must not be empty"));
    }
    if cart.iter().any(|entry| entry.quantity == 0) {
        return Err(ApiError::new(
            "bad_request",
            "cart quantities must be at least 1",
        ));
    }

    let shipping = resolve_shipping(address, &user.0)?;

    // 2. Signature check, constant-time.
    if !merch_razorpay::verify_checkout_signature(
        state.razorpay.key_secret(),
        &gateway_order_id,
        &gateway_payment_id,
        &signature,
    ) {
        return Err(ApiError::new(
            "bad_request",
            "payment signature verification failed",
        ));
    }

    // 3. Confirm the payment with the gateway to learn the instrument used.
    let payment = state
        .razorpay
        .fetch_payment(&gateway_payment_id)
        .await
        .map_err(|e| map_gateway_error(&e))?;
    let payment_method = normalize_payment_method(&payment.method);

    // 4. Rebuild line items from stored prices; any vanished product aborts
    //    the whole order.
    let mut items = Vec::with_capacity(cart.len());
    for entry in &cart {
        let product = merch_db::get_product_by_public_id(&state.pool, entry.product_id)
            .await
            .map_err(|e| map_db_error(&e))?
            .ok_or_else(|| {
                ApiError::new(
                    "not_found",
                    format!("product {} is no longer available", entry.product_id),
                )
            })?;

        let total_amount =
            merch_core::money::line_total(product.price, entry.quantity, product.discount_percent);
        items.push(merch_db::NewOrderItem {
            product_id: product.id,
            name: product.name,
            sku: product.sku,
            quantity: i32::try_from(entry.quantity).map_err(|_| {
                ApiError::new("bad_request", "cart quantity exceeds supported range")
            })?,
            unit_price: product.price,
            total_amount,
        });
    }

    let totals: Vec<Decimal> = items.iter().map(|i| i.total_amount).collect();
    let subtotal = merch_core::money::subtotal(&totals);

    // 5. Register the shipment. Failure here aborts with nothing persisted.
    let (first_name, last_name) = split_name(&shipping.name);
    let now = Utc::now();
    let carrier_request = merch_shiprocket::ShipmentOrderRequest {
        order_id: format!("merch-{}", Uuid::new_v4()),
        order_date: now.format("%Y-%m-%d %H:%M").to_string(),
        billing_customer_name: first_name,
        billing_last_name: last_name,
        billing_address: shipping.address_line1.clone(),
        billing_address_2: shipping.address_line2.clone(),
        billing_city: shipping.city.clone(),
        billing_state: shipping.state.clone(),
        billing_pincode: shipping.zip.clone(),
        billing_country: shipping.country.clone(),
        billing_email: shipping.email.clone(),
        billing_phone: shipping.phone.clone(),
        shipping_is_billing: true,
        order_items: items
            .iter()
            .map(|item| merch_shiprocket::ShipmentItem {
                name: item.name.clone(),
                sku: item.sku.clone(),
                units: u32::try_from(item.quantity).unwrap_or(0),
                selling_price: item.unit_price,
            })
            .collect(),
        payment_method: "Prepaid".to_owned(),
        sub_total: subtotal,
        length: PARCEL_LENGTH_CM,
        breadth: PARCEL_BREADTH_CM,
        height: PARCEL_HEIGHT_CM,
        weight: PARCEL_WEIGHT_KG,
    };

    let shipment = state
        .shiprocket
        .create_order(&carrier_request)
        .await
        .map_err(|e| map_carrier_error(&e))?;

    // 6. Persist order + items in one transaction. The payment is treated as
    //    settled once the signature and gateway fetch both passed.
    let order = merch_db::create_order(
        &state.pool,
        &merch_db::NewOrder {
            user_id: user.0.id,
            carrier_order_id: shipment.order_id.to_string(),
            payment_status: merch_core::PaymentStatus::Completed.to_string(),
            payment_id: gateway_payment_id,
            payment_order_id: gateway_order_id,
            payment_amount: amount,
            payment_method: payment_method.clone(),
            payment_date: now,
            ship_name: shipping.name,
            ship_email: shipping.email,
            ship_phone: shipping.phone,
            ship_address_line1: shipping.address_line1,
            ship_address_line2: shipping.address_line2,
            ship_city: shipping.city,
            ship_state: shipping.state,
            ship_zip: shipping.zip,
            ship_country: shipping.country,
            subtotal,
            items,
        },
    )
    .await
    .map_err(|e| map_db_error(&e))?;

    // 7. Minimal summary back to the storefront.
    Ok(ok_with(
        StatusCode::CREATED,
        OrderPlaced {
            order_id: order.public_id,
            carrier_order_id: order.carrier_order_id,
            created_at: order.created_at,
            payment_method,
        },
    ))
}

/// GET /api/v1/orders — the caller's orders, newest first, items included.
pub(super) async fn list_orders(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<OrderQuery>,
) -> Result<(StatusCode, Json<Envelope<Vec<OrderDetail>>>), ApiError> {
    let rows = merch_db::list_orders_for_user(&state.pool, user.0.id, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(&e))?;

    let order_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let mut items_by_order: std::collections::HashMap<i64, Vec<OrderLineItem>> =
        std::collections::HashMap::new();
    for item in merch_db::list_order_items(&state.pool, &order_ids)
        .await
        .map_err(|e| map_db_error(&e))?
    {
        items_by_order
            .entry(item.order_id)
            .or_default()
            .push(OrderLineItem {
                name: item.name,
                sku: item.sku,
                quantity: item.quantity,
                unit_price: item.unit_price,
                total_amount: item.total_amount,
            });
    }

    Ok(ok(rows
        .into_iter()
        .map(|row| {
            let items = items_by_order.remove(&row.id).unwrap_or_default();
            OrderDetail {
                summary: OrderSummary::from(row),
                items,
            }
        })
        .collect()))
}

/// GET /api/v1/orders/{public_id} — one of the caller's orders with items.
pub(super) async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(public_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Envelope<OrderDetail>>), ApiError> {
    let (order, items) = merch_db::get_order_for_user(&state.pool, user.0.id, public_id)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::new("not_found", "order not found"))?;

    Ok(ok(OrderDetail {
        summary: OrderSummary::from(order),
        items: items
            .into_iter()
            .map(|item| OrderLineItem {
                name: item.name,
                sku: item.sku,
                quantity: item.quantity,
                unit_price: item.unit_price,
                total_amount: item.total_amount,
            })
            .collect(),
    }))
}
