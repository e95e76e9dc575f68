use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of a shipment order: SKU, units, and per-unit selling price.
#[derive(Debug, Clone, Serialize)]
pub struct ShipmentItem {
    pub name: String,
    pub sku: String,
    pub units: u32,
    pub selling_price: Decimal,
}

/// Body for `POST /v1/external/orders/create/adhoc`.
///
/// Billing fields double as shipping fields (`shipping_is_billing = true`);
/// the order flow fills them from the request address with the user profile
/// as fallback.
#[derive(Debug, Clone, Serialize)]
pub struct ShipmentOrderRequest {
    pub order_id: String,
    /// `YYYY-MM-DD HH:MM` in the seller's timezone.
    pub order_date: String,
    pub billing_customer_name: String,
    pub billing_last_name: String,
    pub billing_address: String,
    pub billing_address_2: Option<String>,
    pub billing_city: String,
    pub billing_state: String,
    pub billing_pincode: String,
    pub billing_country: String,
    pub billing_email: String,
    pub billing_phone: String,
    pub shipping_is_billing: bool,
    pub order_items: Vec<ShipmentItem>,
    pub payment_method: String,
    pub sub_total: Decimal,
    pub length: Decimal,
    pub breadth: Decimal,
    pub height: Decimal,
    pub weight: Decimal,
}

/// Response from shipment order creation.
#[derive(Debug, Clone, Deserialize)]
pub struct ShipmentOrderResponse {
    pub order_id: i64,
    pub shipment_id: i64,
    pub status: String,
}
