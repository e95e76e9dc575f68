use serde::Deserialize;

/// A payment entity as returned by `GET /v1/payments/{id}`.
///
/// `amount` is an integer in the currency's smallest unit (paise for INR).
#[derive(Debug, Clone, Deserialize)]
pub struct Payment {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    /// `created`, `authorized`, `captured`, `refunded`, or `failed`.
    pub status: String,
    /// Instrument used: `card`, `netbanking`, `upi`, `wallet`, ...
    pub method: String,
    pub order_id: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
}
