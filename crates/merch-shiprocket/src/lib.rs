//! Client for the Shiprocket shipment API.
//!
//! Handles credentialed login with a cached bearer token and ad-hoc shipment
//! order creation. The token cache is the only cross-request mutable state in
//! the whole service.

mod client;
mod error;
mod types;

pub use client::ShiprocketClient;
pub use error::ShiprocketError;
pub use types::{ShipmentItem, ShipmentOrderRequest, ShipmentOrderResponse};
