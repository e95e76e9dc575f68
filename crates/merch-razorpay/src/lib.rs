//! Client for the Razorpay payments API.
//!
//! Covers the two things order placement needs: fetching a captured payment
//! by id, and verifying the checkout signature Razorpay hands back to the
//! browser after a successful payment.

mod client;
mod error;
mod signature;
mod types;

pub use client::RazorpayClient;
pub use error::RazorpayError;
pub use signature::{compute_checkout_signature, verify_checkout_signature};
pub use types::Payment;
