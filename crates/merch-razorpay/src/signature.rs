//! Checkout signature verification.
//!
//! After a successful checkout, Razorpay returns `razorpay_signature`, an
//! HMAC-SHA256 over `"{order_id}|{payment_id}"` keyed with the account's key
//! secret, hex-encoded.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Computes the expected checkout signature for an (order, payment) pair.
///
/// Exposed so callers can mint valid signatures when simulating checkouts.
#[must_use]
pub fn compute_checkout_signature(key_secret: &str, order_id: &str, payment_id: &str) -> String {
    let payload = format!("{order_id}|{payment_id}");
    let mut mac = HmacSha256::new_from_slice(key_secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a checkout signature in constant time.
///
/// Returns `true` only when `supplied_signature` matches the expected
/// HMAC-SHA256 hex digest of `"{order_id}|{payment_id}"`.
#[must_use]
pub fn verify_checkout_signature(
    key_secret: &str,
    order_id: &str,
    payment_id: &str,
    supplied_signature: &str,
) -> bool {
    let expected = compute_checkout_signature(key_secret, order_id, payment_id);

    expected
        .as_bytes()
        .ct_eq(supplied_signature.as_bytes())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_key_secret";
    const ORDER_ID: &str = "order_IluGWxBm9U8zJ8";
    const PAYMENT_ID: &str = "pay_IluGWxBm9U8zJ8";

    #[test]
    fn accepts_a_valid_signature() {
        let sig = compute_checkout_signature(SECRET, ORDER_ID, PAYMENT_ID);
        assert!(verify_checkout_signature(SECRET, ORDER_ID, PAYMENT_ID, &sig));
    }

    #[test]
    fn rejects_a_signature_made_with_another_secret() {
        let sig = compute_checkout_signature("wrong_secret", ORDER_ID, PAYMENT_ID);
        assert!(!verify_checkout_signature(SECRET, ORDER_ID, PAYMENT_ID, &sig));
    }

    #[test]
    fn rejects_a_tampered_signature() {
        let mut sig = compute_checkout_signature(SECRET, ORDER_ID, PAYMENT_ID);
        // Flip the last hex character.
        let last = sig.pop().expect("non-empty signature");
        sig.push(if last == '0' { '1' } else { '0' });
        assert!(!verify_checkout_signature(SECRET, ORDER_ID, PAYMENT_ID, &sig));
    }

    #[test]
    fn rejects_a_signature_for_a_different_payment() {
        let sig = compute_checkout_signature(SECRET, ORDER_ID, "pay_other");
        assert!(!verify_checkout_signature(SECRET, ORDER_ID, PAYMENT_ID, &sig));
    }

    #[test]
    fn rejects_an_empty_signature() {
        assert!(!verify_checkout_signature(SECRET, ORDER_ID, PAYMENT_ID, ""));
    }
}
