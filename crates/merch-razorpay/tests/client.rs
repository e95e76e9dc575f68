//! Integration tests for `RazorpayClient` using wiremock HTTP mocks.

use merch_razorpay::{RazorpayClient, RazorpayError};
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> RazorpayClient {
    RazorpayClient::with_base_url("rzp_test_key", "rzp_test_secret", 30, base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn fetch_payment_returns_parsed_payment() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "id": "pay_29QQoUBi66xm2f",
        "entity": "payment",
        "amount": 50000,
        "currency": "INR",
        "status": "captured",
        "method": "upi",
        "order_id": "order_9A33XWu170gUtm",
        "email": "buyer@example.com",
        "contact": "+919999999999"
    });

    Mock::given(method("GET"))
        .and(path("/v1/payments/pay_29QQoUBi66xm2f"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let payment = client
        .fetch_payment("pay_29QQoUBi66xm2f")
        .await
        .expect("should parse payment");

    assert_eq!(payment.id, "pay_29QQoUBi66xm2f");
    assert_eq!(payment.amount, 50_000);
    assert_eq!(payment.currency, "INR");
    assert_eq!(payment.status, "captured");
    assert_eq!(payment.method, "upi");
    assert_eq!(payment.order_id.as_deref(), Some("order_9A33XWu170gUtm"));
}

#[tokio::test]
async fn fetch_payment_surfaces_api_error_description() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "error": {
            "code": "BAD_REQUEST_ERROR",
            "description": "The id provided does not exist"
        }
    });

    Mock::given(method("GET"))
        .and(path("/v1/payments/pay_missing"))
        .respond_with(ResponseTemplate::new(400).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch_payment("pay_missing")
        .await
        .expect_err("should fail");

    match err {
        RazorpayError::ApiError(msg) => {
            assert!(
                msg.contains("The id provided does not exist"),
                "unexpected message: {msg}"
            );
        }
        other => panic!("expected ApiError, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_payment_rejects_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/payments/pay_garbled"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not-json"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch_payment("pay_garbled")
        .await
        .expect_err("should fail");

    assert!(matches!(err, RazorpayError::Deserialize { .. }));
}
