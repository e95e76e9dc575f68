//! Integration tests for `ShiprocketClient` using wiremock HTTP mocks.

use std::time::Duration;

use merch_shiprocket::{ShipmentItem, ShipmentOrderRequest, ShiprocketClient, ShiprocketError};
use rust_decimal_macros::dec;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ShiprocketClient {
    ShiprocketClient::with_base_url("ship@example.com", "ship-pass", 30, base_url)
        .expect("client construction should not fail")
}

fn sample_request() -> ShipmentOrderRequest {
    ShipmentOrderRequest {
        order_id: "merch-42".to_owned(),
        order_date: "2026-03-01 12:00".to_owned(),
        billing_customer_name: "Asha".to_owned(),
        billing_last_name: "Rao".to_owned(),
        billing_address: "12 MG Road".to_owned(),
        billing_address_2: None,
        billing_city: "Bengaluru".to_owned(),
        billing_state: "Karnataka".to_owned(),
        billing_pincode: "560001".to_owned(),
        billing_country: "India".to_owned(),
        billing_email: "asha@example.com".to_owned(),
        billing_phone: "+919999999999".to_owned(),
        shipping_is_billing: true,
        order_items: vec![ShipmentItem {
            name: "Tote Bag".to_owned(),
            sku: "TOTE-1".to_owned(),
            units: 2,
            selling_price: dec!(499.00),
        }],
        payment_method: "Prepaid".to_owned(),
        sub_total: dec!(998.00),
        length: dec!(10),
        breadth: dec!(10),
        height: dec!(5),
        weight: dec!(0.5),
    }
}

fn login_mock() -> Mock {
    Mock::given(method("POST"))
        .and(path("/v1/external/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "test-bearer-token"
        })))
}

#[tokio::test]
async fn create_order_logs_in_and_returns_ids() {
    let server = MockServer::start().await;
    login_mock().expect(1).mount(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/external/orders/create/adhoc"))
        .and(header("authorization", "Bearer test-bearer-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "order_id": 7_001,
            "shipment_id": 9_001,
            "status": "NEW"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let response = client
        .create_order(&sample_request())
        .await
        .expect("order creation should succeed");

    assert_eq!(response.order_id, 7_001);
    assert_eq!(response.shipment_id, 9_001);
    assert_eq!(response.status, "NEW");
}

#[tokio::test]
async fn create_order_reuses_cached_token_across_calls() {
    let server = MockServer::start().await;
    // expect(1): the second create_order must not log in again.
    login_mock().expect(1).mount(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/external/orders/create/adhoc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "order_id": 7_002,
            "shipment_id": 9_002,
            "status": "NEW"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client.create_order(&sample_request()).await.expect("first");
    client
        .create_order(&sample_request())
        .await
        .expect("second");
}

#[tokio::test]
async fn concurrent_calls_share_a_single_login() {
    let server = MockServer::start().await;
    // A slow login keeps both callers in the refresh path at once; expect(1)
    // verifies only one of them reaches the wire.
    Mock::given(method("POST"))
        .and(path("/v1/external/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(100))
                .set_body_json(serde_json::json!({
                    "token": "test-bearer-token"
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/external/orders/create/adhoc"))
        .and(header("authorization", "Bearer test-bearer-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "order_id": 7_003,
            "shipment_id": 9_003,
            "status": "NEW"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let first_request = sample_request();
    let second_request = sample_request();
    let (first, second) = tokio::join!(
        client.create_order(&first_request),
        client.create_order(&second_request)
    );
    first.expect("first concurrent order");
    second.expect("second concurrent order");
}

#[tokio::test]
async fn login_rejection_surfaces_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/external/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "Wrong Password"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .create_order(&sample_request())
        .await
        .expect_err("should fail");

    match err {
        ShiprocketError::Auth(msg) => {
            assert!(msg.contains("Wrong Password"), "unexpected message: {msg}");
        }
        other => panic!("expected Auth, got: {other:?}"),
    }
}

#[tokio::test]
async fn create_order_failure_surfaces_api_error() {
    let server = MockServer::start().await;
    login_mock().mount(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/external/orders/create/adhoc"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "message": "billing_pincode is invalid"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .create_order(&sample_request())
        .await
        .expect_err("should fail");

    match err {
        ShiprocketError::ApiError(msg) => {
            assert!(
                msg.contains("billing_pincode is invalid"),
                "unexpected message: {msg}"
            );
        }
        other => panic!("expected ApiError, got: {other:?}"),
    }
}
