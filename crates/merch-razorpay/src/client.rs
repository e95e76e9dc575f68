use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::RazorpayError;
use crate::types::Payment;

const DEFAULT_BASE_URL: &str = "https://api.razorpay.com/";

/// Client for the Razorpay REST API.
///
/// Authenticates with HTTP basic auth (key id / key secret). Use
/// [`RazorpayClient::new`] for production or
/// [`RazorpayClient::with_base_url`] to point at a mock server in tests.
pub struct RazorpayClient {
    client: Client,
    key_id: String,
    key_secret: String,
    base_url: Url,
}

impl RazorpayClient {
    /// Creates a new client pointed at the production Razorpay API.
    ///
    /// # Errors
    ///
    /// Returns [`RazorpayError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(key_id: &str, key_secret: &str, timeout_secs: u64) -> Result<Self, RazorpayError> {
        Self::with_base_url(key_id, key_secret, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`RazorpayError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`RazorpayError::ApiError`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        key_id: &str,
        key_secret: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, RazorpayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("merch/0.1 (storefront)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| RazorpayError::ApiError(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            key_id: key_id.to_owned(),
            key_secret: key_secret.to_owned(),
            base_url,
        })
    }

    /// The key secret this client was built with; also keys checkout
    /// signature verification.
    #[must_use]
    pub fn key_secret(&self) -> &str {
        &self.key_secret
    }

    /// Fetches a payment by id via `GET /v1/payments/{id}`.
    ///
    /// The order flow calls this after signature verification to learn the
    /// instrument actually used (`method`).
    ///
    /// # Errors
    ///
    /// - [`RazorpayError::ApiError`] if Razorpay returns an error envelope.
    /// - [`RazorpayError::Http`] on network failure or non-2xx HTTP status.
    /// - [`RazorpayError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn fetch_payment(&self, payment_id: &str) -> Result<Payment, RazorpayError> {
        let url = self
            .base_url
            .join(&format!("v1/payments/{payment_id}"))
            .map_err(|e| RazorpayError::ApiError(format!("invalid payment id: {e}")))?;

        let response = self
            .client
            .get(url.clone())
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await?;

        // Razorpay signals errors with a 4xx status and a JSON error envelope;
        // surface its description rather than the bare status line.
        if !response.status().is_success() {
            let status = response.status();
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let description = body
                .get("error")
                .and_then(|e| e.get("description"))
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown error");
            return Err(RazorpayError::ApiError(format!("{status}: {description}")));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| RazorpayError::Deserialize {
            context: format!("fetch_payment(id={payment_id})"),
            source: e,
        })
    }
}
