use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};

use crate::error::ShiprocketError;
use crate::types::{ShipmentOrderRequest, ShipmentOrderResponse};

const DEFAULT_BASE_URL: &str = "https://apiv2.shiprocket.in/";

// Shiprocket issues 10-day tokens; refresh a day early so an in-flight
// request never carries a token right at the expiry boundary.
const TOKEN_TTL_DAYS: i64 = 9;

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
    message: Option<String>,
}

/// Client for the Shiprocket external API.
///
/// Logs in lazily with the configured credentials and caches the bearer
/// token process-wide until its refresh window lapses.
pub struct ShiprocketClient {
    client: Client,
    email: String,
    password: String,
    base_url: Url,
    token: RwLock<Option<CachedToken>>,
    refresh: Mutex<()>,
}

impl ShiprocketClient {
    /// Creates a new client pointed at the production Shiprocket API.
    ///
    /// # Errors
    ///
    /// Returns [`ShiprocketError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(email: &str, password: &str, timeout_secs: u64) -> Result<Self, ShiprocketError> {
        Self::with_base_url(email, password, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ShiprocketError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ShiprocketError::ApiError`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        email: &str,
        password: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ShiprocketError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("merch/0.1 (storefront)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| {
            ShiprocketError::ApiError(format!("invalid base URL '{base_url}': {e}"))
        })?;

        Ok(Self {
            client,
            email: email.to_owned(),
            password: password.to_owned(),
            base_url,
            token: RwLock::new(None),
            refresh: Mutex::new(()),
        })
    }

    /// Registers a shipment order via `POST /v1/external/orders/create/adhoc`.
    ///
    /// Logs in first if no unexpired token is cached. A single attempt; no
    /// retry on failure.
    ///
    /// # Errors
    ///
    /// - [`ShiprocketError::Auth`] if login is rejected.
    /// - [`ShiprocketError::ApiError`] if order creation returns non-2xx.
    /// - [`ShiprocketError::Http`] on network failure.
    /// - [`ShiprocketError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn create_order(
        &self,
        request: &ShipmentOrderRequest,
    ) -> Result<ShipmentOrderResponse, ShiprocketError> {
        let token = self.bearer_token().await?;

        let url = self
            .base_url
            .join("v1/external/orders/create/adhoc")
            .map_err(|e| ShiprocketError::ApiError(format!("invalid endpoint: {e}")))?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&token)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown error");
            return Err(ShiprocketError::ApiError(format!("{status}: {message}")));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ShiprocketError::Deserialize {
            context: format!("create_order(order_id={})", request.order_id),
            source: e,
        })
    }

    /// Returns the cached token, logging in when none is cached or the
    /// refresh window has lapsed.
    ///
    /// Refreshes are serialized: concurrent callers hitting a stale cache
    /// wait on the first login instead of each issuing their own.
    async fn bearer_token(&self) -> Result<String, ShiprocketError> {
        if let Some(token) = self.fresh_token().await {
            return Ok(token);
        }

        let _refresh = self.refresh.lock().await;

        // Another caller may have refreshed while we waited on the lock.
        if let Some(token) = self.fresh_token().await {
            return Ok(token);
        }

        let token = self.login().await?;

        let mut cached = self.token.write().await;
        *cached = Some(CachedToken {
            token: token.clone(),
            expires_at: Utc::now() + chrono::Duration::days(TOKEN_TTL_DAYS),
        });

        Ok(token)
    }

    async fn fresh_token(&self) -> Option<String> {
        let cached = self.token.read().await;
        cached
            .as_ref()
            .filter(|c| c.expires_at > Utc::now())
            .map(|c| c.token.clone())
    }

    /// Authenticates via `POST /v1/external/auth/login`.
    async fn login(&self) -> Result<String, ShiprocketError> {
        let url = self
            .base_url
            .join("v1/external/auth/login")
            .map_err(|e| ShiprocketError::ApiError(format!("invalid endpoint: {e}")))?;

        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({
                "email": self.email,
                "password": self.password,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("login rejected");
            return Err(ShiprocketError::Auth(format!("{status}: {message}")));
        }

        let body = response.text().await?;
        let login: LoginResponse =
            serde_json::from_str(&body).map_err(|e| ShiprocketError::Deserialize {
                context: "login".to_owned(),
                source: e,
            })?;

        login.token.ok_or_else(|| {
            ShiprocketError::Auth(
                login
                    .message
                    .unwrap_or_else(|| "login response carried no token".to_owned()),
            )
        })
    }
}
