use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

/// The authenticated user, stored as a request extension by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Arc<merch_db::UserRow>);

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User public id.
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}

/// JWT verification settings plus the pool used to load the token's subject.
#[derive(Clone)]
pub struct AuthState {
    pool: PgPool,
    decoding_key: Arc<DecodingKey>,
}

impl AuthState {
    #[must_use]
    pub fn new(pool: PgPool, jwt_secret: &str) -> Self {
        Self {
            pool,
            decoding_key: Arc::new(DecodingKey::from_secret(jwt_secret.as_bytes())),
        }
    }

    /// Decodes and validates an access token, returning its claims.
    ///
    /// Malformed, expired, and badly-signed tokens all fail identically.
    fn verify(&self, token: &str) -> Option<Claims> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .ok()
    }
}

/// Signs a short-lived HS256 access token for a user.
///
/// Token minting lives with whatever front door handles login; this helper
/// exists for tests and operational tooling.
///
/// # Errors
///
/// Returns [`jsonwebtoken::errors::Error`] if encoding fails.
pub fn sign_access_token(
    jwt_secret: &str,
    user_public_id: Uuid,
    ttl_secs: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_public_id,
        exp: now + ttl_secs,
        iat: now,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    status: &'static str,
    #[serde(rename = "statusCode")]
    status_code: u16,
    result: &'static str,
}

fn middleware_error(status: StatusCode, message: &'static str) -> Response {
    (
        status,
        Json(MiddlewareErrorBody {
            status: "error",
            status_code: status.as_u16(),
            result: message,
        }),
    )
        .into_response()
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Set on the response as the `x-request-id` header
/// - Recorded on a span wrapping the handler, so log events emitted while
///   serving the request carry it
pub async fn request_id(req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    let span = tracing::info_span!(
        "request",
        request_id = %id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let mut res = next.run(req).instrument(span).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing bearer-token access on protected routes.
///
/// Verifies the JWT, loads the subject's user row (exactly one database
/// read), and inserts [`CurrentUser`] into request extensions. Absent or
/// invalid tokens yield 401; a verified token whose subject no longer exists
/// yields 404.
pub async fn require_auth(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer_token(req.headers().get(AUTHORIZATION)) else {
        return middleware_error(StatusCode::UNAUTHORIZED, "missing bearer token");
    };

    let Some(claims) = auth.verify(token) else {
        return middleware_error(StatusCode::UNAUTHORIZED, "invalid or expired token");
    };

    let user = match merch_db::get_user_by_public_id(&auth.pool, claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => return middleware_error(StatusCode::NOT_FOUND, "user not found"),
        Err(e) => {
            tracing::error!(error = %e, "user lookup failed during auth");
            return middleware_error(StatusCode::INTERNAL_SERVER_ERROR, "user lookup failed");
        }
    };

    req.extensions_mut().insert(CurrentUser(Arc::new(user)));
    next.run(req).await
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
