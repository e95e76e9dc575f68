mod carts;
mod coupons;
mod orders;
mod products;
mod wishlists;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{request_id, require_auth, AuthState};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub razorpay: Arc<merch_razorpay::RazorpayClient>,
    pub shiprocket: Arc<merch_shiprocket::ShiprocketClient>,
}

/// The uniform response envelope every route answers with:
/// `{status, statusCode, result}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: &'static str,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub result: T,
}

/// Wraps a payload in a success envelope with the given HTTP status.
pub(super) fn ok_with<T: Serialize>(status: StatusCode, result: T) -> (StatusCode, Json<Envelope<T>>) {
    (
        status,
        Json(Envelope {
            status: "ok",
            status_code: status.as_u16(),
            result,
        }),
    )
}

/// Wraps a payload in a 200 envelope.
pub(super) fn ok<T: Serialize>(result: T) -> (StatusCode, Json<Envelope<T>>) {
    ok_with(StatusCode::OK, result)
}

/// An error destined for the envelope: a machine code choosing the HTTP
/// status and a human-readable message placed in `result`.
#[derive(Debug)]
pub struct ApiError {
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.code {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Envelope {
            status: "error",
            status_code: status.as_u16(),
            result: self.message,
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    server: &'static str,
    database: &'static str,
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(error: &merch_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new("internal_error", "database query failed")
}

/// Maps a unique-constraint violation (Postgres 23505) to a 409; everything
/// else falls through to the generic database error.
pub(super) fn map_unique_violation(
    error: &merch_db::DbError,
    conflict_message: &'static str,
) -> ApiError {
    if let merch_db::DbError::Sqlx(sqlx::Error::Database(db_err)) = error {
        if db_err.code().as_deref() == Some("23505") {
            return ApiError::new("conflict", conflict_message);
        }
    }
    map_db_error(error)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/products", post(products::create_product))
        .route(
            "/api/v1/products/{public_id}",
            axum::routing::patch(products::update_product).delete(products::delete_product),
        )
        .route("/api/v1/cart", get(carts::get_cart))
        .route("/api/v1/cart/items", post(carts::add_item))
        .route(
            "/api/v1/cart/items/{product_id}/decrement",
            post(carts::decrement_item),
        )
        .route(
            "/api/v1/cart/items/{product_id}",
            delete(carts::delete_item),
        )
        .route("/api/v1/wishlist", get(wishlists::get_wishlist))
        .route("/api/v1/wishlist/items", post(wishlists::add_item))
        .route(
            "/api/v1/wishlist/items/{product_id}",
            delete(wishlists::remove_item),
        )
        .route(
            "/api/v1/coupons",
            get(coupons::list_coupons).post(coupons::create_coupon),
        )
        .route("/api/v1/coupons/validate", post(coupons::validate_coupon))
        .route("/api/v1/coupons/{code}", delete(coupons::delete_coupon))
        .route(
            "/api/v1/orders",
            get(orders::list_orders).post(orders::place_order),
        )
        .route("/api/v1/orders/{public_id}", get(orders::get_order))
        .layer(axum::middleware::from_fn_with_state(auth, require_auth))
}

pub fn build_app(state: AppState, auth: AuthState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/products", get(products::list_products))
        .route("/api/v1/products/{public_id}", get(products::get_product));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match merch_db::health_check(&state.pool).await {
        Ok(()) => ok(HealthData {
            server: "ok",
            database: "ok",
        }),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            ok_with(
                StatusCode::SERVICE_UNAVAILABLE,
                HealthData {
                    server: "degraded",
                    database: "unavailable",
                },
            )
        }
    }
}
