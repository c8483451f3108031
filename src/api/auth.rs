//! Optional API key check on the `X-Api-Key` header.
//!
//! When [`ApiConfig::api_key`](crate::config::ApiConfig::api_key) is set, requests
//! without a matching header get a 401 with an [`ApiError`] body.

use crate::error::ApiError;
use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Middleware rejecting requests whose `X-Api-Key` does not match `expected_api_key`
///
/// # Examples
///
/// ```no_run
/// use axum::{Router, middleware};
/// use tidal_relay::api::auth::require_api_key;
///
/// let router: Router = Router::new().layer(middleware::from_fn_with_state(
///     Some("secret".to_string()),
///     require_api_key,
/// ));
/// ```
pub async fn require_api_key(
    State(expected_api_key): State<Option<String>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = expected_api_key else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(key) if constant_time_eq(key.as_bytes(), expected.as_bytes()) => next.run(request).await,
        Some(_) => {
            tracing::debug!(path = %request.uri().path(), "Rejected request with wrong API key");
            unauthorized("Invalid API key")
        }
        None => unauthorized("Missing X-Api-Key header"),
    }
}

/// Compares every byte regardless of where the first mismatch is
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(ApiError::unauthorized(message))).into_response()
}
