use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use crate::app_state::AppState;
use crate::error::ServerError;

pub const ACCESS_KEY_HEADER: &str = "x-access-key";

#[derive(Deserialize)]
struct AccessKeyParams {
    code: Option<String>,
}

/// Admits requests carrying the configured key in the header or the `code` query parameter.
pub async fn require_access_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let from_header = request
        .headers()
        .get(ACCESS_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let presented = from_header.or_else(|| {
        Query::<AccessKeyParams>::try_from_uri(request.uri())
            .ok()
            .and_then(|Query(params)| params.code)
    });

    match presented {
        Some(key) if keys_match(key.as_bytes(), state.access_key.as_bytes()) => {
            next.run(request).await
        }
        _ => {
            debug!(path = %request.uri().path(), "Rejected request without a valid access key");
            ServerError::Unauthorized.into_response()
        }
    }
}

/// Compares every byte regardless of where the first mismatch is.
fn keys_match(presented: &[u8], expected: &[u8]) -> bool {
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
