//! Bearer authentication.
//!
//! The development server has no accounts: the bearer token itself names the
//! user whose feed is served.

use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};

use crate::domain::UserId;

pub fn authenticate(headers: &HeaderMap) -> Result<UserId, StatusCode> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    UserId::new(token.to_string()).map_err(|_| {
        tracing::warn!("Rejected request with invalid bearer token");
        StatusCode::UNAUTHORIZED
    })
}
