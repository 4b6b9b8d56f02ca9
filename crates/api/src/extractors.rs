//! Request extractors.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::response::ApiError;
use crate::state::AppState;

/// Access guard for the campaign endpoints.
///
/// Open when no API key is configured. Otherwise the key must be sent as
/// `X-API-Key` or `Authorization: Bearer <key>`.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.api_key.as_deref() else {
            return Ok(AdminAuth);
        };

        let bearer = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim);

        let api_key_header = parts.headers.get("X-API-Key").and_then(|h| h.to_str().ok());

        match api_key_header.or(bearer) {
            Some(key) if key == expected => Ok(AdminAuth),
            Some(_) => Err(ApiError::unauthorized("Invalid API key")),
            None => Err(ApiError::unauthorized("Missing API key")),
        }
    }
}
