//! Request extractors shared by the handlers.

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use crate::domain::aggregates::Actor;
use crate::error::StorefrontError;
use crate::state::AppState;

/// JSON body whose rejections render as `{"error": ...}` like every other failure.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(StorefrontError))]
pub struct Body<T>(pub T);

/// Query string with the same error rendering as [`Body`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(StorefrontError))]
pub struct Params<T>(pub T);

#[axum::async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = StorefrontError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| StorefrontError::Unauthorized("missing bearer token".into()))?;
        state.authenticate(token).await
    }
}

pub(crate) fn parse_param<T>(raw: Option<&str>) -> Result<Option<T>, StorefrontError>
where
    T: std::str::FromStr<Err = String>,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse().map(Some).map_err(StorefrontError::Validation),
        None => Ok(None),
    }
}
