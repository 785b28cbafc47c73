//! Service error type and its HTTP mapping.
//!
//! Every service operation returns [`StorefrontError`]. Aggregate errors are
//! folded in with `From`, so handlers can use `?` throughout. Storage details
//! are logged server-side and never reach the client.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use crate::domain::aggregates::{CartError, ExhibitionError, OrderError, OrderStatus, ProductError};
use crate::domain::value_objects::{EmailError, MoneyError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorefrontError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;

impl StorefrontError {
    pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }
    pub fn not_found(what: impl Into<String>) -> Self { Self::NotFound(what.into()) }
    pub fn forbidden(msg: impl Into<String>) -> Self { Self::Forbidden(msg.into()) }
    pub fn conflict(msg: impl Into<String>) -> Self { Self::Conflict(msg.into()) }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) | Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Storage(_) => {
                tracing::error!(error = %self, "storage failure");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<OrderError> for StorefrontError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<ProductError> for StorefrontError {
    fn from(err: ProductError) -> Self { Self::Validation(err.to_string()) }
}

impl From<CartError> for StorefrontError {
    fn from(err: CartError) -> Self { Self::Validation(err.to_string()) }
}

impl From<MoneyError> for StorefrontError {
    fn from(err: MoneyError) -> Self { Self::Validation(err.to_string()) }
}

impl From<ExhibitionError> for StorefrontError {
    fn from(err: ExhibitionError) -> Self { Self::Validation(err.to_string()) }
}

impl From<EmailError> for StorefrontError {
    fn from(err: EmailError) -> Self { Self::Validation(err.to_string()) }
}

impl From<validator::ValidationErrors> for StorefrontError {
    fn from(err: validator::ValidationErrors) -> Self { Self::Validation(err.to_string()) }
}

impl From<JsonRejection> for StorefrontError {
    fn from(err: JsonRejection) -> Self { Self::Validation(err.body_text()) }
}

impl From<QueryRejection> for StorefrontError {
    fn from(err: QueryRejection) -> Self { Self::Validation(err.body_text()) }
}

impl From<sqlx::Error> for StorefrontError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound("record".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict("record already exists".into()),
            _ => Self::Storage(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StorefrontError {
    fn from(err: sqlx::migrate::MigrateError) -> Self { Self::Storage(err.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(StorefrontError::validation("bad").status(), StatusCode::BAD_REQUEST);
        assert_eq!(StorefrontError::not_found("order").status(), StatusCode::NOT_FOUND);
        assert_eq!(StorefrontError::Unauthorized("no token".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(StorefrontError::forbidden("nope").status(), StatusCode::FORBIDDEN);
        assert_eq!(StorefrontError::conflict("stale").status(), StatusCode::CONFLICT);
        assert_eq!(StorefrontError::Storage("disk".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
    #[test]
    fn test_invalid_transition_is_a_conflict() {
        let err: StorefrontError = OrderError::InvalidTransition { from: OrderStatus::Delivered, to: OrderStatus::Pending }.into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "cannot move order from delivered to pending");
        let err: StorefrontError = OrderError::MissingPhone.into();
        assert_eq!(err, StorefrontError::Validation("phone number is required".into()));
    }
    #[test]
    fn test_not_found_message() {
        assert_eq!(StorefrontError::not_found("product p9").to_string(), "product p9 not found");
    }
}
