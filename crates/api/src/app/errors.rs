//! Consistent error responses.
//!
//! Every failure becomes `{"error": "<message>"}`. Status classes:
//! validation, duplicate usernames and storage failures are 400, token and
//! ownership failures are 403, missing resources are 404.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use petadopt_auth::{TokenError, UserError};
use petadopt_core::DomainError;
use petadopt_infra::StoreError;

pub const INVALID_TOKEN: &str = "invalid token";
pub const INVALID_CREDENTIALS: &str = "invalid credentials";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Opaque storage failure; the detail is logged, never returned.
    #[error("storage failure")]
    Store(String),

    #[error("request timed out")]
    Timeout,

    #[error("internal error")]
    Internal(String),
}

impl ApiError {
    pub fn invalid_token() -> Self {
        Self::Forbidden(INVALID_TOKEN.to_string())
    }

    pub fn invalid_credentials() -> Self {
        Self::Forbidden(INVALID_CREDENTIALS.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Store(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Store(detail) => tracing::error!(error = %detail, "store operation failed"),
            ApiError::Internal(detail) => tracing::error!(error = %detail, "internal error"),
            _ => {}
        }
        json_error(self.status(), self.to_string())
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, axum::Json(json!({ "error": message.into() }))).into_response()
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(_) | DomainError::Conflict(_) => ApiError::BadRequest(err.to_string()),
            DomainError::NotFound(_) => ApiError::NotFound(err.to_string()),
            DomainError::Forbidden => ApiError::Forbidden(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StoreError::Conflict(msg) => ApiError::BadRequest(msg),
            StoreError::Database(detail) => ApiError::Store(detail),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encode(e) => ApiError::Internal(format!("failed to sign token: {e}")),
            TokenError::Lifetime => ApiError::Internal(TokenError::Lifetime.to_string()),
            TokenError::Invalid(_) | TokenError::Window(_) => ApiError::invalid_token(),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Domain(e) => e.into(),
            UserError::Password(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("blocking task failed: {err}"))
    }
}
