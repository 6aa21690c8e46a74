use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::Utc;

use petadopt_auth::{Principal, TokenValidator};
use petadopt_core::Username;

use crate::app::errors::ApiError;
use crate::app::AppState;
use crate::middleware::extract_token;

/// Authenticated caller of a request.
///
/// Extracting it validates the request token; handlers that take one are
/// authenticated routes and reject missing or invalid tokens with 403.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext(Principal);

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self(principal)
    }

    pub fn username(&self) -> &Username {
        self.0.username()
    }

    pub fn principal(&self) -> &Principal {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for PrincipalContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers).ok_or_else(ApiError::invalid_token)?;

        let claims = state.tokens.validate(token, Utc::now()).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            ApiError::invalid_token()
        })?;

        Ok(Self(Principal::from(claims)))
    }
}
