use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use chrono::Utc;

use petadopt_auth::NewUser;
use petadopt_core::Username;
use petadopt_infra::StoreError;

use crate::app::AppState;
use crate::app::dto::{CredentialsRequest, TokenResponse};
use crate::app::errors::ApiError;

/// Create an account and return a fresh session token.
pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let Json(body) = body?;
    let username = Username::parse(&body.username)?;

    // Cheap duplicate check before paying for bcrypt; the store's unique
    // constraint still decides races.
    if state.store.user_exists(&username).await? {
        return Err(StoreError::username_taken(&username).into());
    }

    let cost = state.password_hash_cost;
    let new_user =
        tokio::task::spawn_blocking(move || NewUser::register(username, &body.password, cost)).await??;

    let user = state.store.create_user(new_user).await?;
    let token = state.tokens.issue(&user.username, Utc::now())?;

    tracing::info!(user = %user.username, "user signed up");

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            username: user.username,
            token,
        }),
    ))
}

/// Exchange credentials for a session token.
///
/// Unknown users and wrong passwords are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(body) = body?;
    let username = Username::parse(&body.username).map_err(|_| ApiError::invalid_credentials())?;

    let user = match state.store.get_user_by_username(&username).await {
        Ok(user) => user,
        Err(StoreError::NotFound(_)) => return Err(ApiError::invalid_credentials()),
        Err(e) => return Err(e.into()),
    };

    let (user, verified) = tokio::task::spawn_blocking(move || {
        let ok = user.verify_password(&body.password);
        (user, ok)
    })
    .await?;

    if !verified {
        tracing::info!(user = %user.username, "login rejected");
        return Err(ApiError::invalid_credentials());
    }

    let token = state.tokens.issue(&user.username, Utc::now())?;
    Ok(Json(TokenResponse {
        username: user.username,
        token,
    }))
}
