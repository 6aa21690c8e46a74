use axum::{
    Router,
    routing::{get, post},
};

use crate::app::AppState;

pub mod listings;
pub mod system;
pub mod users;

/// Router for every endpoint. Authentication is per handler: handlers that
/// take a `PrincipalContext` require a valid token.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(system::health))
        .route("/signup", post(users::signup))
        .route("/login", post(users::login))
        .nest("/listings", listings::router())
        .route("/:username/listings", get(listings::list_by_username))
}
