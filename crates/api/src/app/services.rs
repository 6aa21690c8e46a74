//! Shared request state wiring.

use std::sync::Arc;

use petadopt_auth::TokenService;
use petadopt_infra::{AppConfig, Storage};

/// Immutable state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Storage>,
    pub tokens: Arc<TokenService>,
    pub password_hash_cost: u32,
}

impl AppState {
    pub fn new(config: &AppConfig, store: Arc<dyn Storage>) -> Self {
        Self {
            store,
            tokens: Arc::new(TokenService::new(&config.jwt_secret, config.token_ttl)),
            password_hash_cost: config.password_hash_cost,
        }
    }
}
