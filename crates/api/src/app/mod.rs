//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: shared state (store, token service)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;

use petadopt_infra::{AppConfig, Storage};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppState;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(config: &AppConfig, store: Arc<dyn Storage>) -> Router {
    let state = AppState::new(config, store);

    routes::router()
        .fallback(routes::system::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::trace_requests))
                .layer(axum::middleware::from_fn(middleware::json_method_not_allowed))
                .layer(axum::middleware::from_fn_with_state(
                    config.request_timeout,
                    middleware::request_timeout,
                )),
        )
        .with_state(state)
}
