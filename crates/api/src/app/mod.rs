//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection, engine and shared config
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower::ServiceBuilder;

use chatorder_infra::{AppConfig, InMemoryOrderStore, StoreError};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &AppConfig) -> Result<Router, StoreError> {
    build_app_with_store(config, Arc::new(InMemoryOrderStore::new()))
}

/// Same router, with a caller-provided in-memory fallback store (seeded in tests).
pub fn build_app_with_store(config: &AppConfig, memory: Arc<InMemoryOrderStore>) -> Result<Router, StoreError> {
    let services = Arc::new(services::AppServices::from_config(config, memory)?);

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .route("/", post(routes::messages::receive_message))
        .layer(ServiceBuilder::new().layer(Extension(services))))
}
