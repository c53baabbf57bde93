//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for the admin backend
//! - The `{ "success": ... }` response envelope
//! - Request context extraction for the audit trail

pub mod context;
pub mod response;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use wagerdesk_shared::Currency;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Display currency for ledger descriptions and error messages.
    pub currency: Currency,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
