//! API route definitions.

pub mod audit;
pub mod financial;
pub mod health;
pub mod risk;
pub mod users;
pub mod vendors;
pub mod withdrawals;

use axum::Router;

use crate::AppState;

/// Combines all route groups under one router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(vendors::routes())
        .merge(users::routes())
        .merge(withdrawals::routes())
        .merge(financial::routes())
        .merge(audit::routes())
        .merge(risk::routes())
}
