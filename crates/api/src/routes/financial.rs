//! Financial command routes under `/financial`.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use wagerdesk_db::FinancialRepository;

use crate::{response, AppState};

/// Creates the financial routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/financial/stats", get(stats))
        .route("/financial/ledger", get(ledger))
        .route("/financial/allocations", get(allocations))
}

/// Query parameters for the ledger feed.
#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    /// Maximum rows to return.
    pub limit: Option<u64>,
    /// Rows to skip.
    pub offset: Option<u64>,
}

/// Query parameters for the allocation feed.
#[derive(Debug, Deserialize)]
pub struct AllocationsQuery {
    /// Maximum rows to return.
    pub limit: Option<u64>,
}

/// GET /financial/stats
async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    let repo = FinancialRepository::new((*state.db).clone());
    match repo.stats().await {
        Ok(stats) => response::ok(stats),
        Err(e) => {
            error!(error = %e, "Failed to aggregate financial stats");
            response::error(500, "DATABASE_ERROR", &e.to_string())
        }
    }
}

/// GET /financial/ledger
async fn ledger(
    State(state): State<AppState>,
    Query(query): Query<LedgerQuery>,
) -> impl IntoResponse {
    let repo = FinancialRepository::new((*state.db).clone());
    let limit = query.limit.unwrap_or(50).min(200);
    let offset = query.offset.unwrap_or(0);
    match repo.ledger(limit, offset).await {
        Ok(rows) => response::ok(json!({
            "entries": rows,
            "limit": limit,
            "offset": offset,
        })),
        Err(e) => {
            error!(error = %e, "Failed to read master ledger");
            response::error(500, "DATABASE_ERROR", &e.to_string())
        }
    }
}

/// GET /financial/allocations
async fn allocations(
    State(state): State<AppState>,
    Query(query): Query<AllocationsQuery>,
) -> impl IntoResponse {
    let repo = FinancialRepository::new((*state.db).clone());
    match repo.allocations(query.limit.unwrap_or(50).min(200)).await {
        Ok(rows) => response::ok(rows),
        Err(e) => {
            error!(error = %e, "Failed to read allocations");
            response::error(500, "DATABASE_ERROR", &e.to_string())
        }
    }
}
