//! Audit trail routes under `/audit`.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::error;

use wagerdesk_db::repositories::audit::AuditFilter;
use wagerdesk_db::AuditRepository;

use crate::{response, AppState};

/// Creates the audit routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/audit/logs", get(list_logs))
        .route("/audit/logs/{security_token}", get(get_log))
        .route("/audit/kpis", get(kpis))
}

/// Query parameters for the log feed.
#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    /// `Security`, `Finance`, `Vendor` or `System`.
    pub category: Option<String>,
    /// `success` or `failed`.
    pub status: Option<String>,
    /// Maximum rows to return.
    pub limit: Option<u64>,
}

/// GET /audit/logs
async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> impl IntoResponse {
    let repo = AuditRepository::new((*state.db).clone());
    let filter = AuditFilter {
        category: query.category,
        status: query.status,
        limit: query.limit,
    };
    match repo.list(filter).await {
        Ok(rows) => response::ok(rows),
        Err(e) => {
            error!(error = %e, "Failed to list audit logs");
            response::error(500, "DATABASE_ERROR", &e.to_string())
        }
    }
}

/// GET /audit/logs/{security_token}
async fn get_log(
    State(state): State<AppState>,
    Path(security_token): Path<String>,
) -> impl IntoResponse {
    let repo = AuditRepository::new((*state.db).clone());
    match repo.find_by_token(&security_token).await {
        Ok(Some(row)) => response::ok(row),
        Ok(None) => response::error(
            404,
            "LOG_NOT_FOUND",
            &format!("No audit log with token {security_token}"),
        ),
        Err(e) => response::error(500, "DATABASE_ERROR", &e.to_string()),
    }
}

/// GET /audit/kpis
async fn kpis(State(state): State<AppState>) -> impl IntoResponse {
    let repo = AuditRepository::new((*state.db).clone());
    match repo.kpis().await {
        Ok(kpis) => response::ok(kpis),
        Err(e) => {
            error!(error = %e, "Failed to derive audit KPIs");
            response::error(500, "DATABASE_ERROR", &e.to_string())
        }
    }
}
