//! Risk alert routes under `/risk`.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use wagerdesk_core::audit::{AuditCategory, AuditEntry, OperationTrace};
use wagerdesk_db::repositories::risk::RaiseAlertInput;
use wagerdesk_db::{AuditRepository, RiskRepository};

use crate::context::actor_context;
use crate::{response, AppState};

/// Creates the risk routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/risk/alerts", get(list_alerts).post(raise_alert))
        .route("/risk/alerts/{alert_id}/resolve", post(resolve_alert))
        .route("/risk/kpis", get(kpis))
}

/// Body for raising an alert.
#[derive(Debug, Deserialize)]
pub struct RaiseAlertRequest {
    /// `critical`, `high`, `medium` or `low`.
    pub severity: String,
    /// Alert classification.
    pub alert_type: String,
    /// Human-readable message.
    pub message: String,
    /// Public ID of the entity concerned, if any.
    pub entity_id: Option<String>,
}

const SEVERITIES: [&str; 4] = ["critical", "high", "medium", "low"];

/// GET /risk/alerts
async fn list_alerts(State(state): State<AppState>) -> impl IntoResponse {
    let repo = RiskRepository::new((*state.db).clone());
    match repo.open_alerts().await {
        Ok(rows) => response::ok(rows),
        Err(e) => {
            error!(error = %e, "Failed to list risk alerts");
            response::error(e.http_status_code(), e.error_code(), &e.to_string())
        }
    }
}

/// POST /risk/alerts
async fn raise_alert(
    State(state): State<AppState>,
    Json(payload): Json<RaiseAlertRequest>,
) -> impl IntoResponse {
    if !SEVERITIES.contains(&payload.severity.as_str()) {
        return response::error(
            400,
            "INVALID_SEVERITY",
            &format!("Unknown severity: {}", payload.severity),
        );
    }

    let repo = RiskRepository::new((*state.db).clone());
    let input = RaiseAlertInput {
        severity: payload.severity,
        alert_type: payload.alert_type,
        message: payload.message,
        entity_id: payload.entity_id,
    };
    match repo.raise(input).await {
        Ok(alert) => response::created(alert),
        Err(e) => response::error(e.http_status_code(), e.error_code(), &e.to_string()),
    }
}

/// POST /risk/alerts/{alert_id}/resolve
async fn resolve_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(alert_id): Path<i32>,
) -> impl IntoResponse {
    let repo = RiskRepository::new((*state.db).clone());
    let context = actor_context(&headers);
    match repo.resolve(alert_id, &context.admin_name).await {
        Ok(alert) => {
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(
                    AuditEntry::success(
                        "RESOLVE_RISK_ALERT",
                        AuditCategory::Security,
                        format!("Resolved {} alert #{alert_id}", alert.severity),
                        OperationTrace::new(
                            "risk.resolve_alert",
                            json!({"alert_id": alert_id}),
                        ),
                        context,
                    )
                    .with_states(None, serde_json::to_value(&alert).ok()),
                )
                .await;
            response::ok(alert)
        }
        Err(e) => response::error(e.http_status_code(), e.error_code(), &e.to_string()),
    }
}

/// GET /risk/kpis
async fn kpis(State(state): State<AppState>) -> impl IntoResponse {
    let repo = RiskRepository::new((*state.db).clone());
    match repo.kpis().await {
        Ok(kpis) => response::ok(kpis),
        Err(e) => {
            error!(error = %e, "Failed to derive risk KPIs");
            response::error(e.http_status_code(), e.error_code(), &e.to_string())
        }
    }
}
