//! Withdrawal queue routes under `/withdrawals`.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use wagerdesk_core::audit::{AuditCategory, AuditEntry, OperationTrace};
use wagerdesk_core::withdrawal::WithdrawalStatus;
use wagerdesk_db::{AuditRepository, WithdrawalRepository};

use crate::context::{actor_context, ledger_actor};
use crate::{response, AppState};

/// Creates the withdrawal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/withdrawals", get(list_withdrawals))
        .route("/withdrawals/{withdrawal_id}/approve", post(approve))
        .route("/withdrawals/{withdrawal_id}/reject", post(reject))
}

/// Query parameters for listing the queue.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// `pending`, `approved` or `rejected`.
    pub status: Option<String>,
}

/// Body for rejecting a request.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    /// Reason shown to the user.
    pub reason: String,
}

/// GET /withdrawals
async fn list_withdrawals(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => match WithdrawalStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                return response::error(
                    400,
                    "INVALID_STATUS",
                    &format!("Unknown withdrawal status: {raw}"),
                )
            }
        },
    };

    let repo = WithdrawalRepository::new((*state.db).clone());
    match repo.list(status).await {
        Ok(rows) => response::ok(rows),
        Err(e) => response::error(500, "DATABASE_ERROR", &e.to_string()),
    }
}

/// POST /withdrawals/{withdrawal_id}/approve
///
/// Settles the request: the balance debit and the status flip commit
/// together, so a double approval answers 409 and never debits twice.
async fn approve(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(withdrawal_id): Path<String>,
) -> impl IntoResponse {
    let repo = WithdrawalRepository::new((*state.db).clone());
    let context = actor_context(&headers);
    let actor = ledger_actor(&context);
    let trace = OperationTrace::new(
        "withdrawal.approve",
        json!({"withdrawal_id": withdrawal_id}),
    );

    match repo.approve(&withdrawal_id, &actor, &state.currency).await {
        Ok(row) => {
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(
                    AuditEntry::success(
                        "APPROVE_WITHDRAWAL",
                        AuditCategory::Finance,
                        format!(
                            "Approved withdrawal {withdrawal_id} of {} for user {}",
                            state.currency.format(row.amount),
                            row.user_id
                        ),
                        trace,
                        context,
                    )
                    .with_states(None, serde_json::to_value(&row).ok()),
                )
                .await;
            response::ok(row)
        }
        Err(e) => {
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(AuditEntry::failure(
                    "APPROVE_WITHDRAWAL",
                    AuditCategory::Finance,
                    e.to_string(),
                    trace,
                    context,
                ))
                .await;
            response::error(e.http_status_code(), e.error_code(), &e.to_string())
        }
    }
}

/// POST /withdrawals/{withdrawal_id}/reject
async fn reject(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(withdrawal_id): Path<String>,
    Json(payload): Json<RejectRequest>,
) -> impl IntoResponse {
    let repo = WithdrawalRepository::new((*state.db).clone());
    let context = actor_context(&headers);
    let actor = ledger_actor(&context);

    match repo.reject(&withdrawal_id, &payload.reason, &actor).await {
        Ok(row) => {
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(
                    AuditEntry::success(
                        "REJECT_WITHDRAWAL",
                        AuditCategory::Finance,
                        format!("Rejected withdrawal {withdrawal_id}: {}", payload.reason),
                        OperationTrace::new(
                            "withdrawal.reject",
                            json!({"withdrawal_id": withdrawal_id, "reason": payload.reason}),
                        ),
                        context,
                    )
                    .with_states(None, serde_json::to_value(&row).ok()),
                )
                .await;
            response::ok(row)
        }
        Err(e) => response::error(e.http_status_code(), e.error_code(), &e.to_string()),
    }
}
