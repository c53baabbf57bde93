//! User routes under `/site3/users`.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use wagerdesk_core::audit::{AuditCategory, AuditEntry, OperationTrace};
use wagerdesk_db::repositories::user::CreateUserInput;
use wagerdesk_db::{AuditRepository, TransferRepository, UserRepository, WithdrawalRepository};

use crate::context::{actor_context, ledger_actor};
use crate::{response, AppState};

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/site3/users", post(create_user).get(list_users))
        .route("/site3/users/{user_id}", get(get_user).delete(delete_user))
        .route("/site3/users/{user_id}/transactions", get(list_transactions))
        .route("/site3/users/{user_id}/add-funds", post(add_funds))
        .route("/site3/users/{user_id}/adjust-balance", post(adjust_balance))
        .route("/site3/users/{user_id}/status", patch(set_status))
        .route("/site3/users/{user_id}/withdrawals", post(request_withdrawal))
}

// ============================================================================
// Request Types
// ============================================================================

/// Body for creating a user.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Username.
    pub username: String,
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Owning vendor's public ID.
    pub vendor_id: String,
    /// Opening balance; defaults to zero.
    #[serde(default)]
    pub initial_balance: Decimal,
}

/// Body for funding a user from their vendor's credit.
#[derive(Debug, Deserialize)]
pub struct AddFundsRequest {
    /// Amount to move from the vendor's credit.
    pub amount: Decimal,
}

/// Body for a signed balance correction.
#[derive(Debug, Deserialize)]
pub struct AdjustBalanceRequest {
    /// Signed delta applied to the balance.
    pub delta: Decimal,
    /// Reason recorded in the ledger rows.
    pub reason: String,
}

/// Body for activating or suspending a user.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    /// New active flag.
    pub is_active: bool,
}

/// Body for queueing a withdrawal request.
#[derive(Debug, Deserialize)]
pub struct WithdrawalRequestBody {
    /// Amount to withdraw.
    pub amount: Decimal,
}

/// Query parameters for listing users.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// Restrict to one vendor.
    pub vendor_id: Option<String>,
}

/// Query parameters for the transaction log.
#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    /// Maximum rows to return.
    pub limit: Option<u64>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /site3/users
async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateUserRequest>,
) -> impl IntoResponse {
    let repo = UserRepository::new((*state.db).clone());
    let context = actor_context(&headers);
    let actor = ledger_actor(&context);

    let input = CreateUserInput {
        username: payload.username,
        email: payload.email,
        password: payload.password,
        vendor_id: payload.vendor_id,
        initial_balance: payload.initial_balance,
    };
    let trace = OperationTrace::new(
        "user.create",
        json!({
            "username": input.username.clone(),
            "vendor_id": input.vendor_id.clone(),
            "initial_balance": input.initial_balance,
        }),
    );

    match repo.create(input, &actor, &state.currency).await {
        Ok(user) => {
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(
                    AuditEntry::success(
                        "CREATE_USER",
                        AuditCategory::Finance,
                        format!("Created user {} ({})", user.username, user.user_id),
                        trace,
                        context,
                    )
                    .with_states(None, serde_json::to_value(&user).ok()),
                )
                .await;
            response::created(user)
        }
        Err(e) => {
            error!(error = %e, "Failed to create user");
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(AuditEntry::failure(
                    "CREATE_USER",
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

/// GET /site3/users
async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> impl IntoResponse {
    let repo = UserRepository::new((*state.db).clone());
    match repo.list(query.vendor_id.as_deref()).await {
        Ok(users) => response::ok(users),
        Err(e) => {
            error!(error = %e, "Failed to list users");
            response::error(e.http_status_code(), e.error_code(), &e.to_string())
        }
    }
}

/// GET /site3/users/{user_id}
async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let repo = UserRepository::new((*state.db).clone());
    match repo.get(&user_id).await {
        Ok(user) => response::ok(json!({
            "user": user,
            "availableBalance": user.balance - user.exposure,
        })),
        Err(e) => response::error(e.http_status_code(), e.error_code(), &e.to_string()),
    }
}

/// DELETE /site3/users/{user_id}
async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let repo = UserRepository::new((*state.db).clone());
    let context = actor_context(&headers);

    match repo.delete(&user_id).await {
        Ok(()) => {
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(AuditEntry::success(
                    "DELETE_USER",
                    AuditCategory::Security,
                    format!("Deleted user {user_id}"),
                    OperationTrace::new("user.delete", json!({"user_id": user_id})),
                    context,
                ))
                .await;
            response::ok(json!({"deleted": user_id}))
        }
        Err(e) => response::error(e.http_status_code(), e.error_code(), &e.to_string()),
    }
}

/// GET /site3/users/{user_id}/transactions
async fn list_transactions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<TransactionsQuery>,
) -> impl IntoResponse {
    let repo = UserRepository::new((*state.db).clone());
    let limit = query.limit.unwrap_or(50).min(200);
    match repo.transactions(&user_id, limit).await {
        Ok(rows) => response::ok(rows),
        Err(e) => response::error(e.http_status_code(), e.error_code(), &e.to_string()),
    }
}

/// POST /site3/users/{user_id}/add-funds
///
/// Moves funds from the owning vendor's credit into the user's balance.
async fn add_funds(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(payload): Json<AddFundsRequest>,
) -> impl IntoResponse {
    let users = UserRepository::new((*state.db).clone());
    let context = actor_context(&headers);
    let actor = ledger_actor(&context);

    let user = match users.get(&user_id).await {
        Ok(user) => user,
        Err(e) => return response::error(e.http_status_code(), e.error_code(), &e.to_string()),
    };
    let trace = OperationTrace::new(
        "funds.fund_user",
        json!({"user_id": user_id, "vendor_id": user.vendor_id, "amount": payload.amount}),
    );
    let prev_state = serde_json::to_value(&user).ok();

    let repo = TransferRepository::new((*state.db).clone());
    match repo
        .fund_user(&user.vendor_id, &user_id, payload.amount, &actor, &state.currency)
        .await
    {
        Ok(outcome) => {
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(
                    AuditEntry::success(
                        "FUND_USER",
                        AuditCategory::Finance,
                        format!(
                            "Funded user {user_id} with {} from vendor {}",
                            state.currency.format(payload.amount),
                            user.vendor_id
                        ),
                        trace,
                        context,
                    )
                    .with_states(
                        prev_state,
                        outcome.user.as_ref().and_then(|u| serde_json::to_value(u).ok()),
                    ),
                )
                .await;
            response::ok(json!({
                "user": outcome.user,
                "vendor": outcome.vendor,
                "ledgerId": outcome.ledger_id,
            }))
        }
        Err(e) => {
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(AuditEntry::failure(
                    "FUND_USER",
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

/// POST /site3/users/{user_id}/adjust-balance
async fn adjust_balance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(payload): Json<AdjustBalanceRequest>,
) -> impl IntoResponse {
    let repo = TransferRepository::new((*state.db).clone());
    let context = actor_context(&headers);
    let actor = ledger_actor(&context);
    let trace = OperationTrace::new(
        "funds.adjust_user_balance",
        json!({"user_id": user_id, "delta": payload.delta, "reason": payload.reason}),
    );
    let prev_state = UserRepository::new((*state.db).clone())
        .get(&user_id)
        .await
        .ok()
        .and_then(|u| serde_json::to_value(&u).ok());

    match repo
        .adjust_user_balance(&user_id, payload.delta, &payload.reason, &actor, &state.currency)
        .await
    {
        Ok(outcome) => {
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(
                    AuditEntry::success(
                        "ADJUST_USER_BALANCE",
                        AuditCategory::Finance,
                        format!("Adjusted balance of user {user_id}"),
                        trace,
                        context,
                    )
                    .with_states(
                        prev_state,
                        outcome.user.as_ref().and_then(|u| serde_json::to_value(u).ok()),
                    ),
                )
                .await;
            response::ok(json!({
                "user": outcome.user,
                "ledgerId": outcome.ledger_id,
            }))
        }
        Err(e) => {
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(AuditEntry::failure(
                    "ADJUST_USER_BALANCE",
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

/// PATCH /site3/users/{user_id}/status
async fn set_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(payload): Json<SetStatusRequest>,
) -> impl IntoResponse {
    let repo = UserRepository::new((*state.db).clone());
    let context = actor_context(&headers);

    match repo.set_active(&user_id, payload.is_active).await {
        Ok(user) => {
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(
                    AuditEntry::success(
                        "SET_USER_STATUS",
                        AuditCategory::Security,
                        format!(
                            "User {user_id} is now {}",
                            if payload.is_active { "active" } else { "blocked" }
                        ),
                        OperationTrace::new(
                            "user.set_status",
                            json!({"user_id": user_id, "is_active": payload.is_active}),
                        ),
                        context,
                    )
                    .with_states(None, serde_json::to_value(&user).ok()),
                )
                .await;
            response::ok(user)
        }
        Err(e) => response::error(e.http_status_code(), e.error_code(), &e.to_string()),
    }
}

/// POST /site3/users/{user_id}/withdrawals
async fn request_withdrawal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(payload): Json<WithdrawalRequestBody>,
) -> impl IntoResponse {
    let repo = WithdrawalRepository::new((*state.db).clone());
    let context = actor_context(&headers);

    match repo.request(&user_id, payload.amount).await {
        Ok(request) => {
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(AuditEntry::success(
                    "REQUEST_WITHDRAWAL",
                    AuditCategory::Finance,
                    format!(
                        "User {user_id} requested withdrawal of {}",
                        state.currency.format(payload.amount)
                    ),
                    OperationTrace::new(
                        "withdrawal.request",
                        json!({"user_id": user_id, "amount": payload.amount}),
                    ),
                    context,
                ))
                .await;
            response::created(request)
        }
        Err(e) => response::error(e.http_status_code(), e.error_code(), &e.to_string()),
    }
}
