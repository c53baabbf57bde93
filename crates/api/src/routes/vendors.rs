//! Vendor routes under `/site2/vendors`.
//!
//! Vendor creation and every fund movement answer only after the full
//! multi-row write has committed; the audit entry is recorded afterwards
//! on a best-effort basis.

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
use wagerdesk_db::repositories::vendor::{CreateVendorInput, UpdateVendorInput};
use wagerdesk_db::{AuditRepository, TransferRepository, VendorRepository};

use crate::context::{actor_context, ledger_actor};
use crate::{response, AppState};

/// Creates the vendor routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/site2/vendors", post(create_vendor).get(list_vendors))
        .route(
            "/site2/vendors/{vendor_id}",
            get(vendor_details).put(update_vendor).delete(delete_vendor),
        )
        .route("/site2/vendors/{vendor_id}/add-funds", post(add_funds))
        .route("/site2/vendors/{vendor_id}/adjust-credit", post(adjust_credit))
        .route("/site2/vendors/{vendor_id}/transactions", get(list_transactions))
        .route("/site2/vendors/{vendor_id}/status", patch(set_status))
}

// ============================================================================
// Request Types
// ============================================================================

/// Body for creating a vendor.
#[derive(Debug, Deserialize)]
pub struct CreateVendorRequest {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Opening credit limit; defaults to zero.
    #[serde(default)]
    pub credit_limit: Decimal,
    /// Commission percentage; defaults to zero.
    #[serde(default)]
    pub commission_rate: Decimal,
}

/// Body for updating a vendor's profile.
#[derive(Debug, Deserialize)]
pub struct UpdateVendorRequest {
    /// New display name.
    pub name: Option<String>,
    /// New login email.
    pub email: Option<String>,
    /// New commission percentage.
    pub commission_rate: Option<Decimal>,
}

/// Body for allocating funds to a vendor.
#[derive(Debug, Deserialize)]
pub struct AddFundsRequest {
    /// Amount to allocate.
    pub amount: Decimal,
    /// Optional description for the allocation record.
    pub description: Option<String>,
}

/// Body for a signed credit limit correction.
#[derive(Debug, Deserialize)]
pub struct AdjustCreditRequest {
    /// Signed delta applied to the limit.
    pub delta: Decimal,
    /// Reason recorded in the ledger rows.
    pub reason: String,
}

/// Body for activating or suspending a vendor.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    /// New active flag.
    pub is_active: bool,
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

/// POST /site2/vendors
async fn create_vendor(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateVendorRequest>,
) -> impl IntoResponse {
    let repo = VendorRepository::new((*state.db).clone());
    let context = actor_context(&headers);
    let actor = ledger_actor(&context);

    let input = CreateVendorInput {
        name: payload.name,
        email: payload.email,
        password: payload.password,
        credit_limit: payload.credit_limit,
        commission_rate: payload.commission_rate,
    };
    let trace = OperationTrace::new(
        "vendor.create",
        json!({"name": input.name.clone(), "credit_limit": input.credit_limit}),
    );

    match repo.create(input, &actor, &state.currency).await {
        Ok(vendor) => {
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(
                    AuditEntry::success(
                        "CREATE_VENDOR",
                        AuditCategory::Vendor,
                        format!("Created vendor {} ({})", vendor.name, vendor.vendor_id),
                        trace,
                        context,
                    )
                    .with_states(None, serde_json::to_value(&vendor).ok()),
                )
                .await;
            response::created(vendor)
        }
        Err(e) => {
            error!(error = %e, "Failed to create vendor");
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(AuditEntry::failure(
                    "CREATE_VENDOR",
                    AuditCategory::Vendor,
                    e.to_string(),
                    trace,
                    context,
                ))
                .await;
            response::error(e.http_status_code(), e.error_code(), &e.to_string())
        }
    }
}

/// GET /site2/vendors
async fn list_vendors(State(state): State<AppState>) -> impl IntoResponse {
    let repo = VendorRepository::new((*state.db).clone());
    match repo.list().await {
        Ok(vendors) => response::ok(vendors),
        Err(e) => {
            error!(error = %e, "Failed to list vendors");
            response::error(e.http_status_code(), e.error_code(), &e.to_string())
        }
    }
}

/// GET /site2/vendors/{vendor_id}
///
/// Vendor profile enriched with user totals and the recent transaction log.
async fn vendor_details(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
) -> impl IntoResponse {
    let repo = VendorRepository::new((*state.db).clone());

    let vendor = match repo.get(&vendor_id).await {
        Ok(vendor) => vendor,
        Err(e) => return response::error(e.http_status_code(), e.error_code(), &e.to_string()),
    };
    let (user_count, user_balance) = match repo.user_totals(&vendor_id).await {
        Ok(totals) => totals,
        Err(e) => {
            error!(error = %e, "Failed to aggregate vendor users");
            return response::error(e.http_status_code(), e.error_code(), &e.to_string());
        }
    };
    let transactions = match repo.transactions(&vendor_id, 50).await {
        Ok(rows) => rows,
        Err(e) => return response::error(e.http_status_code(), e.error_code(), &e.to_string()),
    };

    let available_credit = vendor.credit_limit - vendor.used_credit;
    response::ok(json!({
        "vendor": vendor,
        "availableCredit": available_credit,
        "userCount": user_count,
        "userBalance": user_balance,
        "recentTransactions": transactions,
    }))
}

/// PUT /site2/vendors/{vendor_id}
async fn update_vendor(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
    Json(payload): Json<UpdateVendorRequest>,
) -> impl IntoResponse {
    let repo = VendorRepository::new((*state.db).clone());
    let input = UpdateVendorInput {
        name: payload.name,
        email: payload.email,
        commission_rate: payload.commission_rate,
    };
    match repo.update_profile(&vendor_id, input).await {
        Ok(vendor) => response::ok(vendor),
        Err(e) => response::error(e.http_status_code(), e.error_code(), &e.to_string()),
    }
}

/// DELETE /site2/vendors/{vendor_id}
async fn delete_vendor(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(vendor_id): Path<String>,
) -> impl IntoResponse {
    let repo = VendorRepository::new((*state.db).clone());
    let context = actor_context(&headers);
    let trace = OperationTrace::new("vendor.delete", json!({"vendor_id": vendor_id}));

    match repo.delete(&vendor_id).await {
        Ok(()) => {
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(AuditEntry::success(
                    "DELETE_VENDOR",
                    AuditCategory::Vendor,
                    format!("Deleted vendor {vendor_id}"),
                    trace,
                    context,
                ))
                .await;
            response::ok(json!({"deleted": vendor_id}))
        }
        Err(e) => response::error(e.http_status_code(), e.error_code(), &e.to_string()),
    }
}

/// POST /site2/vendors/{vendor_id}/add-funds
async fn add_funds(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(vendor_id): Path<String>,
    Json(payload): Json<AddFundsRequest>,
) -> impl IntoResponse {
    let repo = TransferRepository::new((*state.db).clone());
    let context = actor_context(&headers);
    let actor = ledger_actor(&context);
    let trace = OperationTrace::new(
        "funds.allocate",
        json!({"vendor_id": vendor_id, "amount": payload.amount}),
    );
    let prev_state = VendorRepository::new((*state.db).clone())
        .get(&vendor_id)
        .await
        .ok()
        .and_then(|v| serde_json::to_value(&v).ok());

    match repo
        .allocate_to_vendor(
            &vendor_id,
            payload.amount,
            payload.description.as_deref(),
            &actor,
            &state.currency,
        )
        .await
    {
        Ok(outcome) => {
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(
                    AuditEntry::success(
                        "ALLOCATE_FUNDS",
                        AuditCategory::Finance,
                        format!(
                            "Allocated {} to vendor {vendor_id}",
                            state.currency.format(payload.amount)
                        ),
                        trace,
                        context,
                    )
                    .with_states(
                        prev_state,
                        outcome.vendor.as_ref().and_then(|v| serde_json::to_value(v).ok()),
                    ),
                )
                .await;
            response::ok(json!({
                "vendor": outcome.vendor,
                "ledgerId": outcome.ledger_id,
            }))
        }
        Err(e) => {
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(AuditEntry::failure(
                    "ALLOCATE_FUNDS",
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

/// POST /site2/vendors/{vendor_id}/adjust-credit
async fn adjust_credit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(vendor_id): Path<String>,
    Json(payload): Json<AdjustCreditRequest>,
) -> impl IntoResponse {
    let repo = TransferRepository::new((*state.db).clone());
    let context = actor_context(&headers);
    let actor = ledger_actor(&context);
    let trace = OperationTrace::new(
        "funds.adjust_vendor_credit",
        json!({"vendor_id": vendor_id, "delta": payload.delta, "reason": payload.reason}),
    );
    let prev_state = VendorRepository::new((*state.db).clone())
        .get(&vendor_id)
        .await
        .ok()
        .and_then(|v| serde_json::to_value(&v).ok());

    match repo
        .adjust_vendor_credit(&vendor_id, payload.delta, &payload.reason, &actor, &state.currency)
        .await
    {
        Ok(outcome) => {
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(
                    AuditEntry::success(
                        "ADJUST_VENDOR_CREDIT",
                        AuditCategory::Finance,
                        format!("Adjusted credit limit of vendor {vendor_id}"),
                        trace,
                        context,
                    )
                    .with_states(
                        prev_state,
                        outcome.vendor.as_ref().and_then(|v| serde_json::to_value(v).ok()),
                    ),
                )
                .await;
            response::ok(json!({
                "vendor": outcome.vendor,
                "ledgerId": outcome.ledger_id,
            }))
        }
        Err(e) => {
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(AuditEntry::failure(
                    "ADJUST_VENDOR_CREDIT",
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

/// GET /site2/vendors/{vendor_id}/transactions
async fn list_transactions(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
    Query(query): Query<TransactionsQuery>,
) -> impl IntoResponse {
    let repo = VendorRepository::new((*state.db).clone());
    let limit = query.limit.unwrap_or(50).min(200);
    match repo.transactions(&vendor_id, limit).await {
        Ok(rows) => response::ok(rows),
        Err(e) => response::error(e.http_status_code(), e.error_code(), &e.to_string()),
    }
}

/// PATCH /site2/vendors/{vendor_id}/status
async fn set_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(vendor_id): Path<String>,
    Json(payload): Json<SetStatusRequest>,
) -> impl IntoResponse {
    let repo = VendorRepository::new((*state.db).clone());
    let context = actor_context(&headers);

    match repo.set_active(&vendor_id, payload.is_active).await {
        Ok(vendor) => {
            let audit = AuditRepository::new((*state.db).clone());
            audit
                .record(
                    AuditEntry::success(
                        "SET_VENDOR_STATUS",
                        AuditCategory::Vendor,
                        format!(
                            "Vendor {vendor_id} is now {}",
                            if payload.is_active { "active" } else { "suspended" }
                        ),
                        OperationTrace::new(
                            "vendor.set_status",
                            json!({"vendor_id": vendor_id, "is_active": payload.is_active}),
                        ),
                        context,
                    )
                    .with_states(None, serde_json::to_value(&vendor).ok()),
                )
                .await;
            response::ok(vendor)
        }
        Err(e) => response::error(e.http_status_code(), e.error_code(), &e.to_string()),
    }
}
