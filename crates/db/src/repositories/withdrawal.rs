//! Withdrawal queue repository.
//!
//! Approval debits the user's balance through the transfer engine inside
//! the same transaction that flips the queue row, so a request can never
//! be settled twice: the row is read with `SELECT ... FOR UPDATE` and a
//! second approval sees the terminal status.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use wagerdesk_core::ids;
use wagerdesk_core::transfer::{Actor, TransferEngine, TransferError};
use wagerdesk_core::withdrawal::{ensure_can_approve, ensure_can_reject, WithdrawalError, WithdrawalStatus};
use wagerdesk_shared::Currency;

use super::plan::{apply_plan, user_snapshot};
use super::transfer::{lock_user, TransferOpError};
use crate::entities::withdrawal_queue;

/// Error types for withdrawal operations.
#[derive(Debug, thiserror::Error)]
pub enum WithdrawalOpError {
    /// Withdrawal request not found.
    #[error("Withdrawal not found: {0}")]
    NotFound(String),

    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Requested amount must be strictly positive.
    #[error("Withdrawal amount must be greater than zero")]
    NonPositiveAmount,

    /// Illegal state transition.
    #[error(transparent)]
    State(#[from] WithdrawalError),

    /// Settlement was rejected by the transfer engine.
    #[error(transparent)]
    Rejected(#[from] TransferError),

    /// Stored status string is not a known state.
    #[error("Unknown withdrawal status: {0}")]
    UnknownStatus(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<TransferOpError> for WithdrawalOpError {
    fn from(e: TransferOpError) -> Self {
        match e {
            TransferOpError::UserNotFound(id) | TransferOpError::VendorNotFound(id) => {
                Self::UserNotFound(id)
            }
            TransferOpError::Rejected(e) => Self::Rejected(e),
            TransferOpError::Database(e) => Self::Database(e),
        }
    }
}

impl WithdrawalOpError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "WITHDRAWAL_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::State(e) => e.error_code(),
            Self::Rejected(e) => e.error_code(),
            Self::UnknownStatus(_) | Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::UserNotFound(_) => 404,
            Self::NonPositiveAmount => 400,
            Self::State(e) => e.http_status_code(),
            Self::Rejected(e) => e.http_status_code(),
            Self::UnknownStatus(_) | Self::Database(_) => 500,
        }
    }
}

/// Repository for the withdrawal approval queue.
#[derive(Debug, Clone)]
pub struct WithdrawalRepository {
    db: DatabaseConnection,
}

impl WithdrawalRepository {
    /// Creates a new withdrawal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Queues a withdrawal request for admin review. No funds move yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist, the amount is not
    /// positive, or the database fails.
    pub async fn request(
        &self,
        user_id: &str,
        amount: Decimal,
    ) -> Result<withdrawal_queue::Model, WithdrawalOpError> {
        if amount <= Decimal::ZERO {
            return Err(WithdrawalOpError::NonPositiveAmount);
        }

        let txn = self.db.begin().await?;
        let user = lock_user(&txn, user_id).await?;

        let row = withdrawal_queue::ActiveModel {
            withdrawal_id: Set(ids::withdrawal_id()),
            user_id: Set(user.user_id),
            username: Set(user.username),
            amount: Set(amount),
            status: Set(WithdrawalStatus::Pending.as_str().to_string()),
            reason: Set(None),
            requested_at: Set(Utc::now().fixed_offset()),
            processed_at: Set(None),
            processed_by: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;
        Ok(row)
    }

    /// Lists requests, optionally filtered to one status, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<withdrawal_queue::Model>, DbErr> {
        let mut query = withdrawal_queue::Entity::find()
            .order_by_asc(withdrawal_queue::Column::RequestedAt);
        if let Some(status) = status {
            query = query.filter(withdrawal_queue::Column::Status.eq(status.as_str()));
        }
        query.all(&self.db).await
    }

    /// Approves a pending request and settles it: the user's balance is
    /// debited and a master ledger row is written in the same transaction
    /// that marks the request approved.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is missing or already processed,
    /// the user lacks unlocked funds, or the database fails.
    pub async fn approve(
        &self,
        withdrawal_id: &str,
        actor: &Actor,
        currency: &Currency,
    ) -> Result<withdrawal_queue::Model, WithdrawalOpError> {
        let txn = self.db.begin().await?;

        let row = lock_request(&txn, withdrawal_id).await?;
        let status = parse_status(&row.status)?;
        ensure_can_approve(withdrawal_id, status)?;

        let user = lock_user(&txn, &row.user_id).await?;
        let plan =
            TransferEngine::settle_withdrawal(&user_snapshot(&user), row.amount, actor, currency)?;
        apply_plan(&txn, &plan).await?;

        let mut active: withdrawal_queue::ActiveModel = row.into();
        active.status = Set(WithdrawalStatus::Approved.as_str().to_string());
        active.processed_at = Set(Some(Utc::now().fixed_offset()));
        active.processed_by = Set(Some(actor.name.clone()));
        let row = active.update(&txn).await?;

        txn.commit().await?;
        Ok(row)
    }

    /// Rejects a pending request with a reason. No funds move.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is missing, already processed, or
    /// the reason is blank.
    pub async fn reject(
        &self,
        withdrawal_id: &str,
        reason: &str,
        actor: &Actor,
    ) -> Result<withdrawal_queue::Model, WithdrawalOpError> {
        let txn = self.db.begin().await?;

        let row = lock_request(&txn, withdrawal_id).await?;
        let status = parse_status(&row.status)?;
        ensure_can_reject(withdrawal_id, status, reason)?;

        let mut active: withdrawal_queue::ActiveModel = row.into();
        active.status = Set(WithdrawalStatus::Rejected.as_str().to_string());
        active.reason = Set(Some(reason.to_string()));
        active.processed_at = Set(Some(Utc::now().fixed_offset()));
        active.processed_by = Set(Some(actor.name.clone()));
        let row = active.update(&txn).await?;

        txn.commit().await?;
        Ok(row)
    }
}

async fn lock_request(
    txn: &DatabaseTransaction,
    withdrawal_id: &str,
) -> Result<withdrawal_queue::Model, WithdrawalOpError> {
    withdrawal_queue::Entity::find()
        .filter(withdrawal_queue::Column::WithdrawalId.eq(withdrawal_id))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| WithdrawalOpError::NotFound(withdrawal_id.to_string()))
}

fn parse_status(raw: &str) -> Result<WithdrawalStatus, WithdrawalOpError> {
    WithdrawalStatus::parse(raw).ok_or_else(|| WithdrawalOpError::UnknownStatus(raw.to_string()))
}
