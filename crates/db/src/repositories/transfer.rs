//! Fund movement repository.
//!
//! Every method follows the same shape: begin a transaction, read the
//! affected account rows with `SELECT ... FOR UPDATE`, plan the movement
//! with the transfer engine, apply the plan, commit. Two concurrent
//! movements against the same vendor or user therefore serialize on the
//! row lock and the second one plans against fresh balances.

use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, QueryFilter,
    QuerySelect, TransactionTrait,
};

use rust_decimal::Decimal;
use wagerdesk_core::transfer::{Actor, TransferEngine, TransferError};
use wagerdesk_shared::Currency;

use super::plan::{apply_plan, user_snapshot, vendor_snapshot};
use crate::entities::{users, vendors};

/// Error types for fund movement operations.
#[derive(Debug, thiserror::Error)]
pub enum TransferOpError {
    /// Vendor not found.
    #[error("Vendor not found: {0}")]
    VendorNotFound(String),

    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// The transfer engine rejected the movement.
    #[error(transparent)]
    Rejected(#[from] TransferError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl TransferOpError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::VendorNotFound(_) => "VENDOR_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::Rejected(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::VendorNotFound(_) | Self::UserNotFound(_) => 404,
            Self::Rejected(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

/// Outcome of a fund movement: the rows as they look after commit.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    /// Updated vendor row, if a vendor was involved.
    pub vendor: Option<vendors::Model>,
    /// Updated user row, if a user was involved.
    pub user: Option<users::Model>,
    /// Master ledger entry ID of the movement.
    pub ledger_id: String,
}

/// Repository for fund movements between accounts.
#[derive(Debug, Clone)]
pub struct TransferRepository {
    db: DatabaseConnection,
}

impl TransferRepository {
    /// Creates a new transfer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Allocates funds from the admin to a vendor's credit limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the vendor does not exist, the engine rejects
    /// the amount, or the database fails.
    pub async fn allocate_to_vendor(
        &self,
        vendor_id: &str,
        amount: Decimal,
        description: Option<&str>,
        actor: &Actor,
        currency: &Currency,
    ) -> Result<TransferOutcome, TransferOpError> {
        let txn = self.db.begin().await?;

        let vendor = lock_vendor(&txn, vendor_id).await?;
        let plan = TransferEngine::allocate_to_vendor(
            &vendor_snapshot(&vendor),
            amount,
            description,
            actor,
            currency,
        )?;
        let ledger_id = plan.ledger.ledger_id.clone();
        apply_plan(&txn, &plan).await?;

        let vendor = lock_vendor(&txn, vendor_id).await?;
        txn.commit().await?;

        Ok(TransferOutcome {
            vendor: Some(vendor),
            user: None,
            ledger_id,
        })
    }

    /// Moves funds from a vendor's credit into a user's balance.
    ///
    /// # Errors
    ///
    /// Returns an error if either account is missing, the vendor is
    /// inactive or over its cap, or the database fails.
    pub async fn fund_user(
        &self,
        vendor_id: &str,
        user_id: &str,
        amount: Decimal,
        actor: &Actor,
        currency: &Currency,
    ) -> Result<TransferOutcome, TransferOpError> {
        let txn = self.db.begin().await?;

        // Vendor first, then user: all paths lock in the same order.
        let vendor = lock_vendor(&txn, vendor_id).await?;
        let user = lock_user(&txn, user_id).await?;

        let plan = TransferEngine::fund_user_from_vendor(
            &vendor_snapshot(&vendor),
            &user_snapshot(&user),
            amount,
            actor,
            currency,
        )?;
        let ledger_id = plan.ledger.ledger_id.clone();
        apply_plan(&txn, &plan).await?;

        let vendor = lock_vendor(&txn, vendor_id).await?;
        let user = lock_user(&txn, user_id).await?;
        txn.commit().await?;

        Ok(TransferOutcome {
            vendor: Some(vendor),
            user: Some(user),
            ledger_id,
        })
    }

    /// Applies a signed correction to a vendor's credit limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the vendor does not exist, the adjustment is
    /// rejected, or the database fails.
    pub async fn adjust_vendor_credit(
        &self,
        vendor_id: &str,
        delta: Decimal,
        reason: &str,
        actor: &Actor,
        currency: &Currency,
    ) -> Result<TransferOutcome, TransferOpError> {
        let txn = self.db.begin().await?;

        let vendor = lock_vendor(&txn, vendor_id).await?;
        let plan = TransferEngine::adjust_vendor_credit(
            &vendor_snapshot(&vendor),
            delta,
            reason,
            actor,
            currency,
        )?;
        let ledger_id = plan.ledger.ledger_id.clone();
        apply_plan(&txn, &plan).await?;

        let vendor = lock_vendor(&txn, vendor_id).await?;
        txn.commit().await?;

        Ok(TransferOutcome {
            vendor: Some(vendor),
            user: None,
            ledger_id,
        })
    }

    /// Applies a signed correction to a user's balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist, the adjustment is
    /// rejected, or the database fails.
    pub async fn adjust_user_balance(
        &self,
        user_id: &str,
        delta: Decimal,
        reason: &str,
        actor: &Actor,
        currency: &Currency,
    ) -> Result<TransferOutcome, TransferOpError> {
        let txn = self.db.begin().await?;

        let user = lock_user(&txn, user_id).await?;
        let plan = TransferEngine::adjust_user_balance(
            &user_snapshot(&user),
            delta,
            reason,
            actor,
            currency,
        )?;
        let ledger_id = plan.ledger.ledger_id.clone();
        apply_plan(&txn, &plan).await?;

        let user = lock_user(&txn, user_id).await?;
        txn.commit().await?;

        Ok(TransferOutcome {
            vendor: None,
            user: Some(user),
            ledger_id,
        })
    }
}

pub(crate) async fn lock_vendor(
    txn: &DatabaseTransaction,
    vendor_id: &str,
) -> Result<vendors::Model, TransferOpError> {
    vendors::Entity::find()
        .filter(vendors::Column::VendorId.eq(vendor_id))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| TransferOpError::VendorNotFound(vendor_id.to_string()))
}

pub(crate) async fn lock_user(
    txn: &DatabaseTransaction,
    user_id: &str,
) -> Result<users::Model, TransferOpError> {
    users::Entity::find()
        .filter(users::Column::UserId.eq(user_id))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| TransferOpError::UserNotFound(user_id.to_string()))
}
