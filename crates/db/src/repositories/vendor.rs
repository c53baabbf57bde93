//! Vendor repository for vendor account CRUD.
//!
//! Creating a vendor with an opening credit limit is a fund movement:
//! the row is inserted with a zero limit and the opening allocation goes
//! through the transfer engine inside the same transaction, so the
//! vendor, its first transaction, the allocation record, and the master
//! ledger row all land together or not at all.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};

use wagerdesk_core::ids;
use wagerdesk_core::transfer::{Actor, TransferEngine, TransferError, VendorSnapshot};
use wagerdesk_shared::{password, Currency};

use super::plan::apply_plan;
use super::transfer::{lock_vendor, TransferOpError};
use crate::entities::{users, vendor_transactions, vendors};

/// Error types for vendor operations.
#[derive(Debug, thiserror::Error)]
pub enum VendorError {
    /// Vendor not found.
    #[error("Vendor not found: {0}")]
    NotFound(String),

    /// Email already registered.
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Invalid input field.
    #[error("{0}")]
    Validation(String),

    /// Vendor still has credit distributed to users.
    #[error("Vendor {0} has outstanding used credit and cannot be deleted")]
    HasOutstandingCredit(String),

    /// Opening allocation was rejected.
    #[error(transparent)]
    Rejected(#[from] TransferError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<TransferOpError> for VendorError {
    fn from(e: TransferOpError) -> Self {
        match e {
            TransferOpError::VendorNotFound(id) | TransferOpError::UserNotFound(id) => {
                Self::NotFound(id)
            }
            TransferOpError::Rejected(e) => Self::Rejected(e),
            TransferOpError::Database(e) => Self::Database(e),
        }
    }
}

impl VendorError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "VENDOR_NOT_FOUND",
            Self::EmailTaken(_) => "EMAIL_TAKEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::HasOutstandingCredit(_) => "OUTSTANDING_CREDIT",
            Self::Rejected(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::EmailTaken(_) => 409,
            Self::Validation(_) => 400,
            Self::HasOutstandingCredit(_) => 409,
            Self::Rejected(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

/// Input for creating a vendor.
#[derive(Debug, Clone)]
pub struct CreateVendorInput {
    /// Display name.
    pub name: String,
    /// Login email, unique.
    pub email: String,
    /// Plain-text password, hashed before storage.
    pub password: String,
    /// Opening credit limit; zero means no opening allocation.
    pub credit_limit: Decimal,
    /// Commission percentage.
    pub commission_rate: Decimal,
}

/// Input for updating a vendor's profile.
#[derive(Debug, Clone, Default)]
pub struct UpdateVendorInput {
    /// New display name.
    pub name: Option<String>,
    /// New login email.
    pub email: Option<String>,
    /// New commission percentage.
    pub commission_rate: Option<Decimal>,
}

/// Vendor repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct VendorRepository {
    db: DatabaseConnection,
}

impl VendorRepository {
    /// Creates a new vendor repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a vendor, allocating the opening credit limit when given.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate email, weak password, a rejected
    /// opening allocation, or database failure.
    pub async fn create(
        &self,
        input: CreateVendorInput,
        actor: &Actor,
        currency: &Currency,
    ) -> Result<vendors::Model, VendorError> {
        if input.name.trim().is_empty() {
            return Err(VendorError::Validation("Vendor name is required".to_string()));
        }
        password::validate_password(&input.password)
            .map_err(|e| VendorError::Validation(e.to_string()))?;
        let password_hash = password::hash_password(&input.password)
            .map_err(|e| VendorError::Validation(e.to_string()))?;

        let txn = self.db.begin().await?;

        let existing = vendors::Entity::find()
            .filter(vendors::Column::Email.eq(input.email.clone()))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(VendorError::EmailTaken(input.email));
        }

        let now = Utc::now().fixed_offset();
        let vendor_id = ids::vendor_id();
        let email = input.email.clone();
        let vendor = vendors::ActiveModel {
            vendor_id: Set(vendor_id.clone()),
            name: Set(input.name.clone()),
            email: Set(input.email),
            password_hash: Set(password_hash),
            credit_limit: Set(Decimal::ZERO),
            used_credit: Set(Decimal::ZERO),
            commission_rate: Set(input.commission_rate),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            // The pre-check races with concurrent creates; the loser of
            // that race hits the unique index instead.
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                VendorError::EmailTaken(email)
            } else {
                VendorError::Database(e)
            }
        })?;

        let vendor = if input.credit_limit > Decimal::ZERO {
            let snapshot = VendorSnapshot {
                vendor_id: vendor.vendor_id.clone(),
                name: vendor.name.clone(),
                credit_limit: Decimal::ZERO,
                used_credit: Decimal::ZERO,
                is_active: true,
            };
            let plan = TransferEngine::allocate_to_vendor(
                &snapshot,
                input.credit_limit,
                Some("Initial credit allocation"),
                actor,
                currency,
            )?;
            apply_plan(&txn, &plan).await?;
            lock_vendor(&txn, &vendor_id).await?
        } else {
            vendor
        };

        txn.commit().await?;
        Ok(vendor)
    }

    /// Lists all vendors, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self) -> Result<Vec<vendors::Model>, VendorError> {
        Ok(vendors::Entity::find()
            .order_by_desc(vendors::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Finds a vendor by public ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no vendor matches.
    pub async fn get(&self, vendor_id: &str) -> Result<vendors::Model, VendorError> {
        vendors::Entity::find()
            .filter(vendors::Column::VendorId.eq(vendor_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| VendorError::NotFound(vendor_id.to_string()))
    }

    /// Updates profile fields that are present in the input.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no vendor matches.
    pub async fn update_profile(
        &self,
        vendor_id: &str,
        input: UpdateVendorInput,
    ) -> Result<vendors::Model, VendorError> {
        let vendor = self.get(vendor_id).await?;

        let mut active: vendors::ActiveModel = vendor.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(rate) = input.commission_rate {
            active.commission_rate = Set(rate);
        }
        active.updated_at = Set(Utc::now().fixed_offset());

        Ok(active.update(&self.db).await?)
    }

    /// Activates or suspends a vendor.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no vendor matches.
    pub async fn set_active(
        &self,
        vendor_id: &str,
        is_active: bool,
    ) -> Result<vendors::Model, VendorError> {
        let vendor = self.get(vendor_id).await?;
        let mut active: vendors::ActiveModel = vendor.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now().fixed_offset());
        Ok(active.update(&self.db).await?)
    }

    /// Deletes a vendor. Refused while the vendor still has credit
    /// distributed to users or active users attached.
    ///
    /// # Errors
    ///
    /// Returns `HasOutstandingCredit` or `NotFound`.
    pub async fn delete(&self, vendor_id: &str) -> Result<(), VendorError> {
        let txn = self.db.begin().await?;
        let vendor = lock_vendor(&txn, vendor_id).await?;

        if vendor.used_credit > Decimal::ZERO {
            return Err(VendorError::HasOutstandingCredit(vendor_id.to_string()));
        }
        let attached_users = users::Entity::find()
            .filter(users::Column::VendorId.eq(vendor_id))
            .count(&txn)
            .await?;
        if attached_users > 0 {
            return Err(VendorError::HasOutstandingCredit(vendor_id.to_string()));
        }

        vendors::Entity::delete_many()
            .filter(vendors::Column::VendorId.eq(vendor_id))
            .exec(&txn)
            .await?;
        txn.commit().await?;
        Ok(())
    }

    /// Lists a vendor's transaction log, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no vendor matches.
    pub async fn transactions(
        &self,
        vendor_id: &str,
        limit: u64,
    ) -> Result<Vec<vendor_transactions::Model>, VendorError> {
        self.get(vendor_id).await?;
        Ok(vendor_transactions::Entity::find()
            .filter(vendor_transactions::Column::VendorId.eq(vendor_id))
            .order_by_desc(vendor_transactions::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?)
    }

    /// Counts users attached to a vendor and sums their balances.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn user_totals(&self, vendor_id: &str) -> Result<(u64, Decimal), VendorError> {
        #[derive(sea_orm::FromQueryResult)]
        struct Totals {
            user_count: i64,
            total_balance: Option<Decimal>,
        }

        let totals = users::Entity::find()
            .select_only()
            .column_as(users::Column::Id.count(), "user_count")
            .column_as(Expr::col(users::Column::Balance).sum(), "total_balance")
            .filter(users::Column::VendorId.eq(vendor_id))
            .into_model::<Totals>()
            .one(&self.db)
            .await?
            .unwrap_or(Totals {
                user_count: 0,
                total_balance: None,
            });

        let count = u64::try_from(totals.user_count).unwrap_or(0);
        Ok((count, totals.total_balance.unwrap_or(Decimal::ZERO)))
    }
}
