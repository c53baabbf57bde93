//! User repository for bettor account CRUD.
//!
//! Creating a user with an opening balance is a vendor-to-user fund
//! movement: the vendor row is locked first, the user is inserted with a
//! zero balance, and the opening credit goes through the transfer engine
//! inside the same transaction.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};

use wagerdesk_core::ids;
use wagerdesk_core::transfer::{Actor, TransferEngine, TransferError, UserSnapshot};
use wagerdesk_shared::{password, Currency};

use super::plan::{apply_plan, vendor_snapshot};
use super::transfer::{lock_user, lock_vendor, TransferOpError};
use crate::entities::{user_transactions, users};

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// User not found.
    #[error("User not found: {0}")]
    NotFound(String),

    /// Owning vendor not found.
    #[error("Vendor not found: {0}")]
    VendorNotFound(String),

    /// Username or email already registered.
    #[error("Already registered: {0}")]
    Taken(String),

    /// Invalid input field.
    #[error("{0}")]
    Validation(String),

    /// User still holds funds or open bets.
    #[error("User {0} still holds funds and cannot be deleted")]
    HasFunds(String),

    /// Opening credit was rejected.
    #[error(transparent)]
    Rejected(#[from] TransferError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<TransferOpError> for UserError {
    fn from(e: TransferOpError) -> Self {
        match e {
            TransferOpError::VendorNotFound(id) => Self::VendorNotFound(id),
            TransferOpError::UserNotFound(id) => Self::NotFound(id),
            TransferOpError::Rejected(e) => Self::Rejected(e),
            TransferOpError::Database(e) => Self::Database(e),
        }
    }
}

impl UserError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "USER_NOT_FOUND",
            Self::VendorNotFound(_) => "VENDOR_NOT_FOUND",
            Self::Taken(_) => "ALREADY_REGISTERED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::HasFunds(_) => "USER_HAS_FUNDS",
            Self::Rejected(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::VendorNotFound(_) => 404,
            Self::Taken(_) | Self::HasFunds(_) => 409,
            Self::Validation(_) => 400,
            Self::Rejected(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Username, unique.
    pub username: String,
    /// Login email, unique.
    pub email: String,
    /// Plain-text password, hashed before storage.
    pub password: String,
    /// Owning vendor's public ID.
    pub vendor_id: String,
    /// Opening balance; zero means no opening credit.
    pub initial_balance: Decimal,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a user under a vendor, crediting the opening balance from
    /// the vendor's available credit when given.
    ///
    /// # Errors
    ///
    /// Returns an error on a missing or inactive vendor, duplicate
    /// username or email, weak password, a rejected opening credit, or
    /// database failure.
    pub async fn create(
        &self,
        input: CreateUserInput,
        actor: &Actor,
        currency: &Currency,
    ) -> Result<users::Model, UserError> {
        if input.username.trim().is_empty() {
            return Err(UserError::Validation("Username is required".to_string()));
        }
        password::validate_password(&input.password)
            .map_err(|e| UserError::Validation(e.to_string()))?;
        let password_hash = password::hash_password(&input.password)
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let txn = self.db.begin().await?;

        // Vendor lock up front: the opening credit plans against balances
        // no concurrent movement can change underneath us.
        let vendor = lock_vendor(&txn, &input.vendor_id).await?;

        let existing = users::Entity::find()
            .filter(
                users::Column::Username
                    .eq(input.username.clone())
                    .or(users::Column::Email.eq(input.email.clone())),
            )
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(UserError::Taken(input.username));
        }

        let now = Utc::now().fixed_offset();
        let user_id = ids::user_id();
        let user = users::ActiveModel {
            user_id: Set(user_id.clone()),
            username: Set(input.username.clone()),
            email: Set(input.email),
            password_hash: Set(password_hash),
            vendor_id: Set(input.vendor_id.clone()),
            balance: Set(Decimal::ZERO),
            exposure: Set(Decimal::ZERO),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            // Concurrent creates can slip past the pre-check; map the
            // unique-index failure to the same conflict answer.
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                UserError::Taken(input.username.clone())
            } else {
                UserError::Database(e)
            }
        })?;

        let user = if input.initial_balance > Decimal::ZERO {
            let snapshot = UserSnapshot {
                user_id: user.user_id.clone(),
                username: user.username.clone(),
                balance: Decimal::ZERO,
                exposure: Decimal::ZERO,
            };
            let plan = TransferEngine::fund_user_from_vendor(
                &vendor_snapshot(&vendor),
                &snapshot,
                input.initial_balance,
                actor,
                currency,
            )?;
            apply_plan(&txn, &plan).await?;
            lock_user(&txn, &user_id).await?
        } else {
            user
        };

        txn.commit().await?;
        Ok(user)
    }

    /// Lists users, optionally scoped to one vendor, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self, vendor_id: Option<&str>) -> Result<Vec<users::Model>, UserError> {
        let mut query = users::Entity::find().order_by_desc(users::Column::CreatedAt);
        if let Some(vendor_id) = vendor_id {
            query = query.filter(users::Column::VendorId.eq(vendor_id));
        }
        Ok(query.all(&self.db).await?)
    }

    /// Finds a user by public ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no user matches.
    pub async fn get(&self, user_id: &str) -> Result<users::Model, UserError> {
        users::Entity::find()
            .filter(users::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| UserError::NotFound(user_id.to_string()))
    }

    /// Activates or suspends a user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no user matches.
    pub async fn set_active(
        &self,
        user_id: &str,
        is_active: bool,
    ) -> Result<users::Model, UserError> {
        let user = self.get(user_id).await?;
        let mut active: users::ActiveModel = user.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now().fixed_offset());
        Ok(active.update(&self.db).await?)
    }

    /// Deletes a user. Refused while the user still holds a balance or
    /// has open exposure.
    ///
    /// # Errors
    ///
    /// Returns `HasFunds` or `NotFound`.
    pub async fn delete(&self, user_id: &str) -> Result<(), UserError> {
        let txn = self.db.begin().await?;
        let user = lock_user(&txn, user_id).await?;

        if user.balance > Decimal::ZERO || user.exposure > Decimal::ZERO {
            return Err(UserError::HasFunds(user_id.to_string()));
        }

        users::Entity::delete_many()
            .filter(users::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        txn.commit().await?;
        Ok(())
    }

    /// Lists a user's transaction log, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no user matches.
    pub async fn transactions(
        &self,
        user_id: &str,
        limit: u64,
    ) -> Result<Vec<user_transactions::Model>, UserError> {
        self.get(user_id).await?;
        Ok(user_transactions::Entity::find()
            .filter(user_transactions::Column::UserId.eq(user_id))
            .order_by_desc(user_transactions::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?)
    }
}
