//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions across the three platform schemas
//! - Repository abstractions for data access
//! - Database migrations
//!
//! Every multi-row fund movement goes through
//! [`repositories::TransferRepository`], which locks the affected account
//! rows, asks the transfer engine for a plan, and applies the plan inside
//! a single database transaction.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AuditRepository, FinancialRepository, RiskRepository, TransferRepository, UserRepository,
    VendorRepository, WithdrawalRepository,
};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use wagerdesk_shared::DatabaseConfig;

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections);
    Database::connect(options).await
}
