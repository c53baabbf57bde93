//! Shared types, errors, and configuration for WagerDesk.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management
//! - Currency display helpers for ledger descriptions
//! - Password hashing (the credential contract consumed by vendor/user CRUD)

pub mod config;
pub mod currency;
pub mod error;
pub mod password;

pub use config::{AppConfig, DatabaseConfig};
pub use currency::Currency;
pub use error::{AppError, AppResult};
