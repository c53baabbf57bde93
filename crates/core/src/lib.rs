//! Core business logic for WagerDesk.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and ledger planning
//! live here.
//!
//! # Modules
//!
//! - `transfer` - The fund transfer engine: plans every multi-row ledger write
//! - `audit` - Audit entry construction and security token generation
//! - `withdrawal` - Withdrawal approval state machine
//! - `stats` - Derived financial, audit, and risk metrics
//! - `ids` - Reference ID generation with the platform prefix taxonomy

pub mod audit;
pub mod ids;
pub mod stats;
pub mod transfer;
pub mod withdrawal;
