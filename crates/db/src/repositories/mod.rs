//! Repository layer for database access.
//!
//! Each repository owns a connection handle and exposes async methods for
//! one aggregate. Fund-moving methods follow the same shape everywhere:
//! begin a transaction, lock the affected account rows, plan the movement
//! with the transfer engine, apply the plan, commit.

pub mod audit;
pub mod financial;
mod plan;
pub mod risk;
pub mod transfer;
pub mod user;
pub mod vendor;
pub mod withdrawal;

pub use audit::AuditRepository;
pub use financial::FinancialRepository;
pub use risk::RiskRepository;
pub use transfer::TransferRepository;
pub use user::UserRepository;
pub use vendor::VendorRepository;
pub use withdrawal::WithdrawalRepository;
