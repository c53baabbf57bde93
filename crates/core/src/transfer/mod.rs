//! The fund transfer engine.
//!
//! Every credit movement in the platform (admin allocation, vendor-to-user
//! funding, balance corrections, withdrawal settlement) writes denormalized
//! records into up to three ledgers: the per-entity transaction log, the
//! admin allocation log, and the system-wide master ledger. This module is
//! the single place that decides which rows to write and with what before /
//! after balances, so that the conservation invariants hold no matter which
//! endpoint triggered the movement.
//!
//! The engine is pure: it reads account snapshots and emits a
//! [`TransferPlan`]. The database layer applies a plan inside one database
//! transaction, making the multi-row write all-or-nothing.

pub mod engine;
pub mod error;
pub mod types;

pub use engine::TransferEngine;
pub use error::TransferError;
pub use types::{
    Actor, AllocationRecord, EntityKind, LedgerEntryKind, LedgerRow, TransferPlan, UserEntry,
    UserEntryKind, UserSnapshot, UserUpdate, VendorEntry, VendorEntryKind, VendorSnapshot,
    VendorUpdate,
};
