//! `SeaORM` entity definitions.
//!
//! Tables are split across three Postgres schemas mirroring the admin
//! hierarchy: `site1_superadmin` holds the master ledger, allocations,
//! audit trail, withdrawal queue and risk alerts; `site2_vendor` holds
//! vendors and their transaction log; `site3_users` holds users and
//! their transaction log.

pub mod admin_fund_allocations;
pub mod audit_logs;
pub mod master_ledger;
pub mod risk_alerts;
pub mod user_transactions;
pub mod users;
pub mod vendor_transactions;
pub mod vendors;
pub mod withdrawal_queue;
