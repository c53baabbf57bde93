//! Financial command repository.
//!
//! Aggregates the raw sums behind the financial dashboard and exposes
//! read access to the master ledger and allocation log.

use sea_orm::{
    DatabaseConnection, DbBackend, DbErr, EntityTrait, FromQueryResult, QueryOrder, QuerySelect,
    Statement,
};

use rust_decimal::Decimal;
use wagerdesk_core::stats::{FinancialSnapshot, FinancialStats};

use crate::entities::{admin_fund_allocations, master_ledger};

#[derive(Debug, FromQueryResult)]
struct VendorSums {
    total_limits: Decimal,
    vendor_used: Decimal,
    active_vendors: i64,
}

#[derive(Debug, FromQueryResult)]
struct UserSums {
    total_balance: Decimal,
    total_exposure: Decimal,
    active_users: i64,
}

#[derive(Debug, FromQueryResult)]
struct PendingWithdrawals {
    pending_count: i64,
    pending_amount: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct FlowSum {
    total: Decimal,
}

/// Repository for financial aggregation and ledger reads.
#[derive(Debug, Clone)]
pub struct FinancialRepository {
    db: DatabaseConnection,
}

impl FinancialRepository {
    /// Creates a new financial repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Reads the raw sums for the financial dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn snapshot(&self) -> Result<FinancialSnapshot, DbErr> {
        let total_allocated = self
            .flow_sum(
                "SELECT COALESCE(SUM(amount), 0) AS total
                 FROM site1_superadmin.admin_fund_allocations
                 WHERE allocation_type = 'to_vendor'",
            )
            .await?;

        let vendor_sums = VendorSums::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            "SELECT COALESCE(SUM(credit_limit), 0) AS total_limits,
                    COALESCE(SUM(used_credit), 0)  AS vendor_used,
                    COUNT(*) FILTER (WHERE is_active) AS active_vendors
             FROM site2_vendor.vendors",
        ))
        .one(&self.db)
        .await?
        .unwrap_or(VendorSums {
            total_limits: Decimal::ZERO,
            vendor_used: Decimal::ZERO,
            active_vendors: 0,
        });

        let user_sums = UserSums::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            "SELECT COALESCE(SUM(balance), 0)  AS total_balance,
                    COALESCE(SUM(exposure), 0) AS total_exposure,
                    COUNT(*) FILTER (WHERE is_active) AS active_users
             FROM site3_users.users",
        ))
        .one(&self.db)
        .await?
        .unwrap_or(UserSums {
            total_balance: Decimal::ZERO,
            total_exposure: Decimal::ZERO,
            active_users: 0,
        });

        let pending = PendingWithdrawals::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            "SELECT COUNT(*) AS pending_count,
                    COALESCE(SUM(amount), 0) AS pending_amount
             FROM site1_superadmin.withdrawal_queue
             WHERE status = 'pending'",
        ))
        .one(&self.db)
        .await?
        .unwrap_or(PendingWithdrawals {
            pending_count: 0,
            pending_amount: Decimal::ZERO,
        });

        let bet_volume_24h = self
            .flow_sum(
                "SELECT COALESCE(SUM(amount), 0) AS total
                 FROM site3_users.user_transactions
                 WHERE transaction_type = 'bet_placed'
                   AND created_at >= NOW() - INTERVAL '24 hours'",
            )
            .await?;

        let commission_mtd = self
            .flow_sum(
                "SELECT COALESCE(SUM(amount), 0) AS total
                 FROM site2_vendor.vendor_transactions
                 WHERE transaction_type = 'commission_earned'
                   AND created_at >= date_trunc('month', NOW())",
            )
            .await?;

        Ok(FinancialSnapshot {
            total_allocated,
            total_credit_limits: vendor_sums.total_limits,
            vendor_used: vendor_sums.vendor_used,
            total_user_balance: user_sums.total_balance,
            user_exposure: user_sums.total_exposure,
            active_vendors: u64::try_from(vendor_sums.active_vendors).unwrap_or(0),
            active_users: u64::try_from(user_sums.active_users).unwrap_or(0),
            pending_withdrawal_count: u64::try_from(pending.pending_count).unwrap_or(0),
            pending_withdrawal_amount: pending.pending_amount,
            bet_volume_24h,
            commission_mtd,
        })
    }

    async fn flow_sum(&self, sql: &str) -> Result<Decimal, DbErr> {
        let row = FlowSum::find_by_statement(Statement::from_string(DbBackend::Postgres, sql))
            .one(&self.db)
            .await?;
        Ok(row.map_or(Decimal::ZERO, |r| r.total))
    }

    /// Derives the dashboard stats from a fresh snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot queries fail.
    pub async fn stats(&self) -> Result<FinancialStats, DbErr> {
        let snapshot = self.snapshot().await?;
        Ok(FinancialStats::from(&snapshot))
    }

    /// Reads a page of the master ledger, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn ledger(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<master_ledger::Model>, DbErr> {
        master_ledger::Entity::find()
            .order_by_desc(master_ledger::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
    }

    /// Reads the most recent admin fund allocations.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn allocations(
        &self,
        limit: u64,
    ) -> Result<Vec<admin_fund_allocations::Model>, DbErr> {
        admin_fund_allocations::Entity::find()
            .order_by_desc(admin_fund_allocations::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
    }
}
