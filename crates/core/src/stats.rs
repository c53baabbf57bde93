//! Derived financial, audit, and risk metrics.
//!
//! The database layer aggregates raw sums and counts; this module turns
//! them into the derived figures the command dashboards display. All
//! money math stays in [`Decimal`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Raw sums read from the ledgers in one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinancialSnapshot {
    /// Sum of all `to_vendor` admin fund allocations.
    pub total_allocated: Decimal,
    /// Sum of all vendor credit limits. Diverges from `total_allocated`
    /// once credit adjustments move a limit without an allocation row.
    pub total_credit_limits: Decimal,
    /// Sum of all vendor used credit.
    pub vendor_used: Decimal,
    /// Sum of all user balances.
    pub total_user_balance: Decimal,
    /// Sum of all user exposure.
    pub user_exposure: Decimal,
    /// Number of active vendors.
    pub active_vendors: u64,
    /// Number of active users.
    pub active_users: u64,
    /// Number of withdrawal requests awaiting review.
    pub pending_withdrawal_count: u64,
    /// Sum of withdrawal amounts awaiting review.
    pub pending_withdrawal_amount: Decimal,
    /// `bet_placed` volume over the rolling 24-hour window.
    pub bet_volume_24h: Decimal,
    /// `commission_earned` sum, month to date.
    pub commission_mtd: Decimal,
}

/// Derived figures for the financial command dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialStats {
    /// Funds circulating below the admin: distributed credit plus locked bets.
    pub total_liquidity: Decimal,
    /// Allocated but not yet distributed credit.
    pub reserve_cluster: Decimal,
    /// Total balance owed to users.
    pub user_liability: Decimal,
    /// Sum of all `to_vendor` admin fund allocations.
    pub total_allocated: Decimal,
    /// Sum of all vendor credit limits.
    pub total_credit_limits: Decimal,
    /// Sum of all vendor used credit.
    pub vendor_used: Decimal,
    /// Sum of all user exposure.
    pub user_exposure: Decimal,
    /// Number of active vendors.
    pub active_vendors: u64,
    /// Number of active users.
    pub active_users: u64,
    /// Number of withdrawal requests awaiting review.
    pub pending_withdrawal_count: u64,
    /// Sum of withdrawal amounts awaiting review.
    pub pending_withdrawal_amount: Decimal,
    /// `bet_placed` volume over the rolling 24-hour window.
    pub bet_volume_24h: Decimal,
    /// `commission_earned` sum, month to date.
    pub commission_mtd: Decimal,
}

impl From<&FinancialSnapshot> for FinancialStats {
    fn from(s: &FinancialSnapshot) -> Self {
        Self {
            total_liquidity: s.vendor_used + s.user_exposure,
            reserve_cluster: s.total_allocated - s.vendor_used,
            user_liability: s.total_user_balance,
            total_allocated: s.total_allocated,
            total_credit_limits: s.total_credit_limits,
            vendor_used: s.vendor_used,
            user_exposure: s.user_exposure,
            active_vendors: s.active_vendors,
            active_users: s.active_users,
            pending_withdrawal_count: s.pending_withdrawal_count,
            pending_withdrawal_amount: s.pending_withdrawal_amount,
            bet_volume_24h: s.bet_volume_24h,
            commission_mtd: s.commission_mtd,
        }
    }
}

/// Raw audit event counts read in one aggregation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditCounts {
    /// Total audit log rows.
    pub total: u64,
    /// Rows with failed status.
    pub failed: u64,
    /// Rows created in the last 24 hours.
    pub last_24h: u64,
    /// Rows in the Security category.
    pub security: u64,
}

/// Health figures for the audit dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditKpis {
    /// Total audit log rows.
    pub total_events: u64,
    /// Rows with failed status.
    pub failed_events: u64,
    /// Rows created in the last 24 hours.
    pub events_last_24h: u64,
    /// Rows in the Security category.
    pub security_events: u64,
    /// Percentage of successful events, 100 when there are none.
    pub stability_index: Decimal,
}

impl From<&AuditCounts> for AuditKpis {
    fn from(c: &AuditCounts) -> Self {
        let stability_index = if c.total == 0 {
            Decimal::ONE_HUNDRED
        } else {
            let failed = Decimal::from(c.failed);
            let total = Decimal::from(c.total);
            (Decimal::ONE_HUNDRED * (total - failed) / total).round_dp(2)
        };
        Self {
            total_events: c.total,
            failed_events: c.failed,
            events_last_24h: c.last_24h,
            security_events: c.security,
            stability_index,
        }
    }
}

/// Open risk alert counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskCounts {
    /// Open critical alerts.
    pub critical: u64,
    /// Open high alerts.
    pub high: u64,
    /// Open medium alerts.
    pub medium: u64,
    /// Open low alerts.
    pub low: u64,
}

impl RiskCounts {
    /// Total open alerts across all severities.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.critical + self.high + self.medium + self.low
    }
}

/// Derived figures for the risk dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskKpis {
    /// Total open alerts.
    pub open_alerts: u64,
    /// Open critical alerts.
    pub critical_alerts: u64,
    /// Distinct entities referenced by open alerts.
    pub flagged_entities: u64,
    /// Severity-weighted threat score, capped at 100.
    pub threat_score: Decimal,
}

impl RiskKpis {
    /// Derives KPIs from open alert counts and the flagged-entity count.
    #[must_use]
    pub fn from_counts(c: &RiskCounts, flagged_entities: u64) -> Self {
        // critical 25, high 10, medium 4, low 1; capped at 100.
        let weighted = Decimal::from(c.critical) * Decimal::from(25)
            + Decimal::from(c.high) * Decimal::TEN
            + Decimal::from(c.medium) * Decimal::from(4)
            + Decimal::from(c.low);
        Self {
            open_alerts: c.total(),
            critical_alerts: c.critical,
            flagged_entities,
            threat_score: weighted.min(Decimal::ONE_HUNDRED),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_financial_derivations() {
        let snapshot = FinancialSnapshot {
            total_allocated: dec!(10000),
            total_credit_limits: dec!(9500),
            vendor_used: dec!(6000),
            total_user_balance: dec!(5500),
            user_exposure: dec!(1500),
            active_vendors: 4,
            active_users: 120,
            ..FinancialSnapshot::default()
        };
        let stats = FinancialStats::from(&snapshot);
        assert_eq!(stats.total_liquidity, dec!(7500));
        // Reserve derives from the allocation total, not the limit sum:
        // an adjusted limit must not silently move the reserve.
        assert_eq!(stats.reserve_cluster, dec!(4000));
        assert_eq!(stats.total_credit_limits, dec!(9500));
        assert_eq!(stats.user_liability, dec!(5500));
    }

    #[test]
    fn test_financial_stats_camel_case() {
        let stats = FinancialStats::from(&FinancialSnapshot::default());
        let value = serde_json::to_value(&stats).expect("serialize");
        assert!(value.get("totalLiquidity").is_some());
        assert!(value.get("reserveCluster").is_some());
        assert!(value.get("userLiability").is_some());
    }

    #[test]
    fn test_stability_index() {
        let idx = |total, failed| {
            AuditKpis::from(&AuditCounts {
                total,
                failed,
                ..AuditCounts::default()
            })
            .stability_index
        };
        assert_eq!(idx(0, 0), dec!(100));
        assert_eq!(idx(200, 0), dec!(100));
        assert_eq!(idx(200, 10), dec!(95));
        assert_eq!(idx(3, 1), dec!(66.67));
    }

    #[test]
    fn test_threat_score_weights_and_cap() {
        let calm = RiskCounts {
            medium: 2,
            low: 3,
            ..RiskCounts::default()
        };
        let kpis = RiskKpis::from_counts(&calm, 4);
        assert_eq!(kpis.open_alerts, 5);
        assert_eq!(kpis.flagged_entities, 4);
        assert_eq!(kpis.threat_score, dec!(11));

        let storm = RiskCounts {
            critical: 10,
            high: 10,
            medium: 0,
            low: 0,
        };
        assert_eq!(RiskKpis::from_counts(&storm, 12).threat_score, dec!(100));
    }
}
