//! Audit trail repository.
//!
//! Recording is best-effort: a failed insert is logged and swallowed so
//! an audit outage never blocks the operation being audited.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use wagerdesk_core::audit::{AuditCategory, AuditEntry, AuditStatus};
use wagerdesk_core::stats::{AuditCounts, AuditKpis};

use crate::entities::audit_logs;

/// Filter options for listing audit logs.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Filter by category string (`Security`, `Finance`, `Vendor`, `System`).
    pub category: Option<String>,
    /// Filter by status (`success`, `failed`).
    pub status: Option<String>,
    /// Maximum rows to return.
    pub limit: Option<u64>,
}

/// Repository for the audit trail.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    db: DatabaseConnection,
}

impl AuditRepository {
    /// Creates a new audit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Persists an audit entry. Failures are logged, never returned.
    pub async fn record(&self, entry: AuditEntry) {
        let result = audit_logs::ActiveModel {
            security_token: Set(entry.security_token.clone()),
            action: Set(entry.action),
            category: Set(entry.category.as_str().to_string()),
            details: Set(entry.details),
            operation: Set(entry.trace.operation),
            params: Set(entry.trace.params),
            status: Set(entry.status.as_str().to_string()),
            prev_state: Set(entry.prev_state),
            new_state: Set(entry.new_state),
            admin_id: Set(entry.actor.admin_id),
            admin_name: Set(entry.actor.admin_name),
            ip_address: Set(entry.actor.ip_address),
            user_agent: Set(entry.actor.user_agent),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(&self.db)
        .await;

        if let Err(e) = result {
            tracing::warn!(
                error = %e,
                security_token = %entry.security_token,
                "Failed to record audit entry"
            );
        }
    }

    /// Lists audit logs matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self, filter: AuditFilter) -> Result<Vec<audit_logs::Model>, DbErr> {
        let mut query = audit_logs::Entity::find().order_by_desc(audit_logs::Column::CreatedAt);
        if let Some(category) = filter.category {
            query = query.filter(audit_logs::Column::Category.eq(category));
        }
        if let Some(status) = filter.status {
            query = query.filter(audit_logs::Column::Status.eq(status));
        }
        query.limit(filter.limit.unwrap_or(100).min(500)).all(&self.db).await
    }

    /// Finds one audit log by its security token.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_token(
        &self,
        security_token: &str,
    ) -> Result<Option<audit_logs::Model>, DbErr> {
        audit_logs::Entity::find()
            .filter(audit_logs::Column::SecurityToken.eq(security_token))
            .one(&self.db)
            .await
    }

    /// Derives audit health KPIs from raw event counts.
    ///
    /// # Errors
    ///
    /// Returns an error if a count query fails.
    pub async fn kpis(&self) -> Result<AuditKpis, DbErr> {
        let day_ago = (Utc::now() - chrono::Duration::hours(24)).fixed_offset();
        let counts = AuditCounts {
            total: audit_logs::Entity::find().count(&self.db).await?,
            failed: audit_logs::Entity::find()
                .filter(audit_logs::Column::Status.eq(AuditStatus::Failed.as_str()))
                .count(&self.db)
                .await?,
            last_24h: audit_logs::Entity::find()
                .filter(audit_logs::Column::CreatedAt.gte(day_ago))
                .count(&self.db)
                .await?,
            security: audit_logs::Entity::find()
                .filter(audit_logs::Column::Category.eq(AuditCategory::Security.as_str()))
                .count(&self.db)
                .await?,
        };
        Ok(AuditKpis::from(&counts))
    }
}
