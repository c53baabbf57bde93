//! Risk alert repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, Set, Statement,
};

use wagerdesk_core::stats::{RiskCounts, RiskKpis};

use crate::entities::risk_alerts;

/// Error types for risk alert operations.
#[derive(Debug, thiserror::Error)]
pub enum RiskError {
    /// Alert not found.
    #[error("Risk alert not found: {0}")]
    NotFound(i32),

    /// Alert already resolved.
    #[error("Risk alert {0} is already resolved")]
    AlreadyResolved(i32),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RiskError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "ALERT_NOT_FOUND",
            Self::AlreadyResolved(_) => "ALREADY_RESOLVED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::AlreadyResolved(_) => 409,
            Self::Database(_) => 500,
        }
    }
}

/// Input for raising an alert.
#[derive(Debug, Clone)]
pub struct RaiseAlertInput {
    /// `critical`, `high`, `medium` or `low`.
    pub severity: String,
    /// Alert classification, e.g. `exposure_spike`.
    pub alert_type: String,
    /// Human-readable message.
    pub message: String,
    /// Public ID of the entity concerned, if any.
    pub entity_id: Option<String>,
}

/// Repository for risk alerts.
#[derive(Debug, Clone)]
pub struct RiskRepository {
    db: DatabaseConnection,
}

impl RiskRepository {
    /// Creates a new risk repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Raises a new alert.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn raise(&self, input: RaiseAlertInput) -> Result<risk_alerts::Model, RiskError> {
        Ok(risk_alerts::ActiveModel {
            severity: Set(input.severity),
            alert_type: Set(input.alert_type),
            message: Set(input.message),
            entity_id: Set(input.entity_id),
            is_resolved: Set(false),
            resolved_by: Set(None),
            created_at: Set(Utc::now().fixed_offset()),
            resolved_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await?)
    }

    /// Lists open alerts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn open_alerts(&self) -> Result<Vec<risk_alerts::Model>, RiskError> {
        Ok(risk_alerts::Entity::find()
            .filter(risk_alerts::Column::IsResolved.eq(false))
            .order_by_desc(risk_alerts::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Marks an alert resolved.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `AlreadyResolved`.
    pub async fn resolve(
        &self,
        alert_id: i32,
        resolved_by: &str,
    ) -> Result<risk_alerts::Model, RiskError> {
        let alert = risk_alerts::Entity::find_by_id(alert_id)
            .one(&self.db)
            .await?
            .ok_or(RiskError::NotFound(alert_id))?;

        if alert.is_resolved {
            return Err(RiskError::AlreadyResolved(alert_id));
        }

        let mut active: risk_alerts::ActiveModel = alert.into();
        active.is_resolved = Set(true);
        active.resolved_by = Set(Some(resolved_by.to_string()));
        active.resolved_at = Set(Some(Utc::now().fixed_offset()));
        Ok(active.update(&self.db).await?)
    }

    /// Derives risk KPIs from open alert counts by severity.
    ///
    /// # Errors
    ///
    /// Returns an error if a count query fails.
    pub async fn kpis(&self) -> Result<RiskKpis, RiskError> {
        let counts = RiskCounts {
            critical: self.count_open("critical").await?,
            high: self.count_open("high").await?,
            medium: self.count_open("medium").await?,
            low: self.count_open("low").await?,
        };

        #[derive(Debug, FromQueryResult)]
        struct Flagged {
            flagged: i64,
        }
        let flagged = Flagged::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            "SELECT COUNT(DISTINCT entity_id) AS flagged
             FROM site1_superadmin.risk_alerts
             WHERE NOT is_resolved AND entity_id IS NOT NULL",
        ))
        .one(&self.db)
        .await?
        .map_or(0, |f| f.flagged);

        Ok(RiskKpis::from_counts(
            &counts,
            u64::try_from(flagged).unwrap_or(0),
        ))
    }

    async fn count_open(&self, severity: &str) -> Result<u64, DbErr> {
        risk_alerts::Entity::find()
            .filter(risk_alerts::Column::IsResolved.eq(false))
            .filter(risk_alerts::Column::Severity.eq(severity))
            .count(&self.db)
            .await
    }
}
