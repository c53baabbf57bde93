//! `SeaORM` Entity for risk alerts surfaced on the command dashboard.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "site1_superadmin", table_name = "risk_alerts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// `critical`, `high`, `medium` or `low`.
    pub severity: String,
    /// Alert classification, e.g. `exposure_spike`, `failed_logins`.
    pub alert_type: String,
    pub message: String,
    /// Public ID of the entity the alert concerns, if any.
    pub entity_id: Option<String>,
    pub is_resolved: bool,
    pub resolved_by: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub resolved_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
