//! `SeaORM` Entity for the audit trail.
//!
//! `params` holds a structured JSON trace of the audited operation
//! instead of raw statement text.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "site1_superadmin", table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Externally visible token (`TRC-…`).
    pub security_token: String,
    /// Short action name, e.g. `CREATE_VENDOR`.
    pub action: String,
    /// `Security`, `Finance`, `Vendor` or `System`.
    pub category: String,
    pub details: String,
    /// Machine-readable operation name, e.g. `vendor.create`.
    pub operation: String,
    /// Operation parameters as JSON.
    pub params: Json,
    /// `success` or `failed`.
    pub status: String,
    /// Row snapshot before the operation, when one applies.
    pub prev_state: Option<Json>,
    /// Row snapshot after the operation, when one applies.
    pub new_state: Option<Json>,
    pub admin_id: String,
    pub admin_name: String,
    pub ip_address: String,
    pub user_agent: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
