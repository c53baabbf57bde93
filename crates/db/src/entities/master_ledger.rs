//! `SeaORM` Entity for the master ledger.
//!
//! Every fund movement between any two entities lands here exactly once,
//! regardless of which per-entity log it also touched. Append-only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "site1_superadmin", table_name = "master_ledger")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Public ledger ID (`LDG-…`), unique.
    pub ledger_id: String,
    /// Business date of the movement, distinct from the row insert time.
    pub transaction_date: DateTimeWithTimeZone,
    /// `admin_allocation`, `vendor_to_user`, `user_withdrawal`, `adjustment`.
    pub entry_type: String,
    pub from_entity_type: String,
    pub from_entity_id: String,
    pub from_entity_name: String,
    pub to_entity_type: String,
    pub to_entity_id: String,
    pub to_entity_name: String,
    pub amount: Decimal,
    /// Transaction type mirroring the per-entity row.
    pub transaction_type: String,
    pub description: String,
    pub created_by: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
