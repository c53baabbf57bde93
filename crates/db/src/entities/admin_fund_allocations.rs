//! `SeaORM` Entity for the admin fund allocation log. Append-only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "site1_superadmin", table_name = "admin_fund_allocations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Public allocation ID (`ALLOC-…`), unique.
    pub allocation_id: String,
    /// Always `to_vendor` in the current taxonomy.
    pub allocation_type: String,
    /// `vendor` or `user`.
    pub to_entity_type: String,
    pub to_entity_id: String,
    pub to_entity_name: String,
    pub amount: Decimal,
    pub description: String,
    pub allocated_by: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
