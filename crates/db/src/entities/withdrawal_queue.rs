//! `SeaORM` Entity for the withdrawal approval queue.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "site1_superadmin", table_name = "withdrawal_queue")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Public withdrawal ID (`WD-…`), unique.
    pub withdrawal_id: String,
    pub user_id: String,
    pub username: String,
    pub amount: Decimal,
    /// `pending`, `approved` or `rejected`.
    pub status: String,
    /// Rejection reason, if rejected.
    pub reason: Option<String>,
    pub requested_at: DateTimeWithTimeZone,
    pub processed_at: Option<DateTimeWithTimeZone>,
    pub processed_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
