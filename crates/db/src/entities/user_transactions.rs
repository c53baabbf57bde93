//! `SeaORM` Entity for the user transaction log. Append-only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "site3_users", table_name = "user_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Public transaction ID (`UTX-…`), unique.
    pub transaction_id: String,
    pub user_id: String,
    /// `credit_from_vendor`, `bet_placed`, `withdrawal`, `adjustment`.
    pub transaction_type: String,
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub exposure_before: Decimal,
    pub exposure_after: Decimal,
    pub description: String,
    /// Counterparty public ID.
    pub reference_id: String,
    /// Counterparty display name.
    pub reference_name: String,
    pub created_by: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::UserId"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
