//! `SeaORM` Entity for the users table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "site3_users", table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Public user ID (`USR-…`), unique.
    pub user_id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Owning vendor's public ID.
    pub vendor_id: String,
    /// Funds available to the user.
    pub balance: Decimal,
    /// Funds locked in open bets.
    pub exposure: Decimal,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::user_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_transactions::Relation::Users.def().rev()
    }
}

impl ActiveModelBehavior for ActiveModel {}
