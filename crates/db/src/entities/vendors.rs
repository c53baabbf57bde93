//! `SeaORM` Entity for the vendors table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "site2_vendor", table_name = "vendors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Public vendor ID (`VND-…`), unique.
    pub vendor_id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Total funds the admin has allocated.
    pub credit_limit: Decimal,
    /// Portion of the limit already distributed to users.
    pub used_credit: Decimal,
    /// Commission percentage on user activity.
    pub commission_rate: Decimal,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::vendor_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        super::vendor_transactions::Relation::Vendors.def().rev()
    }
}

impl ActiveModelBehavior for ActiveModel {}
