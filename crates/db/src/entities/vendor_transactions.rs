//! `SeaORM` Entity for the vendor transaction log.
//!
//! Rows are append-only. `balance_before` / `balance_after` track the
//! vendor field the row type mutates: the credit limit for
//! `credit_from_admin` and adjustments, the used-credit counter for
//! `debit_to_user`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "site2_vendor", table_name = "vendor_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Public transaction ID (`VTX-…`), unique.
    pub transaction_id: String,
    pub vendor_id: String,
    /// `credit_from_admin`, `debit_to_user`, `commission_earned`, `adjustment`.
    pub transaction_type: String,
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
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
        belongs_to = "super::vendors::Entity",
        from = "Column::VendorId",
        to = "super::vendors::Column::VendorId"
    )]
    Vendors,
}

impl Related<super::vendors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
