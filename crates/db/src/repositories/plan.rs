//! Applies a [`TransferPlan`] inside an open database transaction.
//!
//! All balance updates and ledger inserts from one plan land in the same
//! transaction; the caller commits or rolls back.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, QueryFilter, Set};

use wagerdesk_core::transfer::{TransferPlan, UserSnapshot, VendorSnapshot};

use crate::entities::{
    admin_fund_allocations, master_ledger, user_transactions, users, vendor_transactions, vendors,
};

pub(crate) fn vendor_snapshot(model: &vendors::Model) -> VendorSnapshot {
    VendorSnapshot {
        vendor_id: model.vendor_id.clone(),
        name: model.name.clone(),
        credit_limit: model.credit_limit,
        used_credit: model.used_credit,
        is_active: model.is_active,
    }
}

pub(crate) fn user_snapshot(model: &users::Model) -> UserSnapshot {
    UserSnapshot {
        user_id: model.user_id.clone(),
        username: model.username.clone(),
        balance: model.balance,
        exposure: model.exposure,
    }
}

pub(crate) async fn apply_plan(txn: &DatabaseTransaction, plan: &TransferPlan) -> Result<(), DbErr> {
    let now = Utc::now().fixed_offset();

    if let Some(update) = &plan.vendor_update {
        vendors::Entity::update_many()
            .col_expr(vendors::Column::CreditLimit, Expr::value(update.credit_limit))
            .col_expr(vendors::Column::UsedCredit, Expr::value(update.used_credit))
            .col_expr(vendors::Column::UpdatedAt, Expr::value(now))
            .filter(vendors::Column::VendorId.eq(update.vendor_id.clone()))
            .exec(txn)
            .await?;
    }

    if let Some(update) = &plan.user_update {
        users::Entity::update_many()
            .col_expr(users::Column::Balance, Expr::value(update.balance))
            .col_expr(users::Column::Exposure, Expr::value(update.exposure))
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::UserId.eq(update.user_id.clone()))
            .exec(txn)
            .await?;
    }

    if let Some(entry) = &plan.vendor_entry {
        vendor_transactions::ActiveModel {
            transaction_id: Set(entry.transaction_id.clone()),
            vendor_id: Set(entry.vendor_id.clone()),
            transaction_type: Set(entry.kind.as_str().to_string()),
            amount: Set(entry.amount),
            balance_before: Set(entry.balance_before),
            balance_after: Set(entry.balance_after),
            description: Set(entry.description.clone()),
            reference_id: Set(entry.reference_id.clone()),
            reference_name: Set(entry.reference_name.clone()),
            created_by: Set(entry.created_by.clone()),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }

    if let Some(entry) = &plan.user_entry {
        user_transactions::ActiveModel {
            transaction_id: Set(entry.transaction_id.clone()),
            user_id: Set(entry.user_id.clone()),
            transaction_type: Set(entry.kind.as_str().to_string()),
            amount: Set(entry.amount),
            balance_before: Set(entry.balance_before),
            balance_after: Set(entry.balance_after),
            exposure_before: Set(entry.exposure_before),
            exposure_after: Set(entry.exposure_after),
            description: Set(entry.description.clone()),
            reference_id: Set(entry.reference_id.clone()),
            reference_name: Set(entry.reference_name.clone()),
            created_by: Set(entry.created_by.clone()),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }

    if let Some(record) = &plan.allocation {
        admin_fund_allocations::ActiveModel {
            allocation_id: Set(record.allocation_id.clone()),
            allocation_type: Set(record.allocation_type.clone()),
            to_entity_type: Set(record.recipient_kind.as_str().to_string()),
            to_entity_id: Set(record.recipient_id.clone()),
            to_entity_name: Set(record.recipient_name.clone()),
            amount: Set(record.amount),
            description: Set(record.description.clone()),
            allocated_by: Set(record.allocated_by.clone()),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }

    master_ledger::ActiveModel {
        ledger_id: Set(plan.ledger.ledger_id.clone()),
        transaction_date: Set(now),
        entry_type: Set(plan.ledger.kind.as_str().to_string()),
        from_entity_type: Set(plan.ledger.from_kind.as_str().to_string()),
        from_entity_id: Set(plan.ledger.from_id.clone()),
        from_entity_name: Set(plan.ledger.from_name.clone()),
        to_entity_type: Set(plan.ledger.to_kind.as_str().to_string()),
        to_entity_id: Set(plan.ledger.to_id.clone()),
        to_entity_name: Set(plan.ledger.to_name.clone()),
        amount: Set(plan.ledger.amount),
        transaction_type: Set(plan.ledger.transaction_type.clone()),
        description: Set(plan.ledger.description.clone()),
        created_by: Set(plan.ledger.created_by.clone()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    Ok(())
}
