//! Integration tests for fund movements.
//!
//! These tests need a live Postgres database; they skip themselves when
//! `DATABASE_URL` is not set. Migrations are applied on first connect.

use rust_decimal_macros::dec;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
use std::env;
use uuid::Uuid;

use wagerdesk_core::transfer::{Actor, TransferError};
use wagerdesk_db::migration::{Migrator, MigratorTrait};
use wagerdesk_db::repositories::transfer::TransferOpError;
use wagerdesk_db::repositories::user::CreateUserInput;
use wagerdesk_db::repositories::vendor::CreateVendorInput;
use wagerdesk_db::{FinancialRepository, TransferRepository, UserRepository, VendorRepository};
use wagerdesk_shared::Currency;

async fn connect() -> Option<DatabaseConnection> {
    let url = env::var("DATABASE_URL").ok()?;
    let db = Database::connect(&url).await.expect("connect to database");
    Migrator::up(&db, None).await.expect("run migrations");
    Some(db)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", &Uuid::new_v4().simple().to_string()[..8])
}

fn vendor_input(credit_limit: rust_decimal::Decimal) -> CreateVendorInput {
    let tag = unique("v");
    CreateVendorInput {
        name: format!("Vendor {tag}"),
        email: format!("{tag}@example.com"),
        password: "hunter22".to_string(),
        credit_limit,
        commission_rate: dec!(2.5),
    }
}

fn user_input(vendor_id: &str, initial_balance: rust_decimal::Decimal) -> CreateUserInput {
    let tag = unique("u");
    CreateUserInput {
        username: tag.clone(),
        email: format!("{tag}@example.com"),
        password: "hunter22".to_string(),
        vendor_id: vendor_id.to_string(),
        initial_balance,
    }
}

#[tokio::test]
async fn test_vendor_create_writes_opening_allocation() {
    let Some(db) = connect().await else { return };
    let vendors = VendorRepository::new(db.clone());
    let actor = Actor::admin();
    let inr = Currency::inr();

    let vendor = vendors
        .create(vendor_input(dec!(1000)), &actor, &inr)
        .await
        .expect("create vendor");

    assert!(vendor.vendor_id.starts_with("VND-"));
    assert_eq!(vendor.credit_limit, dec!(1000));
    assert_eq!(vendor.used_credit, dec!(0));

    let txs = vendors
        .transactions(&vendor.vendor_id, 10)
        .await
        .expect("list transactions");
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].transaction_type, "credit_from_admin");
    assert_eq!(txs[0].balance_before, dec!(0));
    assert_eq!(txs[0].balance_after, dec!(1000));
    assert!(txs[0].transaction_id.starts_with("VTX-"));

    let financial = FinancialRepository::new(db.clone());
    let entries = financial.ledger(50, 0).await.expect("ledger");
    let entry = entries
        .iter()
        .find(|e| e.to_entity_id == vendor.vendor_id)
        .expect("ledger entry");
    assert_eq!(entry.entry_type, "admin_allocation");
    assert_eq!(entry.transaction_date, entry.created_at);
}

#[tokio::test]
async fn test_duplicate_email_race_answers_conflict() {
    let Some(db) = connect().await else { return };
    let inr = Currency::inr();

    // Both tasks pass the pre-check before either row lands; the loser
    // must still surface as EMAIL_TAKEN, not a database error.
    let input = vendor_input(dec!(0));
    let mut handles = Vec::new();
    for _ in 0..2 {
        let vendors = VendorRepository::new(db.clone());
        let input = input.clone();
        let inr = inr.clone();
        handles.push(tokio::spawn(async move {
            let actor = Actor::admin();
            vendors.create(input, &actor, &inr).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.expect("task join") {
            Ok(_) => successes += 1,
            Err(e) => assert_eq!(e.error_code(), "EMAIL_TAKEN"),
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test]
async fn test_user_create_funds_from_vendor_credit() {
    let Some(db) = connect().await else { return };
    let vendors = VendorRepository::new(db.clone());
    let users = UserRepository::new(db.clone());
    let actor = Actor::admin();
    let inr = Currency::inr();

    let vendor = vendors
        .create(vendor_input(dec!(1000)), &actor, &inr)
        .await
        .expect("create vendor");
    let user = users
        .create(user_input(&vendor.vendor_id, dec!(400)), &actor, &inr)
        .await
        .expect("create user");

    assert!(user.user_id.starts_with("USR-"));
    assert_eq!(user.balance, dec!(400));
    assert_eq!(user.exposure, dec!(0));

    let vendor = vendors.get(&vendor.vendor_id).await.expect("get vendor");
    assert_eq!(vendor.used_credit, dec!(400));
    assert_eq!(vendor.credit_limit, dec!(1000));

    // The vendor debit row tracks the used-credit running total.
    let vtxs = vendors
        .transactions(&vendor.vendor_id, 10)
        .await
        .expect("vendor transactions");
    let debit = vtxs
        .iter()
        .find(|t| t.transaction_type == "debit_to_user")
        .expect("debit row");
    assert_eq!(debit.balance_before, dec!(0));
    assert_eq!(debit.balance_after, dec!(400));

    let utxs = users
        .transactions(&user.user_id, 10)
        .await
        .expect("user transactions");
    assert_eq!(utxs.len(), 1);
    assert_eq!(utxs[0].transaction_type, "credit_from_vendor");
    assert_eq!(utxs[0].balance_after, dec!(400));
}

#[tokio::test]
async fn test_credit_cap_rejected_without_partial_writes() {
    let Some(db) = connect().await else { return };
    let vendors = VendorRepository::new(db.clone());
    let users = UserRepository::new(db.clone());
    let transfers = TransferRepository::new(db.clone());
    let actor = Actor::admin();
    let inr = Currency::inr();

    let vendor = vendors
        .create(vendor_input(dec!(100)), &actor, &inr)
        .await
        .expect("create vendor");
    let user = users
        .create(user_input(&vendor.vendor_id, dec!(0)), &actor, &inr)
        .await
        .expect("create user");

    let result = transfers
        .fund_user(&vendor.vendor_id, &user.user_id, dec!(250), &actor, &inr)
        .await;
    assert!(matches!(
        result,
        Err(TransferOpError::Rejected(TransferError::CreditLimitExceeded { .. }))
    ));

    // Nothing moved and no partial rows landed.
    let vendor = vendors.get(&vendor.vendor_id).await.expect("get vendor");
    assert_eq!(vendor.used_credit, dec!(0));
    let user = users.get(&user.user_id).await.expect("get user");
    assert_eq!(user.balance, dec!(0));
    let utxs = users
        .transactions(&user.user_id, 10)
        .await
        .expect("user transactions");
    assert!(utxs.is_empty());
}

#[tokio::test]
async fn test_mid_apply_failure_rolls_back_every_row() {
    let Some(db) = connect().await else { return };
    let vendors = VendorRepository::new(db.clone());
    let users = UserRepository::new(db.clone());
    let transfers = TransferRepository::new(db.clone());
    let actor = Actor::admin();
    let inr = Currency::inr();

    let vendor = vendors
        .create(vendor_input(dec!(1000)), &actor, &inr)
        .await
        .expect("create vendor");
    let user = users
        .create(user_input(&vendor.vendor_id, dec!(0)), &actor, &inr)
        .await
        .expect("create user");

    // The master-ledger row is the last write of a funding plan. Reject
    // one specific amount at the table so that final insert fails after
    // the balance updates and transaction rows have already been issued.
    db.execute_unprepared(
        "ALTER TABLE site1_superadmin.master_ledger
         DROP CONSTRAINT IF EXISTS chk_ledger_blocked_amount",
    )
    .await
    .expect("drop stale constraint");
    db.execute_unprepared(
        "ALTER TABLE site1_superadmin.master_ledger
         ADD CONSTRAINT chk_ledger_blocked_amount CHECK (amount <> 123.45)",
    )
    .await
    .expect("add constraint");

    let result = transfers
        .fund_user(&vendor.vendor_id, &user.user_id, dec!(123.45), &actor, &inr)
        .await;

    db.execute_unprepared(
        "ALTER TABLE site1_superadmin.master_ledger
         DROP CONSTRAINT chk_ledger_blocked_amount",
    )
    .await
    .expect("drop constraint");

    assert!(matches!(result, Err(TransferOpError::Database(_))));

    // The whole transaction rolled back: balances untouched, no orphaned
    // per-entity rows.
    let vendor = vendors.get(&vendor.vendor_id).await.expect("get vendor");
    assert_eq!(vendor.used_credit, dec!(0));
    let user = users.get(&user.user_id).await.expect("get user");
    assert_eq!(user.balance, dec!(0));
    let vtxs = vendors
        .transactions(&vendor.vendor_id, 10)
        .await
        .expect("vendor transactions");
    assert!(vtxs.iter().all(|t| t.transaction_type != "debit_to_user"));
    let utxs = users
        .transactions(&user.user_id, 10)
        .await
        .expect("user transactions");
    assert!(utxs.is_empty());
}

#[tokio::test]
async fn test_concurrent_funding_serializes_on_vendor_lock() {
    let Some(db) = connect().await else { return };
    let vendors = VendorRepository::new(db.clone());
    let users = UserRepository::new(db.clone());
    let actor = Actor::admin();
    let inr = Currency::inr();

    let vendor = vendors
        .create(vendor_input(dec!(500)), &actor, &inr)
        .await
        .expect("create vendor");
    let user = users
        .create(user_input(&vendor.vendor_id, dec!(0)), &actor, &inr)
        .await
        .expect("create user");

    // Two tasks race 10 transfers of 30 each against a 500 limit: all must
    // plan against fresh balances, so every one succeeds and the final
    // used credit is exactly the sum.
    let mut handles = Vec::new();
    for _ in 0..2 {
        let transfers = TransferRepository::new(db.clone());
        let vendor_id = vendor.vendor_id.clone();
        let user_id = user.user_id.clone();
        let inr = inr.clone();
        handles.push(tokio::spawn(async move {
            let actor = Actor::admin();
            for _ in 0..5 {
                transfers
                    .fund_user(&vendor_id, &user_id, dec!(30), &actor, &inr)
                    .await
                    .expect("fund user");
            }
        }));
    }
    for handle in handles {
        handle.await.expect("task join");
    }

    let vendor = vendors.get(&vendor.vendor_id).await.expect("get vendor");
    assert_eq!(vendor.used_credit, dec!(300));
    let user = users.get(&user.user_id).await.expect("get user");
    assert_eq!(user.balance, dec!(300));
}

#[tokio::test]
async fn test_vendor_adjustment_and_delete_guard() {
    let Some(db) = connect().await else { return };
    let vendors = VendorRepository::new(db.clone());
    let users = UserRepository::new(db.clone());
    let transfers = TransferRepository::new(db.clone());
    let actor = Actor::admin();
    let inr = Currency::inr();

    let vendor = vendors
        .create(vendor_input(dec!(200)), &actor, &inr)
        .await
        .expect("create vendor");
    let user = users
        .create(user_input(&vendor.vendor_id, dec!(150)), &actor, &inr)
        .await
        .expect("create user");

    // Lowering the limit below the distributed credit is refused.
    let result = transfers
        .adjust_vendor_credit(&vendor.vendor_id, dec!(-100), "claw back", &actor, &inr)
        .await;
    assert!(matches!(
        result,
        Err(TransferOpError::Rejected(TransferError::CreditLimitExceeded { .. }))
    ));

    // Deleting a vendor with outstanding used credit is refused.
    let result = vendors.delete(&vendor.vendor_id).await;
    assert!(result.is_err());

    // Deleting a user that still holds funds is refused.
    let result = users.delete(&user.user_id).await;
    assert!(result.is_err());
}
