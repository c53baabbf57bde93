//! Integration tests for the withdrawal queue.
//!
//! Need a live Postgres database; they skip themselves when
//! `DATABASE_URL` is not set.

use rust_decimal_macros::dec;
use sea_orm::{Database, DatabaseConnection};
use std::env;
use uuid::Uuid;

use wagerdesk_core::transfer::Actor;
use wagerdesk_core::withdrawal::WithdrawalStatus;
use wagerdesk_db::migration::{Migrator, MigratorTrait};
use wagerdesk_db::repositories::user::CreateUserInput;
use wagerdesk_db::repositories::vendor::CreateVendorInput;
use wagerdesk_db::repositories::withdrawal::WithdrawalOpError;
use wagerdesk_db::{UserRepository, VendorRepository, WithdrawalRepository};
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

async fn seed_user(db: &DatabaseConnection, balance: rust_decimal::Decimal) -> String {
    let vendors = VendorRepository::new(db.clone());
    let users = UserRepository::new(db.clone());
    let actor = Actor::admin();
    let inr = Currency::inr();

    let vtag = unique("v");
    let vendor = vendors
        .create(
            CreateVendorInput {
                name: format!("Vendor {vtag}"),
                email: format!("{vtag}@example.com"),
                password: "hunter22".to_string(),
                credit_limit: balance + dec!(100),
                commission_rate: dec!(0),
            },
            &actor,
            &inr,
        )
        .await
        .expect("create vendor");

    let utag = unique("u");
    users
        .create(
            CreateUserInput {
                username: utag.clone(),
                email: format!("{utag}@example.com"),
                password: "hunter22".to_string(),
                vendor_id: vendor.vendor_id,
                initial_balance: balance,
            },
            &actor,
            &inr,
        )
        .await
        .expect("create user")
        .user_id
}

#[tokio::test]
async fn test_approve_debits_balance_once() {
    let Some(db) = connect().await else { return };
    let withdrawals = WithdrawalRepository::new(db.clone());
    let users = UserRepository::new(db.clone());
    let actor = Actor::admin();
    let inr = Currency::inr();

    let user_id = seed_user(&db, dec!(500)).await;
    let request = withdrawals
        .request(&user_id, dec!(200))
        .await
        .expect("queue request");
    assert!(request.withdrawal_id.starts_with("WD-"));
    assert_eq!(request.status, "pending");

    let approved = withdrawals
        .approve(&request.withdrawal_id, &actor, &inr)
        .await
        .expect("approve");
    assert_eq!(approved.status, "approved");
    assert!(approved.processed_at.is_some());

    let user = users.get(&user_id).await.expect("get user");
    assert_eq!(user.balance, dec!(300));

    let txs = users.transactions(&user_id, 10).await.expect("transactions");
    let withdrawal_tx = txs
        .iter()
        .find(|t| t.transaction_type == "withdrawal")
        .expect("withdrawal row");
    assert_eq!(withdrawal_tx.balance_before, dec!(500));
    assert_eq!(withdrawal_tx.balance_after, dec!(300));

    // A second approval must bounce off the terminal status, not debit again.
    let result = withdrawals.approve(&request.withdrawal_id, &actor, &inr).await;
    assert!(matches!(result, Err(WithdrawalOpError::State(_))));
    let user = users.get(&user_id).await.expect("get user");
    assert_eq!(user.balance, dec!(300));
}

#[tokio::test]
async fn test_approve_refused_beyond_unlocked_funds() {
    let Some(db) = connect().await else { return };
    let withdrawals = WithdrawalRepository::new(db.clone());
    let users = UserRepository::new(db.clone());
    let actor = Actor::admin();
    let inr = Currency::inr();

    let user_id = seed_user(&db, dec!(100)).await;
    let request = withdrawals
        .request(&user_id, dec!(250))
        .await
        .expect("queue request");

    let result = withdrawals.approve(&request.withdrawal_id, &actor, &inr).await;
    assert!(matches!(result, Err(WithdrawalOpError::Rejected(_))));

    // Request stays pending and the balance is untouched.
    let pending = withdrawals
        .list(Some(WithdrawalStatus::Pending))
        .await
        .expect("list pending");
    assert!(pending.iter().any(|w| w.withdrawal_id == request.withdrawal_id));
    let user = users.get(&user_id).await.expect("get user");
    assert_eq!(user.balance, dec!(100));
}

#[tokio::test]
async fn test_reject_records_reason_and_moves_no_funds() {
    let Some(db) = connect().await else { return };
    let withdrawals = WithdrawalRepository::new(db.clone());
    let users = UserRepository::new(db.clone());
    let actor = Actor::admin();

    let user_id = seed_user(&db, dec!(300)).await;
    let request = withdrawals
        .request(&user_id, dec!(50))
        .await
        .expect("queue request");

    let result = withdrawals.reject(&request.withdrawal_id, "  ", &actor).await;
    assert!(matches!(result, Err(WithdrawalOpError::State(_))));

    let rejected = withdrawals
        .reject(&request.withdrawal_id, "KYC incomplete", &actor)
        .await
        .expect("reject");
    assert_eq!(rejected.status, "rejected");
    assert_eq!(rejected.reason.as_deref(), Some("KYC incomplete"));

    let user = users.get(&user_id).await.expect("get user");
    assert_eq!(user.balance, dec!(300));
}
