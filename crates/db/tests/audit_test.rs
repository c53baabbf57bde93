//! Integration tests for the audit trail.
//!
//! These tests need a live Postgres database; they skip themselves when
//! `DATABASE_URL` is not set. Migrations are applied on first connect.

use rust_decimal_macros::dec;
use sea_orm::{Database, DatabaseConnection};
use serde_json::json;
use std::env;
use uuid::Uuid;

use wagerdesk_core::audit::{ActorContext, AuditCategory, AuditEntry, OperationTrace};
use wagerdesk_core::transfer::Actor;
use wagerdesk_db::migration::{Migrator, MigratorTrait};
use wagerdesk_db::repositories::vendor::CreateVendorInput;
use wagerdesk_db::{AuditRepository, VendorRepository};
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

#[tokio::test]
async fn test_failed_audit_insert_leaves_operation_intact() {
    let Some(db) = connect().await else { return };
    let vendors = VendorRepository::new(db.clone());
    let audit = AuditRepository::new(db.clone());
    let actor = Actor::admin();
    let inr = Currency::inr();

    let tag = unique("v");
    let vendor = vendors
        .create(
            CreateVendorInput {
                name: format!("Vendor {tag}"),
                email: format!("{tag}@example.com"),
                password: "hunter22".to_string(),
                credit_limit: dec!(500),
                commission_rate: dec!(2.5),
            },
            &actor,
            &inr,
        )
        .await
        .expect("create vendor");

    // An action wider than its column makes the audit insert itself
    // fail. Recording swallows the failure and the committed vendor
    // must be unaffected.
    let entry = AuditEntry::success(
        "X".repeat(120),
        AuditCategory::Vendor,
        format!("Created vendor {}", vendor.vendor_id),
        OperationTrace::new("vendor.create", json!({"vendor_id": vendor.vendor_id})),
        ActorContext::default(),
    );
    let token = entry.security_token.clone();
    audit.record(entry).await;

    let row = audit.find_by_token(&token).await.expect("query by token");
    assert!(row.is_none());

    let vendor = vendors.get(&vendor.vendor_id).await.expect("vendor persisted");
    assert_eq!(vendor.credit_limit, dec!(500));
}

#[tokio::test]
async fn test_record_round_trips_states_and_trace() {
    let Some(db) = connect().await else { return };
    let audit = AuditRepository::new(db.clone());

    let entry = AuditEntry::success(
        "ADJUST_VENDOR_CREDIT",
        AuditCategory::Finance,
        "Raised credit limit",
        OperationTrace::new("vendor.adjust_credit", json!({"delta": "500"})),
        ActorContext::default(),
    )
    .with_states(
        Some(json!({"credit_limit": "1000"})),
        Some(json!({"credit_limit": "1500"})),
    );
    let token = entry.security_token.clone();
    audit.record(entry).await;

    let row = audit
        .find_by_token(&token)
        .await
        .expect("query by token")
        .expect("recorded entry");
    assert_eq!(row.operation, "vendor.adjust_credit");
    assert_eq!(row.params["delta"], "500");
    assert_eq!(row.prev_state.as_ref().expect("prev state")["credit_limit"], "1000");
    assert_eq!(row.new_state.as_ref().expect("new state")["credit_limit"], "1500");
}
