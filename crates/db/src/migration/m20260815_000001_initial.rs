//! Initial database migration.
//!
//! Creates the three platform schemas and all core tables. Monetary
//! columns are `NUMERIC(18, 2)` throughout; ledger tables are append-only
//! by convention and carry unique public IDs alongside the serial row id.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: SCHEMAS
        // ============================================================
        db.execute_unprepared(SCHEMAS_SQL).await?;

        // ============================================================
        // PART 2: ACCOUNT TABLES
        // ============================================================
        db.execute_unprepared(VENDORS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;

        // ============================================================
        // PART 3: LEDGERS
        // ============================================================
        db.execute_unprepared(VENDOR_TRANSACTIONS_SQL).await?;
        db.execute_unprepared(USER_TRANSACTIONS_SQL).await?;
        db.execute_unprepared(ADMIN_FUND_ALLOCATIONS_SQL).await?;
        db.execute_unprepared(MASTER_LEDGER_SQL).await?;

        // ============================================================
        // PART 4: OPERATIONS TABLES
        // ============================================================
        db.execute_unprepared(AUDIT_LOGS_SQL).await?;
        db.execute_unprepared(WITHDRAWAL_QUEUE_SQL).await?;
        db.execute_unprepared(RISK_ALERTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP SCHEMA IF EXISTS site3_users CASCADE;
             DROP SCHEMA IF EXISTS site2_vendor CASCADE;
             DROP SCHEMA IF EXISTS site1_superadmin CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const SCHEMAS_SQL: &str = "
CREATE SCHEMA IF NOT EXISTS site1_superadmin;
CREATE SCHEMA IF NOT EXISTS site2_vendor;
CREATE SCHEMA IF NOT EXISTS site3_users;
";

const VENDORS_SQL: &str = "
CREATE TABLE site2_vendor.vendors (
    id              SERIAL PRIMARY KEY,
    vendor_id       VARCHAR(64) NOT NULL UNIQUE,
    name            VARCHAR(255) NOT NULL,
    email           VARCHAR(255) NOT NULL UNIQUE,
    password_hash   VARCHAR(255) NOT NULL,
    credit_limit    NUMERIC(18, 2) NOT NULL DEFAULT 0 CHECK (credit_limit >= 0),
    used_credit     NUMERIC(18, 2) NOT NULL DEFAULT 0 CHECK (used_credit >= 0),
    commission_rate NUMERIC(5, 2) NOT NULL DEFAULT 0,
    is_active       BOOLEAN NOT NULL DEFAULT TRUE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (used_credit <= credit_limit)
);
";

const USERS_SQL: &str = "
CREATE TABLE site3_users.users (
    id            SERIAL PRIMARY KEY,
    user_id       VARCHAR(64) NOT NULL UNIQUE,
    username      VARCHAR(255) NOT NULL UNIQUE,
    email         VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    vendor_id     VARCHAR(64) NOT NULL REFERENCES site2_vendor.vendors(vendor_id),
    balance       NUMERIC(18, 2) NOT NULL DEFAULT 0 CHECK (balance >= 0),
    exposure      NUMERIC(18, 2) NOT NULL DEFAULT 0 CHECK (exposure >= 0),
    is_active     BOOLEAN NOT NULL DEFAULT TRUE,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_users_vendor_id ON site3_users.users(vendor_id);
";

const VENDOR_TRANSACTIONS_SQL: &str = "
CREATE TABLE site2_vendor.vendor_transactions (
    id               SERIAL PRIMARY KEY,
    transaction_id   VARCHAR(64) NOT NULL UNIQUE,
    vendor_id        VARCHAR(64) NOT NULL REFERENCES site2_vendor.vendors(vendor_id),
    transaction_type VARCHAR(32) NOT NULL,
    amount           NUMERIC(18, 2) NOT NULL CHECK (amount >= 0),
    balance_before   NUMERIC(18, 2) NOT NULL,
    balance_after    NUMERIC(18, 2) NOT NULL,
    description      TEXT NOT NULL,
    reference_id     VARCHAR(64) NOT NULL,
    reference_name   VARCHAR(255) NOT NULL,
    created_by       VARCHAR(255) NOT NULL,
    created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_vendor_transactions_vendor_id
    ON site2_vendor.vendor_transactions(vendor_id, created_at DESC);
";

const USER_TRANSACTIONS_SQL: &str = "
CREATE TABLE site3_users.user_transactions (
    id               SERIAL PRIMARY KEY,
    transaction_id   VARCHAR(64) NOT NULL UNIQUE,
    user_id          VARCHAR(64) NOT NULL REFERENCES site3_users.users(user_id),
    transaction_type VARCHAR(32) NOT NULL,
    amount           NUMERIC(18, 2) NOT NULL CHECK (amount >= 0),
    balance_before   NUMERIC(18, 2) NOT NULL,
    balance_after    NUMERIC(18, 2) NOT NULL,
    exposure_before  NUMERIC(18, 2) NOT NULL,
    exposure_after   NUMERIC(18, 2) NOT NULL,
    description      TEXT NOT NULL,
    reference_id     VARCHAR(64) NOT NULL,
    reference_name   VARCHAR(255) NOT NULL,
    created_by       VARCHAR(255) NOT NULL,
    created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_user_transactions_user_id
    ON site3_users.user_transactions(user_id, created_at DESC);
";

const ADMIN_FUND_ALLOCATIONS_SQL: &str = "
CREATE TABLE site1_superadmin.admin_fund_allocations (
    id              SERIAL PRIMARY KEY,
    allocation_id   VARCHAR(64) NOT NULL UNIQUE,
    allocation_type VARCHAR(32) NOT NULL,
    to_entity_type  VARCHAR(16) NOT NULL,
    to_entity_id    VARCHAR(64) NOT NULL,
    to_entity_name  VARCHAR(255) NOT NULL,
    amount          NUMERIC(18, 2) NOT NULL CHECK (amount > 0),
    description     TEXT NOT NULL,
    allocated_by    VARCHAR(255) NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const MASTER_LEDGER_SQL: &str = "
CREATE TABLE site1_superadmin.master_ledger (
    id               SERIAL PRIMARY KEY,
    ledger_id        VARCHAR(64) NOT NULL UNIQUE,
    transaction_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    entry_type       VARCHAR(32) NOT NULL,
    from_entity_type VARCHAR(16) NOT NULL,
    from_entity_id   VARCHAR(64) NOT NULL,
    from_entity_name VARCHAR(255) NOT NULL,
    to_entity_type   VARCHAR(16) NOT NULL,
    to_entity_id     VARCHAR(64) NOT NULL,
    to_entity_name   VARCHAR(255) NOT NULL,
    amount           NUMERIC(18, 2) NOT NULL CHECK (amount >= 0),
    transaction_type VARCHAR(32) NOT NULL,
    description      TEXT NOT NULL,
    created_by       VARCHAR(255) NOT NULL,
    created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_master_ledger_created_at
    ON site1_superadmin.master_ledger(created_at DESC);
";

const AUDIT_LOGS_SQL: &str = "
CREATE TABLE site1_superadmin.audit_logs (
    id             SERIAL PRIMARY KEY,
    security_token VARCHAR(32) NOT NULL,
    action         VARCHAR(64) NOT NULL,
    category       VARCHAR(16) NOT NULL,
    details        TEXT NOT NULL,
    operation      VARCHAR(64) NOT NULL,
    params         JSONB NOT NULL DEFAULT '{}',
    status         VARCHAR(16) NOT NULL,
    prev_state     JSONB,
    new_state      JSONB,
    admin_id       VARCHAR(64) NOT NULL,
    admin_name     VARCHAR(255) NOT NULL,
    ip_address     VARCHAR(64) NOT NULL,
    user_agent     TEXT NOT NULL,
    created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_audit_logs_category ON site1_superadmin.audit_logs(category, created_at DESC);
";

const WITHDRAWAL_QUEUE_SQL: &str = "
CREATE TABLE site1_superadmin.withdrawal_queue (
    id            SERIAL PRIMARY KEY,
    withdrawal_id VARCHAR(64) NOT NULL UNIQUE,
    user_id       VARCHAR(64) NOT NULL REFERENCES site3_users.users(user_id),
    username      VARCHAR(255) NOT NULL,
    amount        NUMERIC(18, 2) NOT NULL CHECK (amount > 0),
    status        VARCHAR(16) NOT NULL DEFAULT 'pending',
    reason        TEXT,
    requested_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    processed_at  TIMESTAMPTZ,
    processed_by  VARCHAR(255)
);

CREATE INDEX idx_withdrawal_queue_status ON site1_superadmin.withdrawal_queue(status, requested_at);
";

const RISK_ALERTS_SQL: &str = "
CREATE TABLE site1_superadmin.risk_alerts (
    id          SERIAL PRIMARY KEY,
    severity    VARCHAR(16) NOT NULL,
    alert_type  VARCHAR(64) NOT NULL,
    message     TEXT NOT NULL,
    entity_id   VARCHAR(64),
    is_resolved BOOLEAN NOT NULL DEFAULT FALSE,
    resolved_by VARCHAR(255),
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    resolved_at TIMESTAMPTZ
);

CREATE INDEX idx_risk_alerts_open ON site1_superadmin.risk_alerts(is_resolved, severity);
";
