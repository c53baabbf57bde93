//! Transfer domain types: account snapshots, ledger rows, and plans.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Who performed an operation. Defaults to the platform super admin for
/// system-triggered movements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Public actor ID (e.g. `ADMIN-001` or a vendor ID).
    pub id: String,
    /// Display name recorded in ledger rows.
    pub name: String,
}

impl Actor {
    /// Creates an actor from id and name.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// The default super admin actor.
    #[must_use]
    pub fn admin() -> Self {
        Self::new("ADMIN-001", "System Admin")
    }
}

/// The kind of entity on either side of a master ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// The platform super admin.
    Admin,
    /// A vendor (reseller tier).
    Vendor,
    /// An end bettor.
    User,
}

impl EntityKind {
    /// Stable string form used in persisted rows.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Vendor => "vendor",
            Self::User => "user",
        }
    }
}

/// A point-in-time view of a vendor's credit accounts, read under lock
/// before planning a transfer.
#[derive(Debug, Clone)]
pub struct VendorSnapshot {
    /// Public vendor ID.
    pub vendor_id: String,
    /// Vendor display name.
    pub name: String,
    /// Total funds the admin has allocated to this vendor.
    pub credit_limit: Decimal,
    /// Portion of the limit already distributed to users.
    pub used_credit: Decimal,
    /// Whether the vendor is Active.
    pub is_active: bool,
}

impl VendorSnapshot {
    /// Credit still available for distribution to users.
    #[must_use]
    pub fn available_credit(&self) -> Decimal {
        self.credit_limit - self.used_credit
    }
}

/// A point-in-time view of a user's funds.
#[derive(Debug, Clone)]
pub struct UserSnapshot {
    /// Public user ID.
    pub user_id: String,
    /// Username.
    pub username: String,
    /// Funds available to the user.
    pub balance: Decimal,
    /// Funds locked in open bets.
    pub exposure: Decimal,
}

impl UserSnapshot {
    /// Balance not locked in open bets.
    #[must_use]
    pub fn available_balance(&self) -> Decimal {
        self.balance - self.exposure
    }
}

/// Vendor transaction row types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorEntryKind {
    /// Admin allocated funds to the vendor's credit limit.
    CreditFromAdmin,
    /// Vendor distributed funds onward to a user.
    DebitToUser,
    /// Commission accrued to the vendor.
    CommissionEarned,
    /// Manual admin correction.
    Adjustment,
}

impl VendorEntryKind {
    /// Stable string form used in persisted rows.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreditFromAdmin => "credit_from_admin",
            Self::DebitToUser => "debit_to_user",
            Self::CommissionEarned => "commission_earned",
            Self::Adjustment => "adjustment",
        }
    }
}

/// User transaction row types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserEntryKind {
    /// Vendor funded the user's balance.
    CreditFromVendor,
    /// Funds moved into exposure for a placed bet.
    BetPlaced,
    /// Approved withdrawal debited the balance.
    Withdrawal,
    /// Manual admin correction.
    Adjustment,
}

impl UserEntryKind {
    /// Stable string form used in persisted rows.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreditFromVendor => "credit_from_vendor",
            Self::BetPlaced => "bet_placed",
            Self::Withdrawal => "withdrawal",
            Self::Adjustment => "adjustment",
        }
    }
}

/// Master ledger entry types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryKind {
    /// Admin moved funds to a vendor.
    AdminAllocation,
    /// Vendor moved funds to a user.
    VendorToUser,
    /// Approved withdrawal moved funds out of a user balance.
    UserWithdrawal,
    /// Manual correction.
    Adjustment,
}

impl LedgerEntryKind {
    /// Stable string form used in persisted rows.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AdminAllocation => "admin_allocation",
            Self::VendorToUser => "vendor_to_user",
            Self::UserWithdrawal => "user_withdrawal",
            Self::Adjustment => "adjustment",
        }
    }
}

/// An immutable vendor transaction row to append.
///
/// `balance_before` / `balance_after` always reflect the vendor field the
/// entry kind mutates: the credit limit for `credit_from_admin` and
/// limit adjustments, the used-credit counter for `debit_to_user`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorEntry {
    /// Generated transaction ID (`VTX-…`).
    pub transaction_id: String,
    /// Vendor this row belongs to.
    pub vendor_id: String,
    /// Row type.
    pub kind: VendorEntryKind,
    /// Absolute amount moved.
    pub amount: Decimal,
    /// Tracked field before the movement.
    pub balance_before: Decimal,
    /// Tracked field after the movement.
    pub balance_after: Decimal,
    /// Human-readable description (amounts pre-formatted with the currency symbol).
    pub description: String,
    /// ID of the counterparty that caused this row.
    pub reference_id: String,
    /// Name of the counterparty.
    pub reference_name: String,
    /// Actor that created the row.
    pub created_by: String,
}

/// An immutable user transaction row to append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
    /// Generated transaction ID (`UTX-…`).
    pub transaction_id: String,
    /// User this row belongs to.
    pub user_id: String,
    /// Row type.
    pub kind: UserEntryKind,
    /// Absolute amount moved.
    pub amount: Decimal,
    /// Balance before the movement.
    pub balance_before: Decimal,
    /// Balance after the movement.
    pub balance_after: Decimal,
    /// Exposure before the movement.
    pub exposure_before: Decimal,
    /// Exposure after the movement.
    pub exposure_after: Decimal,
    /// Human-readable description.
    pub description: String,
    /// ID of the counterparty that caused this row.
    pub reference_id: String,
    /// Name of the counterparty.
    pub reference_name: String,
    /// Actor that created the row.
    pub created_by: String,
}

/// An immutable admin fund allocation record to append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRecord {
    /// Generated allocation ID (`ALLOC-…`).
    pub allocation_id: String,
    /// Always `to_vendor` in the current taxonomy.
    pub allocation_type: String,
    /// Recipient entity kind.
    pub recipient_kind: EntityKind,
    /// Recipient public ID.
    pub recipient_id: String,
    /// Recipient display name.
    pub recipient_name: String,
    /// Amount allocated.
    pub amount: Decimal,
    /// Description.
    pub description: String,
    /// Actor that allocated the funds.
    pub allocated_by: String,
}

/// An immutable master ledger row to append. Every fund movement between
/// any two entities produces exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    /// Generated ledger ID (`LDG-…`).
    pub ledger_id: String,
    /// Row type.
    pub kind: LedgerEntryKind,
    /// Source entity kind.
    pub from_kind: EntityKind,
    /// Source public ID.
    pub from_id: String,
    /// Source display name.
    pub from_name: String,
    /// Destination entity kind.
    pub to_kind: EntityKind,
    /// Destination public ID.
    pub to_id: String,
    /// Destination display name.
    pub to_name: String,
    /// Amount moved.
    pub amount: Decimal,
    /// Transaction type mirroring the per-entity row.
    pub transaction_type: String,
    /// Description.
    pub description: String,
    /// Actor that created the row.
    pub created_by: String,
}

/// New vendor balance fields to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorUpdate {
    /// Vendor to update.
    pub vendor_id: String,
    /// New credit limit.
    pub credit_limit: Decimal,
    /// New used credit.
    pub used_credit: Decimal,
}

/// New user balance fields to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    /// User to update.
    pub user_id: String,
    /// New balance.
    pub balance: Decimal,
    /// New exposure.
    pub exposure: Decimal,
}

/// The complete set of writes for one logical fund movement.
///
/// A plan is applied atomically by the persistence layer: either every
/// update and row lands, or none of them do.
#[derive(Debug, Clone)]
pub struct TransferPlan {
    /// Vendor balance fields to persist, if a vendor is involved.
    pub vendor_update: Option<VendorUpdate>,
    /// User balance fields to persist, if a user is involved.
    pub user_update: Option<UserUpdate>,
    /// Vendor transaction row to append.
    pub vendor_entry: Option<VendorEntry>,
    /// User transaction row to append.
    pub user_entry: Option<UserEntry>,
    /// Admin fund allocation record to append.
    pub allocation: Option<AllocationRecord>,
    /// Master ledger row. Always present: every movement is recorded here.
    pub ledger: LedgerRow,
}

impl TransferPlan {
    /// Number of immutable ledger rows this plan appends.
    #[must_use]
    pub fn row_count(&self) -> usize {
        1 + usize::from(self.vendor_entry.is_some())
            + usize::from(self.user_entry.is_some())
            + usize::from(self.allocation.is_some())
    }
}
