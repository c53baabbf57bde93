//! Fund transfer planning.
//!
//! Each operation validates the requested movement against account
//! snapshots and emits a [`TransferPlan`] holding the updated balances and
//! every ledger row to append. The engine never talks to the database; the
//! repository layer reads snapshots under row locks, calls the engine, and
//! applies the plan inside a single database transaction.

use rust_decimal::Decimal;

use wagerdesk_shared::Currency;

use super::error::TransferError;
use super::types::{
    Actor, AllocationRecord, EntityKind, LedgerEntryKind, LedgerRow, TransferPlan, UserEntry,
    UserEntryKind, UserSnapshot, UserUpdate, VendorEntry, VendorEntryKind, VendorSnapshot,
    VendorUpdate,
};
use crate::ids;

/// The fund transfer engine. Stateless; all methods are pure planners.
pub struct TransferEngine;

impl TransferEngine {
    /// Plans an admin allocation to a vendor's credit limit.
    ///
    /// Emits three rows: a `credit_from_admin` vendor transaction tracking
    /// the limit change, an admin fund allocation record, and a master
    /// ledger row from the admin to the vendor.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveAmount` if `amount <= 0`.
    pub fn allocate_to_vendor(
        vendor: &VendorSnapshot,
        amount: Decimal,
        description: Option<&str>,
        actor: &Actor,
        currency: &Currency,
    ) -> Result<TransferPlan, TransferError> {
        ensure_positive(amount)?;

        let new_limit = vendor.credit_limit + amount;
        let description = description
            .map_or_else(|| "Fund allocation from admin".to_string(), str::to_string);

        let vendor_entry = VendorEntry {
            transaction_id: ids::vendor_transaction_id(),
            vendor_id: vendor.vendor_id.clone(),
            kind: VendorEntryKind::CreditFromAdmin,
            amount,
            balance_before: vendor.credit_limit,
            balance_after: new_limit,
            description: description.clone(),
            reference_id: actor.id.clone(),
            reference_name: actor.name.clone(),
            created_by: actor.name.clone(),
        };

        let allocation = AllocationRecord {
            allocation_id: ids::allocation_id(),
            allocation_type: "to_vendor".to_string(),
            recipient_kind: EntityKind::Vendor,
            recipient_id: vendor.vendor_id.clone(),
            recipient_name: vendor.name.clone(),
            amount,
            description,
            allocated_by: actor.name.clone(),
        };

        let ledger = LedgerRow {
            ledger_id: ids::ledger_id(),
            kind: LedgerEntryKind::AdminAllocation,
            from_kind: EntityKind::Admin,
            from_id: actor.id.clone(),
            from_name: actor.name.clone(),
            to_kind: EntityKind::Vendor,
            to_id: vendor.vendor_id.clone(),
            to_name: vendor.name.clone(),
            amount,
            transaction_type: VendorEntryKind::CreditFromAdmin.as_str().to_string(),
            description: format!(
                "Admin allocated {} to vendor {}",
                currency.format(amount),
                vendor.name
            ),
            created_by: actor.name.clone(),
        };

        Ok(TransferPlan {
            vendor_update: Some(VendorUpdate {
                vendor_id: vendor.vendor_id.clone(),
                credit_limit: new_limit,
                used_credit: vendor.used_credit,
            }),
            user_update: None,
            vendor_entry: Some(vendor_entry),
            user_entry: None,
            allocation: Some(allocation),
            ledger,
        })
    }

    /// Plans a vendor funding a user's balance.
    ///
    /// The credit limit is a hard cap: the vendor's used credit may never
    /// exceed it. The vendor's `debit_to_user` row tracks the real
    /// used-credit running total, and the user's `credit_from_vendor` row
    /// tracks the real balance.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveAmount`, `InactiveVendor`, or
    /// `CreditLimitExceeded`.
    pub fn fund_user_from_vendor(
        vendor: &VendorSnapshot,
        user: &UserSnapshot,
        amount: Decimal,
        actor: &Actor,
        currency: &Currency,
    ) -> Result<TransferPlan, TransferError> {
        ensure_positive(amount)?;
        if !vendor.is_active {
            return Err(TransferError::InactiveVendor {
                vendor_id: vendor.vendor_id.clone(),
            });
        }
        let available = vendor.available_credit();
        if amount > available {
            return Err(TransferError::CreditLimitExceeded {
                requested: currency.format(amount),
                available: currency.format(available),
            });
        }

        let new_balance = user.balance + amount;
        let new_used = vendor.used_credit + amount;

        let user_entry = UserEntry {
            transaction_id: ids::user_transaction_id(),
            user_id: user.user_id.clone(),
            kind: UserEntryKind::CreditFromVendor,
            amount,
            balance_before: user.balance,
            balance_after: new_balance,
            exposure_before: user.exposure,
            exposure_after: user.exposure,
            description: format!(
                "Credit of {} from vendor {}",
                currency.format(amount),
                vendor.name
            ),
            reference_id: vendor.vendor_id.clone(),
            reference_name: vendor.name.clone(),
            created_by: actor.name.clone(),
        };

        let vendor_entry = VendorEntry {
            transaction_id: ids::vendor_transaction_id(),
            vendor_id: vendor.vendor_id.clone(),
            kind: VendorEntryKind::DebitToUser,
            amount,
            balance_before: vendor.used_credit,
            balance_after: new_used,
            description: format!(
                "Funded user {} with {}",
                user.username,
                currency.format(amount)
            ),
            reference_id: user.user_id.clone(),
            reference_name: user.username.clone(),
            created_by: actor.name.clone(),
        };

        let ledger = LedgerRow {
            ledger_id: ids::ledger_id(),
            kind: LedgerEntryKind::VendorToUser,
            from_kind: EntityKind::Vendor,
            from_id: vendor.vendor_id.clone(),
            from_name: vendor.name.clone(),
            to_kind: EntityKind::User,
            to_id: user.user_id.clone(),
            to_name: user.username.clone(),
            amount,
            transaction_type: "credit_to_user".to_string(),
            description: format!(
                "Vendor {} funded user {} with {}",
                vendor.name,
                user.username,
                currency.format(amount)
            ),
            created_by: actor.name.clone(),
        };

        Ok(TransferPlan {
            vendor_update: Some(VendorUpdate {
                vendor_id: vendor.vendor_id.clone(),
                credit_limit: vendor.credit_limit,
                used_credit: new_used,
            }),
            user_update: Some(UserUpdate {
                user_id: user.user_id.clone(),
                balance: new_balance,
                exposure: user.exposure,
            }),
            vendor_entry: Some(vendor_entry),
            user_entry: Some(user_entry),
            allocation: None,
            ledger,
        })
    }

    /// Plans a signed correction to a vendor's credit limit.
    ///
    /// The new limit must stay non-negative and must not drop below the
    /// credit already distributed to users.
    ///
    /// # Errors
    ///
    /// Returns `ZeroAdjustment`, `WouldGoNegative`, or
    /// `CreditLimitExceeded` when the lowered limit would be under the
    /// outstanding used credit.
    pub fn adjust_vendor_credit(
        vendor: &VendorSnapshot,
        delta: Decimal,
        reason: &str,
        actor: &Actor,
        currency: &Currency,
    ) -> Result<TransferPlan, TransferError> {
        if delta.is_zero() {
            return Err(TransferError::ZeroAdjustment);
        }
        let new_limit = vendor.credit_limit + delta;
        if new_limit < Decimal::ZERO {
            return Err(TransferError::WouldGoNegative {
                field: "credit_limit",
            });
        }
        if new_limit < vendor.used_credit {
            return Err(TransferError::CreditLimitExceeded {
                requested: currency.format(new_limit),
                available: currency.format(vendor.used_credit),
            });
        }

        let magnitude = delta.abs();
        let direction = if delta > Decimal::ZERO {
            "increased"
        } else {
            "decreased"
        };
        let description = format!(
            "Credit limit {direction} by {}: {reason}",
            currency.format(magnitude)
        );

        let vendor_entry = VendorEntry {
            transaction_id: ids::vendor_transaction_id(),
            vendor_id: vendor.vendor_id.clone(),
            kind: VendorEntryKind::Adjustment,
            amount: magnitude,
            balance_before: vendor.credit_limit,
            balance_after: new_limit,
            description: description.clone(),
            reference_id: actor.id.clone(),
            reference_name: actor.name.clone(),
            created_by: actor.name.clone(),
        };

        let ledger = LedgerRow {
            ledger_id: ids::ledger_id(),
            kind: LedgerEntryKind::Adjustment,
            from_kind: EntityKind::Admin,
            from_id: actor.id.clone(),
            from_name: actor.name.clone(),
            to_kind: EntityKind::Vendor,
            to_id: vendor.vendor_id.clone(),
            to_name: vendor.name.clone(),
            amount: magnitude,
            transaction_type: VendorEntryKind::Adjustment.as_str().to_string(),
            description,
            created_by: actor.name.clone(),
        };

        Ok(TransferPlan {
            vendor_update: Some(VendorUpdate {
                vendor_id: vendor.vendor_id.clone(),
                credit_limit: new_limit,
                used_credit: vendor.used_credit,
            }),
            user_update: None,
            vendor_entry: Some(vendor_entry),
            user_entry: None,
            allocation: None,
            ledger,
        })
    }

    /// Plans a signed correction to a user's balance.
    ///
    /// # Errors
    ///
    /// Returns `ZeroAdjustment` or `WouldGoNegative` when the new balance
    /// would be negative.
    pub fn adjust_user_balance(
        user: &UserSnapshot,
        delta: Decimal,
        reason: &str,
        actor: &Actor,
        currency: &Currency,
    ) -> Result<TransferPlan, TransferError> {
        if delta.is_zero() {
            return Err(TransferError::ZeroAdjustment);
        }
        let new_balance = user.balance + delta;
        if new_balance < Decimal::ZERO {
            return Err(TransferError::WouldGoNegative { field: "balance" });
        }

        let magnitude = delta.abs();
        let direction = if delta > Decimal::ZERO {
            "increased"
        } else {
            "decreased"
        };
        let description = format!(
            "Balance {direction} by {}: {reason}",
            currency.format(magnitude)
        );

        let user_entry = UserEntry {
            transaction_id: ids::user_transaction_id(),
            user_id: user.user_id.clone(),
            kind: UserEntryKind::Adjustment,
            amount: magnitude,
            balance_before: user.balance,
            balance_after: new_balance,
            exposure_before: user.exposure,
            exposure_after: user.exposure,
            description: description.clone(),
            reference_id: actor.id.clone(),
            reference_name: actor.name.clone(),
            created_by: actor.name.clone(),
        };

        let ledger = LedgerRow {
            ledger_id: ids::ledger_id(),
            kind: LedgerEntryKind::Adjustment,
            from_kind: EntityKind::Admin,
            from_id: actor.id.clone(),
            from_name: actor.name.clone(),
            to_kind: EntityKind::User,
            to_id: user.user_id.clone(),
            to_name: user.username.clone(),
            amount: magnitude,
            transaction_type: UserEntryKind::Adjustment.as_str().to_string(),
            description,
            created_by: actor.name.clone(),
        };

        Ok(TransferPlan {
            vendor_update: None,
            user_update: Some(UserUpdate {
                user_id: user.user_id.clone(),
                balance: new_balance,
                exposure: user.exposure,
            }),
            vendor_entry: None,
            user_entry: Some(user_entry),
            allocation: None,
            ledger,
        })
    }

    /// Plans the balance debit for an approved withdrawal.
    ///
    /// Only unlocked funds (balance minus exposure) can be withdrawn.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveAmount` or `InsufficientFunds`.
    pub fn settle_withdrawal(
        user: &UserSnapshot,
        amount: Decimal,
        actor: &Actor,
        currency: &Currency,
    ) -> Result<TransferPlan, TransferError> {
        ensure_positive(amount)?;
        let available = user.available_balance();
        if amount > available {
            return Err(TransferError::InsufficientFunds {
                requested: currency.format(amount),
                available: currency.format(available),
            });
        }

        let new_balance = user.balance - amount;

        let user_entry = UserEntry {
            transaction_id: ids::user_transaction_id(),
            user_id: user.user_id.clone(),
            kind: UserEntryKind::Withdrawal,
            amount,
            balance_before: user.balance,
            balance_after: new_balance,
            exposure_before: user.exposure,
            exposure_after: user.exposure,
            description: format!("Withdrawal of {} approved", currency.format(amount)),
            reference_id: actor.id.clone(),
            reference_name: actor.name.clone(),
            created_by: actor.name.clone(),
        };

        let ledger = LedgerRow {
            ledger_id: ids::ledger_id(),
            kind: LedgerEntryKind::UserWithdrawal,
            from_kind: EntityKind::User,
            from_id: user.user_id.clone(),
            from_name: user.username.clone(),
            to_kind: EntityKind::Admin,
            to_id: actor.id.clone(),
            to_name: actor.name.clone(),
            amount,
            transaction_type: UserEntryKind::Withdrawal.as_str().to_string(),
            description: format!(
                "Withdrawal of {} for user {}",
                currency.format(amount),
                user.username
            ),
            created_by: actor.name.clone(),
        };

        Ok(TransferPlan {
            vendor_update: None,
            user_update: Some(UserUpdate {
                user_id: user.user_id.clone(),
                balance: new_balance,
                exposure: user.exposure,
            }),
            vendor_entry: None,
            user_entry: Some(user_entry),
            allocation: None,
            ledger,
        })
    }
}

fn ensure_positive(amount: Decimal) -> Result<(), TransferError> {
    if amount <= Decimal::ZERO {
        return Err(TransferError::NonPositiveAmount { amount });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn vendor(limit: Decimal, used: Decimal) -> VendorSnapshot {
        VendorSnapshot {
            vendor_id: "VND-100".to_string(),
            name: "Acme Book".to_string(),
            credit_limit: limit,
            used_credit: used,
            is_active: true,
        }
    }

    fn user(balance: Decimal, exposure: Decimal) -> UserSnapshot {
        UserSnapshot {
            user_id: "USR-200".to_string(),
            username: "punter7".to_string(),
            balance,
            exposure,
        }
    }

    fn inr() -> Currency {
        Currency::inr()
    }

    // ========================================================================
    // AllocateToVendor
    // ========================================================================

    #[test]
    fn test_allocation_conservation() {
        let v = vendor(dec!(0), dec!(0));
        let plan =
            TransferEngine::allocate_to_vendor(&v, dec!(1000), None, &Actor::admin(), &inr())
                .expect("plan");

        let update = plan.vendor_update.clone().expect("vendor update");
        assert_eq!(update.credit_limit, dec!(1000));
        assert_eq!(update.used_credit, dec!(0));

        // Exactly three rows: vendor tx + allocation + master ledger.
        assert_eq!(plan.row_count(), 3);

        let entry = plan.vendor_entry.expect("vendor entry");
        assert_eq!(entry.kind, VendorEntryKind::CreditFromAdmin);
        assert_eq!(entry.balance_before, dec!(0));
        assert_eq!(entry.balance_after, dec!(1000));
        assert_eq!(entry.amount, dec!(1000));

        let alloc = plan.allocation.expect("allocation");
        assert_eq!(alloc.allocation_type, "to_vendor");
        assert_eq!(alloc.recipient_id, "VND-100");
        assert_eq!(alloc.amount, dec!(1000));

        assert_eq!(plan.ledger.kind, LedgerEntryKind::AdminAllocation);
        assert_eq!(plan.ledger.from_kind, EntityKind::Admin);
        assert_eq!(plan.ledger.to_id, "VND-100");
        assert_eq!(plan.ledger.amount, dec!(1000));
    }

    #[test]
    fn test_allocation_rejects_non_positive() {
        let v = vendor(dec!(500), dec!(0));
        for amount in [dec!(0), dec!(-10)] {
            let result =
                TransferEngine::allocate_to_vendor(&v, amount, None, &Actor::admin(), &inr());
            assert!(matches!(
                result,
                Err(TransferError::NonPositiveAmount { .. })
            ));
        }
    }

    #[test]
    fn test_allocation_default_description() {
        let v = vendor(dec!(0), dec!(0));
        let plan =
            TransferEngine::allocate_to_vendor(&v, dec!(50), None, &Actor::admin(), &inr())
                .expect("plan");
        assert_eq!(
            plan.vendor_entry.expect("entry").description,
            "Fund allocation from admin"
        );
    }

    #[test]
    fn test_allocation_ledger_uses_currency_symbol() {
        let v = vendor(dec!(0), dec!(0));
        let usd = Currency::new("USD", "$");
        let plan = TransferEngine::allocate_to_vendor(&v, dec!(250), None, &Actor::admin(), &usd)
            .expect("plan");
        assert!(plan.ledger.description.contains("$250"));
    }

    // ========================================================================
    // FundUserFromVendor
    // ========================================================================

    #[test]
    fn test_funding_conservation() {
        let v = vendor(dec!(1000), dec!(0));
        let u = user(dec!(0), dec!(0));
        let plan =
            TransferEngine::fund_user_from_vendor(&v, &u, dec!(400), &Actor::admin(), &inr())
                .expect("plan");

        // user.balance after = before + amount
        let user_update = plan.user_update.clone().expect("user update");
        assert_eq!(user_update.balance, dec!(400));
        // vendor.used_credit after = before + amount
        let vendor_update = plan.vendor_update.clone().expect("vendor update");
        assert_eq!(vendor_update.used_credit, dec!(400));
        assert_eq!(vendor_update.credit_limit, dec!(1000));

        // Exactly three rows: user tx + vendor tx + master ledger.
        assert_eq!(plan.row_count(), 3);
        assert!(plan.allocation.is_none());

        let ue = plan.user_entry.expect("user entry");
        assert_eq!(ue.kind, UserEntryKind::CreditFromVendor);
        assert_eq!(ue.balance_before, dec!(0));
        assert_eq!(ue.balance_after, dec!(400));
        assert_eq!(ue.exposure_before, ue.exposure_after);

        // The vendor debit row tracks the real used-credit running total.
        let ve = plan.vendor_entry.expect("vendor entry");
        assert_eq!(ve.kind, VendorEntryKind::DebitToUser);
        assert_eq!(ve.balance_before, dec!(0));
        assert_eq!(ve.balance_after, dec!(400));

        assert_eq!(plan.ledger.from_id, "VND-100");
        assert_eq!(plan.ledger.to_id, "USR-200");
        assert_eq!(plan.ledger.amount, dec!(400));
    }

    #[test]
    fn test_funding_tracks_prior_balances() {
        let v = vendor(dec!(1000), dec!(300));
        let u = user(dec!(120), dec!(20));
        let plan =
            TransferEngine::fund_user_from_vendor(&v, &u, dec!(200), &Actor::admin(), &inr())
                .expect("plan");

        let ue = plan.user_entry.expect("user entry");
        assert_eq!(ue.balance_before, dec!(120));
        assert_eq!(ue.balance_after, dec!(320));
        assert_eq!(ue.exposure_before, dec!(20));
        assert_eq!(ue.exposure_after, dec!(20));

        let ve = plan.vendor_entry.expect("vendor entry");
        assert_eq!(ve.balance_before, dec!(300));
        assert_eq!(ve.balance_after, dec!(500));
    }

    #[test]
    fn test_funding_enforces_credit_cap() {
        let v = vendor(dec!(1000), dec!(800));
        let u = user(dec!(0), dec!(0));
        let result =
            TransferEngine::fund_user_from_vendor(&v, &u, dec!(300), &Actor::admin(), &inr());
        match result {
            Err(TransferError::CreditLimitExceeded {
                requested,
                available,
            }) => {
                assert_eq!(requested, "\u{20b9}300");
                assert_eq!(available, "\u{20b9}200");
            }
            other => panic!("expected CreditLimitExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_funding_exactly_at_cap_allowed() {
        let v = vendor(dec!(1000), dec!(800));
        let u = user(dec!(0), dec!(0));
        let plan =
            TransferEngine::fund_user_from_vendor(&v, &u, dec!(200), &Actor::admin(), &inr())
                .expect("plan");
        assert_eq!(plan.vendor_update.expect("update").used_credit, dec!(1000));
    }

    #[test]
    fn test_funding_rejects_inactive_vendor() {
        let mut v = vendor(dec!(1000), dec!(0));
        v.is_active = false;
        let u = user(dec!(0), dec!(0));
        let result =
            TransferEngine::fund_user_from_vendor(&v, &u, dec!(100), &Actor::admin(), &inr());
        assert!(matches!(result, Err(TransferError::InactiveVendor { .. })));
    }

    // ========================================================================
    // Adjustments
    // ========================================================================

    #[test]
    fn test_vendor_adjustment_increase() {
        let v = vendor(dec!(500), dec!(100));
        let plan = TransferEngine::adjust_vendor_credit(
            &v,
            dec!(250),
            "manual top-up",
            &Actor::admin(),
            &inr(),
        )
        .expect("plan");

        assert_eq!(plan.vendor_update.clone().expect("update").credit_limit, dec!(750));
        assert_eq!(plan.row_count(), 2);
        let entry = plan.vendor_entry.expect("entry");
        assert_eq!(entry.kind, VendorEntryKind::Adjustment);
        assert_eq!(entry.balance_before, dec!(500));
        assert_eq!(entry.balance_after, dec!(750));
        assert!(entry.description.contains("manual top-up"));
    }

    #[test]
    fn test_vendor_adjustment_cannot_undercut_used_credit() {
        let v = vendor(dec!(500), dec!(400));
        let result = TransferEngine::adjust_vendor_credit(
            &v,
            dec!(-200),
            "claw back",
            &Actor::admin(),
            &inr(),
        );
        assert!(matches!(
            result,
            Err(TransferError::CreditLimitExceeded { .. })
        ));
    }

    #[test]
    fn test_vendor_adjustment_cannot_go_negative() {
        let v = vendor(dec!(100), dec!(0));
        let result = TransferEngine::adjust_vendor_credit(
            &v,
            dec!(-150),
            "oops",
            &Actor::admin(),
            &inr(),
        );
        assert!(matches!(result, Err(TransferError::WouldGoNegative { .. })));
    }

    #[test]
    fn test_user_adjustment_decrease() {
        let u = user(dec!(300), dec!(50));
        let plan = TransferEngine::adjust_user_balance(
            &u,
            dec!(-100),
            "bet settlement correction",
            &Actor::admin(),
            &inr(),
        )
        .expect("plan");

        assert_eq!(plan.user_update.expect("update").balance, dec!(200));
        let entry = plan.user_entry.expect("entry");
        assert_eq!(entry.amount, dec!(100));
        assert_eq!(entry.balance_before, dec!(300));
        assert_eq!(entry.balance_after, dec!(200));
    }

    #[test]
    fn test_user_adjustment_rejects_zero_and_negative_result() {
        let u = user(dec!(100), dec!(0));
        assert!(matches!(
            TransferEngine::adjust_user_balance(&u, dec!(0), "noop", &Actor::admin(), &inr()),
            Err(TransferError::ZeroAdjustment)
        ));
        assert!(matches!(
            TransferEngine::adjust_user_balance(&u, dec!(-200), "too far", &Actor::admin(), &inr()),
            Err(TransferError::WouldGoNegative { .. })
        ));
    }

    // ========================================================================
    // SettleWithdrawal
    // ========================================================================

    #[test]
    fn test_withdrawal_settlement_debits_balance() {
        let u = user(dec!(500), dec!(100));
        let plan =
            TransferEngine::settle_withdrawal(&u, dec!(250), &Actor::admin(), &inr())
                .expect("plan");

        assert_eq!(plan.user_update.clone().expect("update").balance, dec!(250));
        assert_eq!(plan.row_count(), 2);
        let entry = plan.user_entry.expect("entry");
        assert_eq!(entry.kind, UserEntryKind::Withdrawal);
        assert_eq!(entry.balance_after, dec!(250));
        assert_eq!(plan.ledger.kind, LedgerEntryKind::UserWithdrawal);
        assert_eq!(plan.ledger.from_kind, EntityKind::User);
        assert_eq!(plan.ledger.to_kind, EntityKind::Admin);
    }

    #[test]
    fn test_withdrawal_limited_to_unlocked_funds() {
        // balance 500, exposure 400: only 100 is withdrawable.
        let u = user(dec!(500), dec!(400));
        let result = TransferEngine::settle_withdrawal(&u, dec!(150), &Actor::admin(), &inr());
        assert!(matches!(
            result,
            Err(TransferError::InsufficientFunds { .. })
        ));
    }

    // ========================================================================
    // Worked scenario from the platform runbook: V1 allocation then funding.
    // ========================================================================

    #[test]
    fn test_allocate_then_fund_scenario() {
        let v1 = vendor(dec!(0), dec!(0));
        let plan = TransferEngine::allocate_to_vendor(
            &v1,
            dec!(1000),
            None,
            &Actor::admin(),
            &inr(),
        )
        .expect("allocation plan");
        let v1_after = plan.vendor_update.expect("update");
        assert_eq!(v1_after.credit_limit, dec!(1000));
        let entry = plan.vendor_entry.expect("entry");
        assert_eq!(entry.balance_before, dec!(0));
        assert_eq!(entry.balance_after, dec!(1000));

        let v1 = VendorSnapshot {
            credit_limit: v1_after.credit_limit,
            used_credit: v1_after.used_credit,
            ..v1
        };
        let u1 = user(dec!(0), dec!(0));
        let plan =
            TransferEngine::fund_user_from_vendor(&v1, &u1, dec!(400), &Actor::admin(), &inr())
                .expect("funding plan");
        assert_eq!(plan.user_update.expect("update").balance, dec!(400));
        assert_eq!(plan.vendor_update.expect("update").used_credit, dec!(400));
        assert_eq!(plan.ledger.from_id, v1.vendor_id);
        assert_eq!(plan.ledger.to_id, u1.user_id);
        assert_eq!(plan.ledger.amount, dec!(400));
    }

    // ========================================================================
    // Property tests
    // ========================================================================

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// For any allocation, the limit grows by exactly the amount and
        /// the before/after pair on the vendor row is consistent.
        #[test]
        fn prop_allocation_conserves_funds(
            start in amount_strategy(),
            amount in amount_strategy(),
        ) {
            let v = vendor(start, Decimal::ZERO);
            let plan = TransferEngine::allocate_to_vendor(
                &v, amount, None, &Actor::admin(), &inr(),
            ).expect("plan");

            let update = plan.vendor_update.expect("update");
            prop_assert_eq!(update.credit_limit, start + amount);

            let entry = plan.vendor_entry.expect("entry");
            prop_assert_eq!(entry.balance_after - entry.balance_before, amount);
            prop_assert_eq!(plan.ledger.amount, amount);
        }

        /// For any funding within the cap, user balance and vendor used
        /// credit both grow by exactly the amount, and nothing goes
        /// negative.
        #[test]
        fn prop_funding_conserves_funds(
            limit in amount_strategy(),
            balance in amount_strategy(),
            amount in amount_strategy(),
        ) {
            prop_assume!(amount <= limit);
            let v = vendor(limit, Decimal::ZERO);
            let u = user(balance, Decimal::ZERO);

            let plan = TransferEngine::fund_user_from_vendor(
                &v, &u, amount, &Actor::admin(), &inr(),
            ).expect("plan");

            let vu = plan.vendor_update.expect("vendor update");
            let uu = plan.user_update.expect("user update");
            prop_assert_eq!(vu.used_credit, amount);
            prop_assert_eq!(uu.balance, balance + amount);
            prop_assert!(vu.used_credit <= vu.credit_limit);
            prop_assert!(uu.balance >= Decimal::ZERO);
        }

        /// Funding above the available credit is always rejected.
        #[test]
        fn prop_funding_never_exceeds_cap(
            limit in amount_strategy(),
            used in amount_strategy(),
            amount in amount_strategy(),
        ) {
            prop_assume!(used <= limit);
            prop_assume!(amount > limit - used);
            let v = vendor(limit, used);
            let u = user(Decimal::ZERO, Decimal::ZERO);

            let result = TransferEngine::fund_user_from_vendor(
                &v, &u, amount, &Actor::admin(), &inr(),
            );
            prop_assert!(
                matches!(result, Err(TransferError::CreditLimitExceeded { .. })),
                "expected CreditLimitExceeded"
            );
        }

        /// Settlement never produces a negative balance and never touches
        /// exposed funds.
        #[test]
        fn prop_withdrawal_never_goes_negative(
            balance in amount_strategy(),
            exposure in amount_strategy(),
            amount in amount_strategy(),
        ) {
            prop_assume!(exposure <= balance);
            let u = user(balance, exposure);

            match TransferEngine::settle_withdrawal(&u, amount, &Actor::admin(), &inr()) {
                Ok(plan) => {
                    let update = plan.user_update.expect("update");
                    prop_assert!(update.balance >= exposure);
                    prop_assert!(update.balance >= Decimal::ZERO);
                }
                Err(TransferError::InsufficientFunds { .. }) => {
                    prop_assert!(amount > balance - exposure);
                }
                Err(other) => prop_assert!(false, "unexpected error: {other:?}"),
            }
        }
    }
}
