//! Withdrawal request state machine.
//!
//! A request is created `Pending` and moves exactly once to `Approved` or
//! `Rejected`. Approval debits the user's balance through the transfer
//! engine in the same database transaction; rejection records a reason
//! and moves no funds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle states of a withdrawal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    /// Awaiting admin review.
    Pending,
    /// Approved and settled.
    Approved,
    /// Rejected with a reason.
    Rejected,
}

impl WithdrawalStatus {
    /// Stable string form used in persisted rows.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses the persisted string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Errors from illegal state transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WithdrawalError {
    /// The request already left the pending state.
    #[error("Withdrawal {withdrawal_id} was already {status}")]
    AlreadyProcessed {
        /// Public withdrawal ID.
        withdrawal_id: String,
        /// The terminal status it already reached.
        status: &'static str,
    },

    /// Rejection requires a non-empty reason.
    #[error("A rejection reason is required")]
    MissingReason,
}

impl WithdrawalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyProcessed { .. } => "ALREADY_PROCESSED",
            Self::MissingReason => "MISSING_REASON",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::AlreadyProcessed { .. } => 409,
            Self::MissingReason => 400,
        }
    }
}

/// Checks that a request in `status` can be approved.
///
/// # Errors
///
/// Returns `AlreadyProcessed` unless the request is still pending.
pub fn ensure_can_approve(
    withdrawal_id: &str,
    status: WithdrawalStatus,
) -> Result<(), WithdrawalError> {
    ensure_pending(withdrawal_id, status)
}

/// Checks that a request in `status` can be rejected with `reason`.
///
/// # Errors
///
/// Returns `AlreadyProcessed` unless the request is still pending, or
/// `MissingReason` when the reason is blank.
pub fn ensure_can_reject(
    withdrawal_id: &str,
    status: WithdrawalStatus,
    reason: &str,
) -> Result<(), WithdrawalError> {
    ensure_pending(withdrawal_id, status)?;
    if reason.trim().is_empty() {
        return Err(WithdrawalError::MissingReason);
    }
    Ok(())
}

fn ensure_pending(
    withdrawal_id: &str,
    status: WithdrawalStatus,
) -> Result<(), WithdrawalError> {
    match status {
        WithdrawalStatus::Pending => Ok(()),
        WithdrawalStatus::Approved | WithdrawalStatus::Rejected => {
            Err(WithdrawalError::AlreadyProcessed {
                withdrawal_id: withdrawal_id.to_string(),
                status: status.as_str(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_can_transition() {
        assert!(ensure_can_approve("WD-1", WithdrawalStatus::Pending).is_ok());
        assert!(ensure_can_reject("WD-1", WithdrawalStatus::Pending, "stale KYC").is_ok());
    }

    #[test]
    fn test_terminal_states_are_final() {
        for status in [WithdrawalStatus::Approved, WithdrawalStatus::Rejected] {
            let err = ensure_can_approve("WD-1", status).unwrap_err();
            assert_eq!(err.error_code(), "ALREADY_PROCESSED");
            assert_eq!(err.http_status_code(), 409);

            let err = ensure_can_reject("WD-1", status, "any").unwrap_err();
            assert!(matches!(err, WithdrawalError::AlreadyProcessed { .. }));
        }
    }

    #[test]
    fn test_rejection_requires_reason() {
        let err = ensure_can_reject("WD-1", WithdrawalStatus::Pending, "   ").unwrap_err();
        assert_eq!(err, WithdrawalError::MissingReason);
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_status_round_trips_through_strings() {
        for status in [
            WithdrawalStatus::Pending,
            WithdrawalStatus::Approved,
            WithdrawalStatus::Rejected,
        ] {
            assert_eq!(WithdrawalStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(WithdrawalStatus::parse("cancelled"), None);
    }
}
