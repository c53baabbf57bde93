//! Transfer engine error types.
//!
//! Monetary fields in messages are pre-formatted with the configured
//! currency symbol by the engine, so callers surface them verbatim.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while planning a fund transfer.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Transfer amount must be strictly positive.
    #[error("Transfer amount must be greater than zero, got {amount}")]
    NonPositiveAmount {
        /// The rejected amount.
        amount: Decimal,
    },

    /// Adjustment delta of zero is meaningless.
    #[error("Adjustment amount cannot be zero")]
    ZeroAdjustment,

    /// Vendor credit cap would be breached.
    #[error("Credit limit exceeded: requested {requested}, available {available}")]
    CreditLimitExceeded {
        /// Requested amount, formatted with the currency symbol.
        requested: String,
        /// Available credit, formatted with the currency symbol.
        available: String,
    },

    /// User does not have enough unlocked funds.
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        /// Requested amount, formatted with the currency symbol.
        requested: String,
        /// Available balance, formatted with the currency symbol.
        available: String,
    },

    /// The operation would drive a monetary field below zero.
    #[error("Operation would drive {field} below zero")]
    WouldGoNegative {
        /// Name of the field that would go negative.
        field: &'static str,
    },

    /// Inactive vendors cannot move funds.
    #[error("Vendor {vendor_id} is inactive")]
    InactiveVendor {
        /// The inactive vendor's public ID.
        vendor_id: String,
    },
}

impl TransferError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount { .. } => "NON_POSITIVE_AMOUNT",
            Self::ZeroAdjustment => "ZERO_ADJUSTMENT",
            Self::CreditLimitExceeded { .. } => "CREDIT_LIMIT_EXCEEDED",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::WouldGoNegative { .. } => "WOULD_GO_NEGATIVE",
            Self::InactiveVendor { .. } => "INACTIVE_VENDOR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - malformed input
            Self::NonPositiveAmount { .. } | Self::ZeroAdjustment => 400,

            // 422 Unprocessable - business rule violations
            Self::CreditLimitExceeded { .. }
            | Self::InsufficientFunds { .. }
            | Self::WouldGoNegative { .. }
            | Self::InactiveVendor { .. } => 422,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            TransferError::NonPositiveAmount { amount: dec!(-5) }.error_code(),
            "NON_POSITIVE_AMOUNT"
        );
        assert_eq!(TransferError::ZeroAdjustment.error_code(), "ZERO_ADJUSTMENT");
        assert_eq!(
            TransferError::WouldGoNegative { field: "balance" }.error_code(),
            "WOULD_GO_NEGATIVE"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            TransferError::NonPositiveAmount { amount: dec!(0) }.http_status_code(),
            400
        );
        assert_eq!(
            TransferError::CreditLimitExceeded {
                requested: "\u{20b9}500".into(),
                available: "\u{20b9}100".into(),
            }
            .http_status_code(),
            422
        );
        assert_eq!(
            TransferError::InactiveVendor {
                vendor_id: "VND-001".into()
            }
            .http_status_code(),
            422
        );
    }

    #[test]
    fn test_messages_carry_formatted_amounts() {
        let err = TransferError::InsufficientFunds {
            requested: "\u{20b9}900".into(),
            available: "\u{20b9}250.50".into(),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds: requested \u{20b9}900, available \u{20b9}250.50"
        );
    }
}
