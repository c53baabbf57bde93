//! Reference ID generation.
//!
//! Every generated ledger identifier keeps the platform prefix taxonomy
//! (`ALLOC-`, `VTX-`, `UTX-`, `LDG-`, `WD-`) followed by epoch millis for
//! readability, plus a UUID-derived suffix so two IDs minted in the same
//! millisecond can never collide.

use chrono::Utc;
use uuid::Uuid;

const SUFFIX_LEN: usize = 12;

fn random_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..SUFFIX_LEN].to_string()
}

fn stamped(prefix: &str) -> String {
    format!("{prefix}-{}-{}", Utc::now().timestamp_millis(), random_suffix())
}

/// Generates a vendor account ID (`VND-…`).
#[must_use]
pub fn vendor_id() -> String {
    stamped("VND")
}

/// Generates a user account ID (`USR-…`).
#[must_use]
pub fn user_id() -> String {
    stamped("USR")
}

/// Generates an admin fund allocation ID (`ALLOC-…`).
#[must_use]
pub fn allocation_id() -> String {
    stamped("ALLOC")
}

/// Generates a vendor transaction ID (`VTX-…`).
#[must_use]
pub fn vendor_transaction_id() -> String {
    stamped("VTX")
}

/// Generates a user transaction ID (`UTX-…`).
#[must_use]
pub fn user_transaction_id() -> String {
    stamped("UTX")
}

/// Generates a master ledger entry ID (`LDG-…`).
#[must_use]
pub fn ledger_id() -> String {
    stamped("LDG")
}

/// Generates a withdrawal request ID (`WD-…`).
#[must_use]
pub fn withdrawal_id() -> String {
    stamped("WD")
}

/// Generates an audit security token of the form `TRC-<4-digit>-<3-char>`.
///
/// The token is the externally visible log identifier, distinct from the
/// internal numeric row id. Randomness comes from a v4 UUID rather than the
/// clock, so tokens minted in the same instant stay distinct.
#[must_use]
pub fn security_token() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let bytes = *Uuid::new_v4().as_bytes();
    let digits = 1000 + (u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) % 9000);
    let tail: String = bytes[4..7]
        .iter()
        .map(|b| ALPHABET[usize::from(*b) % ALPHABET.len()] as char)
        .collect();
    format!("TRC-{digits}-{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_prefixes() {
        assert!(vendor_id().starts_with("VND-"));
        assert!(user_id().starts_with("USR-"));
        assert!(allocation_id().starts_with("ALLOC-"));
        assert!(vendor_transaction_id().starts_with("VTX-"));
        assert!(user_transaction_id().starts_with("UTX-"));
        assert!(ledger_id().starts_with("LDG-"));
        assert!(withdrawal_id().starts_with("WD-"));
    }

    #[test]
    fn test_no_collision_within_same_millisecond() {
        // A tight loop mints many IDs inside a handful of milliseconds; the
        // UUID suffix must keep them all distinct even when the clock part
        // is identical.
        let ids: HashSet<String> = (0..10_000).map(|_| ledger_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_security_token_shape() {
        for _ in 0..100 {
            let token = security_token();
            let parts: Vec<&str> = token.split('-').collect();
            assert_eq!(parts.len(), 3);
            assert_eq!(parts[0], "TRC");
            assert_eq!(parts[1].len(), 4);
            let digits: u32 = parts[1].parse().expect("numeric part");
            assert!((1000..=9999).contains(&digits));
            assert_eq!(parts[2].len(), 3);
            assert!(parts[2]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_security_tokens_distinct() {
        let tokens: HashSet<String> = (0..1000).map(|_| security_token()).collect();
        assert_eq!(tokens.len(), 1000);
    }
}
