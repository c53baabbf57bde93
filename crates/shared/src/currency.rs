//! Currency display helpers.
//!
//! Ledger descriptions and user-facing error messages embed formatted
//! amounts. The symbol comes from configuration, never hard-coded strings
//! at the call sites.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::CurrencyConfig;

/// A display currency: ISO code plus the symbol used for formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// ISO 4217 currency code.
    pub code: String,
    /// Symbol prefixed to formatted amounts.
    pub symbol: String,
}

impl Currency {
    /// Creates a currency from code and symbol.
    #[must_use]
    pub fn new(code: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            symbol: symbol.into(),
        }
    }

    /// Indian Rupee, the platform default.
    #[must_use]
    pub fn inr() -> Self {
        Self::new("INR", "\u{20b9}")
    }

    /// Formats an amount with the currency symbol, two decimal places.
    #[must_use]
    pub fn format(&self, amount: Decimal) -> String {
        format!("{}{}", self.symbol, amount.round_dp(2))
    }
}

impl From<&CurrencyConfig> for Currency {
    fn from(config: &CurrencyConfig) -> Self {
        Self::new(config.code.clone(), config.symbol.clone())
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::inr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_rounds_to_two_places() {
        let inr = Currency::inr();
        assert_eq!(inr.format(dec!(1000)), "\u{20b9}1000");
        assert_eq!(inr.format(dec!(42.555)), "\u{20b9}42.56");
    }

    #[test]
    fn test_custom_symbol() {
        let usd = Currency::new("USD", "$");
        assert_eq!(usd.format(dec!(99.9)), "$99.9");
    }

    #[test]
    fn test_from_config() {
        let config = CurrencyConfig::default();
        let currency = Currency::from(&config);
        assert_eq!(currency, Currency::inr());
    }
}
