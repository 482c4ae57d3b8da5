//! Supported currencies and their classification

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Brl,
    Gbp,
    Jpy,
    Cad,
    Aud,
    Chf,
    Btc,
    Eth,
    Usdt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fiat,
    Crypto,
}

const FIAT: [Currency; 8] = [
    Currency::Usd,
    Currency::Eur,
    Currency::Brl,
    Currency::Gbp,
    Currency::Jpy,
    Currency::Cad,
    Currency::Aud,
    Currency::Chf,
];

const CRYPTO: [Currency; 3] = [Currency::Btc, Currency::Eth, Currency::Usdt];

const ALL: [Currency; 11] = [
    Currency::Usd,
    Currency::Eur,
    Currency::Brl,
    Currency::Gbp,
    Currency::Jpy,
    Currency::Cad,
    Currency::Aud,
    Currency::Chf,
    Currency::Btc,
    Currency::Eth,
    Currency::Usdt,
];

impl Currency {
    /// Every supported currency, FIAT first.
    pub fn all() -> &'static [Currency] {
        &ALL
    }

    pub fn fiat() -> &'static [Currency] {
        &FIAT
    }

    pub fn crypto() -> &'static [Currency] {
        &CRYPTO
    }

    pub fn category(self) -> Category {
        match self {
            Currency::Btc | Currency::Eth | Currency::Usdt => Category::Crypto,
            _ => Category::Fiat,
        }
    }

    pub fn is_crypto(self) -> bool {
        self.category() == Category::Crypto
    }

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Brl => "BRL",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Chf => "CHF",
            Currency::Btc => "BTC",
            Currency::Eth => "ETH",
            Currency::Usdt => "USDT",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Currency::Usd => "US Dollar",
            Currency::Eur => "Euro",
            Currency::Brl => "Brazilian Real",
            Currency::Gbp => "Pound Sterling",
            Currency::Jpy => "Japanese Yen",
            Currency::Cad => "Canadian Dollar",
            Currency::Aud => "Australian Dollar",
            Currency::Chf => "Swiss Franc",
            Currency::Btc => "Bitcoin",
            Currency::Eth => "Ethereum",
            Currency::Usdt => "Tether (USDt)",
        }
    }

    /// Short label, e.g. `BTC · CRYPTO` or `USD`.
    pub fn label(self) -> String {
        if self.is_crypto() {
            format!("{} · CRYPTO", self.code())
        } else {
            self.code().to_string()
        }
    }

    /// Long label, e.g. `BTC — Bitcoin (CRYPTO)` or `USD — US Dollar`.
    pub fn long_label(self) -> String {
        if self.is_crypto() {
            format!("{} — {} (CRYPTO)", self.code(), self.name())
        } else {
            format!("{} — {}", self.code(), self.name())
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        ALL.iter()
            .copied()
            .find(|c| c.code() == code)
            .ok_or_else(|| anyhow::anyhow!("Unsupported currency: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(Currency::Btc.is_crypto());
        assert!(Currency::Usdt.is_crypto());
        assert!(!Currency::Brl.is_crypto());
        assert!(Currency::fiat().iter().all(|c| !c.is_crypto()));
        assert!(Currency::crypto().iter().all(|c| c.is_crypto()));
        assert_eq!(
            Currency::all().len(),
            Currency::fiat().len() + Currency::crypto().len()
        );
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!(" Usdt ".parse::<Currency>().unwrap(), Currency::Usdt);
        assert_eq!(Currency::Eth.to_string(), "ETH");
        for c in Currency::all() {
            assert_eq!(c.code().parse::<Currency>().unwrap(), *c);
        }

        let err = "XYZ".parse::<Currency>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported currency: XYZ");
    }

    #[test]
    fn test_labels() {
        assert_eq!(Currency::Btc.label(), "BTC · CRYPTO");
        assert_eq!(Currency::Usd.label(), "USD");
        assert_eq!(Currency::Btc.long_label(), "BTC — Bitcoin (CRYPTO)");
        assert_eq!(Currency::Eur.long_label(), "EUR — Euro");
    }

    #[test]
    fn test_serde_uses_codes() {
        assert_eq!(serde_json::to_string(&Currency::Usdt).unwrap(), "\"USDT\"");
        let c: Currency = serde_json::from_str("\"BRL\"").unwrap();
        assert_eq!(c, Currency::Brl);
    }
}
