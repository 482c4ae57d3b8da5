//! Offline fallback rates.
//!
//! Every entry is the number of units of a currency per 1 USD, so any pair is
//! the ratio `table[to] / table[from]`. FIAT entries are stable enough to be a
//! reasonable approximation; crypto entries are rough placeholders that only
//! keep the flow usable while every provider is down.

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::core::currency::Currency;
use crate::core::error::RateError;
use crate::core::rate::{ProviderId, Rate, RateWithProvenance};

/// Shown next to any value produced from this table.
pub const STATIC_RATE_DISCLAIMER: &str = "Offline reference rates: approximate values, not current market prices (crypto especially).";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticRateTable {
    units_per_usd: HashMap<Currency, Decimal>,
}

impl Default for StaticRateTable {
    fn default() -> Self {
        let entries = [
            (Currency::Usd, Decimal::ONE),
            (Currency::Eur, Decimal::new(92, 2)),
            (Currency::Brl, Decimal::new(540, 2)),
            (Currency::Gbp, Decimal::new(78, 2)),
            (Currency::Jpy, Decimal::from(157)),
            (Currency::Cad, Decimal::new(136, 2)),
            (Currency::Aud, Decimal::new(148, 2)),
            (Currency::Chf, Decimal::new(86, 2)),
            (Currency::Btc, Decimal::ONE / Decimal::from(65_000)),
            (Currency::Eth, Decimal::ONE / Decimal::from(3_000)),
            (Currency::Usdt, Decimal::ONE),
        ];
        Self {
            units_per_usd: entries.into_iter().collect(),
        }
    }
}

impl StaticRateTable {
    pub fn new(units_per_usd: HashMap<Currency, Decimal>) -> Self {
        Self { units_per_usd }
    }

    /// Default table with `overrides` replacing individual entries.
    pub fn with_overrides(overrides: &HashMap<Currency, Decimal>) -> Self {
        let mut table = Self::default();
        table
            .units_per_usd
            .extend(overrides.iter().map(|(c, v)| (*c, *v)));
        table
    }

    pub fn units_per_usd(&self, currency: Currency) -> Option<Decimal> {
        self.units_per_usd.get(&currency).copied()
    }

    pub fn rate(&self, from: Currency, to: Currency) -> Result<RateWithProvenance, RateError> {
        let value = if from == to {
            Decimal::ONE
        } else {
            let unsupported = || RateError::UnsupportedPair { from, to };
            let f = self
                .units_per_usd(from)
                .filter(|v| v.is_sign_positive() && !v.is_zero())
                .ok_or_else(unsupported)?;
            let t = self
                .units_per_usd(to)
                .filter(|v| v.is_sign_positive() && !v.is_zero())
                .ok_or_else(unsupported)?;
            t.checked_div(f).ok_or_else(unsupported)?
        };

        Ok(RateWithProvenance {
            rate: Rate { from, to, value },
            provider: ProviderId::Static,
            attribution_url: None,
        })
    }
}
