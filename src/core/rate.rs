//! Rates, series and their provenance

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::core::currency::Currency;
use crate::core::error::{ProviderError, ProviderFailure};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderId {
    Frankfurter,
    OpenErApi,
    CurrencyApi,
    Yahoo,
    /// Offline table; never reported by a network adapter.
    Static,
}

impl ProviderId {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::Frankfurter => "frankfurter",
            ProviderId::OpenErApi => "open-er-api",
            ProviderId::CurrencyApi => "currency-api",
            ProviderId::Yahoo => "yahoo",
            ProviderId::Static => "static",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `1 from == value to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    pub from: Currency,
    pub to: Currency,
    pub value: Decimal,
}

impl Rate {
    pub fn identity(currency: Currency) -> Self {
        Rate {
            from: currency,
            to: currency,
            value: Decimal::ONE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateWithProvenance {
    #[serde(flatten)]
    pub rate: Rate,
    pub provider: ProviderId,
    pub attribution_url: Option<String>,
}

impl RateWithProvenance {
    pub fn value(&self) -> Decimal {
        self.rate.value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Intraday,
    Daily,
}

impl Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::Intraday => f.write_str("intraday"),
            Granularity::Daily => f.write_str("daily"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: Decimal,
}

/// A non-empty, timestamp-ascending sequence of observed rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub from: Currency,
    pub to: Currency,
    pub provider: ProviderId,
    pub granularity: Granularity,
    points: Vec<SeriesPoint>,
}

impl Series {
    /// Sorts `points` by timestamp and rejects an empty result.
    pub fn new(
        from: Currency,
        to: Currency,
        provider: ProviderId,
        granularity: Granularity,
        mut points: Vec<SeriesPoint>,
    ) -> Result<Self, ProviderError> {
        if points.is_empty() {
            return Err(ProviderError::new(provider, ProviderFailure::EmptySeries));
        }
        points.sort_by_key(|p| p.timestamp);
        Ok(Series {
            from,
            to,
            provider,
            granularity,
            points,
        })
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed series.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> &SeriesPoint {
        // Non-empty by construction.
        &self.points[self.points.len() - 1]
    }
}
