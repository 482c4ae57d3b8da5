//! Error types for rate resolution and conversion.

use crate::core::currency::Currency;
use crate::core::rate::ProviderId;
use thiserror::Error;

/// Why a single provider call failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderFailure {
    #[error("request failed: {0}")]
    Network(String),
    #[error("HTTP error: {0}")]
    Status(u16),
    #[error("timed out after {0} ms")]
    Timeout(u64),
    #[error("unexpected response shape: {0}")]
    Shape(String),
    #[error("invalid rate value: {0}")]
    InvalidValue(String),
    #[error("missing rate: {0}")]
    MissingRate(String),
    #[error("empty series")]
    EmptySeries,
    #[error("upstream error: {0}")]
    Upstream(String),
}

/// One adapter call failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{provider}: {failure}")]
pub struct ProviderError {
    pub provider: ProviderId,
    pub failure: ProviderFailure,
}

impl ProviderError {
    pub fn new(provider: ProviderId, failure: ProviderFailure) -> Self {
        Self { provider, failure }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.failure, ProviderFailure::Timeout(_))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RateError {
    /// Every candidate in a chain failed. `last` is `None` only when the
    /// chain had no candidate for the pair at all.
    #[error("all providers failed for {from}->{to}{}", last_error_suffix(.last))]
    AllProvidersFailed {
        from: Currency,
        to: Currency,
        attempted: Vec<ProviderId>,
        #[source]
        last: Option<ProviderError>,
    },

    #[error("static rate table has no entry for {from}->{to}")]
    UnsupportedPair { from: Currency, to: Currency },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

fn last_error_suffix(last: &Option<ProviderError>) -> String {
    match last {
        Some(err) => format!(" (last error: {err})"),
        None => " (no provider supports this pair)".to_string(),
    }
}
