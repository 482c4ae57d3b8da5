//! Provider contracts shared by every upstream rate source

use async_trait::async_trait;

use crate::core::currency::Currency;
use crate::core::error::ProviderError;
use crate::core::rate::{ProviderId, RateWithProvenance, Series};

/// Which currency pairs a provider can price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairCoverage {
    FiatOnly,
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub id: ProviderId,
    pub base_url: String,
    pub coverage: PairCoverage,
    /// Set when the upstream terms require attribution.
    pub attribution_url: Option<&'static str>,
}

impl ProviderDescriptor {
    pub fn supports(&self, from: Currency, to: Currency) -> bool {
        match self.coverage {
            PairCoverage::Any => true,
            PairCoverage::FiatOnly => !from.is_crypto() && !to.is_crypto(),
        }
    }
}

#[async_trait]
pub trait LatestRateProvider: Send + Sync {
    fn descriptor(&self) -> &ProviderDescriptor;

    async fn fetch_rate(
        &self,
        from: Currency,
        to: Currency,
    ) -> Result<RateWithProvenance, ProviderError>;
}

#[async_trait]
pub trait SeriesProvider: Send + Sync {
    fn descriptor(&self) -> &ProviderDescriptor;

    /// Fetches roughly the last `days` days of observations.
    async fn fetch_series(
        &self,
        from: Currency,
        to: Currency,
        days: u32,
    ) -> Result<Series, ProviderError>;
}
