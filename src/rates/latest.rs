use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use super::run_chain;
use crate::core::config::AppConfig;
use crate::core::currency::Currency;
use crate::core::error::RateError;
use crate::core::provider::LatestRateProvider;
use crate::core::rate::{ProviderId, Rate, RateWithProvenance};
use crate::providers::{CurrencyApiProvider, FrankfurterProvider, OpenErApiProvider};

/// Resolves one latest rate by trying each adapter in priority order.
///
/// Adapters whose coverage excludes the pair are skipped before any request
/// is made. Exhaustion is reported as [`RateError::AllProvidersFailed`];
/// substituting the offline table is left to the caller.
pub struct LatestRateChain {
    providers: Vec<Arc<dyn LatestRateProvider>>,
    timeout: Duration,
}

impl LatestRateChain {
    pub fn new(providers: Vec<Arc<dyn LatestRateProvider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    /// Frankfurter, then Currency-API, then Open ER-API.
    pub fn from_config(config: &AppConfig, client: Client) -> Self {
        let providers = &config.providers;
        let chain: Vec<Arc<dyn LatestRateProvider>> = vec![
            Arc::new(FrankfurterProvider::new(
                &providers.frankfurter.base_url,
                client.clone(),
            )),
            Arc::new(CurrencyApiProvider::new(
                &providers.currency_api.base_url,
                &providers.currency_api.fallback_base_urls,
                client.clone(),
            )),
            Arc::new(OpenErApiProvider::new(
                &providers.open_er_api.base_url,
                client,
            )),
        ];
        Self::new(chain, config.timeout())
    }

    fn eligible(&self, from: Currency, to: Currency) -> Vec<Arc<dyn LatestRateProvider>> {
        self.providers
            .iter()
            .filter(|p| p.descriptor().supports(from, to))
            .cloned()
            .collect()
    }

    /// Providers that would be attempted for the pair, in order.
    pub fn candidates(&self, from: Currency, to: Currency) -> Vec<ProviderId> {
        self.eligible(from, to)
            .iter()
            .map(|p| p.descriptor().id)
            .collect()
    }

    #[instrument(name = "LatestRate", skip(self), fields(from = %from, to = %to))]
    pub async fn get_latest_rate(
        &self,
        from: Currency,
        to: Currency,
    ) -> Result<RateWithProvenance, RateError> {
        if from == to {
            return Ok(RateWithProvenance {
                rate: Rate::identity(from),
                provider: ProviderId::Frankfurter,
                attribution_url: None,
            });
        }

        let eligible = self.eligible(from, to);
        debug!(candidates = ?self.candidates(from, to), "Resolving latest rate");

        run_chain(
            from,
            to,
            &eligible,
            self.timeout,
            |p| p.descriptor(),
            |p| p.fetch_rate(from, to),
        )
        .await
    }
}
