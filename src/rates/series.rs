use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use super::run_chain;
use crate::core::config::AppConfig;
use crate::core::currency::Currency;
use crate::core::error::RateError;
use crate::core::provider::SeriesProvider;
use crate::core::rate::{ProviderId, Series};
use crate::providers::{FrankfurterProvider, YahooFinanceProvider};

/// Intraday first, daily second. There is no offline series.
pub struct SeriesChain {
    providers: Vec<Arc<dyn SeriesProvider>>,
    timeout: Duration,
}

impl SeriesChain {
    pub fn new(providers: Vec<Arc<dyn SeriesProvider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    pub fn from_config(config: &AppConfig, client: Client) -> Self {
        let providers = &config.providers;
        let chain: Vec<Arc<dyn SeriesProvider>> = vec![
            Arc::new(YahooFinanceProvider::new(
                &providers.yahoo.base_url,
                client.clone(),
            )),
            Arc::new(FrankfurterProvider::new(
                &providers.frankfurter.base_url,
                client,
            )),
        ];
        Self::new(chain, config.timeout())
    }

    fn eligible(&self, from: Currency, to: Currency) -> Vec<Arc<dyn SeriesProvider>> {
        self.providers
            .iter()
            .filter(|p| p.descriptor().supports(from, to))
            .cloned()
            .collect()
    }

    pub fn candidates(&self, from: Currency, to: Currency) -> Vec<ProviderId> {
        self.eligible(from, to)
            .iter()
            .map(|p| p.descriptor().id)
            .collect()
    }

    #[instrument(name = "Series", skip(self), fields(from = %from, to = %to))]
    pub async fn get_series(
        &self,
        from: Currency,
        to: Currency,
        days: u32,
    ) -> Result<Series, RateError> {
        let eligible = self.eligible(from, to);
        let series = run_chain(
            from,
            to,
            &eligible,
            self.timeout,
            |p| p.descriptor(),
            |p| p.fetch_series(from, to, days),
        )
        .await?;

        debug!(
            provider = %series.provider,
            granularity = %series.granularity,
            points = series.len(),
            "Resolved series"
        );
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ProviderFailure;
    use crate::core::rate::Granularity;
    use crate::providers::util::http_client;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(yahoo: &MockServer, frankfurter: &MockServer) -> AppConfig {
        let mut config = AppConfig::default();
        config.providers.yahoo.base_url = yahoo.uri();
        config.providers.frankfurter.base_url = frankfurter.uri();
        config.timeout_ms = 500;
        config
    }

    async fn mount_daily(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path_regex(r"^/\d{4}-\d{2}-\d{2}\.\.\d{4}-\d{2}-\d{2}$"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"rates":{"2024-05-02":{"BRL":5.11},"2024-05-03":{"BRL":5.09}}}"#,
            ))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_intraday_preferred() {
        let yahoo = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/USDBRL=X"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"chart":{"result":[{"timestamp":[1714726800],"indicators":{"quote":[{"close":[5.08]}]}}]}}"#,
            ))
            .mount(&yahoo)
            .await;
        let frankfurter = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&frankfurter)
            .await;

        let series = SeriesChain::from_config(&config_for(&yahoo, &frankfurter), http_client().unwrap())
            .get_series(Currency::Usd, Currency::Brl, 1)
            .await
            .unwrap();

        assert_eq!(series.provider, ProviderId::Yahoo);
        assert_eq!(series.granularity, Granularity::Intraday);
    }

    #[tokio::test]
    async fn test_intraday_failure_falls_back_to_daily() {
        let yahoo = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&yahoo)
            .await;
        let frankfurter = MockServer::start().await;
        mount_daily(&frankfurter).await;

        let series = SeriesChain::from_config(&config_for(&yahoo, &frankfurter), http_client().unwrap())
            .get_series(Currency::Usd, Currency::Brl, 7)
            .await
            .unwrap();

        assert_eq!(series.provider, ProviderId::Frankfurter);
        assert_eq!(series.granularity, Granularity::Daily);
        assert_eq!(series.len(), 2);
    }

    #[tokio::test]
    async fn test_crypto_series_has_no_daily_fallback() {
        let yahoo = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&yahoo)
            .await;
        let frankfurter = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&frankfurter)
            .await;

        let chain = SeriesChain::from_config(&config_for(&yahoo, &frankfurter), http_client().unwrap());
        assert_eq!(chain.candidates(Currency::Btc, Currency::Usd), vec![ProviderId::Yahoo]);

        let err = chain
            .get_series(Currency::Btc, Currency::Usd, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RateError::AllProvidersFailed { ref attempted, .. } if attempted == &vec![ProviderId::Yahoo]
        ));
    }

    #[tokio::test]
    async fn test_both_failing() {
        let yahoo = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&yahoo)
            .await;
        let frankfurter = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"rates":{}}"#))
            .mount(&frankfurter)
            .await;

        let err = SeriesChain::from_config(&config_for(&yahoo, &frankfurter), http_client().unwrap())
            .get_series(Currency::Eur, Currency::Brl, 3)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "all providers failed for EUR->BRL (last error: frankfurter: empty series)"
        );
    }

    #[tokio::test]
    async fn test_oversized_range_fails_without_panicking() {
        let yahoo = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(422))
            .mount(&yahoo)
            .await;
        let frankfurter = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(0)
            .mount(&frankfurter)
            .await;

        let err = SeriesChain::from_config(&config_for(&yahoo, &frankfurter), http_client().unwrap())
            .get_series(Currency::Usd, Currency::Brl, 200_000_000)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RateError::AllProvidersFailed { last: Some(ref last), .. }
                if matches!(last.failure, ProviderFailure::InvalidValue(_))
        ));
    }
}
