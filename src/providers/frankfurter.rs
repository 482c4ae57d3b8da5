//! Frankfurter (ECB reference rates): latest rate and daily series.

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

use super::util::{get_json, positive_rate};
use crate::core::currency::Currency;
use crate::core::error::{ProviderError, ProviderFailure};
use crate::core::provider::{LatestRateProvider, PairCoverage, ProviderDescriptor, SeriesProvider};
use crate::core::rate::{Granularity, ProviderId, Rate, RateWithProvenance, Series, SeriesPoint};

const ID: ProviderId = ProviderId::Frankfurter;

pub struct FrankfurterProvider {
    descriptor: ProviderDescriptor,
    client: Client,
}

impl FrankfurterProvider {
    pub fn new(base_url: &str, client: Client) -> Self {
        Self {
            descriptor: ProviderDescriptor {
                id: ID,
                base_url: base_url.trim_end_matches('/').to_string(),
                coverage: PairCoverage::FiatOnly,
                attribution_url: None,
            },
            client,
        }
    }

    fn latest_url(&self, from: Currency, to: Currency) -> String {
        format!("{}/latest?from={from}&to={to}", self.descriptor.base_url)
    }

    /// `start..end` covers `days` calendar days ending on `end`.
    fn series_url(
        &self,
        from: Currency,
        to: Currency,
        end: NaiveDate,
        days: u32,
    ) -> Result<String, ProviderError> {
        let start = end
            .checked_sub_days(Days::new(u64::from(days.max(1)) - 1))
            .ok_or_else(|| {
                ProviderError::new(
                    ID,
                    ProviderFailure::InvalidValue(format!("range of {days} days")),
                )
            })?;
        Ok(format!(
            "{}/{}..{}?from={from}&to={to}",
            self.descriptor.base_url,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    rates: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    rates: BTreeMap<String, HashMap<String, Option<f64>>>,
}

fn parse_series_points(
    response: SeriesResponse,
    to: Currency,
) -> Result<Vec<SeriesPoint>, ProviderError> {
    let mut points = Vec::with_capacity(response.rates.len());
    for (date, rates) in response.rates {
        let day = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
            ProviderError::new(ID, ProviderFailure::Shape(format!("bad date '{date}': {e}")))
        })?;
        let Some(raw) = rates.get(to.code()) else {
            continue;
        };
        // Skip unusable points rather than failing the whole series.
        let Some(Ok(value)) = raw.map(|v| positive_rate(ID, v)) else {
            debug!(%date, value = ?raw, "Dropping invalid point");
            continue;
        };
        let timestamp = day
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| ProviderError::new(ID, ProviderFailure::Shape(date.clone())))?;
        points.push(SeriesPoint { timestamp, value });
    }
    Ok(points)
}

#[async_trait]
impl LatestRateProvider for FrankfurterProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    #[instrument(name = "FrankfurterLatest", skip(self), fields(from = %from, to = %to))]
    async fn fetch_rate(
        &self,
        from: Currency,
        to: Currency,
    ) -> Result<RateWithProvenance, ProviderError> {
        let response: LatestResponse =
            get_json(&self.client, ID, &self.latest_url(from, to)).await?;

        let value = response
            .rates
            .get(to.code())
            .ok_or_else(|| ProviderError::new(ID, ProviderFailure::MissingRate(to.to_string())))?;

        Ok(RateWithProvenance {
            rate: Rate {
                from,
                to,
                value: positive_rate(ID, *value)?,
            },
            provider: ID,
            attribution_url: None,
        })
    }
}

#[async_trait]
impl SeriesProvider for FrankfurterProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    #[instrument(name = "FrankfurterSeries", skip(self), fields(from = %from, to = %to))]
    async fn fetch_series(
        &self,
        from: Currency,
        to: Currency,
        days: u32,
    ) -> Result<Series, ProviderError> {
        let url = self.series_url(from, to, Utc::now().date_naive(), days)?;
        let response: SeriesResponse = get_json(&self.client, ID, &url).await?;
        let points = parse_series_points(response, to)?;
        debug!(points = points.len(), "Parsed daily series");
        Series::new(from, to, ID, Granularity::Daily, points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::util::http_client;
    use rust_decimal::Decimal;
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> FrankfurterProvider {
        FrankfurterProvider::new(&server.uri(), http_client().unwrap())
    }

    #[tokio::test]
    async fn test_successful_latest_rate() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("from", "USD"))
            .and(query_param("to", "BRL"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"amount":1.0,"base":"USD","date":"2024-05-03","rates":{"BRL":5.0712}}"#),
            )
            .mount(&mock_server)
            .await;

        let rate = provider(&mock_server)
            .fetch_rate(Currency::Usd, Currency::Brl)
            .await
            .unwrap();
        assert_eq!(rate.value().round_dp(4), Decimal::new(50712, 4));
        assert_eq!(rate.provider, ProviderId::Frankfurter);
        assert!(rate.attribution_url.is_none());
    }

    #[tokio::test]
    async fn test_missing_rate() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"rates":{"EUR":0.9}}"#))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server)
            .fetch_rate(Currency::Usd, Currency::Brl)
            .await
            .unwrap_err();
        assert_eq!(err.failure, ProviderFailure::MissingRate("BRL".to_string()));
    }

    #[tokio::test]
    async fn test_zero_rate_is_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"rates":{"BRL":0}}"#))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server)
            .fetch_rate(Currency::Usd, Currency::Brl)
            .await
            .unwrap_err();
        assert!(matches!(err.failure, ProviderFailure::InvalidValue(_)));
    }

    #[tokio::test]
    async fn test_http_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server)
            .fetch_rate(Currency::Usd, Currency::Brl)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "frankfurter: HTTP error: 404");
    }

    #[test]
    fn test_series_url_spans_requested_days() {
        let client = http_client().unwrap();
        let provider = FrankfurterProvider::new("https://api.frankfurter.dev/v1/", client);
        let end = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();

        assert_eq!(
            provider
                .series_url(Currency::Usd, Currency::Brl, end, 7)
                .unwrap(),
            "https://api.frankfurter.dev/v1/2024-05-04..2024-05-10?from=USD&to=BRL"
        );
        assert_eq!(
            provider
                .series_url(Currency::Eur, Currency::Usd, end, 0)
                .unwrap(),
            "https://api.frankfurter.dev/v1/2024-05-10..2024-05-10?from=EUR&to=USD"
        );
    }

    #[tokio::test]
    async fn test_out_of_range_series_is_an_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server)
            .fetch_series(Currency::Usd, Currency::Brl, 200_000_000)
            .await
            .unwrap_err();
        assert!(matches!(err.failure, ProviderFailure::InvalidValue(_)));
        assert_eq!(err.provider, ProviderId::Frankfurter);
    }

    #[tokio::test]
    async fn test_daily_series_skips_null_points() {
        let mock_server = MockServer::start().await;
        let body = r#"{"rates":{
            "2024-05-02": {"BRL": 5.11},
            "2024-05-03": {"BRL": null},
            "2024-05-06": {"BRL": -1.0}
        }}"#;
        Mock::given(method("GET"))
            .and(path_regex(r"^/\d{4}-\d{2}-\d{2}\.\.\d{4}-\d{2}-\d{2}$"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let series = provider(&mock_server)
            .fetch_series(Currency::Usd, Currency::Brl, 7)
            .await
            .unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.latest().value.round_dp(2), Decimal::new(511, 2));
    }

    #[tokio::test]
    async fn test_daily_series_sorted_business_days() {
        let mock_server = MockServer::start().await;
        // 2024-05-04/05 is a weekend: absent upstream
        let body = r#"{
            "amount": 1.0,
            "base": "USD",
            "start_date": "2024-05-02",
            "end_date": "2024-05-06",
            "rates": {
                "2024-05-06": {"BRL": 5.07},
                "2024-05-02": {"BRL": 5.11},
                "2024-05-03": {"BRL": 5.09}
            }
        }"#;
        Mock::given(method("GET"))
            .and(path_regex(r"^/\d{4}-\d{2}-\d{2}\.\.\d{4}-\d{2}-\d{2}$"))
            .and(query_param("from", "USD"))
            .and(query_param("to", "BRL"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let series = provider(&mock_server)
            .fetch_series(Currency::Usd, Currency::Brl, 5)
            .await
            .unwrap();

        assert_eq!(series.granularity, Granularity::Daily);
        assert_eq!(series.provider, ProviderId::Frankfurter);
        let days: Vec<_> = series
            .points()
            .iter()
            .map(|p| p.timestamp.format("%Y-%m-%d").to_string())
            .collect();
        assert_eq!(days, vec!["2024-05-02", "2024-05-03", "2024-05-06"]);
        assert_eq!(series.latest().value.round_dp(2), Decimal::new(507, 2));
    }

    #[tokio::test]
    async fn test_empty_daily_series_fails() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/\d{4}-\d{2}-\d{2}\.\.\d{4}-\d{2}-\d{2}$"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"rates":{}}"#))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server)
            .fetch_series(Currency::Usd, Currency::Brl, 7)
            .await
            .unwrap_err();
        assert_eq!(err.failure, ProviderFailure::EmptySeries);
    }
}
