use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::util::{get_json, positive_rate};
use crate::core::currency::Currency;
use crate::core::error::{ProviderError, ProviderFailure};
use crate::core::provider::{PairCoverage, ProviderDescriptor, SeriesProvider};
use crate::core::rate::{Granularity, ProviderId, Series, SeriesPoint};

const ID: ProviderId = ProviderId::Yahoo;

/// Forex pairs quoted by Yahoo in this direction.
const CANONICAL_FOREX: [(Currency, Currency); 9] = [
    (Currency::Usd, Currency::Brl),
    (Currency::Eur, Currency::Brl),
    (Currency::Eur, Currency::Usd),
    (Currency::Usd, Currency::Gbp),
    (Currency::Usd, Currency::Jpy),
    (Currency::Usd, Currency::Cad),
    (Currency::Usd, Currency::Aud),
    (Currency::Usd, Currency::Chf),
    (Currency::Eur, Currency::Gbp),
];

/// Chart symbol for a pair, and whether closes must be inverted to read as `from -> to`.
pub fn yahoo_symbol(from: Currency, to: Currency) -> (String, bool) {
    match (from.is_crypto(), to.is_crypto()) {
        (true, true) | (true, false) => (format!("{from}-{to}"), false),
        (false, true) => (format!("{to}-{from}"), true),
        (false, false) => {
            if CANONICAL_FOREX.contains(&(to, from)) {
                (format!("{to}{from}=X"), true)
            } else {
                (format!("{from}{to}=X"), false)
            }
        }
    }
}

pub struct YahooFinanceProvider {
    descriptor: ProviderDescriptor,
    client: Client,
}

impl YahooFinanceProvider {
    pub fn new(base_url: &str, client: Client) -> Self {
        YahooFinanceProvider {
            descriptor: ProviderDescriptor {
                id: ID,
                base_url: base_url.trim_end_matches('/').to_string(),
                coverage: PairCoverage::Any,
                attribution_url: None,
            },
            client,
        }
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

fn extract_points(item: ChartItem, invert: bool) -> Result<Vec<SeriesPoint>, ProviderError> {
    let timestamps = item.timestamp.unwrap_or_default();
    let closes = item
        .indicators
        .and_then(|inds| inds.quote.into_iter().next())
        .and_then(|q| q.close)
        .unwrap_or_default();

    if timestamps.len() != closes.len() {
        return Err(ProviderError::new(
            ID,
            ProviderFailure::Shape(format!(
                "{} timestamps but {} closes",
                timestamps.len(),
                closes.len()
            )),
        ));
    }

    let mut points = Vec::with_capacity(closes.len());
    for (ts, close) in timestamps.into_iter().zip(closes) {
        let Some(close) = close else {
            continue;
        };
        let Ok(value) = positive_rate(ID, close) else {
            debug!(ts, close, "Skipping invalid close");
            continue;
        };
        let value = if invert {
            match Decimal::ONE.checked_div(value) {
                Some(v) => v,
                None => continue,
            }
        } else {
            value
        };
        let Some(timestamp) = Utc.timestamp_opt(ts, 0).single() else {
            continue;
        };
        points.push(SeriesPoint { timestamp, value });
    }
    Ok(points)
}

#[async_trait]
impl SeriesProvider for YahooFinanceProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    #[instrument(name = "YahooSeries", skip(self), fields(from = %from, to = %to))]
    async fn fetch_series(
        &self,
        from: Currency,
        to: Currency,
        days: u32,
    ) -> Result<Series, ProviderError> {
        let (symbol, invert) = yahoo_symbol(from, to);
        let url = format!(
            "{}/v8/finance/chart/{}?range={}d&interval=60m",
            self.descriptor.base_url,
            symbol,
            days.max(1)
        );

        let data: YahooChartResponse = get_json(&self.client, ID, &url).await?;
        let item = data
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| ProviderError::new(ID, ProviderFailure::EmptySeries))?;

        let points = extract_points(item, invert)?;
        debug!(%symbol, invert, points = points.len(), "Parsed intraday series");
        Series::new(from, to, ID, Granularity::Intraday, points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::util::http_client;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(symbol: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let request_path = format!("/v8/finance/chart/{symbol}");

        Mock::given(method("GET"))
            .and(path(request_path))
            .and(query_param("interval", "60m"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn chart(timestamps: &str, closes: &str) -> String {
        format!(
            r#"{{"chart": {{"result": [{{
                "meta": {{"currency": "BRL"}},
                "timestamp": [{timestamps}],
                "indicators": {{"quote": [{{"close": [{closes}]}}]}}
            }}], "error": null}}}}"#
        )
    }

    #[test]
    fn test_symbol_mapping() {
        assert_eq!(yahoo_symbol(Currency::Usd, Currency::Brl), ("USDBRL=X".to_string(), false));
        assert_eq!(yahoo_symbol(Currency::Brl, Currency::Usd), ("USDBRL=X".to_string(), true));
        assert_eq!(yahoo_symbol(Currency::Gbp, Currency::Eur), ("EURGBP=X".to_string(), true));
        assert_eq!(yahoo_symbol(Currency::Brl, Currency::Jpy), ("BRLJPY=X".to_string(), false));
        assert_eq!(yahoo_symbol(Currency::Btc, Currency::Usd), ("BTC-USD".to_string(), false));
        assert_eq!(yahoo_symbol(Currency::Eur, Currency::Eth), ("ETH-EUR".to_string(), true));
        assert_eq!(yahoo_symbol(Currency::Btc, Currency::Eth), ("BTC-ETH".to_string(), false));
    }

    #[tokio::test]
    async fn test_successful_intraday_series() {
        let body = chart("1714730400, 1714726800, 1714734000", "5.10, 5.08, null");
        let mock_server = create_mock_server("USDBRL=X", &body).await;
        let provider = YahooFinanceProvider::new(&mock_server.uri(), http_client().unwrap());

        let series = provider
            .fetch_series(Currency::Usd, Currency::Brl, 1)
            .await
            .unwrap();

        assert_eq!(series.granularity, Granularity::Intraday);
        assert_eq!(series.provider, ProviderId::Yahoo);
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].timestamp.timestamp(), 1714726800);
        assert_eq!(series.latest().value.round_dp(2), Decimal::new(510, 2));
    }

    #[tokio::test]
    async fn test_reverse_direction_is_inverted() {
        let body = chart("1714726800", "5.0");
        let mock_server = create_mock_server("USDBRL=X", &body).await;
        let provider = YahooFinanceProvider::new(&mock_server.uri(), http_client().unwrap());

        let series = provider
            .fetch_series(Currency::Brl, Currency::Usd, 7)
            .await
            .unwrap();
        assert_eq!(series.latest().value.round_dp(4), Decimal::new(2000, 4));
    }

    #[tokio::test]
    async fn test_mismatched_arrays_is_shape_error() {
        let body = chart("1714726800, 1714730400", "5.0");
        let mock_server = create_mock_server("USDBRL=X", &body).await;
        let provider = YahooFinanceProvider::new(&mock_server.uri(), http_client().unwrap());

        let err = provider
            .fetch_series(Currency::Usd, Currency::Brl, 1)
            .await
            .unwrap_err();
        assert!(matches!(err.failure, ProviderFailure::Shape(_)));
    }

    #[tokio::test]
    async fn test_no_result_data() {
        let mock_server =
            create_mock_server("BTC-USD", r#"{"chart": {"result": [], "error": null}}"#).await;
        let provider = YahooFinanceProvider::new(&mock_server.uri(), http_client().unwrap());

        let err = provider
            .fetch_series(Currency::Btc, Currency::Usd, 1)
            .await
            .unwrap_err();
        assert_eq!(err.failure, ProviderFailure::EmptySeries);
    }

    #[tokio::test]
    async fn test_only_null_closes_is_empty() {
        let body = chart("1714726800, 1714730400", "null, 0");
        let mock_server = create_mock_server("BTC-USD", &body).await;
        let provider = YahooFinanceProvider::new(&mock_server.uri(), http_client().unwrap());

        let err = provider
            .fetch_series(Currency::Btc, Currency::Usd, 1)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "yahoo: empty series");
    }

    #[tokio::test]
    async fn test_yahoo_api_error_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/USDJPY=X"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        let provider = YahooFinanceProvider::new(&mock_server.uri(), http_client().unwrap());

        let err = provider
            .fetch_series(Currency::Usd, Currency::Jpy, 1)
            .await
            .unwrap_err();
        assert_eq!(err.failure, ProviderFailure::Status(500));
    }

    #[tokio::test]
    async fn test_yahoo_malformed_response() {
        let mock_server = create_mock_server("USDJPY=X", r#"{"charts": {}}"#).await;
        let provider = YahooFinanceProvider::new(&mock_server.uri(), http_client().unwrap());

        let err = provider
            .fetch_series(Currency::Usd, Currency::Jpy, 1)
            .await
            .unwrap_err();
        assert!(matches!(err.failure, ProviderFailure::Shape(_)));
    }
}
