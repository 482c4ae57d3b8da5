//! Currency-API CDN: keyless, covers crypto, served from several mirrors.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, instrument};

use super::util::{get_json, positive_rate};
use crate::core::currency::Currency;
use crate::core::error::{ProviderError, ProviderFailure};
use crate::core::provider::{LatestRateProvider, PairCoverage, ProviderDescriptor};
use crate::core::rate::{ProviderId, Rate, RateWithProvenance};

const ID: ProviderId = ProviderId::CurrencyApi;

pub struct CurrencyApiProvider {
    descriptor: ProviderDescriptor,
    bases: Vec<String>,
    client: Client,
}

impl CurrencyApiProvider {
    /// `base_url` is tried first, then each of `mirrors` in order.
    pub fn new(base_url: &str, mirrors: &[String], client: Client) -> Self {
        let mut bases: Vec<String> = Vec::with_capacity(mirrors.len() + 1);
        for base in std::iter::once(base_url).chain(mirrors.iter().map(String::as_str)) {
            let base = base.trim_end_matches('/').to_string();
            if !base.is_empty() && !bases.contains(&base) {
                bases.push(base);
            }
        }

        Self {
            descriptor: ProviderDescriptor {
                id: ID,
                base_url: base_url.trim_end_matches('/').to_string(),
                coverage: PairCoverage::Any,
                attribution_url: None,
            },
            bases,
            client,
        }
    }

    pub fn bases(&self) -> &[String] {
        &self.bases
    }

    /// `{base}/f/t.json`, answering `{"t": n}` or `{"f": {"t": n}}`.
    async fn pair_endpoint(&self, base: &str, from: &str, to: &str) -> Result<f64, ProviderError> {
        let url = format!("{base}/{from}/{to}.json");
        let body: HashMap<String, Value> = get_json(&self.client, ID, &url).await?;

        body.get(to)
            .and_then(Value::as_f64)
            .or_else(|| nested_rate(&body, from, to))
            .ok_or_else(|| ProviderError::new(ID, ProviderFailure::MissingRate(to.to_uppercase())))
    }

    /// `{base}/f.json`, answering `{"f": {"t": n, ...}}`.
    async fn map_endpoint(&self, base: &str, from: &str, to: &str) -> Result<f64, ProviderError> {
        let url = format!("{base}/{from}.json");
        let body: HashMap<String, Value> = get_json(&self.client, ID, &url).await?;

        nested_rate(&body, from, to)
            .ok_or_else(|| ProviderError::new(ID, ProviderFailure::MissingRate(to.to_uppercase())))
    }
}

fn nested_rate(body: &HashMap<String, Value>, from: &str, to: &str) -> Option<f64> {
    body.get(from)?.get(to)?.as_f64()
}

#[async_trait]
impl LatestRateProvider for CurrencyApiProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    #[instrument(name = "CurrencyApiLatest", skip(self), fields(from = %from, to = %to))]
    async fn fetch_rate(
        &self,
        from: Currency,
        to: Currency,
    ) -> Result<RateWithProvenance, ProviderError> {
        let f = from.code().to_lowercase();
        let t = to.code().to_lowercase();

        for base in &self.bases {
            let found = match self.pair_endpoint(base, &f, &t).await {
                Ok(value) => Ok(value),
                Err(e) => {
                    debug!(base = %base, error = %e, "Pair endpoint failed, trying map endpoint");
                    self.map_endpoint(base, &f, &t).await
                }
            };

            match found {
                Ok(value) => {
                    return Ok(RateWithProvenance {
                        rate: Rate {
                            from,
                            to,
                            value: positive_rate(ID, value)?,
                        },
                        provider: ID,
                        attribution_url: None,
                    });
                }
                Err(e) => debug!(base = %base, error = %e, "Base failed, trying next mirror"),
            }
        }

        Err(ProviderError::new(
            ID,
            ProviderFailure::MissingRate("all bases".to_string()),
        ))
    }
}
