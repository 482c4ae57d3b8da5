//! Open ER-API: FIAT-only fallback whose terms require attribution.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::instrument;

use super::util::{get_json, positive_rate};
use crate::core::currency::Currency;
use crate::core::error::{ProviderError, ProviderFailure};
use crate::core::provider::{LatestRateProvider, PairCoverage, ProviderDescriptor};
use crate::core::rate::{ProviderId, Rate, RateWithProvenance};

const ID: ProviderId = ProviderId::OpenErApi;
pub const ATTRIBUTION_URL: &str = "https://www.exchangerate-api.com";

pub struct OpenErApiProvider {
    descriptor: ProviderDescriptor,
    client: Client,
}

impl OpenErApiProvider {
    pub fn new(base_url: &str, client: Client) -> Self {
        Self {
            descriptor: ProviderDescriptor {
                id: ID,
                base_url: base_url.trim_end_matches('/').to_string(),
                coverage: PairCoverage::FiatOnly,
                attribution_url: Some(ATTRIBUTION_URL),
            },
            client,
        }
    }
}

/// The open endpoint answers with `rates`; the keyed v6 API with `conversion_rates`.
#[derive(Debug, Deserialize)]
struct OpenErResponse {
    result: Option<String>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    rates: Option<HashMap<String, f64>>,
    conversion_rates: Option<HashMap<String, f64>>,
}

#[async_trait]
impl LatestRateProvider for OpenErApiProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    #[instrument(name = "OpenErApiLatest", skip(self), fields(from = %from, to = %to))]
    async fn fetch_rate(
        &self,
        from: Currency,
        to: Currency,
    ) -> Result<RateWithProvenance, ProviderError> {
        let url = format!("{}/latest/{from}", self.descriptor.base_url);
        let response: OpenErResponse = get_json(&self.client, ID, &url).await?;

        if response.result.as_deref() == Some("error") {
            let reason = response.error_type.unwrap_or_else(|| "unknown".to_string());
            return Err(ProviderError::new(ID, ProviderFailure::Upstream(reason)));
        }

        let rates = response
            .rates
            .or(response.conversion_rates)
            .ok_or_else(|| ProviderError::new(ID, ProviderFailure::Shape("no rates map".into())))?;
        let value = rates
            .get(to.code())
            .ok_or_else(|| ProviderError::new(ID, ProviderFailure::MissingRate(to.to_string())))?;

        Ok(RateWithProvenance {
            rate: Rate {
                from,
                to,
                value: positive_rate(ID, *value)?,
            },
            provider: ID,
            attribution_url: Some(ATTRIBUTION_URL.to_string()),
        })
    }
}
