use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::core::error::{ProviderError, ProviderFailure};
use crate::core::rate::ProviderId;

pub const USER_AGENT: &str = "fxconv/1.0";

/// Client shared by every adapter.
pub fn http_client() -> anyhow::Result<Client> {
    Ok(Client::builder().user_agent(USER_AGENT).build()?)
}

/// Issues a `GET` and deserializes a successful body into `T`.
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    provider: ProviderId,
    url: &str,
) -> Result<T, ProviderError> {
    debug!(%provider, "Requesting {}", url);

    let network =
        |e: reqwest::Error| ProviderError::new(provider, ProviderFailure::Network(e.to_string()));
    let response = client.get(url).send().await.map_err(network)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::new(
            provider,
            ProviderFailure::Status(status.as_u16()),
        ));
    }

    let text = response.text().await.map_err(network)?;
    serde_json::from_str(&text)
        .map_err(|e| ProviderError::new(provider, ProviderFailure::Shape(e.to_string())))
}

/// Bounds `call` by `timeout`. On expiry the call is dropped, which aborts
/// its in-flight request.
pub async fn with_deadline<T, F>(
    provider: ProviderId,
    timeout: Duration,
    call: F,
) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::new(
            provider,
            ProviderFailure::Timeout(timeout.as_millis() as u64),
        )),
    }
}

/// Converts a reported rate, rejecting zero, negative and non-finite values.
pub fn positive_rate(provider: ProviderId, value: f64) -> Result<Decimal, ProviderError> {
    let invalid = || ProviderError::new(provider, ProviderFailure::InvalidValue(value.to_string()));
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid());
    }
    Decimal::from_f64(value)
        .filter(|d| !d.is_zero())
        .ok_or_else(invalid)
}
