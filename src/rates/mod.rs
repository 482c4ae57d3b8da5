//! Sequential fallback chains over the provider adapters.

pub mod latest;
pub mod series;

pub use latest::LatestRateChain;
pub use series::SeriesChain;

use futures::future::BoxFuture;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::currency::Currency;
use crate::core::error::{ProviderError, RateError};
use crate::core::provider::ProviderDescriptor;
use crate::core::rate::ProviderId;
use crate::providers::util::with_deadline;

/// Tries each candidate in order, each bounded by `timeout`, and returns the
/// first success. Candidates must already be filtered for the pair.
async fn run_chain<'a, P, T, F>(
    from: Currency,
    to: Currency,
    candidates: &'a [P],
    timeout: Duration,
    descriptor: impl Fn(&'a P) -> &'a ProviderDescriptor,
    mut call: F,
) -> Result<T, RateError>
where
    F: FnMut(&'a P) -> BoxFuture<'a, Result<T, ProviderError>>,
{
    let mut attempted = Vec::with_capacity(candidates.len());
    let mut last: Option<ProviderError> = None;

    for candidate in candidates {
        let id: ProviderId = descriptor(candidate).id;
        attempted.push(id);
        debug!(provider = %id, "Trying provider");

        match with_deadline(id, timeout, call(candidate)).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(provider = %id, %from, %to, error = %e, "Provider failed, trying next");
                last = Some(e);
            }
        }
    }

    Err(RateError::AllProvidersFailed {
        from,
        to,
        attempted,
        last,
    })
}
