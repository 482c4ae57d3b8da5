use super::{OutputFormat, ui};
use crate::core::currency::Currency;
use crate::core::error::RateError;
use crate::core::rate::{ProviderId, RateWithProvenance};
use crate::core::static_table::{STATIC_RATE_DISCLAIMER, StaticRateTable};
use crate::rates::LatestRateChain;
use anyhow::Result;
use comfy_table::Cell;
use futures::future::join_all;
use serde::Serialize;
use tracing::warn;

/// A resolved rate and whether it came from the offline table.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedRate {
    #[serde(flatten)]
    pub rate: RateWithProvenance,
    pub degraded: bool,
}

impl ResolvedRate {
    pub fn notice(&self) -> Option<&'static str> {
        self.degraded.then_some(STATIC_RATE_DISCLAIMER)
    }
}

/// Network chain first; the offline table when `offline` is set or when every
/// provider failed.
pub async fn resolve_rate(
    chain: &LatestRateChain,
    table: &StaticRateTable,
    from: Currency,
    to: Currency,
    offline: bool,
) -> Result<ResolvedRate, RateError> {
    if !offline {
        match chain.get_latest_rate(from, to).await {
            Ok(rate) => {
                return Ok(ResolvedRate {
                    rate,
                    degraded: false,
                });
            }
            Err(e @ RateError::AllProvidersFailed { .. }) => {
                warn!(error = %e, "Falling back to offline rates");
            }
            Err(e) => return Err(e),
        }
    }

    let rate = table.rate(from, to)?;
    Ok(ResolvedRate {
        degraded: rate.provider == ProviderId::Static,
        rate,
    })
}

/// Prints the provider and, for offline values, the disclaimer.
pub fn print_provenance(provider: ProviderId, attribution_url: Option<&str>, notice: Option<&str>) {
    let source = match attribution_url {
        Some(url) => format!("{provider} ({url})"),
        None => provider.to_string(),
    };
    println!(
        "{}",
        ui::style_text(&format!("Source: {source}"), ui::StyleType::Subtle)
    );
    if let Some(notice) = notice {
        println!("{}", ui::style_text(notice, ui::StyleType::Warning));
    }
}

pub async fn run(
    chain: &LatestRateChain,
    table: &StaticRateTable,
    from: Currency,
    to: Currency,
    format: OutputFormat,
) -> Result<()> {
    let spinner = ui::new_spinner(&format!("Fetching {from}->{to}..."));
    let resolved = resolve_rate(chain, table, from, to, false).await;
    spinner.finish_and_clear();
    let resolved = resolved?;

    match format {
        OutputFormat::Json => ui::print_json(&resolved),
        OutputFormat::Table => {
            println!(
                "1 {} = {} {}",
                ui::style_text(from.code(), ui::StyleType::TotalLabel),
                ui::style_text(&ui::format_rate(resolved.rate.value()), ui::StyleType::TotalValue),
                to
            );
            print_provenance(
                resolved.rate.provider,
                resolved.rate.attribution_url.as_deref(),
                resolved.notice(),
            );
            Ok(())
        }
    }
}

#[derive(Debug, Serialize)]
struct RatesRow {
    currency: Currency,
    #[serde(flatten)]
    result: Option<ResolvedRate>,
    error: Option<String>,
}

/// Rate from `from` to every other supported currency, one chain per target.
pub async fn run_all(
    chain: &LatestRateChain,
    table: &StaticRateTable,
    from: Currency,
    format: OutputFormat,
) -> Result<()> {
    let targets: Vec<Currency> = Currency::all()
        .iter()
        .copied()
        .filter(|c| *c != from)
        .collect();

    let pb = ui::new_progress_bar(targets.len() as u64, true);
    pb.set_message("Fetching rates...");
    let futures = targets.iter().map(|&to| {
        let pb_clone = pb.clone();
        async move {
            let res = resolve_rate(chain, table, from, to, false).await;
            pb_clone.inc(1);
            (to, res)
        }
    });
    let results = join_all(futures).await;
    pb.finish_and_clear();

    let rows: Vec<RatesRow> = results
        .into_iter()
        .map(|(to, res)| match res {
            Ok(resolved) => RatesRow {
                currency: to,
                result: Some(resolved),
                error: None,
            },
            Err(e) => RatesRow {
                currency: to,
                result: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    if format == OutputFormat::Json {
        return ui::print_json(&rows);
    }

    let mut table_out = ui::new_styled_table();
    table_out.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (1 {from})")),
        ui::header_cell("Source"),
    ]);

    let mut any_degraded = false;
    for row in &rows {
        match &row.result {
            Some(resolved) => {
                any_degraded |= resolved.degraded;
                table_out.add_row(vec![
                    Cell::new(row.currency.label()),
                    ui::rate_cell(resolved.rate.value()),
                    Cell::new(resolved.rate.provider.to_string()),
                ]);
            }
            None => {
                table_out.add_row(vec![
                    Cell::new(row.currency.label()),
                    ui::na_cell(true),
                    Cell::new(row.error.as_deref().unwrap_or_default()),
                ]);
            }
        }
    }

    println!("{}", ui::style_text(&format!("Rates from {}", from.long_label()), ui::StyleType::Title));
    println!("{table_out}");
    if any_degraded {
        println!(
            "{}",
            ui::style_text(STATIC_RATE_DISCLAIMER, ui::StyleType::Warning)
        );
    }
    Ok(())
}
