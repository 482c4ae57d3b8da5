use super::rate::{print_provenance, resolve_rate};
use super::{OutputFormat, ui};
use crate::core::amount::{self, AmountLimits, AmountValidation};
use crate::core::convert::convert;
use crate::core::currency::Currency;
use crate::core::rate::{ProviderId, RateWithProvenance};
use crate::core::static_table::StaticRateTable;
use crate::rates::LatestRateChain;
use anyhow::{Result, anyhow};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Serialize)]
pub struct ConversionReport {
    pub amount: String,
    pub from: Currency,
    pub to: Currency,
    pub rate: Decimal,
    pub converted: String,
    pub provider: ProviderId,
    pub attribution_url: Option<String>,
    pub degraded: bool,
    pub notice: Option<&'static str>,
}

/// Canonicalizes user input; anything short of a complete amount is an error here.
pub fn prepare_amount(raw: &str, limits: &AmountLimits) -> Result<String> {
    let normalized = amount::normalize(raw, limits);
    debug!(raw, %normalized, "Normalized amount");
    match amount::validate(&normalized) {
        AmountValidation::Ok => Ok(normalized),
        AmountValidation::Incomplete => Err(anyhow!(
            "Incomplete amount '{normalized}': add digits after the decimal point"
        )),
        state => Err(anyhow!(
            "{} (got '{raw}')",
            state.message().unwrap_or("Invalid amount.")
        )),
    }
}

pub async fn build_report(
    chain: &LatestRateChain,
    table: &StaticRateTable,
    limits: &AmountLimits,
    raw_amount: &str,
    from: Currency,
    to: Currency,
    offline: bool,
) -> Result<ConversionReport> {
    let amount = prepare_amount(raw_amount, limits)?;
    let source = resolve_rate(chain, table, from, to, offline).await?;
    let converted = convert(&amount, &source.rate.rate)?;

    let notice = source.notice();
    let RateWithProvenance {
        rate,
        provider,
        attribution_url,
    } = source.rate;

    Ok(ConversionReport {
        amount,
        from,
        to,
        rate: rate.value,
        converted,
        provider,
        attribution_url,
        degraded: source.degraded,
        notice,
    })
}

#[allow(clippy::too_many_arguments)]
pub async fn run(
    chain: &LatestRateChain,
    table: &StaticRateTable,
    limits: &AmountLimits,
    raw_amount: &str,
    from: Currency,
    to: Currency,
    offline: bool,
    format: OutputFormat,
) -> Result<()> {
    let spinner = ui::new_spinner("Resolving rate...");
    let report = build_report(chain, table, limits, raw_amount, from, to, offline).await;
    spinner.finish_and_clear();
    let report = report?;

    if format == OutputFormat::Json {
        return ui::print_json(&report);
    }

    println!(
        "{} {} = {} {}",
        report.amount,
        ui::style_text(from.code(), ui::StyleType::TotalLabel),
        ui::style_text(&report.converted, ui::StyleType::TotalValue),
        ui::style_text(to.code(), ui::StyleType::TotalLabel),
    );
    println!(
        "{}",
        ui::style_text(
            &format!("Rate: 1 {from} = {} {to}", ui::format_rate(report.rate)),
            ui::StyleType::Subtle
        )
    );
    print_provenance(
        report.provider,
        report.attribution_url.as_deref(),
        report.notice,
    );
    Ok(())
}
