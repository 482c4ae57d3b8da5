use super::{OutputFormat, ui};
use crate::core::currency::Currency;
use crate::core::rate::Granularity;
use crate::rates::SeriesChain;
use anyhow::Result;
use comfy_table::Cell;

pub async fn run(
    chain: &SeriesChain,
    from: Currency,
    to: Currency,
    days: u32,
    format: OutputFormat,
) -> Result<()> {
    let spinner = ui::new_spinner(&format!("Fetching {from}->{to} history..."));
    let series = chain.get_series(from, to, days).await;
    spinner.finish_and_clear();
    let series = series?;

    if format == OutputFormat::Json {
        return ui::print_json(&series);
    }

    let timestamp_format = match series.granularity {
        Granularity::Intraday => "%Y-%m-%d %H:%M UTC",
        Granularity::Daily => "%Y-%m-%d",
    };

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Time"),
        ui::header_cell(&format!("Rate (1 {from} in {to})")),
    ]);
    for point in series.points() {
        table.add_row(vec![
            Cell::new(point.timestamp.format(timestamp_format).to_string()),
            ui::rate_cell(point.value),
        ]);
    }

    println!(
        "{}\n",
        ui::style_text(&format!("{from}->{to}, last {days} days"), ui::StyleType::Title)
    );
    println!("{table}");
    println!(
        "\n{}: {}",
        ui::style_text("Latest", ui::StyleType::TotalLabel),
        ui::style_text(&ui::format_rate(series.latest().value), ui::StyleType::TotalValue)
    );
    println!(
        "{}",
        ui::style_text(
            &format!("Source: {} ({})", series.provider, series.granularity),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}
