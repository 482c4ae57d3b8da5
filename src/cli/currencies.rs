use super::{OutputFormat, ui};
use crate::core::currency::{Category, Currency};
use anyhow::Result;
use comfy_table::Cell;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct CurrencyEntry {
    code: Currency,
    name: &'static str,
    category: Category,
    label: String,
}

pub fn run(format: OutputFormat) -> Result<()> {
    let entries: Vec<CurrencyEntry> = Currency::all()
        .iter()
        .map(|&c| CurrencyEntry {
            code: c,
            name: c.name(),
            category: c.category(),
            label: c.long_label(),
        })
        .collect();

    if format == OutputFormat::Json {
        return ui::print_json(&entries);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Name"),
        ui::header_cell("Category"),
    ]);
    for entry in &entries {
        let category = match entry.category {
            Category::Fiat => Cell::new("FIAT"),
            Category::Crypto => Cell::new("CRYPTO").fg(comfy_table::Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(entry.code.code()),
            Cell::new(entry.name),
            category,
        ]);
    }
    println!("{table}");
    Ok(())
}
