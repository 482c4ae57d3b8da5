pub mod cli;
pub mod core;
pub mod providers;
pub mod rates;

pub use crate::cli::OutputFormat;
pub use crate::core::config;

use crate::core::config::AppConfig;
use crate::core::currency::Currency;
use crate::core::static_table::StaticRateTable;
use crate::rates::{LatestRateChain, SeriesChain};
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Convert {
        amount: String,
        from: Currency,
        to: Currency,
        offline: bool,
    },
    Rate {
        from: Currency,
        to: Currency,
    },
    Rates {
        from: Currency,
    },
    Series {
        from: Currency,
        to: Currency,
        days: u32,
    },
    Currencies,
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    info!("fxconv starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let client = providers::http_client()?;
    let table = StaticRateTable::with_overrides(&config.static_rates);

    match command {
        AppCommand::Convert {
            amount,
            from,
            to,
            offline,
        } => {
            let chain = LatestRateChain::from_config(&config, client);
            cli::convert::run(
                &chain,
                &table,
                &config.amount,
                &amount,
                from,
                to,
                offline,
                format,
            )
            .await
        }
        AppCommand::Rate { from, to } => {
            let chain = LatestRateChain::from_config(&config, client);
            cli::rate::run(&chain, &table, from, to, format).await
        }
        AppCommand::Rates { from } => {
            let chain = LatestRateChain::from_config(&config, client);
            cli::rate::run_all(&chain, &table, from, format).await
        }
        AppCommand::Series { from, to, days } => {
            let chain = SeriesChain::from_config(&config, client);
            cli::series::run(&chain, from, to, days, format).await
        }
        AppCommand::Currencies => cli::currencies::run(format),
    }
}
