use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxconv::core::currency::Currency;
use fxconv::core::log::init_logging;
use fxconv::OutputFormat;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxconv::AppCommand {
    fn from(cmd: Commands) -> fxconv::AppCommand {
        match cmd {
            Commands::Convert {
                amount,
                from,
                to,
                offline,
            } => fxconv::AppCommand::Convert {
                amount,
                from,
                to,
                offline,
            },
            Commands::Rate { from, to } => fxconv::AppCommand::Rate { from, to },
            Commands::Rates { from } => fxconv::AppCommand::Rates { from },
            Commands::Series { from, to, days } => fxconv::AppCommand::Series { from, to, days },
            Commands::Currencies => fxconv::AppCommand::Currencies,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between two currencies
    Convert {
        /// Amount as typed, e.g. `1.234,56`
        amount: String,
        from: Currency,
        to: Currency,
        /// Use the offline reference table instead of live providers
        #[arg(long)]
        offline: bool,
    },
    /// Show the latest rate for a pair
    Rate { from: Currency, to: Currency },
    /// Show the latest rate from one currency to all others
    Rates { from: Currency },
    /// Show recent rate history for a pair
    Series {
        from: Currency,
        to: Currency,
        /// Number of days of history
        #[arg(short, long, default_value_t = 7)]
        days: u32,
    },
    /// List supported currencies
    Currencies,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => fxconv::cli::setup::setup_at_path(path),
            None => fxconv::cli::setup::setup(),
        },
        Some(cmd) => fxconv::run_command(cmd.into(), cli.config_path.as_deref(), format).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
