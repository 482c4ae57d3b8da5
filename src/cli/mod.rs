pub mod convert;
pub mod currencies;
pub mod rate;
pub mod series;
pub mod setup;
pub mod ui;

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
