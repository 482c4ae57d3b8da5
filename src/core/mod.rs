//! Currency model, rate types and the pure parts of conversion

pub mod amount;
pub mod config;
pub mod convert;
pub mod currency;
pub mod error;
pub mod log;
pub mod provider;
pub mod rate;
pub mod static_table;

// Re-export main types for cleaner imports
pub use currency::{Category, Currency};
pub use error::{ProviderError, ProviderFailure, RateError};
pub use provider::{LatestRateProvider, PairCoverage, ProviderDescriptor, SeriesProvider};
pub use rate::{Granularity, ProviderId, Rate, RateWithProvenance, Series, SeriesPoint};
pub use static_table::{STATIC_RATE_DISCLAIMER, StaticRateTable};
