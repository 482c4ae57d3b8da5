pub mod currency_api;
pub mod frankfurter;
pub mod open_er_api;
pub mod util;
pub mod yahoo_finance;

pub use currency_api::CurrencyApiProvider;
pub use frankfurter::FrankfurterProvider;
pub use open_er_api::OpenErApiProvider;
pub use util::http_client;
pub use yahoo_finance::YahooFinanceProvider;
