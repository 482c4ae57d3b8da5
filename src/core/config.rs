use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use reqwest::Url;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::core::amount::AmountLimits;
use crate::core::currency::Currency;

pub const DEFAULT_FRANKFURTER_BASE: &str = "https://api.frankfurter.dev/v1";
pub const DEFAULT_OPEN_ER_API_BASE: &str = "https://open.er-api.com/v6";
pub const DEFAULT_CURRENCY_API_BASE: &str =
    "https://cdn.jsdelivr.net/gh/fawazahmed0/currency-api@1/latest/currencies";
pub const DEFAULT_CURRENCY_API_MIRRORS: [&str; 2] = [
    "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1/currencies",
    "https://cdn.jsdelivr.net/gh/fawazahmed0/currency-api@1/latest/currencies",
];
pub const DEFAULT_YAHOO_BASE: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_TIMEOUT_MS: u64 = 3500;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub base_url: String,
}

impl ProviderConfig {
    fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CurrencyApiConfig {
    pub base_url: String,
    /// Mirrors tried, in order, after `base_url`.
    #[serde(default = "default_currency_api_mirrors")]
    pub fallback_base_urls: Vec<String>,
}

fn default_currency_api_mirrors() -> Vec<String> {
    DEFAULT_CURRENCY_API_MIRRORS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for CurrencyApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CURRENCY_API_BASE.to_string(),
            fallback_base_urls: default_currency_api_mirrors(),
        }
    }
}

fn default_frankfurter() -> ProviderConfig {
    ProviderConfig::new(DEFAULT_FRANKFURTER_BASE)
}

fn default_open_er_api() -> ProviderConfig {
    ProviderConfig::new(DEFAULT_OPEN_ER_API_BASE)
}

fn default_yahoo() -> ProviderConfig {
    ProviderConfig::new(DEFAULT_YAHOO_BASE)
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ProvidersConfig {
    #[serde(default = "default_frankfurter")]
    pub frankfurter: ProviderConfig,
    #[serde(default = "default_open_er_api")]
    pub open_er_api: ProviderConfig,
    #[serde(default)]
    pub currency_api: CurrencyApiConfig,
    #[serde(default = "default_yahoo")]
    pub yahoo: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            frankfurter: default_frankfurter(),
            open_er_api: default_open_er_api(),
            currency_api: CurrencyApiConfig::default(),
            yahoo: default_yahoo(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Per provider call.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub amount: AmountLimits,
    /// Units per 1 USD, replacing entries of the built-in offline table.
    #[serde(default)]
    pub static_rates: HashMap<Currency, Decimal>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            providers: ProvidersConfig::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            amount: AmountLimits::default(),
            static_rates: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults when it does not exist.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Self::finish(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "fxconv", "fxconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config = Self::parse(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Self::finish(config)
    }

    /// Parses YAML, treating an empty document as all defaults.
    pub fn parse(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    fn finish(mut config: Self) -> Result<Self> {
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `FRANKFURTER_BASE`, `OPEN_ER_API_BASE`, `CURRENCY_API_CDN_BASE`,
    /// `YAHOO_BASE` and `FXCONV_TIMEOUT_MS` from `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("FRANKFURTER_BASE") {
            self.providers.frankfurter.base_url = url;
        }
        if let Some(url) = lookup("OPEN_ER_API_BASE") {
            self.providers.open_er_api.base_url = url;
        }
        if let Some(url) = lookup("CURRENCY_API_CDN_BASE") {
            self.providers.currency_api.base_url = url;
        }
        if let Some(url) = lookup("YAHOO_BASE") {
            self.providers.yahoo.base_url = url;
        }
        if let Some(ms) = lookup("FXCONV_TIMEOUT_MS") {
            self.timeout_ms = ms
                .trim()
                .parse()
                .with_context(|| format!("FXCONV_TIMEOUT_MS must be an integer, got '{ms}'"))?;
        }
        Ok(())
    }

    /// Rejects configuration that would only fail later, at request time.
    pub fn validate(&self) -> Result<()> {
        let providers = &self.providers;
        let urls = [
            ("providers.frankfurter.base_url", &providers.frankfurter.base_url),
            ("providers.open_er_api.base_url", &providers.open_er_api.base_url),
            ("providers.currency_api.base_url", &providers.currency_api.base_url),
            ("providers.yahoo.base_url", &providers.yahoo.base_url),
        ];
        for (field, url) in urls {
            validate_url(field, url)?;
        }
        for url in &providers.currency_api.fallback_base_urls {
            validate_url("providers.currency_api.fallback_base_urls", url)?;
        }

        if self.timeout_ms == 0 {
            bail!("timeout_ms must be greater than zero");
        }
        if self.amount.max_int_digits == 0 {
            bail!("amount.max_int_digits must be greater than zero");
        }
        // Decimal holds at most 28 significant digits.
        if self.amount.max_int_digits + self.amount.max_frac_digits > 28 {
            bail!("amount digit limits exceed 28 significant digits");
        }
        for (currency, value) in &self.static_rates {
            if value.is_sign_negative() || value.is_zero() {
                bail!("static_rates.{currency} must be positive, got {value}");
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn validate_url(field: &str, url: &str) -> Result<()> {
    let parsed = Url::parse(url).with_context(|| format!("{field} is not a valid URL: '{url}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("{field} must use http or https: '{url}'");
    }
    Ok(())
}
