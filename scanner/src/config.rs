use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::report::OutputFormat;

pub const DEFAULT_UNIVERSE_URL: &str = "https://push2.eastmoney.com/api/qt/clist/get";
pub const DEFAULT_ORDER_BOOK_URL: &str = "http://push2delay.eastmoney.com/api/qt/stock/get";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}={value:?} is not a valid value")]
    Parse { key: &'static str, value: String },

    #[error("{0}")]
    Invalid(&'static str),
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Fixed polling cadence. A cycle that finishes early sleeps out the rest.
    pub interval: Duration,

    /// Maximum number of order-book requests in flight at once.
    pub concurrency: usize,

    /// Per-request timeout for both endpoints. This is the only deadline a
    /// fetch is subject to.
    pub request_timeout: Duration,

    /// Best-bid floor; cheaper names are ignored as noise.
    pub min_price: Decimal,

    /// How many top gainers to pull per cycle.
    pub universe_size: usize,

    // =========================
    // Endpoints
    // =========================
    pub universe_url: String,
    pub order_book_url: String,

    // =========================
    // Presentation
    // =========================
    pub output: OutputFormat,

    /// Stop after this many cycles. `None` runs until interrupted.
    pub max_cycles: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            concurrency: 20,
            request_timeout: Duration::from_secs(5),
            min_price: Decimal::new(200, 2),
            universe_size: 100,
            universe_url: DEFAULT_UNIVERSE_URL.to_string(),
            order_book_url: DEFAULT_ORDER_BOOK_URL.to_string(),
            output: OutputFormat::Pretty,
            max_cycles: None,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `SCANNER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an injectable variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(secs) = parse_var::<u64, _>(&lookup, "SCANNER_INTERVAL_SECS")? {
            cfg.interval = Duration::from_secs(secs);
        }
        if let Some(n) = parse_var(&lookup, "SCANNER_CONCURRENCY")? {
            cfg.concurrency = n;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "SCANNER_REQUEST_TIMEOUT_SECS")? {
            cfg.request_timeout = Duration::from_secs(secs);
        }
        if let Some(p) = parse_var(&lookup, "SCANNER_MIN_PRICE")? {
            cfg.min_price = p;
        }
        if let Some(n) = parse_var(&lookup, "SCANNER_UNIVERSE_SIZE")? {
            cfg.universe_size = n;
        }
        if let Some(url) = lookup("SCANNER_UNIVERSE_URL") {
            cfg.universe_url = url;
        }
        if let Some(url) = lookup("SCANNER_ORDER_BOOK_URL") {
            cfg.order_book_url = url;
        }

        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::Invalid("polling interval must be positive"));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid("request timeout must be positive"));
        }
        if self.universe_size == 0 {
            return Err(ConfigError::Invalid("universe size must be positive"));
        }
        if self.min_price.is_sign_negative() {
            return Err(ConfigError::Invalid("price floor cannot be negative"));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Parse { key, value: raw }),
    }
}
