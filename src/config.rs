//! Environment-driven configuration.
//!
//! Values come from process environment variables (optionally loaded from a
//! `.env` file by the binary via `dotenvy`). Every setting has a default that
//! reproduces the reference trading policy.

use crate::error::{BotError, BotResult};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.exchange.coinbase.com";
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 180;
pub const DEFAULT_GRANULARITY_SECONDS: u32 = 900;
pub const DEFAULT_LOOKBACK_SECONDS: i64 = 108_000;
pub const DEFAULT_BUY_FUNDS: f64 = 5.0;
pub const DEFAULT_QUOTE_CURRENCY: &str = "USD";
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;

/// Instruments that trade too close to a peg for the crossover to mean much.
pub const DEFAULT_BLACKLIST: [&str; 6] = [
    "PAX-USD", "UST-USD", "PRO-USD", "REP-USD", "USDT-USD", "MUSD-USD",
];

/// Deployment environment name (`APP_ENV`), lowercased. Defaults to `sandbox`.
pub fn get_environment() -> String {
    env::var("APP_ENV")
        .map(|v| v.to_lowercase())
        .unwrap_or_else(|_| "sandbox".to_string())
}

pub fn is_production() -> bool {
    matches!(get_environment().as_str(), "production" | "prod")
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub api_url: String,
    pub credentials_path: PathBuf,
    pub trade_log_path: PathBuf,
    pub chart_dir: PathBuf,
    pub poll_interval_seconds: u64,
    pub granularity_seconds: u32,
    pub lookback_seconds: i64,
    pub buy_funds: f64,
    pub quote_currency: String,
    pub blacklist: Vec<String>,
    pub request_timeout_seconds: u64,
    pub trading_enabled: bool,
    pub skip_confirmation: bool,
    pub metrics_port: Option<u16>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            credentials_path: PathBuf::from("Info.txt"),
            trade_log_path: PathBuf::from("Trades_Logged/trades_logged.txt"),
            chart_dir: PathBuf::from("Trade_Photos"),
            poll_interval_seconds: DEFAULT_POLL_INTERVAL_SECONDS,
            granularity_seconds: DEFAULT_GRANULARITY_SECONDS,
            lookback_seconds: DEFAULT_LOOKBACK_SECONDS,
            buy_funds: DEFAULT_BUY_FUNDS,
            quote_currency: DEFAULT_QUOTE_CURRENCY.to_string(),
            blacklist: DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect(),
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            trading_enabled: false,
            skip_confirmation: false,
            metrics_port: None,
        }
    }
}

impl BotConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> BotResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Unset keys keep
    /// their defaults; set but unparsable keys are a configuration error.
    pub fn from_lookup<F>(lookup: F) -> BotResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let blacklist = match get("BLACKLIST") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.blacklist,
        };

        let config = Self {
            api_url: get("COINBASE_API_URL").unwrap_or(defaults.api_url),
            credentials_path: get("CREDENTIALS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.credentials_path),
            trade_log_path: get("TRADE_LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.trade_log_path),
            chart_dir: get("CHART_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.chart_dir),
            poll_interval_seconds: parse_or(
                "POLL_INTERVAL_SECONDS",
                get("POLL_INTERVAL_SECONDS"),
                defaults.poll_interval_seconds,
            )?,
            granularity_seconds: parse_or(
                "CANDLE_GRANULARITY_SECONDS",
                get("CANDLE_GRANULARITY_SECONDS"),
                defaults.granularity_seconds,
            )?,
            lookback_seconds: parse_or(
                "LOOKBACK_SECONDS",
                get("LOOKBACK_SECONDS"),
                defaults.lookback_seconds,
            )?,
            buy_funds: parse_or("BUY_FUNDS", get("BUY_FUNDS"), defaults.buy_funds)?,
            quote_currency: get("QUOTE_CURRENCY")
                .map(|q| q.to_uppercase())
                .unwrap_or(defaults.quote_currency),
            blacklist,
            request_timeout_seconds: parse_or(
                "REQUEST_TIMEOUT_SECONDS",
                get("REQUEST_TIMEOUT_SECONDS"),
                defaults.request_timeout_seconds,
            )?,
            trading_enabled: parse_flag(
                "TRADING_ENABLED",
                get("TRADING_ENABLED"),
                defaults.trading_enabled,
            )?,
            skip_confirmation: parse_flag(
                "SKIP_CONFIRMATION",
                get("SKIP_CONFIRMATION"),
                defaults.skip_confirmation,
            )?,
            metrics_port: match get("METRICS_PORT") {
                Some(raw) => Some(parse_value::<u16>("METRICS_PORT", &raw)?).filter(|p| *p != 0),
                None => None,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> BotResult<()> {
        if self.poll_interval_seconds == 0 {
            return Err(BotError::Config("POLL_INTERVAL_SECONDS must be > 0".into()));
        }
        if self.granularity_seconds == 0 {
            return Err(BotError::Config("CANDLE_GRANULARITY_SECONDS must be > 0".into()));
        }
        if self.lookback_seconds <= 0 {
            return Err(BotError::Config("LOOKBACK_SECONDS must be > 0".into()));
        }
        if !(self.buy_funds.is_finite() && self.buy_funds > 0.0) {
            return Err(BotError::Config("BUY_FUNDS must be a positive amount".into()));
        }
        if self.request_timeout_seconds == 0 {
            return Err(BotError::Config("REQUEST_TIMEOUT_SECONDS must be > 0".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> BotResult<T> {
    raw.parse::<T>()
        .map_err(|_| BotError::Config(format!("Invalid value for {}: '{}'", key, raw)))
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> BotResult<T> {
    match raw {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_flag(key: &str, raw: Option<String>, default: bool) -> BotResult<bool> {
    match raw.as_deref().map(str::to_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(BotError::Config(format!(
            "Invalid value for {}: '{}'",
            key, other
        ))),
    }
}
