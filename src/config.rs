use crate::services::risk::RiskMode;
use crate::services::signals::Preset;
use secrecy::SecretString;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Symbols scanned when `SCAN_WATCHLIST` is not set.
pub const DEFAULT_WATCHLIST: &[&str] = &[
    "TCS", "INFY", "RELIANCE", "ICICIBANK", "SBIN", "HDFCBANK", "ITC", "AXISBANK", "LT",
    "BHARTIARTL",
];

const DEFAULT_DHAN_BASE_URL: &str = "https://api.dhan.co/v2";

/// Configuration errors. Any of these aborts startup.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Which upstream provides price history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSourceKind {
    /// Yahoo Finance daily chart API.
    #[default]
    Yahoo,
    /// Dhan broker intraday candles.
    Dhan,
}

impl DataSourceKind {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" | "yfinance" => Some(Self::Yahoo),
            "dhan" => Some(Self::Dhan),
            _ => None,
        }
    }
}

/// Dhan broker API credentials.
#[derive(Debug)]
pub struct DhanCredentials {
    /// Sent as the `client-id` header.
    pub client_id: SecretString,
    /// Sent as the `access-token` header.
    pub access_token: SecretString,
}

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Broker credentials (required at startup).
    pub dhan: DhanCredentials,
    /// Broker API base URL.
    pub dhan_base_url: String,
    /// Price history provider.
    pub market_data_source: DataSourceKind,
    /// Exchange suffix tried first (NSE).
    pub primary_suffix: String,
    /// Exchange suffix tried when the primary has no data (BSE).
    pub fallback_suffix: String,
    /// Timeout for every outbound HTTP call, and per symbol during scans.
    pub fetch_timeout: Duration,
    /// Symbols iterated by the scanners.
    pub scan_watchlist: Vec<String>,
    /// Rule set used by `/analyze`.
    pub analyze_preset: Preset,
    /// Risk policy used by `/analyze`.
    pub analyze_risk: RiskMode,
    /// Invert ATR levels for SELL signals instead of the legacy symmetric offsets.
    pub atr_directional: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dhan = DhanCredentials {
            client_id: required(&lookup, "DHAN_API_KEY")?,
            access_token: required(&lookup, "DHAN_ACCESS_TOKEN")?,
        };

        let market_data_source = match lookup("MARKET_DATA_SOURCE") {
            Some(value) => DataSourceKind::from_str(&value).ok_or(ConfigError::Invalid {
                key: "MARKET_DATA_SOURCE",
                value,
            })?,
            None => DataSourceKind::default(),
        };

        let analyze_preset = match lookup("ANALYZE_PRESET") {
            Some(value) => Preset::from_str(&value).ok_or(ConfigError::Invalid {
                key: "ANALYZE_PRESET",
                value,
            })?,
            None => Preset::ConfidenceAccumulation,
        };

        let analyze_risk = match lookup("ANALYZE_RISK_POLICY") {
            Some(value) => RiskMode::from_str(&value).ok_or(ConfigError::Invalid {
                key: "ANALYZE_RISK_POLICY",
                value,
            })?,
            None => RiskMode::Percentage,
        };

        // Format: "TCS,INFY,RELIANCE"
        let scan_watchlist = lookup("SCAN_WATCHLIST")
            .map(|s| {
                s.split(',')
                    .map(|sym| sym.trim().to_uppercase())
                    .filter(|sym| !sym.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect());

        let fetch_timeout_secs: u64 = parsed(&lookup, "FETCH_TIMEOUT_SECS", 10)?;
        if fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "FETCH_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed(&lookup, "PORT", 8000)?,
            dhan,
            dhan_base_url: lookup("DHAN_BASE_URL")
                .unwrap_or_else(|| DEFAULT_DHAN_BASE_URL.to_string()),
            market_data_source,
            primary_suffix: lookup("PRIMARY_SUFFIX").unwrap_or_else(|| ".NS".to_string()),
            fallback_suffix: lookup("FALLBACK_SUFFIX").unwrap_or_else(|| ".BO".to_string()),
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            scan_watchlist,
            analyze_preset,
            analyze_risk,
            atr_directional: lookup("ATR_DIRECTIONAL")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }

    /// Address the HTTP server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<SecretString, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(SecretString::from(value)),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
