//! Market data sources.
//!
//! Every upstream implements [`MarketDataSource`]; the rest of the service
//! only sees `Arc<dyn MarketDataSource>`, chosen at startup from config.

pub mod dhan;
pub mod yahoo;

pub use dhan::DhanClient;
pub use yahoo::YahooFinanceClient;

use crate::config::{Config, DataSourceKind};
use crate::error::AnalysisError;
use crate::types::{Fundamentals, Lookback, PriceBar};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a market data source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network failure or timeout.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with an error status or error payload.
    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// The provider does not offer this kind of data.
    #[error("Unsupported by {0}")]
    Unsupported(String),
}

impl From<SourceError> for AnalysisError {
    fn from(e: SourceError) -> Self {
        AnalysisError::ExternalService(e.to_string())
    }
}

/// Opaque provider of price history and fundamentals.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Daily (or finer) bars for a fully qualified ticker, oldest first.
    ///
    /// An unknown ticker yields an empty vector, not an error.
    async fn history(&self, ticker: &str, lookback: Lookback)
        -> Result<Vec<PriceBar>, SourceError>;

    async fn fundamentals(&self, ticker: &str) -> Result<Fundamentals, SourceError>;
}

/// Build the source selected by `MARKET_DATA_SOURCE`.
pub fn from_config(config: Arc<Config>) -> Result<Arc<dyn MarketDataSource>, SourceError> {
    let source: Arc<dyn MarketDataSource> = match config.market_data_source {
        DataSourceKind::Yahoo => Arc::new(YahooFinanceClient::new(config.fetch_timeout)?),
        DataSourceKind::Dhan => Arc::new(DhanClient::new(config)?),
    };
    Ok(source)
}

/// Keep only bars with a positive close and strictly increasing timestamps.
pub(crate) fn clean_bars(bars: impl IntoIterator<Item = PriceBar>) -> Vec<PriceBar> {
    let mut out: Vec<PriceBar> = Vec::new();
    for bar in bars {
        if bar.close.is_nan() || bar.close <= 0.0 {
            continue;
        }
        if out.last().is_some_and(|prev| bar.time <= prev.time) {
            continue;
        }
        out.push(bar);
    }
    out
}
