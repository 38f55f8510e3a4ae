//! Dhan broker API client for intraday candles.

use super::{clean_bars, MarketDataSource, SourceError};
use crate::config::Config;
use crate::types::{Fundamentals, Lookback, PriceBar};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Candle interval in minutes.
const INTERVAL: &str = "15";

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct IntradayRequest {
    symbol: String,
    exchange: &'static str,
    interval: &'static str,
    from_date: String,
    to_date: String,
}

/// Candles as parallel arrays; timestamps in epoch seconds.
#[derive(Debug, Deserialize)]
struct IntradayResponse {
    #[serde(default)]
    open: Vec<f64>,
    #[serde(default)]
    high: Vec<f64>,
    #[serde(default)]
    low: Vec<f64>,
    #[serde(default)]
    close: Vec<f64>,
    #[serde(default)]
    volume: Vec<f64>,
    #[serde(default)]
    timestamp: Vec<i64>,
}

/// Dhan API client.
pub struct DhanClient {
    client: Client,
    config: Arc<Config>,
}

impl DhanClient {
    pub fn new(config: Arc<Config>) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(config.fetch_timeout).build()?;
        Ok(Self { client, config })
    }

    /// Fetch intraday candles between two dates (inclusive).
    pub async fn get_candles(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceBar>, SourceError> {
        let url = format!(
            "{}/charts/intraday",
            self.config.dhan_base_url.trim_end_matches('/')
        );
        let payload = self.request_for(ticker, from, to);

        debug!("Fetching Dhan candles: {} {:?}", url, payload);

        let response = self
            .client
            .post(&url)
            .header("client-id", self.config.dhan.client_id.expose_secret())
            .header("access-token", self.config.dhan.access_token.expose_secret())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api(format!("{}: {}", status, body)));
        }

        let data: IntradayResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        parse_candles(data)
    }

    fn request_for(&self, ticker: &str, from: NaiveDate, to: NaiveDate) -> IntradayRequest {
        let (symbol, exchange) = split_ticker(
            ticker,
            &self.config.primary_suffix,
            &self.config.fallback_suffix,
        );
        IntradayRequest {
            symbol,
            exchange,
            interval: INTERVAL,
            from_date: from.format("%Y-%m-%d").to_string(),
            to_date: to.format("%Y-%m-%d").to_string(),
        }
    }
}

#[async_trait]
impl MarketDataSource for DhanClient {
    fn name(&self) -> &'static str {
        "dhan"
    }

    async fn history(
        &self,
        ticker: &str,
        lookback: Lookback,
    ) -> Result<Vec<PriceBar>, SourceError> {
        let to = Utc::now().date_naive();
        let from = to - ChronoDuration::days(lookback.days());
        self.get_candles(ticker, from, to).await
    }

    async fn fundamentals(&self, _ticker: &str) -> Result<Fundamentals, SourceError> {
        Err(SourceError::Unsupported("dhan: fundamentals".to_string()))
    }
}

/// Split `TCS.NS` into the bare symbol and Dhan exchange code.
fn split_ticker(ticker: &str, primary: &str, fallback: &str) -> (String, &'static str) {
    let upper = ticker.trim().to_uppercase();
    if !fallback.is_empty() {
        if let Some(symbol) = upper.strip_suffix(&fallback.to_uppercase()) {
            return (symbol.to_string(), "BSE");
        }
    }
    if !primary.is_empty() {
        if let Some(symbol) = upper.strip_suffix(&primary.to_uppercase()) {
            return (symbol.to_string(), "NSE");
        }
    }
    (upper, "NSE")
}

fn parse_candles(data: IntradayResponse) -> Result<Vec<PriceBar>, SourceError> {
    let n = data.timestamp.len();
    if [&data.open, &data.high, &data.low, &data.close, &data.volume]
        .iter()
        .any(|column| column.len() != n)
    {
        return Err(SourceError::Parse(
            "candle arrays have mismatched lengths".to_string(),
        ));
    }

    let bars = (0..n).map(|i| {
        PriceBar::new(
            data.timestamp[i] * 1000,
            data.open[i],
            data.high[i],
            data.low[i],
            data.close[i],
            data.volume[i],
        )
    });
    Ok(clean_bars(bars))
}
