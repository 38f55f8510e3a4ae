//! Yahoo Finance API client for historical stock data.
//!
//! Provides daily OHLC history from the chart API and fundamental ratios
//! from the quoteSummary API. Tickers are passed through with their
//! exchange suffix (`TCS.NS`, `TCS.BO`).

use super::{clean_bars, MarketDataSource, SourceError};
use crate::types::{Fundamentals, Lookback, PriceBar};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SUMMARY_BASE_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";

/// Yahoo Finance chart response.
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

impl YahooError {
    fn is_not_found(&self) -> bool {
        self.code.eq_ignore_ascii_case("Not Found")
    }
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

/// quoteSummary response, reduced to the modules we request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<QuoteSummaryResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    #[serde(default)]
    financial_data: FinancialData,
    #[serde(default)]
    summary_detail: SummaryDetail,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialData {
    #[serde(default)]
    return_on_equity: RawValue,
    #[serde(default)]
    debt_to_equity: RawValue,
    #[serde(default)]
    revenue_growth: RawValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    #[serde(default, rename = "trailingPE")]
    trailing_pe: RawValue,
}

/// Yahoo wraps numbers as `{"raw": 0.18, "fmt": "18.00%"}`, or `{}` when absent.
#[derive(Debug, Default, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

/// Normalize symbol for Yahoo Finance API.
fn normalize_yahoo_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Yahoo Finance API client.
pub struct YahooFinanceClient {
    client: Client,
    chart_url: String,
    summary_url: String,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client.
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        Self::with_base_urls(timeout, CHART_BASE_URL, SUMMARY_BASE_URL)
    }

    /// Client against custom endpoints (used for local mocks).
    pub fn with_base_urls(
        timeout: Duration,
        chart_url: &str,
        summary_url: &str,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self {
            client,
            chart_url: chart_url.trim_end_matches('/').to_string(),
            summary_url: summary_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch historical data for a symbol.
    ///
    /// Arguments:
    /// - symbol: ticker with exchange suffix (e.g., "TCS.NS")
    /// - range: Time range ("3mo", "1y", "2y", ...)
    /// - interval: Data interval ("1d", "1wk", ...)
    pub async fn get_historical_data(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<PriceBar>, SourceError> {
        let url = format!(
            "{}/{}?range={}&interval={}&includePrePost=false",
            self.chart_url,
            normalize_yahoo_symbol(symbol),
            range,
            interval
        );

        debug!("Fetching Yahoo Finance data: {}", url);

        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("Yahoo has no chart for {}", symbol);
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(SourceError::Api(format!("chart {}", response.status())));
        }

        let data: YahooChartResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        parse_chart(data)
    }

    /// Fetch key ratios from quoteSummary.
    pub async fn get_fundamentals(&self, symbol: &str) -> Result<Fundamentals, SourceError> {
        let url = format!(
            "{}/{}?modules=financialData,summaryDetail",
            self.summary_url,
            normalize_yahoo_symbol(symbol)
        );

        debug!("Fetching Yahoo fundamentals: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::Api(format!("quoteSummary {}", response.status())));
        }

        let data: QuoteSummaryResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        parse_summary(data)
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn history(
        &self,
        ticker: &str,
        lookback: Lookback,
    ) -> Result<Vec<PriceBar>, SourceError> {
        self.get_historical_data(ticker, lookback.range(), "1d").await
    }

    async fn fundamentals(&self, ticker: &str) -> Result<Fundamentals, SourceError> {
        self.get_fundamentals(ticker).await
    }
}

fn parse_chart(data: YahooChartResponse) -> Result<Vec<PriceBar>, SourceError> {
    if let Some(error) = data.chart.error {
        if error.is_not_found() {
            return Ok(Vec::new());
        }
        return Err(SourceError::Api(format!(
            "{} - {}",
            error.code, error.description
        )));
    }

    let Some(result) = data.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let Some(timestamps) = result.timestamp else {
        return Ok(Vec::new());
    };

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::Parse("No quote data in response".to_string()))?;

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    let bars = timestamps.iter().enumerate().filter_map(|(i, &timestamp)| {
        let close = closes.get(i).copied().flatten()?;
        let open = opens.get(i).copied().flatten().unwrap_or(close);
        let high = highs.get(i).copied().flatten().unwrap_or(close);
        let low = lows.get(i).copied().flatten().unwrap_or(close);
        let volume = volumes.get(i).copied().flatten().unwrap_or(0) as f64;

        // Convert to milliseconds
        Some(PriceBar::new(timestamp * 1000, open, high, low, close, volume))
    });

    Ok(clean_bars(bars))
}

fn parse_summary(data: QuoteSummaryResponse) -> Result<Fundamentals, SourceError> {
    if let Some(error) = data.quote_summary.error {
        return Err(SourceError::Api(format!(
            "{} - {}",
            error.code, error.description
        )));
    }

    let result = data
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .unwrap_or_default();

    Ok(Fundamentals {
        return_on_equity: result.financial_data.return_on_equity.raw,
        debt_to_equity: result.financial_data.debt_to_equity.raw,
        trailing_pe: result.summary_detail.trailing_pe.raw,
        revenue_growth: result.financial_data.revenue_growth.raw,
    })
}
