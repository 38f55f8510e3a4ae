//! Symbol resolution and price history retrieval.

use crate::config::Config;
use crate::error::AnalysisError;
use crate::sources::MarketDataSource;
use crate::types::{Fundamentals, Lookback, PriceSeries};
use std::sync::Arc;
use tracing::{debug, warn};

/// Normalize user input: uppercase, no whitespace.
pub fn clean_symbol(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Resolves bare symbols against the primary and fallback exchange suffixes.
pub struct Fetcher {
    source: Arc<dyn MarketDataSource>,
    primary_suffix: String,
    fallback_suffix: String,
}

impl Fetcher {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        primary_suffix: impl Into<String>,
        fallback_suffix: impl Into<String>,
    ) -> Self {
        Self {
            source,
            primary_suffix: primary_suffix.into(),
            fallback_suffix: fallback_suffix.into(),
        }
    }

    pub fn from_config(source: Arc<dyn MarketDataSource>, config: &Config) -> Self {
        Self::new(source, &config.primary_suffix, &config.fallback_suffix)
    }

    pub fn source(&self) -> &Arc<dyn MarketDataSource> {
        &self.source
    }

    /// Tickers to try, in order. A symbol that already carries one of the
    /// suffixes is tried as-is only.
    pub fn candidates(&self, symbol: &str) -> Vec<String> {
        let suffixes = [&self.primary_suffix, &self.fallback_suffix];
        let has_suffix = suffixes
            .iter()
            .any(|s| !s.is_empty() && symbol.ends_with(&s.to_uppercase()));
        if has_suffix {
            return vec![symbol.to_string()];
        }

        let mut out: Vec<String> = Vec::with_capacity(2);
        for suffix in suffixes {
            let ticker = format!("{}{}", symbol, suffix);
            if !out.contains(&ticker) {
                out.push(ticker);
            }
        }
        out
    }

    /// Fetch history for `symbol`, falling back from the primary exchange.
    ///
    /// Fails with `InvalidSymbol` when no exchange has data, with
    /// `ExternalService` when every attempt errored, and with
    /// `InsufficientHistory` when the resolved series is shorter than
    /// `min_bars`. Only an empty or failed answer moves on to the fallback
    /// exchange; a short primary series is final.
    pub async fn fetch_series(
        &self,
        symbol: &str,
        lookback: Lookback,
        min_bars: usize,
    ) -> Result<PriceSeries, AnalysisError> {
        let symbol = clean_symbol(symbol);
        if symbol.is_empty() {
            return Err(AnalysisError::InvalidSymbol(symbol));
        }

        let mut last_error = None;
        let mut saw_empty = false;

        for ticker in self.candidates(&symbol) {
            match self.source.history(&ticker, lookback).await {
                Ok(bars) if bars.is_empty() => {
                    debug!("{} returned no bars for {}", self.source.name(), ticker);
                    saw_empty = true;
                }
                Ok(bars) => {
                    debug!("Fetched {} bars for {}", bars.len(), ticker);
                    let series = PriceSeries::new(ticker, bars)?;
                    series.require(min_bars)?;
                    return Ok(series);
                }
                Err(e) => {
                    warn!("{} failed for {}: {}", self.source.name(), ticker, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !saw_empty => Err(e.into()),
            _ => Err(AnalysisError::InvalidSymbol(symbol)),
        }
    }

    /// Fundamentals for an already resolved ticker.
    pub async fn fundamentals(&self, ticker: &str) -> Result<Fundamentals, AnalysisError> {
        Ok(self.source.fundamentals(ticker).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceError;
    use crate::types::PriceBar;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned responses keyed by ticker; unknown tickers return no bars.
    #[derive(Default)]
    struct StubSource {
        bars: HashMap<String, usize>,
        failing: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    impl StubSource {
        fn with(mut self, ticker: &str, count: usize) -> Self {
            self.bars.insert(ticker.to_string(), count);
            self
        }

        fn failing(mut self, ticker: &str) -> Self {
            self.failing.push(ticker.to_string());
            self
        }
    }

    #[async_trait]
    impl MarketDataSource for StubSource {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn history(
            &self,
            ticker: &str,
            _lookback: Lookback,
        ) -> Result<Vec<PriceBar>, SourceError> {
            self.calls.lock().unwrap().push(ticker.to_string());
            if self.failing.iter().any(|t| t == ticker) {
                return Err(SourceError::Api("503 Service Unavailable".to_string()));
            }
            let count = self.bars.get(ticker).copied().unwrap_or(0);
            Ok((0..count)
                .map(|i| {
                    let c = 100.0 + i as f64;
                    PriceBar::new(i as i64 * 86_400_000, c, c, c, c, 1_000.0)
                })
                .collect())
        }

        async fn fundamentals(&self, _ticker: &str) -> Result<Fundamentals, SourceError> {
            Ok(Fundamentals::default())
        }
    }

    fn fetcher(source: StubSource) -> (Fetcher, Arc<StubSource>) {
        let source = Arc::new(source);
        (Fetcher::new(source.clone(), ".NS", ".BO"), source)
    }

    #[test]
    fn test_clean_symbol() {
        assert_eq!(clean_symbol(" tata power "), "TATAPOWER");
        assert_eq!(clean_symbol("infy"), "INFY");
        assert_eq!(clean_symbol("   "), "");
    }

    #[test]
    fn test_candidates() {
        let (fetcher, _) = fetcher(StubSource::default());
        assert_eq!(fetcher.candidates("TCS"), vec!["TCS.NS", "TCS.BO"]);
        assert_eq!(fetcher.candidates("TCS.BO"), vec!["TCS.BO"]);
    }

    #[tokio::test]
    async fn test_primary_suffix_wins() {
        let (fetcher, source) = fetcher(StubSource::default().with("TCS.NS", 30).with("TCS.BO", 30));
        let series = fetcher.fetch_series("tcs", Lookback::ThreeMonths, 20).await.unwrap();
        assert_eq!(series.ticker(), "TCS.NS");
        assert_eq!(series.len(), 30);
        assert_eq!(*source.calls.lock().unwrap(), vec!["TCS.NS"]);
    }

    #[tokio::test]
    async fn test_falls_back_to_secondary_exchange() {
        let (fetcher, source) = fetcher(StubSource::default().with("SMALLCO.BO", 25));
        let series = fetcher.fetch_series("SMALLCO", Lookback::ThreeMonths, 20).await.unwrap();
        assert_eq!(series.ticker(), "SMALLCO.BO");
        assert_eq!(*source.calls.lock().unwrap(), vec!["SMALLCO.NS", "SMALLCO.BO"]);
    }

    #[tokio::test]
    async fn test_primary_failure_falls_through() {
        let (fetcher, _) =
            fetcher(StubSource::default().failing("TCS.NS").with("TCS.BO", 25));
        let series = fetcher.fetch_series("TCS", Lookback::OneYear, 20).await.unwrap();
        assert_eq!(series.ticker(), "TCS.BO");
    }

    #[tokio::test]
    async fn test_both_empty_is_invalid_symbol() {
        let (fetcher, _) = fetcher(StubSource::default());
        let err = fetcher.fetch_series("NOPE", Lookback::ThreeMonths, 2).await.unwrap_err();
        assert_eq!(err, AnalysisError::InvalidSymbol("NOPE".to_string()));
    }

    #[tokio::test]
    async fn test_all_attempts_failing_is_external_service() {
        let (fetcher, _) = fetcher(StubSource::default().failing("TCS.NS").failing("TCS.BO"));
        let err = fetcher.fetch_series("TCS", Lookback::ThreeMonths, 2).await.unwrap_err();
        assert_eq!(err.kind(), "external_service");
    }

    #[tokio::test]
    async fn test_short_history_is_insufficient() {
        let (fetcher, _) = fetcher(StubSource::default().with("NEWCO.NS", 10));
        let err = fetcher.fetch_series("NEWCO", Lookback::TwoYears, 150).await.unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InsufficientHistory { required: 150, available: 10 }
        );
    }

    #[tokio::test]
    async fn test_blank_symbol_is_invalid() {
        let (fetcher, source) = fetcher(StubSource::default());
        assert!(fetcher.fetch_series("  ", Lookback::ThreeMonths, 2).await.is_err());
        assert!(source.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_short_primary_series_does_not_fall_back() {
        let (fetcher, source) =
            fetcher(StubSource::default().with("NEWCO.NS", 10).with("NEWCO.BO", 200));
        let err = fetcher.fetch_series("NEWCO", Lookback::TwoYears, 150).await.unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InsufficientHistory { required: 150, available: 10 }
        );
        assert_eq!(*source.calls.lock().unwrap(), vec!["NEWCO.NS"]);
    }
}
