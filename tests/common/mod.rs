//! Shared fixtures for integration tests: synthetic bar series and an
//! in-memory market data source.

#![allow(dead_code)]

use async_trait::async_trait;
use nexyraa::config::Config;
use nexyraa::sources::{MarketDataSource, SourceError};
use nexyraa::types::{Fundamentals, Lookback, PriceBar, PriceSeries};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

const DAY_MS: i64 = 86_400_000;
const START_MS: i64 = 1_700_000_000_000;

/// Bars from closes and volumes, one per day, high/low one rupee either side.
pub fn bars_from(closes: &[f64], volumes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&c, &v))| PriceBar::new(START_MS + i as i64 * DAY_MS, c, c + 1.0, c - 1.0, c, v))
        .collect()
}

/// Constant volume with the last bar doubled.
fn volumes_with_spike(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| if i + 1 == count { 2_000_000.0 } else { 1_000_000.0 })
        .collect()
}

/// Uptrend with pullbacks: +2 / -1.5 alternating, ending on a gain, last
/// bar on double volume.
pub fn zigzag(count: usize) -> Vec<PriceBar> {
    let mut close = 100.0;
    let closes: Vec<f64> = (0..count)
        .map(|i| {
            if i > 0 {
                close += if (count - 1 - i) % 2 == 0 { 2.0 } else { -1.5 };
            }
            close
        })
        .collect();
    bars_from(&closes, &volumes_with_spike(count))
}

/// Straight line from `from` to `to`, last bar on double volume.
pub fn linear(count: usize, from: f64, to: f64) -> Vec<PriceBar> {
    let step = (to - from) / (count - 1) as f64;
    let closes: Vec<f64> = (0..count).map(|i| from + i as f64 * step).collect();
    bars_from(&closes, &volumes_with_spike(count))
}

/// Falls one rupee per bar from `start`, flat volume.
pub fn falling(count: usize, start: f64) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count).map(|i| start - i as f64).collect();
    bars_from(&closes, &vec![1_000_000.0; count])
}

/// Open, high, low and close all equal `price` on every bar.
pub fn flat(count: usize, price: f64) -> Vec<PriceBar> {
    (0..count)
        .map(|i| PriceBar::new(START_MS + i as i64 * DAY_MS, price, price, price, price, 1_000_000.0))
        .collect()
}

pub fn series(ticker: &str, bars: Vec<PriceBar>) -> PriceSeries {
    PriceSeries::new(ticker, bars).unwrap()
}

/// In-memory source keyed by full ticker.
#[derive(Default)]
pub struct StubSource {
    bars: HashMap<String, Vec<PriceBar>>,
    fundamentals: HashMap<String, Fundamentals>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.bars.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_fundamentals(mut self, ticker: &str, fundamentals: Fundamentals) -> Self {
        self.fundamentals.insert(ticker.to_string(), fundamentals);
        self
    }

    /// Every request for `ticker` fails with an API error.
    pub fn failing(mut self, ticker: &str) -> Self {
        self.failing.insert(ticker.to_string());
        self
    }

    /// History requests for `ticker` sleep before answering.
    pub fn slow(mut self, ticker: &str, delay: Duration) -> Self {
        self.delays.insert(ticker.to_string(), delay);
        self
    }

    pub fn into_arc(self) -> Arc<dyn MarketDataSource> {
        Arc::new(self)
    }
}

#[async_trait]
impl MarketDataSource for StubSource {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn history(&self, ticker: &str, _lookback: Lookback) -> Result<Vec<PriceBar>, SourceError> {
        if let Some(delay) = self.delays.get(ticker) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(ticker) {
            return Err(SourceError::Api(format!("503 for {}", ticker)));
        }
        Ok(self.bars.get(ticker).cloned().unwrap_or_default())
    }

    async fn fundamentals(&self, ticker: &str) -> Result<Fundamentals, SourceError> {
        if self.failing.contains(ticker) {
            return Err(SourceError::Api(format!("503 for {}", ticker)));
        }
        Ok(self.fundamentals.get(ticker).copied().unwrap_or_default())
    }
}

/// Config with test credentials plus the given overrides.
pub fn config_with(overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("DHAN_API_KEY".into(), "test-client".into());
    vars.insert("DHAN_ACCESS_TOKEN".into(), "test-token".into());
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

pub fn test_config() -> Config {
    config_with(&[])
}
