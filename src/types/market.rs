use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// How far back price history is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lookback {
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
}

impl Lookback {
    /// Get the lookback from a string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "3mo" => Some(Lookback::ThreeMonths),
            "1y" => Some(Lookback::OneYear),
            "2y" => Some(Lookback::TwoYears),
            _ => None,
        }
    }

    /// Range parameter understood by chart APIs.
    pub fn range(&self) -> &'static str {
        match self {
            Lookback::ThreeMonths => "3mo",
            Lookback::OneYear => "1y",
            Lookback::TwoYears => "2y",
        }
    }

    /// Calendar days covered.
    pub fn days(&self) -> i64 {
        match self {
            Lookback::ThreeMonths => 90,
            Lookback::OneYear => 365,
            Lookback::TwoYears => 730,
        }
    }
}

/// One OHLCV bar (open, high, low, close, volume).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Bar open time, milliseconds since epoch.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Ordered price bars for one resolved ticker.
///
/// Timestamps are strictly increasing; construction rejects anything else.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, validating bar ordering.
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, AnalysisError> {
        let ticker = ticker.into();

        if let Some(pos) = bars.windows(2).position(|w| w[1].time <= w[0].time) {
            return Err(AnalysisError::ExternalService(format!(
                "bars for {} out of order at index {}",
                ticker,
                pos + 1
            )));
        }

        Ok(Self { ticker, bars })
    }

    /// Ticker including the exchange suffix it was resolved with.
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent bar.
    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Fail with `InsufficientHistory` unless at least `min_bars` are present.
    pub fn require(&self, min_bars: usize) -> Result<(), AnalysisError> {
        if self.bars.len() < min_bars {
            return Err(AnalysisError::InsufficientHistory {
                required: min_bars,
                available: self.bars.len(),
            });
        }
        Ok(())
    }
}

/// Fundamental ratios as reported by the provider (fractions, not percentages).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fundamentals {
    pub return_on_equity: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub revenue_growth: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(time: i64, close: f64) -> PriceBar {
        PriceBar::new(time, close, close + 1.0, close - 1.0, close, 1000.0)
    }

    #[test]
    fn test_series_accepts_increasing_timestamps() {
        let series = PriceSeries::new("TCS.NS", vec![bar(1, 10.0), bar(2, 11.0), bar(5, 12.0)])
            .unwrap();
        assert_eq!(series.ticker(), "TCS.NS");
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![10.0, 11.0, 12.0]);
        assert_eq!(series.last().unwrap().close, 12.0);
    }

    #[test]
    fn test_series_rejects_duplicates_and_reordering() {
        let err = PriceSeries::new("TCS.NS", vec![bar(1, 10.0), bar(1, 11.0)]).unwrap_err();
        assert_eq!(err.kind(), "external_service");

        let err = PriceSeries::new("TCS.NS", vec![bar(1, 10.0), bar(3, 11.0), bar(2, 12.0)])
            .unwrap_err();
        assert!(err.to_string().contains("index 2"));
    }

    #[test]
    fn test_series_require_min_bars() {
        let series = PriceSeries::new("TCS.NS", vec![bar(1, 10.0), bar(2, 11.0)]).unwrap();
        assert!(series.require(2).is_ok());
        assert_eq!(
            series.require(14),
            Err(AnalysisError::InsufficientHistory { required: 14, available: 2 })
        );
    }

    #[test]
    fn test_empty_series() {
        let series = PriceSeries::new("X.NS", Vec::new()).unwrap();
        assert!(series.is_empty());
        assert!(series.last().is_none());
    }

    #[test]
    fn test_lookback_ranges() {
        assert_eq!(Lookback::ThreeMonths.range(), "3mo");
        assert_eq!(Lookback::OneYear.range(), "1y");
        assert_eq!(Lookback::TwoYears.range(), "2y");
        assert_eq!(Lookback::TwoYears.days(), 730);
        assert_eq!(Lookback::from_str("1y"), Some(Lookback::OneYear));
        assert_eq!(Lookback::from_str("5y"), None);
    }
}
