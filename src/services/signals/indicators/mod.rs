//! Technical indicator implementations and the per-series indicator frame.

pub mod atr;
pub mod ema;
pub mod rsi;
pub mod sma;
pub mod volatility;

pub use atr::Atr;
pub use ema::Ema;
pub use rsi::Rsi;
pub use sma::Sma;
pub use volatility::{recent_high, returns_volatility};

use crate::error::AnalysisError;
use crate::types::{PriceBar, PriceSeries};
use tracing::debug;

/// Trait for implementing technical indicators.
pub trait Indicator: Send + Sync {
    /// Column name, e.g. `ema21`; used in not-ready errors.
    fn id(&self) -> String;

    /// Minimum number of bars before the indicator produces a value.
    fn min_periods(&self) -> usize;

    /// Derived column, same length as `bars`; `None` where not ready.
    fn compute(&self, bars: &[PriceBar]) -> Vec<Option<f64>>;
}

/// Which indicators to compute, and with which spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSpec {
    pub ema_fast: usize,
    pub ema_slow: usize,
    /// Long-term trend EMA (e.g. 200), if any rule needs it.
    pub ema_trend: Option<usize>,
    pub rsi_period: usize,
    pub atr_period: Option<usize>,
    pub volume_window: usize,
    /// Bars before the latest one scanned for the recent high. The default
    /// of 9 makes a ten-bar window that ends on the latest bar.
    pub high_lookback: usize,
}

impl Default for IndicatorSpec {
    fn default() -> Self {
        Self {
            ema_fast: 9,
            ema_slow: 21,
            ema_trend: None,
            rsi_period: 14,
            atr_period: None,
            volume_window: 20,
            high_lookback: 9,
        }
    }
}

impl IndicatorSpec {
    /// Same indicator set with an ATR column added (no-op if one is already requested).
    pub fn with_atr(mut self, period: usize) -> Self {
        if self.atr_period.is_none() {
            self.atr_period = Some(period);
        }
        self
    }

    /// All requested indicators.
    pub fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        let mut list: Vec<Box<dyn Indicator>> = vec![
            Box::new(Ema::new(self.ema_fast)),
            Box::new(Ema::new(self.ema_slow)),
            Box::new(Rsi::new(self.rsi_period)),
            Box::new(Sma::volume(self.volume_window)),
        ];
        if let Some(span) = self.ema_trend {
            list.push(Box::new(Ema::new(span)));
        }
        if let Some(period) = self.atr_period {
            list.push(Box::new(Atr::new(period)));
        }
        list
    }

    /// Longest warm-up of any requested indicator.
    pub fn required_bars(&self) -> usize {
        self.indicators()
            .iter()
            .map(|i| i.min_periods())
            .max()
            .unwrap_or(1)
    }
}

/// A price series augmented with derived indicator columns.
///
/// Every column has the same length and ordering as the bars; leading
/// entries are `None` until the indicator has warmed up.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    spec: IndicatorSpec,
    bars: Vec<PriceBar>,
    ema_fast: Vec<Option<f64>>,
    ema_slow: Vec<Option<f64>>,
    ema_trend: Option<Vec<Option<f64>>>,
    rsi: Vec<Option<f64>>,
    atr: Option<Vec<Option<f64>>>,
    avg_volume: Vec<Option<f64>>,
    volatility: Option<f64>,
}

impl IndicatorFrame {
    /// Compute every requested column.
    pub fn compute(series: &PriceSeries, spec: &IndicatorSpec) -> Result<Self, AnalysisError> {
        series.require(spec.required_bars())?;

        let bars = series.bars().to_vec();
        let closes = series.closes();

        debug!(
            "Computing indicators for {} over {} bars",
            series.ticker(),
            bars.len()
        );

        Ok(Self {
            spec: *spec,
            ema_fast: Ema::calculate_ema(&closes, spec.ema_fast),
            ema_slow: Ema::calculate_ema(&closes, spec.ema_slow),
            ema_trend: spec.ema_trend.map(|span| Ema::calculate_ema(&closes, span)),
            rsi: Rsi::calculate_rsi(&closes, spec.rsi_period),
            atr: spec.atr_period.map(|period| Atr::calculate_atr(&bars, period)),
            avg_volume: Sma::volume(spec.volume_window).compute(&bars),
            volatility: returns_volatility(&closes),
            bars,
        })
    }

    pub fn spec(&self) -> &IndicatorSpec {
        &self.spec
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn ema_fast(&self) -> &[Option<f64>] {
        &self.ema_fast
    }

    pub fn ema_slow(&self) -> &[Option<f64>] {
        &self.ema_slow
    }

    pub fn ema_trend(&self) -> Option<&[Option<f64>]> {
        self.ema_trend.as_deref()
    }

    pub fn rsi(&self) -> &[Option<f64>] {
        &self.rsi
    }

    pub fn atr(&self) -> Option<&[Option<f64>]> {
        self.atr.as_deref()
    }

    pub fn avg_volume(&self) -> &[Option<f64>] {
        &self.avg_volume
    }

    /// Snapshot of the latest bar.
    pub fn latest(&self) -> Result<IndicatorSnapshot, AnalysisError> {
        let last = self.bars.len().checked_sub(1).ok_or_else(|| {
            AnalysisError::Computation("no bars to take a snapshot of".to_string())
        })?;
        let bar = self.bars[last];

        let ready = |column: &[Option<f64>], indicator: &dyn Indicator| {
            column
                .get(last)
                .copied()
                .flatten()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    AnalysisError::Computation(format!("{} not ready", indicator.id()))
                })
        };

        let spec = &self.spec;
        let ema_trend = match (&self.ema_trend, spec.ema_trend) {
            (Some(column), Some(span)) => Some(ready(column, &Ema::new(span))?),
            _ => None,
        };
        let atr = match (&self.atr, spec.atr_period) {
            (Some(column), Some(period)) => Some(ready(column, &Atr::new(period))?),
            _ => None,
        };

        Ok(IndicatorSnapshot {
            spec: self.spec,
            close: bar.close,
            prev_close: last.checked_sub(1).map(|i| self.bars[i].close),
            ema_fast: ready(&self.ema_fast, &Ema::new(spec.ema_fast))?,
            ema_slow: ready(&self.ema_slow, &Ema::new(spec.ema_slow))?,
            ema_trend,
            rsi: ready(&self.rsi, &Rsi::new(spec.rsi_period))?,
            atr,
            volume: bar.volume,
            avg_volume: ready(&self.avg_volume, &Sma::volume(spec.volume_window))?,
            volatility: self.volatility,
            recent_high: recent_high(&self.bars, self.spec.high_lookback),
        })
    }
}

/// Indicator values at the latest bar; the only thing the scorer sees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub spec: IndicatorSpec,
    pub close: f64,
    pub prev_close: Option<f64>,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub ema_trend: Option<f64>,
    pub rsi: f64,
    pub atr: Option<f64>,
    pub volume: f64,
    pub avg_volume: f64,
    pub volatility: Option<f64>,
    pub recent_high: Option<f64>,
}
