//! Average True Range (ATR) indicator.

use super::Indicator;
use crate::types::PriceBar;

/// ATR (Average True Range) indicator.
///
/// Measures market volatility by averaging true ranges:
/// TR = max(High-Low, |High-PrevClose|, |Low-PrevClose|)
///
/// The first bar has no previous close and therefore no true range, so the
/// simple rolling mean over `period` ranges is ready from index `period`.
pub struct Atr {
    period: usize,
}

impl Default for Atr {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Atr {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    /// Calculate True Range.
    pub fn true_range(current: &PriceBar, previous: &PriceBar) -> f64 {
        let hl = current.high - current.low;
        let hc = (current.high - previous.close).abs();
        let lc = (current.low - previous.close).abs();
        hl.max(hc).max(lc)
    }

    /// Calculate the ATR column.
    pub fn calculate_atr(bars: &[PriceBar], period: usize) -> Vec<Option<f64>> {
        let period = period.max(1);
        let mut out = vec![None; bars.len()];
        if bars.len() <= period {
            return out;
        }

        let true_ranges: Vec<f64> = bars
            .windows(2)
            .map(|w| Self::true_range(&w[1], &w[0]))
            .collect();

        // true_ranges[j] belongs to bar j + 1
        for end in period..=true_ranges.len() {
            let sum: f64 = true_ranges[end - period..end].iter().sum();
            out[end] = Some(sum / period as f64);
        }

        out
    }
}

impl Indicator for Atr {
    fn id(&self) -> String {
        format!("atr{}", self.period)
    }

    fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        Self::calculate_atr(bars, self.period)
    }
}
