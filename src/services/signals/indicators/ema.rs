//! Exponential Moving Average (EMA) indicator.

use super::Indicator;
use crate::types::PriceBar;

/// EMA (Exponential Moving Average) of closing prices.
///
/// Smoothing factor is `2 / (period + 1)`. The recursion is seeded with the
/// first close (`ema[0] = close[0]`), so a value exists at every position,
/// but entries before index `period - 1` are reported as not ready because
/// they still lean on the seed.
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Calculate the EMA column for an arbitrary value series.
    pub fn calculate_ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
        let period = period.max(1);
        let multiplier = 2.0 / (period as f64 + 1.0);

        let mut out = Vec::with_capacity(values.len());
        let mut ema: Option<f64> = None;

        for (i, &value) in values.iter().enumerate() {
            let next = match ema {
                None => value,
                Some(prev) => multiplier * value + (1.0 - multiplier) * prev,
            };
            ema = Some(next);
            out.push(if i + 1 >= period { Some(next) } else { None });
        }

        out
    }
}

impl Indicator for Ema {
    fn id(&self) -> String {
        format!("ema{}", self.period)
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        Self::calculate_ema(&closes, self.period)
    }
}
