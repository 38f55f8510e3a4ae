//! Relative Strength Index (RSI) indicator.

use super::Indicator;
use crate::types::PriceBar;

/// RSI (Relative Strength Index) indicator.
///
/// Measures momentum by comparing the magnitude of recent gains to recent losses.
/// Values range from 0-100:
/// - Below 30: Oversold
/// - Above 70: Overbought
///
/// Gains and losses are averaged with a simple rolling mean over `period`
/// changes, so the first value appears at index `period`.
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    /// RSI from averaged gains and losses.
    ///
    /// A window without losses reads 100, a window without any movement
    /// reads 50.
    pub fn from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            return if avg_gain == 0.0 { 50.0 } else { 100.0 };
        }

        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }

    /// Calculate the RSI column from closing prices.
    pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
        let period = period.max(1);
        let mut out = vec![None; closes.len()];
        if closes.len() <= period {
            return out;
        }

        let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

        // changes[j] is the move into bar j + 1
        for end in period..=changes.len() {
            let window = &changes[end - period..end];
            let gains: f64 = window.iter().map(|c| c.max(0.0)).sum();
            let losses: f64 = window.iter().map(|c| (-c).max(0.0)).sum();
            out[end] = Some(Self::from_averages(
                gains / period as f64,
                losses / period as f64,
            ));
        }

        out
    }
}

impl Indicator for Rsi {
    fn id(&self) -> String {
        format!("rsi{}", self.period)
    }

    fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        Self::calculate_rsi(&closes, self.period)
    }
}
