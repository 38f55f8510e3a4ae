//! Simple Moving Average (SMA) indicator.

use super::Indicator;
use crate::types::PriceBar;

/// SMA (Simple Moving Average) of traded volume.
///
/// Plain rolling mean over `period` bars, ready from index `period - 1`.
/// It is the average volume that breakouts are judged against.
pub struct Sma {
    period: usize,
}

impl Sma {
    /// Rolling mean of traded volume.
    pub fn volume(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    /// Rolling mean of an arbitrary value series.
    pub fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
        let period = period.max(1);
        let mut out = vec![None; values.len()];

        for end in period..=values.len() {
            let sum: f64 = values[end - period..end].iter().sum();
            out[end - 1] = Some(sum / period as f64);
        }

        out
    }
}

impl Indicator for Sma {
    fn id(&self) -> String {
        format!("volume_sma{}", self.period)
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        let values: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        Self::rolling_mean(&values, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_ids() {
        assert_eq!(Sma::volume(20).id(), "volume_sma20");
        assert_eq!(Sma::volume(20).min_periods(), 20);
    }

    #[test]
    fn test_rolling_mean() {
        let mean = Sma::rolling_mean(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(mean, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_rolling_mean_short_input() {
        assert_eq!(Sma::rolling_mean(&[1.0, 2.0], 3), vec![None, None]);
    }

    #[test]
    fn test_volume_average_picks_up_spike() {
        let bars: Vec<PriceBar> = (0..20)
            .map(|i| {
                let volume = if i == 19 { 2_000_000.0 } else { 1_000_000.0 };
                PriceBar::new(i, 10.0, 10.0, 10.0, 10.0, volume)
            })
            .collect();
        let avg = Sma::volume(20).compute(&bars);
        assert_eq!(avg[19], Some(1_050_000.0));
    }
}
