//! Return volatility and recent-range helpers.

use crate::types::PriceBar;

/// Sample standard deviation of period-over-period returns.
///
/// Returns `None` with fewer than two usable returns. Periods whose previous
/// close is zero are skipped.
pub fn returns_volatility(closes: &[f64]) -> Option<f64> {
    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect();

    if returns.len() < 2 {
        return None;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

/// Highest high of the `lookback` bars before the latest one.
pub fn recent_high(bars: &[PriceBar], lookback: usize) -> Option<f64> {
    if bars.len() < 2 || lookback == 0 {
        return None;
    }

    let end = bars.len() - 1;
    let start = end.saturating_sub(lookback);
    bars[start..end]
        .iter()
        .map(|b| b.high)
        .fold(None, |acc: Option<f64>, h| Some(acc.map_or(h, |a| a.max(h))))
}
