//! Target and stop-loss levels for a signal.

use crate::error::AnalysisError;
use crate::types::SignalKind;
use tracing::warn;

/// Which family of risk policy `/analyze` uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskMode {
    Percentage,
    Atr,
}

impl RiskMode {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "percentage" | "percent" | "pct" => Some(Self::Percentage),
            "atr" => Some(Self::Atr),
            _ => None,
        }
    }
}

/// Target and stop multipliers applied to the price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Multipliers {
    pub target: f64,
    pub stop: f64,
}

impl Multipliers {
    pub const fn new(target: f64, stop: f64) -> Self {
        Self { target, stop }
    }
}

/// How target and stop-loss are derived from price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RiskPolicy {
    /// Fixed multipliers per signal.
    Percentage {
        buy: Multipliers,
        sell: Multipliers,
        hold: Multipliers,
    },
    /// Offsets of `target_mult`/`stop_mult` times ATR.
    ///
    /// With `directional == false` every signal gets target above and stop
    /// below the price, SELL included.
    Atr {
        target_mult: f64,
        stop_mult: f64,
        directional: bool,
    },
}

impl RiskPolicy {
    /// Percentage levels used by `/analyze`.
    pub fn analyze_percentage() -> Self {
        RiskPolicy::Percentage {
            buy: Multipliers::new(1.06, 0.97),
            sell: Multipliers::new(0.95, 1.03),
            hold: Multipliers::new(1.02, 0.99),
        }
    }

    /// Percentage levels used by the quick scan.
    pub fn scan_percentage() -> Self {
        RiskPolicy::Percentage {
            buy: Multipliers::new(1.05, 0.96),
            sell: Multipliers::new(0.95, 1.03),
            hold: Multipliers::new(1.02, 0.99),
        }
    }

    /// Target two ATRs away, stop one and a half.
    pub fn atr(directional: bool) -> Self {
        RiskPolicy::Atr {
            target_mult: 2.0,
            stop_mult: 1.5,
            directional,
        }
    }

    pub fn from_mode(mode: RiskMode, atr_directional: bool) -> Self {
        match mode {
            RiskMode::Percentage => Self::analyze_percentage(),
            RiskMode::Atr => Self::atr(atr_directional),
        }
    }

    pub fn needs_atr(&self) -> bool {
        matches!(self, RiskPolicy::Atr { .. })
    }

    /// Compute rounded levels for `signal` at `price`.
    ///
    /// Only a genuinely inverted bracket fails, and it is judged before
    /// rounding. A level sitting on the price (zero ATR, sub-rupee prices)
    /// is logged and returned as is.
    pub fn levels(
        &self,
        price: f64,
        signal: SignalKind,
        atr: Option<f64>,
    ) -> Result<RiskLevels, AnalysisError> {
        if !signal.is_actionable() && signal != SignalKind::Sell {
            return Err(AnalysisError::Computation(format!(
                "no risk levels for {} signal",
                signal.label()
            )));
        }
        if !price.is_finite() || price <= 0.0 {
            return Err(AnalysisError::Computation(format!(
                "no risk levels for non-positive price {}",
                price
            )));
        }

        let raw = match *self {
            RiskPolicy::Percentage { buy, sell, hold } => {
                let m = match signal {
                    SignalKind::Buy => buy,
                    SignalKind::Sell => sell,
                    _ => hold,
                };
                RiskLevels {
                    target: price * m.target,
                    stoploss: price * m.stop,
                }
            }
            RiskPolicy::Atr {
                target_mult,
                stop_mult,
                directional,
            } => {
                let atr = atr.ok_or_else(|| {
                    AnalysisError::Computation("ATR required for ATR risk levels".to_string())
                })?;
                if directional && signal == SignalKind::Sell {
                    RiskLevels {
                        target: price - atr * target_mult,
                        stoploss: price + atr * stop_mult,
                    }
                } else {
                    RiskLevels {
                        target: price + atr * target_mult,
                        stoploss: price - atr * stop_mult,
                    }
                }
            }
        };

        let levels = RiskLevels {
            target: round2(raw.target),
            stoploss: round2(raw.stoploss),
        };

        if raw.inverts(price, signal) {
            let literal_atr = matches!(self, RiskPolicy::Atr { directional: false, .. });
            if !literal_atr {
                return Err(AnalysisError::Computation(format!(
                    "{} levels inverted around price {}: target {}, stoploss {}",
                    signal.label(),
                    price,
                    levels.target,
                    levels.stoploss
                )));
            }
            warn!(
                "{} levels not bracketing price {}: target {}, stoploss {}",
                signal.label(),
                price,
                levels.target,
                levels.stoploss
            );
        } else if !levels.brackets(price, signal) {
            warn!(
                "{} levels collapse onto price {}: target {}, stoploss {}",
                signal.label(),
                price,
                levels.target,
                levels.stoploss
            );
        }

        Ok(levels)
    }
}

/// Target and stop-loss; rounded to 2 decimals once returned by `levels`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskLevels {
    pub target: f64,
    pub stoploss: f64,
}

impl RiskLevels {
    /// BUY/HOLD: stop < price < target. SELL: target < price < stop.
    pub fn brackets(&self, price: f64, signal: SignalKind) -> bool {
        match signal {
            SignalKind::Sell => self.target < price && price < self.stoploss,
            _ => self.stoploss < price && price < self.target,
        }
    }

    /// A level on the wrong side of the price. Touching the price is not
    /// an inversion.
    pub fn inverts(&self, price: f64, signal: SignalKind) -> bool {
        match signal {
            SignalKind::Sell => self.target > price || self.stoploss < price,
            _ => self.stoploss > price || self.target < price,
        }
    }
}

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(3412.3456), 3412.35);
        assert_eq!(round2(-1.234), -1.23);
    }

    #[test]
    fn test_risk_mode_from_str() {
        assert_eq!(RiskMode::from_str("ATR"), Some(RiskMode::Atr));
        assert_eq!(RiskMode::from_str("percentage"), Some(RiskMode::Percentage));
        assert_eq!(RiskMode::from_str("fib"), None);
    }

    #[test]
    fn test_analyze_percentage_levels() {
        let policy = RiskPolicy::analyze_percentage();

        let buy = policy.levels(100.0, SignalKind::Buy, None).unwrap();
        assert_eq!(buy, RiskLevels { target: 106.0, stoploss: 97.0 });

        let sell = policy.levels(100.0, SignalKind::Sell, None).unwrap();
        assert_eq!(sell, RiskLevels { target: 95.0, stoploss: 103.0 });

        let hold = policy.levels(100.0, SignalKind::Hold, None).unwrap();
        assert_eq!(hold, RiskLevels { target: 102.0, stoploss: 99.0 });
    }

    #[test]
    fn test_scan_percentage_levels() {
        let policy = RiskPolicy::scan_percentage();
        let buy = policy.levels(200.0, SignalKind::Buy, None).unwrap();
        assert_eq!(buy, RiskLevels { target: 210.0, stoploss: 192.0 });
    }

    #[test]
    fn test_levels_are_rounded() {
        let levels = RiskPolicy::analyze_percentage()
            .levels(3412.4, SignalKind::Buy, None)
            .unwrap();
        assert_eq!(levels.target, 3617.14);
        assert_eq!(levels.stoploss, 3310.03);
    }

    #[test]
    fn test_atr_directional_inverts_sell() {
        let policy = RiskPolicy::atr(true);
        let buy = policy.levels(100.0, SignalKind::Buy, Some(2.0)).unwrap();
        assert_eq!(buy, RiskLevels { target: 104.0, stoploss: 97.0 });

        let sell = policy.levels(100.0, SignalKind::Sell, Some(2.0)).unwrap();
        assert_eq!(sell, RiskLevels { target: 96.0, stoploss: 103.0 });
        assert!(sell.brackets(100.0, SignalKind::Sell));
    }

    #[test]
    fn test_atr_literal_keeps_legacy_sell_levels() {
        let sell = RiskPolicy::atr(false)
            .levels(100.0, SignalKind::Sell, Some(2.0))
            .unwrap();
        assert_eq!(sell, RiskLevels { target: 104.0, stoploss: 97.0 });
        assert!(!sell.brackets(100.0, SignalKind::Sell));
    }

    #[test]
    fn test_atr_requires_atr_value() {
        let err = RiskPolicy::atr(true)
            .levels(100.0, SignalKind::Buy, None)
            .unwrap_err();
        assert_eq!(err.kind(), "computation");
    }

    #[test]
    fn test_zero_atr_collapses_onto_price() {
        for signal in [SignalKind::Buy, SignalKind::Hold, SignalKind::Sell] {
            let levels = RiskPolicy::atr(true)
                .levels(250.0, signal, Some(0.0))
                .unwrap();
            assert_eq!(levels, RiskLevels { target: 250.0, stoploss: 250.0 });
            assert!(!levels.brackets(250.0, signal));
        }
    }

    #[test]
    fn test_sub_rupee_hold_is_not_an_error() {
        let levels = RiskPolicy::analyze_percentage()
            .levels(0.3, SignalKind::Hold, None)
            .unwrap();
        assert_eq!(levels, RiskLevels { target: 0.31, stoploss: 0.3 });
    }

    #[test]
    fn test_inversion_detection() {
        let inverted = RiskLevels { target: 99.0, stoploss: 98.0 };
        assert!(inverted.inverts(100.0, SignalKind::Buy));
        assert!(!inverted.inverts(100.0, SignalKind::Sell));

        let touching = RiskLevels { target: 100.0, stoploss: 100.0 };
        assert!(!touching.inverts(100.0, SignalKind::Hold));
        assert!(!touching.inverts(100.0, SignalKind::Sell));
    }

    #[test]
    fn test_negative_atr_inverts_directional_levels() {
        let err = RiskPolicy::atr(true)
            .levels(100.0, SignalKind::Buy, Some(-1.0))
            .unwrap_err();
        assert_eq!(err.kind(), "computation");
    }

    #[test]
    fn test_non_positive_price_is_rejected() {
        let err = RiskPolicy::analyze_percentage()
            .levels(0.0, SignalKind::Buy, None)
            .unwrap_err();
        assert_eq!(err.kind(), "computation");
    }

    #[test]
    fn test_no_levels_for_wait() {
        assert!(RiskPolicy::analyze_percentage()
            .levels(100.0, SignalKind::Wait, None)
            .is_err());
    }

    #[test]
    fn test_needs_atr() {
        assert!(RiskPolicy::atr(false).needs_atr());
        assert!(!RiskPolicy::scan_percentage().needs_atr());
        assert_eq!(
            RiskPolicy::from_mode(RiskMode::Atr, true),
            RiskPolicy::atr(true)
        );
    }
}
