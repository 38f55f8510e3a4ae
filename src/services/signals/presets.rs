//! Built-in rule sets.

use super::indicators::IndicatorSpec;
use super::rules::{Condition, Decision, EmaLine, Note, Rule, RuleSet};

/// Named scoring presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Confidence accumulated from trend, momentum and volume, with traps
    /// vetoing a BUY. Used by `/analyze` and the quick scan.
    ConfidenceAccumulation,
    /// Trend score on EMA 20/50/200 and RSI. Used by the top scan and the
    /// advanced analysis.
    TrendScore,
    /// Zero-based health score on trend, volume and volatility.
    HealthScore,
}

impl Preset {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "confidence_accumulation" | "confidence" => Some(Self::ConfidenceAccumulation),
            "trend_score" | "trend" => Some(Self::TrendScore),
            "health_score" | "health" => Some(Self::HealthScore),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Preset::ConfidenceAccumulation => "confidence_accumulation",
            Preset::TrendScore => "trend_score",
            Preset::HealthScore => "health_score",
        }
    }

    pub fn rules(&self) -> RuleSet {
        match self {
            Preset::ConfidenceAccumulation => confidence_accumulation(),
            Preset::TrendScore => trend_score(),
            Preset::HealthScore => health_score(),
        }
    }
}

pub fn confidence_accumulation() -> RuleSet {
    RuleSet {
        name: Preset::ConfidenceAccumulation.name(),
        indicators: IndicatorSpec::default(),
        base: 50,
        cap: 95,
        rules: vec![
            Rule::new(
                Condition::EmaAbove {
                    upper: EmaLine::Fast,
                    lower: EmaLine::Slow,
                },
                15,
            )
            .on_pass(Note::reason(
                "EMA{fast_span} ({fast}) above EMA{slow_span} ({slow}) → bullish trend",
            ))
            .on_fail(Note::reason(
                "EMA{fast_span} ({fast}) below EMA{slow_span} ({slow}) → weak trend",
            )),
            Rule::new(Condition::RsiBetween { low: 40.0, high: 65.0 }, 15)
                .on_pass(Note::reason("RSI {rsi} → healthy momentum")),
            Rule::new(Condition::RsiAbove(70.0), 0)
                .on_pass(Note::trap("RSI {rsi} → overbought (bull trap risk)")),
            Rule::new(Condition::RsiBelow(30.0), 0)
                .on_pass(Note::reason("RSI {rsi} → oversold bounce possible")),
            Rule::new(Condition::VolumeAboveAverage, 20)
                .on_pass(Note::reason("Volume higher than average → breakout confirmation"))
                .on_fail(Note::trap("Low volume → breakout may fail")),
            Rule::new(Condition::CloseAbovePrevious, 10),
        ],
        decision: Decision::ConfidenceAndTraps {
            buy_at: 75,
            sell_below: 55,
            max_traps: 2,
        },
    }
}

pub fn trend_score() -> RuleSet {
    RuleSet {
        name: Preset::TrendScore.name(),
        indicators: IndicatorSpec {
            ema_fast: 20,
            ema_slow: 50,
            ema_trend: Some(200),
            atr_period: Some(14),
            ..IndicatorSpec::default()
        },
        base: 50,
        cap: 100,
        rules: vec![
            Rule::new(Condition::PriceAbove(EmaLine::Trend), 10)
                .on_pass(Note::reason("Above EMA{trend_span}")),
            Rule::new(
                Condition::EmaAbove {
                    upper: EmaLine::Fast,
                    lower: EmaLine::Slow,
                },
                10,
            )
            .on_pass(Note::reason("EMA{fast_span} > EMA{slow_span}")),
            Rule::new(Condition::RsiBetween { low: 35.0, high: 55.0 }, 10)
                .on_pass(Note::reason("Healthy RSI")),
            Rule::new(Condition::RsiBelow(35.0), 5).on_pass(Note::reason("Oversold bounce zone")),
        ],
        decision: Decision::Score {
            buy_at: 70,
            sell_at: 40,
        },
    }
}

pub fn health_score() -> RuleSet {
    RuleSet {
        name: Preset::HealthScore.name(),
        indicators: IndicatorSpec {
            ema_fast: 20,
            ema_slow: 50,
            ..IndicatorSpec::default()
        },
        base: 0,
        cap: 100,
        rules: vec![
            Rule::new(
                Condition::EmaAbove {
                    upper: EmaLine::Fast,
                    lower: EmaLine::Slow,
                },
                30,
            ),
            Rule::new(Condition::PriceAbove(EmaLine::Fast), 25),
            Rule::new(Condition::VolumeAboveAverage, 20),
            Rule::new(Condition::VolatilityBelow(0.02), 25),
        ],
        decision: Decision::Score {
            buy_at: 70,
            sell_at: 40,
        },
    }
}
