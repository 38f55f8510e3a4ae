//! Data-driven scoring rules.
//!
//! A [`RuleSet`] is a base score, a list of weighted conditions and a
//! decision policy. Every passing rule adds its weight; reasons and traps
//! are collected in rule order from the notes attached to each rule.

use super::indicators::{IndicatorSnapshot, IndicatorSpec};
use crate::error::AnalysisError;
use crate::types::SignalKind;

/// One of the EMA lines carried by a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmaLine {
    Fast,
    Slow,
    /// Long-term trend line; only present when requested.
    Trend,
}

impl EmaLine {
    fn value(&self, snap: &IndicatorSnapshot) -> Result<f64, AnalysisError> {
        match self {
            EmaLine::Fast => Ok(snap.ema_fast),
            EmaLine::Slow => Ok(snap.ema_slow),
            EmaLine::Trend => snap
                .ema_trend
                .ok_or_else(|| AnalysisError::Computation("trend EMA not computed".to_string())),
        }
    }
}

/// Predicate over an indicator snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Condition {
    EmaAbove { upper: EmaLine, lower: EmaLine },
    PriceAbove(EmaLine),
    /// Exclusive on both ends.
    RsiBetween { low: f64, high: f64 },
    RsiAbove(f64),
    RsiBelow(f64),
    VolumeAboveAverage,
    /// False when there is no previous bar.
    CloseAbovePrevious,
    /// False when volatility could not be computed.
    VolatilityBelow(f64),
}

impl Condition {
    pub fn holds(&self, snap: &IndicatorSnapshot) -> Result<bool, AnalysisError> {
        Ok(match *self {
            Condition::EmaAbove { upper, lower } => upper.value(snap)? > lower.value(snap)?,
            Condition::PriceAbove(line) => snap.close > line.value(snap)?,
            Condition::RsiBetween { low, high } => snap.rsi > low && snap.rsi < high,
            Condition::RsiAbove(level) => snap.rsi > level,
            Condition::RsiBelow(level) => snap.rsi < level,
            Condition::VolumeAboveAverage => snap.volume > snap.avg_volume,
            Condition::CloseAbovePrevious => snap.prev_close.is_some_and(|prev| snap.close > prev),
            Condition::VolatilityBelow(level) => snap.volatility.is_some_and(|v| v < level),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    Reason,
    Trap,
}

/// Reason or trap text attached to a rule outcome.
///
/// Templates may reference `{fast}`, `{slow}`, `{trend}`, `{rsi}`, `{price}`
/// (rendered with two decimals) and `{fast_span}`, `{slow_span}`,
/// `{trend_span}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub kind: NoteKind,
    pub template: &'static str,
}

impl Note {
    pub const fn reason(template: &'static str) -> Self {
        Self {
            kind: NoteKind::Reason,
            template,
        }
    }

    pub const fn trap(template: &'static str) -> Self {
        Self {
            kind: NoteKind::Trap,
            template,
        }
    }

    pub fn render(&self, snap: &IndicatorSnapshot) -> String {
        let mut text = self.template.to_string();
        if !text.contains('{') {
            return text;
        }

        let spans = [
            ("{fast_span}", Some(snap.spec.ema_fast)),
            ("{slow_span}", Some(snap.spec.ema_slow)),
            ("{trend_span}", snap.spec.ema_trend),
        ];
        for (key, span) in spans {
            if let Some(span) = span {
                text = text.replace(key, &span.to_string());
            }
        }

        let values = [
            ("{fast}", Some(snap.ema_fast)),
            ("{slow}", Some(snap.ema_slow)),
            ("{trend}", snap.ema_trend),
            ("{rsi}", Some(snap.rsi)),
            ("{price}", Some(snap.close)),
        ];
        for (key, value) in values {
            if let Some(value) = value {
                text = text.replace(key, &format!("{:.2}", value));
            }
        }

        text
    }
}

/// A weighted condition with optional notes for either outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub condition: Condition,
    pub weight: i32,
    pub on_pass: Option<Note>,
    pub on_fail: Option<Note>,
}

impl Rule {
    pub const fn new(condition: Condition, weight: i32) -> Self {
        Self {
            condition,
            weight,
            on_pass: None,
            on_fail: None,
        }
    }

    pub fn on_pass(mut self, note: Note) -> Self {
        self.on_pass = Some(note);
        self
    }

    pub fn on_fail(mut self, note: Note) -> Self {
        self.on_fail = Some(note);
        self
    }
}

/// How the final score maps to a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// BUY when confident with no traps; SELL when weak or trap-laden.
    ConfidenceAndTraps {
        buy_at: i32,
        sell_below: i32,
        max_traps: usize,
    },
    /// Plain thresholds on the score.
    Score { buy_at: i32, sell_at: i32 },
}

impl Decision {
    /// Decide on the uncapped score.
    pub fn decide(&self, score: i32, traps: usize) -> SignalKind {
        match *self {
            Decision::ConfidenceAndTraps {
                buy_at,
                sell_below,
                max_traps,
            } => {
                if score >= buy_at && traps == 0 {
                    SignalKind::Buy
                } else if score < sell_below || traps >= max_traps {
                    SignalKind::Sell
                } else {
                    SignalKind::Hold
                }
            }
            Decision::Score { buy_at, sell_at } => {
                if score >= buy_at {
                    SignalKind::Buy
                } else if score <= sell_at {
                    SignalKind::Sell
                } else {
                    SignalKind::Hold
                }
            }
        }
    }
}

/// Outcome of applying a rule set to a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Scorecard {
    pub signal: SignalKind,
    /// Clamped to `[0, cap]`.
    pub confidence: u8,
    /// Score before clamping.
    pub raw_score: i32,
    pub reasons: Vec<String>,
    pub traps: Vec<String>,
}

/// Named scoring preset.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub name: &'static str,
    /// Indicators the rules read.
    pub indicators: IndicatorSpec,
    pub base: i32,
    pub cap: u8,
    pub rules: Vec<Rule>,
    pub decision: Decision,
}

impl RuleSet {
    pub fn evaluate(&self, snap: &IndicatorSnapshot) -> Result<Scorecard, AnalysisError> {
        let mut score = self.base;
        let mut reasons = Vec::new();
        let mut traps = Vec::new();

        for rule in &self.rules {
            let passed = rule.condition.holds(snap)?;
            if passed {
                score += rule.weight;
            }

            let note = if passed { rule.on_pass } else { rule.on_fail };
            if let Some(note) = note {
                let text = note.render(snap);
                match note.kind {
                    NoteKind::Reason => reasons.push(text),
                    NoteKind::Trap => traps.push(text),
                }
            }
        }

        let signal = self.decision.decide(score, traps.len());
        let confidence = score.clamp(0, self.cap.min(100) as i32) as u8;

        Ok(Scorecard {
            signal,
            confidence,
            raw_score: score,
            reasons,
            traps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            spec: IndicatorSpec::default(),
            close: 105.0,
            prev_close: Some(104.0),
            ema_fast: 103.456,
            ema_slow: 101.0,
            ema_trend: None,
            rsi: 55.0,
            atr: None,
            volume: 2_000.0,
            avg_volume: 1_500.0,
            volatility: Some(0.015),
            recent_high: Some(106.0),
        }
    }

    #[test]
    fn test_conditions() {
        let snap = snapshot();
        let holds = |c: Condition| c.holds(&snap).unwrap();

        assert!(holds(Condition::EmaAbove { upper: EmaLine::Fast, lower: EmaLine::Slow }));
        assert!(!holds(Condition::EmaAbove { upper: EmaLine::Slow, lower: EmaLine::Fast }));
        assert!(holds(Condition::PriceAbove(EmaLine::Fast)));
        assert!(holds(Condition::RsiBetween { low: 40.0, high: 65.0 }));
        assert!(!holds(Condition::RsiBetween { low: 55.0, high: 65.0 }));
        assert!(!holds(Condition::RsiAbove(70.0)));
        assert!(holds(Condition::RsiBelow(60.0)));
        assert!(holds(Condition::VolumeAboveAverage));
        assert!(holds(Condition::CloseAbovePrevious));
        assert!(holds(Condition::VolatilityBelow(0.02)));
    }

    #[test]
    fn test_missing_inputs() {
        let mut snap = snapshot();
        snap.prev_close = None;
        snap.volatility = None;
        assert!(!Condition::CloseAbovePrevious.holds(&snap).unwrap());
        assert!(!Condition::VolatilityBelow(0.02).holds(&snap).unwrap());

        let err = Condition::PriceAbove(EmaLine::Trend).holds(&snap).unwrap_err();
        assert_eq!(err.kind(), "computation");
    }

    #[test]
    fn test_note_rendering() {
        let snap = snapshot();
        let note = Note::reason("EMA{fast_span} ({fast}) above EMA{slow_span} ({slow})");
        assert_eq!(note.render(&snap), "EMA9 (103.46) above EMA21 (101.00)");
        assert_eq!(Note::trap("RSI {rsi}").render(&snap), "RSI 55.00");
        assert_eq!(Note::reason("plain").render(&snap), "plain");
    }

    #[test]
    fn test_confidence_and_traps_decision() {
        let decision = Decision::ConfidenceAndTraps {
            buy_at: 75,
            sell_below: 55,
            max_traps: 2,
        };
        assert_eq!(decision.decide(75, 0), SignalKind::Buy);
        assert_eq!(decision.decide(110, 1), SignalKind::Hold);
        assert_eq!(decision.decide(90, 2), SignalKind::Sell);
        assert_eq!(decision.decide(54, 0), SignalKind::Sell);
        assert_eq!(decision.decide(55, 0), SignalKind::Hold);
    }

    #[test]
    fn test_score_decision() {
        let decision = Decision::Score { buy_at: 70, sell_at: 40 };
        assert_eq!(decision.decide(70, 0), SignalKind::Buy);
        assert_eq!(decision.decide(69, 3), SignalKind::Hold);
        assert_eq!(decision.decide(40, 0), SignalKind::Sell);
    }

    #[test]
    fn test_rule_set_collects_notes_in_order_and_caps() {
        let rules = RuleSet {
            name: "test",
            indicators: IndicatorSpec::default(),
            base: 50,
            cap: 60,
            rules: vec![
                Rule::new(Condition::VolumeAboveAverage, 20).on_pass(Note::reason("volume")),
                Rule::new(Condition::RsiAbove(70.0), 0).on_pass(Note::trap("overbought")),
                Rule::new(Condition::RsiBelow(30.0), 0)
                    .on_pass(Note::reason("oversold"))
                    .on_fail(Note::reason("not oversold")),
                Rule::new(Condition::CloseAbovePrevious, 10),
            ],
            decision: Decision::Score { buy_at: 70, sell_at: 40 },
        };

        let card = rules.evaluate(&snapshot()).unwrap();
        assert_eq!(card.raw_score, 80);
        assert_eq!(card.confidence, 60);
        assert_eq!(card.signal, SignalKind::Buy);
        assert_eq!(card.reasons, vec!["volume", "not oversold"]);
        assert!(card.traps.is_empty());
    }

    #[test]
    fn test_negative_score_clamps_to_zero() {
        let rules = RuleSet {
            name: "negative",
            indicators: IndicatorSpec::default(),
            base: 0,
            cap: 100,
            rules: vec![Rule::new(Condition::VolumeAboveAverage, -30)],
            decision: Decision::Score { buy_at: 70, sell_at: 40 },
        };
        let card = rules.evaluate(&snapshot()).unwrap();
        assert_eq!(card.raw_score, -30);
        assert_eq!(card.confidence, 0);
        assert_eq!(card.signal, SignalKind::Sell);
    }
}
