//! Single-symbol analysis pipeline: fetch, indicators, scoring, risk levels.

use super::fetcher::{clean_symbol, Fetcher};
use super::risk::{round2, RiskPolicy};
use super::signals::{
    detect_trap, entry_timing, presets, IndicatorFrame, IndicatorSnapshot, IndicatorSpec, Preset,
    RuleSet,
};
use crate::config::Config;
use crate::error::AnalysisError;
use crate::types::{
    AdvancedOutcome, AdvancedReport, IndicatorReadout, Lookback, PendingResult, PriceSeries,
    SignalKind, SignalResult,
};
use tracing::{debug, warn};

/// ATR period used when a risk policy needs ATR but the rules don't.
const RISK_ATR_PERIOD: usize = 14;

/// Everything needed to turn a symbol into a signal.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPlan {
    pub rules: RuleSet,
    pub risk: RiskPolicy,
    pub lookback: Lookback,
    /// Callers' own floor; the indicators may require more.
    pub min_bars: usize,
}

impl AnalysisPlan {
    /// Plan behind `/analyze`.
    pub fn analyze(config: &Config) -> Self {
        let preset = config.analyze_preset;
        Self {
            rules: preset.rules(),
            risk: RiskPolicy::from_mode(config.analyze_risk, config.atr_directional),
            lookback: match preset {
                Preset::ConfidenceAccumulation => Lookback::ThreeMonths,
                Preset::HealthScore => Lookback::OneYear,
                Preset::TrendScore => Lookback::TwoYears,
            },
            min_bars: 2,
        }
    }

    /// Trend-score plan behind `/analyze/advanced` and the top scan.
    pub fn trend(config: &Config) -> Self {
        Self {
            rules: presets::trend_score(),
            risk: RiskPolicy::atr(config.atr_directional),
            lookback: Lookback::TwoYears,
            min_bars: 150,
        }
    }

    /// Indicators to compute, including ATR when the risk policy needs it.
    pub fn indicator_spec(&self) -> IndicatorSpec {
        if self.risk.needs_atr() {
            self.rules.indicators.with_atr(RISK_ATR_PERIOD)
        } else {
            self.rules.indicators
        }
    }

    pub fn required_bars(&self) -> usize {
        self.min_bars.max(self.indicator_spec().required_bars())
    }
}

/// Result of a successful analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub result: SignalResult,
    pub snapshot: IndicatorSnapshot,
}

impl Evaluation {
    /// Indicator values echoed back to clients.
    pub fn readout(&self) -> IndicatorReadout {
        let snap = &self.snapshot;
        IndicatorReadout {
            fast_span: snap.spec.ema_fast,
            slow_span: snap.spec.ema_slow,
            ema_fast: round2(snap.ema_fast),
            ema_slow: round2(snap.ema_slow),
            rsi: round2(snap.rsi),
            volume: snap.volume.max(0.0) as u64,
            avg_volume: snap.avg_volume.max(0.0) as u64,
        }
    }
}

/// Score an already fetched series. Pure.
pub fn evaluate(series: &PriceSeries, plan: &AnalysisPlan) -> Result<Evaluation, AnalysisError> {
    series.require(plan.required_bars())?;

    let snapshot = IndicatorFrame::compute(series, &plan.indicator_spec())?.latest()?;
    let card = plan.rules.evaluate(&snapshot)?;

    let price = round2(snapshot.close);
    let levels = plan.risk.levels(price, card.signal, snapshot.atr)?;

    debug!(
        "{} {}: {} at {} (score {})",
        plan.rules.name,
        series.ticker(),
        card.signal.label(),
        price,
        card.raw_score
    );

    Ok(Evaluation {
        result: SignalResult {
            symbol: series.ticker().to_string(),
            price,
            signal: card.signal,
            confidence: card.confidence,
            target: levels.target,
            stoploss: levels.stoploss,
            reasons: card.reasons,
            traps: card.traps,
        },
        snapshot,
    })
}

/// Trend result plus trap, entry and health advisories. Pure.
pub fn evaluate_advanced(
    series: &PriceSeries,
    plan: &AnalysisPlan,
    health: &RuleSet,
) -> Result<AdvancedReport, AnalysisError> {
    let evaluation = evaluate(series, plan)?;

    let snapshot = IndicatorFrame::compute(series, &health.indicators)?.latest()?;
    let health_card = health.evaluate(&snapshot)?;

    Ok(AdvancedReport {
        result: evaluation.result,
        trap: detect_trap(&snapshot),
        entry: entry_timing(&snapshot),
        health_score: health_card.confidence,
    })
}

/// Placeholder for a symbol that could not be analyzed.
///
/// Unknown or too-short symbols become WAIT, anything else ERROR.
pub fn pending(symbol: &str, error: &AnalysisError) -> PendingResult {
    PendingResult {
        symbol: symbol.to_string(),
        signal: if error.is_not_ready() {
            SignalKind::Wait
        } else {
            SignalKind::Error
        },
        error: error.to_string(),
    }
}

/// Runs analysis plans against live data.
pub struct Analyzer {
    fetcher: Fetcher,
}

impl Analyzer {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub async fn analyze(
        &self,
        symbol: &str,
        plan: &AnalysisPlan,
    ) -> Result<Evaluation, AnalysisError> {
        let series = self
            .fetcher
            .fetch_series(symbol, plan.lookback, plan.required_bars())
            .await?;
        evaluate(&series, plan)
    }

    /// Advanced analysis; never fails, errors become WAIT/ERROR placeholders.
    pub async fn advanced(&self, symbol: &str, plan: &AnalysisPlan) -> AdvancedOutcome {
        let health = presets::health_score();
        let min_bars = plan
            .required_bars()
            .max(health.indicators.required_bars());

        let report = match self
            .fetcher
            .fetch_series(symbol, plan.lookback, min_bars)
            .await
        {
            Ok(series) => evaluate_advanced(&series, plan, &health),
            Err(e) => Err(e),
        };

        match report {
            Ok(report) => AdvancedOutcome::Ready(report),
            Err(e) => {
                warn!("Advanced analysis of {} failed: {}", symbol, e);
                AdvancedOutcome::Pending(pending(&clean_symbol(symbol), &e))
            }
        }
    }
}
