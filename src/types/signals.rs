use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Discrete trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalKind {
    Buy,
    Sell,
    Hold,
    /// Not enough data to analyze yet.
    Wait,
    /// Analysis failed.
    Error,
}

impl SignalKind {
    /// Get display label for this signal.
    pub fn label(&self) -> &'static str {
        match self {
            SignalKind::Buy => "BUY",
            SignalKind::Sell => "SELL",
            SignalKind::Hold => "HOLD",
            SignalKind::Wait => "WAIT",
            SignalKind::Error => "ERROR",
        }
    }

    /// BUY and HOLD are the signals the top scanner keeps.
    pub fn is_actionable(&self) -> bool {
        matches!(self, SignalKind::Buy | SignalKind::Hold)
    }
}

/// Outcome of analyzing one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    /// Resolved ticker, including exchange suffix.
    pub symbol: String,
    /// Latest close, rounded to 2 places.
    pub price: f64,
    pub signal: SignalKind,
    /// Confidence score, 0-100.
    pub confidence: u8,
    pub target: f64,
    pub stoploss: f64,
    /// Supporting reasons, in rule order.
    pub reasons: Vec<String>,
    /// Warnings that argue against the signal.
    pub traps: Vec<String>,
}

/// Placeholder returned instead of a result when a symbol cannot be analyzed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingResult {
    pub symbol: String,
    /// WAIT or ERROR.
    pub signal: SignalKind,
    pub error: String,
}

/// Latest indicator values echoed back by `/analyze`.
///
/// EMA keys carry their span, e.g. `EMA9` and `EMA21`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorReadout {
    pub fast_span: usize,
    pub slow_span: usize,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
    pub volume: u64,
    pub avg_volume: u64,
}

impl Serialize for IndicatorReadout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry(&format!("EMA{}", self.fast_span), &self.ema_fast)?;
        map.serialize_entry(&format!("EMA{}", self.slow_span), &self.ema_slow)?;
        map.serialize_entry("RSI", &self.rsi)?;
        map.serialize_entry("Volume", &self.volume)?;
        map.serialize_entry("AvgVolume", &self.avg_volume)?;
        map.end()
    }
}

/// Three-way trap classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrapKind {
    /// Breakout above the recent high on thin volume.
    #[serde(rename = "Possible Bull Trap")]
    BullTrap,
    /// Breakdown below the slow EMA on heavy volume.
    #[serde(rename = "Possible Bear Trap")]
    BearTrap,
    #[serde(rename = "No trap detected")]
    None,
}

impl TrapKind {
    pub fn label(&self) -> &'static str {
        match self {
            TrapKind::BullTrap => "Possible Bull Trap",
            TrapKind::BearTrap => "Possible Bear Trap",
            TrapKind::None => "No trap detected",
        }
    }
}

/// Trend-score analysis enriched with trap, entry and health advisories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvancedReport {
    #[serde(flatten)]
    pub result: SignalResult,
    pub trap: TrapKind,
    pub entry: String,
    pub health_score: u8,
}

/// Either a full report or the reason none could be produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AdvancedOutcome {
    Ready(AdvancedReport),
    Pending(PendingResult),
}

/// Ranked scanner output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResults {
    /// Results that passed the filter, before truncation.
    pub count: usize,
    pub top_results: Vec<SignalResult>,
}

/// Fundamental and performance metrics for one stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMetrics {
    pub price: f64,
    #[serde(rename = "1Y Return %")]
    pub return_1y_pct: f64,
    #[serde(rename = "ROE %")]
    pub roe_pct: f64,
    #[serde(rename = "Debt/Equity")]
    pub debt_to_equity: f64,
    #[serde(rename = "PE Ratio")]
    pub pe_ratio: f64,
    #[serde(rename = "Revenue Growth %")]
    pub revenue_growth_pct: f64,
    #[serde(rename = "Score")]
    pub score: u8,
    pub reasons: Vec<String>,
}

/// Head-to-head comparison of two stocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub stocks: BTreeMap<String, StockMetrics>,
    pub winner: String,
    pub conclusion: String,
    pub disclaimer: String,
}
