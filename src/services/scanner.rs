//! Watchlist scanner.
//!
//! Runs the analysis pipeline for every symbol of a profile concurrently,
//! drops the symbols that fail or time out, and ranks the rest by
//! confidence.

use super::analyzer::{AnalysisPlan, Analyzer};
use super::risk::RiskPolicy;
use super::signals::presets;
use crate::config::Config;
use crate::types::{Lookback, ScanResults, SignalResult};
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// A named scan: which symbols, which plan, how to rank.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanProfile {
    pub name: &'static str,
    pub watchlist: Vec<String>,
    pub plan: AnalysisPlan,
    /// Keep only BUY and HOLD.
    pub actionable_only: bool,
    pub top_n: usize,
}

impl ScanProfile {
    /// Confidence-accumulation scan behind `/scan`.
    pub fn quick(config: &Config) -> Self {
        Self {
            name: "quick",
            watchlist: config.scan_watchlist.clone(),
            plan: AnalysisPlan {
                rules: presets::confidence_accumulation(),
                risk: RiskPolicy::scan_percentage(),
                lookback: Lookback::ThreeMonths,
                min_bars: 2,
            },
            actionable_only: false,
            top_n: 6,
        }
    }

    /// Trend-score scan behind `/scan/top`.
    pub fn top(config: &Config) -> Self {
        Self {
            name: "top",
            watchlist: config.scan_watchlist.clone(),
            plan: AnalysisPlan::trend(config),
            actionable_only: true,
            top_n: 10,
        }
    }
}

/// Filter, sort by confidence (descending, stable) and truncate.
///
/// `count` is the number of results left after filtering, before
/// truncation.
pub fn rank(results: Vec<SignalResult>, actionable_only: bool, top_n: usize) -> ScanResults {
    let mut kept: Vec<SignalResult> = results
        .into_iter()
        .filter(|r| !actionable_only || r.signal.is_actionable())
        .collect();

    kept.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    let count = kept.len();
    kept.truncate(top_n);

    ScanResults {
        count,
        top_results: kept,
    }
}

/// Runs scan profiles.
pub struct Scanner {
    analyzer: Arc<Analyzer>,
    per_symbol_timeout: Duration,
}

impl Scanner {
    pub fn new(analyzer: Arc<Analyzer>, per_symbol_timeout: Duration) -> Self {
        Self {
            analyzer,
            per_symbol_timeout,
        }
    }

    pub async fn scan(&self, profile: &ScanProfile) -> ScanResults {
        let futures: Vec<_> = profile
            .watchlist
            .iter()
            .map(|symbol| async move {
                let outcome = tokio::time::timeout(
                    self.per_symbol_timeout,
                    self.analyzer.analyze(symbol, &profile.plan),
                )
                .await;

                match outcome {
                    Ok(Ok(evaluation)) => Some(evaluation.result),
                    Ok(Err(e)) => {
                        warn!("Scan {}: skipping {}: {}", profile.name, symbol, e);
                        None
                    }
                    Err(_) => {
                        warn!(
                            "Scan {}: skipping {}: timed out after {:?}",
                            profile.name, symbol, self.per_symbol_timeout
                        );
                        None
                    }
                }
            })
            .collect();

        // join_all keeps watchlist order
        let results: Vec<SignalResult> = join_all(futures).await.into_iter().flatten().collect();
        let analyzed = results.len();

        let ranked = rank(results, profile.actionable_only, profile.top_n);

        info!(
            "Scan {}: {}/{} symbols analyzed, {} kept, returning {}",
            profile.name,
            analyzed,
            profile.watchlist.len(),
            ranked.count,
            ranked.top_results.len()
        );

        ranked
    }
}
