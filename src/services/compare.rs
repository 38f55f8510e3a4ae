//! Head-to-head fundamental comparison of two stocks.

use super::fetcher::Fetcher;
use super::risk::round2;
use crate::error::AnalysisError;
use crate::types::{Comparison, Fundamentals, Lookback, PriceSeries, StockMetrics};
use std::collections::BTreeMap;
use tracing::{debug, warn};

const DISCLAIMER: &str = "This is data-based analysis, not financial advice.";

/// Uppercase and strip spaces and hyphens ("tata-power" -> "TATAPOWER").
pub fn clean_compare_symbol(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase()
}

/// Score a stock's fundamentals and one-year performance.
///
/// Missing fundamentals count as zero.
pub fn score_metrics(series: &PriceSeries, fundamentals: &Fundamentals) -> StockMetrics {
    let closes = series.closes();
    let first = closes.first().copied().unwrap_or(0.0);
    let last = closes.last().copied().unwrap_or(0.0);

    let return_1y_pct = if first > 0.0 {
        round2((last / first - 1.0) * 100.0)
    } else {
        0.0
    };
    let roe_pct = round2(fundamentals.return_on_equity.unwrap_or(0.0) * 100.0);
    let debt_to_equity = round2(fundamentals.debt_to_equity.unwrap_or(0.0));
    let pe_ratio = round2(fundamentals.trailing_pe.unwrap_or(0.0));
    let revenue_growth_pct = round2(fundamentals.revenue_growth.unwrap_or(0.0) * 100.0);

    let checks = [
        (roe_pct > 15.0, 20, "Strong ROE"),
        (debt_to_equity < 80.0, 15, "Low Debt"),
        (revenue_growth_pct > 10.0, 20, "Good Revenue Growth"),
        (return_1y_pct > 15.0, 20, "Strong Price Performance"),
        (pe_ratio < 30.0, 10, "Reasonable Valuation"),
    ];

    let mut score = 0u8;
    let mut reasons = Vec::new();
    for (passed, points, reason) in checks {
        if passed {
            score += points;
            reasons.push(reason.to_string());
        }
    }

    StockMetrics {
        price: round2(last),
        return_1y_pct,
        roe_pct,
        debt_to_equity,
        pe_ratio,
        revenue_growth_pct,
        score,
        reasons,
    }
}

/// Winner is `first` only with a strictly higher score.
pub fn pick_winner<'a>(first: (&'a str, &StockMetrics), second: (&'a str, &StockMetrics)) -> &'a str {
    if first.1.score > second.1.score {
        first.0
    } else {
        second.0
    }
}

async fn metrics_for(fetcher: &Fetcher, symbol: &str) -> Result<StockMetrics, AnalysisError> {
    let series = fetcher.fetch_series(symbol, Lookback::OneYear, 2).await?;

    let fundamentals = match fetcher.fundamentals(series.ticker()).await {
        Ok(f) => f,
        Err(e) => {
            warn!("No fundamentals for {}: {}", series.ticker(), e);
            Fundamentals::default()
        }
    };

    let metrics = score_metrics(&series, &fundamentals);
    debug!("{} scored {}", series.ticker(), metrics.score);
    Ok(metrics)
}

/// Compare two stocks.
///
/// Either symbol failing to resolve fails the whole comparison.
pub async fn compare(
    fetcher: &Fetcher,
    stock1: &str,
    stock2: &str,
) -> Result<Comparison, AnalysisError> {
    let s1 = clean_compare_symbol(stock1);
    let s2 = clean_compare_symbol(stock2);

    let (m1, m2) = tokio::join!(metrics_for(fetcher, &s1), metrics_for(fetcher, &s2));
    let (m1, m2) = (m1?, m2?);

    let winner = pick_winner((s1.as_str(), &m1), (s2.as_str(), &m2)).to_string();
    let conclusion = format!(
        "{} looks stronger overall based on better fundamentals, growth and performance.",
        winner
    );

    let mut stocks = BTreeMap::new();
    stocks.insert(s1, m1);
    stocks.insert(s2, m2);

    Ok(Comparison {
        stocks,
        winner,
        conclusion,
        disclaimer: DISCLAIMER.to_string(),
    })
}
