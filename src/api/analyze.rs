//! Single-stock analysis endpoints.

use super::required_param;
use crate::error::Result;
use crate::types::{AdvancedOutcome, IndicatorReadout, SignalResult};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

/// Query parameters for the analyze endpoints.
#[derive(Debug, Deserialize)]
pub struct AnalyzeQuery {
    /// Bare symbol, e.g. `TCS` or `tata power`.
    pub stock: Option<String>,
}

/// `/analyze` body: the signal plus the indicator values behind it.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub result: SignalResult,
    pub indicators: IndicatorReadout,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analyze", get(analyze))
        .route("/analyze/advanced", get(analyze_advanced))
}

async fn analyze(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
) -> Result<Json<AnalyzeResponse>> {
    let stock = required_param(query.stock, "stock")?;

    let evaluation = state.analyzer.analyze(&stock, &state.plans.analyze).await?;

    Ok(Json(AnalyzeResponse {
        indicators: evaluation.readout(),
        result: evaluation.result,
    }))
}

/// Never fails once the query is valid: problems come back as WAIT/ERROR.
async fn analyze_advanced(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
) -> Result<Json<AdvancedOutcome>> {
    let stock = required_param(query.stock, "stock")?;

    Ok(Json(
        state.analyzer.advanced(&stock, &state.plans.advanced).await,
    ))
}
