use super::required_param;
use crate::error::{AnalysisError, AppError, Result};
use crate::services::compare;
use crate::types::Comparison;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub stock1: Option<String>,
    pub stock2: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/compare", get(compare_stocks))
}

async fn compare_stocks(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<Comparison>> {
    let stock1 = required_param(query.stock1, "stock1")?;
    let stock2 = required_param(query.stock2, "stock2")?;

    let comparison = compare::compare(state.analyzer.fetcher(), &stock1, &stock2)
        .await
        .map_err(|e| match e {
            AnalysisError::InvalidSymbol(_) => AppError::InvalidSymbols,
            other => AppError::Analysis(other),
        })?;

    Ok(Json(comparison))
}
