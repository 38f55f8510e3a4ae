use crate::types::ScanResults;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/scan", get(scan))
        .route("/scan/top", get(scan_top))
}

/// Quick confidence scan over the watchlist (top 6, unfiltered).
async fn scan(State(state): State<AppState>) -> Json<ScanResults> {
    Json(state.scanner.scan(&state.plans.quick_scan).await)
}

/// Trend scan over the watchlist (top 10 BUY/HOLD).
async fn scan_top(State(state): State<AppState>) -> Json<ScanResults> {
    Json(state.scanner.scan(&state.plans.top_scan).await)
}
