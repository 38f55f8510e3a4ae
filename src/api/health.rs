//! Liveness endpoints.

use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

const BANNER: &str = "Nexyraa Premium Backend Running";

#[derive(Serialize)]
struct Banner {
    status: &'static str,
}

/// `/health` body: build version plus the market data wiring in use.
#[derive(Debug, Serialize)]
struct ServiceStatus {
    status: &'static str,
    version: &'static str,
    market_data: &'static str,
    watchlist_size: usize,
}

async fn root() -> Json<Banner> {
    Json(Banner { status: BANNER })
}

async fn service_status(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        market_data: state.analyzer.fetcher().source().name(),
        watchlist_size: state.config.scan_watchlist.len(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(service_status))
}
