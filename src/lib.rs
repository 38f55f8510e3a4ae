//! Nexyraa - technical-analysis signal service for Indian equities

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use axum::Router;
use config::Config;
use services::{AnalysisPlan, Analyzer, Fetcher, ScanProfile, Scanner};
use sources::MarketDataSource;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Analysis plans and scan profiles, fixed at startup.
#[derive(Debug)]
pub struct Plans {
    pub analyze: AnalysisPlan,
    pub advanced: AnalysisPlan,
    pub quick_scan: ScanProfile,
    pub top_scan: ScanProfile,
}

impl Plans {
    pub fn from_config(config: &Config) -> Self {
        Self {
            analyze: AnalysisPlan::analyze(config),
            advanced: AnalysisPlan::trend(config),
            quick_scan: ScanProfile::quick(config),
            top_scan: ScanProfile::top(config),
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analyzer: Arc<Analyzer>,
    pub scanner: Arc<Scanner>,
    pub plans: Arc<Plans>,
}

impl AppState {
    pub fn new(config: Arc<Config>, source: Arc<dyn MarketDataSource>) -> Self {
        let analyzer = Arc::new(Analyzer::new(Fetcher::from_config(source, &config)));
        let scanner = Arc::new(Scanner::new(analyzer.clone(), config.fetch_timeout));
        let plans = Arc::new(Plans::from_config(&config));

        Self {
            config,
            analyzer,
            scanner,
            plans,
        }
    }
}

/// Build the HTTP application: routes, CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
