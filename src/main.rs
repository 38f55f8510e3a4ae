use nexyraa::{app, config::Config, sources, AppState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nexyraa=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; missing broker credentials abort here
    let config = Arc::new(Config::from_env()?);
    info!("Starting Nexyraa server on {}", config.bind_address());

    let source = sources::from_config(config.clone())?;
    info!(
        "Market data source: {}, watchlist of {} symbols",
        source.name(),
        config.scan_watchlist.len()
    );

    let state = AppState::new(config.clone(), source);

    // Start the server
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Nexyraa server listening on {}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
