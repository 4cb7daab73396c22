//! dca-server HTTP API
//!
//! Axum-based server exposing the DCA engine: simulation, CSV export,
//! share links, cross-asset comparison and analytics.

mod config;
mod handlers;
mod routes;
mod state;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        dir = %config.price_dir.display(),
        format = %config.price_format,
        ttl_secs = config.cache_ttl_secs,
        interpolation = config.weekly_interpolation,
        "price feeds configured"
    );
    if !config.price_dir.is_dir() {
        tracing::warn!("⚠ Price directory {} not found - API mode will fail", config.price_dir.display());
        tracing::warn!("  Manual price mode and inline series still work");
    }

    let addr = config.bind_addr.clone();
    let app = routes::router(AppState::from_config(config));

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 dca-server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                     - Health check");
    tracing::info!("  POST /api/simulate               - Run a DCA simulation");
    tracing::info!("  POST /api/export/csv             - Breakdown as CSV");
    tracing::info!("  POST /api/share/encode           - Parameters to link query");
    tracing::info!("  GET  /api/share/decode           - Link query to parameters");
    tracing::info!("  POST /api/assets/compare         - DCA into other assets");
    tracing::info!("  POST /api/analytics/projection   - Future price projection");
    tracing::info!("  POST /api/analytics/fire         - Years to financial independence");
    tracing::info!("  POST /api/analytics/savings      - Savings account baseline");
    tracing::info!("  POST /api/analytics/inflation    - CPI and M2 adjustment");
    tracing::info!("  POST /api/analytics/cost-basis   - Combined positions");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
