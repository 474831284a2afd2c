//! Edge Fleet Simulator
//!
//! Synthetic telemetry for a small fleet of edge devices, served as a JSON
//! snapshot, a CSV export and a Prometheus scrape target.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                   EDGE FLEET SIMULATOR                    │
//! ├───────────────────────────────────────────────────────────┤
//! │  GET /api/devices ─┐                                      │
//! │  GET /api/devices/export.csv ─┼──► FleetGenerator (rng)   │
//! │  GET /metrics ─────┘              │                       │
//! │        │                          ▼                       │
//! │        └──────────────────► FleetMetrics (registry)       │
//! │  GET /  ──► static dashboard                              │
//! └───────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod fleet;
mod handlers;
mod metrics;
mod models;

use anyhow::Context;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

use fleet::FleetGenerator;
use metrics::FleetMetrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env().context("Failed to load configuration")?;

    // Initialize logging
    init_tracing(&config);

    tracing::info!("Edge Fleet Simulator starting...");
    tracing::info!(
        "Simulating {} devices, dashboard from {}",
        config.device_count,
        config.static_dir.display()
    );

    // Build application state
    let state = AppState {
        generator: Arc::new(FleetGenerator::new()),
        metrics: Arc::new(FleetMetrics::new().context("Failed to register fleet metrics")?),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing(config: &config::Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "edge_fleet_sim=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<FleetGenerator>,
    pub metrics: Arc<FleetMetrics>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    let api_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/devices", get(handlers::devices::list))
        .route("/api/devices/export.csv", get(handlers::devices::export_csv))
        .route("/metrics", get(handlers::metrics::scrape));

    // Dashboard
    let static_routes = Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir));

    Router::new()
        .merge(api_routes)
        .merge(static_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
