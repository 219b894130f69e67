//! StealthMole Relay Server
//!
//! Threat-intelligence relay between a security orchestration platform and
//! the StealthMole dark-web API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    STEALTHMOLE RELAY                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐ │
//! │  │  API      │  │  Auth     │  │  Mapping                │ │
//! │  │  Routes   │─▶│  (Basic/  │─▶│  observables ─▶ CTIM    │ │
//! │  │  (Axum)   │  │   JWT)    │  │  bundle / verdicts      │ │
//! │  └───────────┘  └───────────┘  └────────────┬────────────┘ │
//! │                                             ▼              │
//! │                                   ┌──────────────────┐     │
//! │                                   │ StealthMole API  │     │
//! │                                   │ (signed JWT/req) │     │
//! │                                   └──────────────────┘     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod ids;
mod mapping;
mod models;
mod provider;
mod handlers;
mod middleware;
mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{RelayError, AppResult};

use ids::{IdGenerator, UuidIdGenerator};
use provider::{StealthMoleClient, ThreatIntelProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    // Initialize logging
    init_tracing(config.log_json);

    tracing::info!("StealthMole Relay {} starting...", config.version());
    tracing::info!(
        modules = config.modules.len(),
        auth_scheme = ?config.auth_scheme,
        environment = %config.environment,
        "Configuration loaded"
    );

    let provider = StealthMoleClient::new(&config)?;

    // Build application state
    let state = AppState {
        config: Arc::new(config.clone()),
        provider: Arc::new(provider),
        ids: Arc::new(UuidIdGenerator),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stealthmole_relay=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub provider: Arc<dyn ThreatIntelProvider>,
    pub ids: Arc<dyn IdGenerator>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Public routes (no credentials required)
    let public_routes = Router::new()
        .route("/refer/observables", post(handlers::enrich::refer))
        .route("/watchdog", get(handlers::health::watchdog))
        .route("/version", post(handlers::health::version));

    // Relay routes (provider credentials required)
    let relay_routes = Router::new()
        .route("/health", post(handlers::health::check))
        .route("/observe/observables", post(handlers::enrich::observe))
        .route("/deliberate/observables", post(handlers::deliberate::deliberate))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_credentials
        ));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .merge(relay_routes)
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
