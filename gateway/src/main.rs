use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geo_proximity::SafeLocationSet;
use network_trust::{IpApiClient, NetworkClassifier, SsidAllowList};
use risk_engine::EngineConfig;
use threat_intel::{HttpThreatFeed, StaticThreatFeed, ThreatFeed, ThreatFeedConfig};

mod routes;

#[derive(Clone)]
pub struct AppState {
    pub safe_locations: Arc<SafeLocationSet>,
    pub network: Arc<NetworkClassifier>,
    pub threats: Arc<dyn ThreatFeed>,
    pub engine: EngineConfig,
}

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/posture/check", post(routes::check_posture))
        .route("/safe-locations", get(routes::list_safe_locations))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "posture_gateway=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Safe-location whitelist: malformed entries fail the load, not requests
    let safe_path = std::env::var("POSTURE_SAFE_LOCATIONS_PATH")
        .unwrap_or_else(|_| "data/safe_locations.json".to_string());
    let safe_locations = SafeLocationSet::load(&safe_path)
        .with_context(|| format!("loading safe locations from {}", safe_path))?;
    tracing::info!("   Loaded {} safe locations", safe_locations.len());

    let ssids = std::env::var("POSTURE_TRUSTED_SSIDS")
        .map(|v| SsidAllowList::from_env_value(&v))
        .unwrap_or_default();
    let network = NetworkClassifier::new(Arc::new(IpApiClient::default()), ssids);

    let threats: Arc<dyn ThreatFeed> = match std::env::var("POSTURE_THREAT_FEED_URL") {
        Ok(url) => {
            tracing::info!("   Threat feed: {}", url);
            Arc::new(HttpThreatFeed::new(ThreatFeedConfig::new(url)))
        }
        Err(_) => {
            tracing::info!("   Threat feed: none configured, every area reports zero threats");
            Arc::new(StaticThreatFeed::empty())
        }
    };

    let state = AppState {
        safe_locations: Arc::new(safe_locations),
        network: Arc::new(network),
        threats,
        engine: EngineConfig::default(),
    };

    let port = std::env::var("POSTURE_GATEWAY_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "8600".to_string());
    let addr = format!("0.0.0.0:{}", port);

    tracing::info!("Posture Gateway starting on {}", addr);
    tracing::info!("   Engine weights version: {}", risk_engine::WEIGHTS_VERSION);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "posture-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
