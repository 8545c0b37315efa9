use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::store::sentinel::SentinelStore;

pub struct AppState {
    pub config: AppConfig,
    pub store: SentinelStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let store = SentinelStore::new(&config.auth, &config.sentinel)?;
        Ok(Self { config, store })
    }
}

pub fn create_router(state: Arc<AppState>) -> Result<Router> {
    let origin = state
        .config
        .server
        .allowed_origin
        .parse::<HeaderValue>()
        .map_err(|e| {
            AppError::Config(format!("server.allowed_origin is not a valid origin: {e}"))
        })?;

    // Preflight OPTIONS requests are answered here for the portal origin.
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::OPTIONS]);

    Ok(Router::new()
        .route("/api/reopen", get(crate::trigger::http::handle_reopen))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

async fn health_check() -> &'static str {
    "ok"
}
