//! HTTP surface for the game frontend

pub mod handlers;
pub mod rate_limit;

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{http::HeaderValue, routing::get, Router};
use tokio::sync::Mutex;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::core::config::ServerConfig;
use crate::llm::LlmClient;
use crate::selection::CitySelectionEngine;

pub struct AppState {
    pub engine: CitySelectionEngine,
    /// None when no API key is configured; persona requests then get 503
    pub llm: Option<LlmClient>,
    pub persona_requests_per_minute: usize,
    pub rate_limiter: Mutex<HashMap<IpAddr, Vec<Instant>>>,
}

impl AppState {
    pub fn new(engine: CitySelectionEngine, llm: Option<LlmClient>, config: &ServerConfig) -> Self {
        Self {
            engine,
            llm,
            persona_requests_per_minute: config.persona_requests_per_minute,
            rate_limiter: Mutex::new(HashMap::new()),
        }
    }
}

pub fn router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    Router::new()
        // Health check
        .route("/", get(handlers::health))
        // Game
        .route("/generate_persona", get(handlers::api_generate_persona))
        .route("/api/city", get(handlers::api_select_city))
        .route("/api/game", get(handlers::api_game))
        // Catalog
        .route("/api/cities/{difficulty}", get(handlers::api_cities_for_tier))
        .route("/api/lookup/{name}", get(handlers::api_lookup_city))
        .route("/api/stats", get(handlers::api_stats))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
