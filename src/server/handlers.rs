use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::continental_diversity_stats;
use crate::core::error::GameError;
use crate::core::types::{City, Tier};
use crate::llm::generate_persona;
use crate::server::rate_limit::{check_rate_limit, prune_empty_entries};
use crate::server::AppState;

/// Largest batch a client may request
const MAX_GAME_COUNT: usize = 50;

// --- Query structs ---

#[derive(Debug, Default, Deserialize)]
pub struct SelectionQuery {
    difficulty: Option<String>,
    seed: Option<String>,
    region: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GameQuery {
    difficulty: Option<String>,
    count: Option<usize>,
    seed: Option<String>,
    region: Option<String>,
    max_per_continent: Option<usize>,
    deterministic: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub difficulty: Tier,
    pub seed: Option<String>,
    pub deterministic: bool,
    pub cities: Vec<City>,
    pub continental_stats: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub difficulty: BTreeMap<Tier, usize>,
    pub continents: BTreeMap<String, usize>,
}

// --- Helpers ---

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

fn game_error_response(err: GameError) -> Response {
    let status = match &err {
        GameError::UnknownTier(_) => StatusCode::BAD_REQUEST,
        GameError::NoCitiesAvailable(_) => StatusCode::CONFLICT,
        GameError::LlmError(_) | GameError::PersonaParse(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        warn!(error = %err, "Request failed");
    }
    error_response(status, err.to_string())
}

/// Missing difficulty means beginner
fn parse_tier(difficulty: Option<&str>) -> Result<Tier, GameError> {
    difficulty.map_or(Ok(Tier::Beginner), |d| d.parse())
}

// --- Handlers ---

pub async fn health() -> &'static str {
    "ok"
}

pub async fn api_generate_persona(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(params): Query<SelectionQuery>,
) -> Response {
    let tier = match parse_tier(params.difficulty.as_deref()) {
        Ok(tier) => tier,
        Err(e) => return game_error_response(e),
    };
    let Some(client) = state.llm.as_ref() else {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "Persona generation is not configured");
    };

    // Only requests that will reach the LLM consume quota
    {
        let mut limiter = state.rate_limiter.lock().await;
        let now = Instant::now();
        if limiter.len() > 1000 {
            prune_empty_entries(&mut limiter, now);
        }
        let entries = limiter.entry(addr.ip()).or_default();
        if !check_rate_limit(entries, now, state.persona_requests_per_minute) {
            return error_response(StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded, try again shortly");
        }
    }

    let city = match state
        .engine
        .select_city(tier, params.seed.as_deref(), params.region.as_deref())
    {
        Ok(city) => city,
        Err(e) => return game_error_response(e),
    };

    match generate_persona(client, &city).await {
        Ok(persona) => Json(persona).into_response(),
        Err(e) => game_error_response(e),
    }
}

pub async fn api_select_city(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SelectionQuery>,
) -> Response {
    let result = parse_tier(params.difficulty.as_deref()).and_then(|tier| {
        state
            .engine
            .select_city(tier, params.seed.as_deref(), params.region.as_deref())
    });

    match result {
        Ok(city) => Json(city).into_response(),
        Err(e) => game_error_response(e),
    }
}

pub async fn api_game(State(state): State<Arc<AppState>>, Query(params): Query<GameQuery>) -> Response {
    let tier = match parse_tier(params.difficulty.as_deref()) {
        Ok(tier) => tier,
        Err(e) => return game_error_response(e),
    };

    let mut request = state.engine.batch_request(tier);
    if let Some(count) = params.count {
        if count == 0 || count > MAX_GAME_COUNT {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("count must be between 1 and {}", MAX_GAME_COUNT),
            );
        }
        request = request.with_count(count);
    }
    if let Some(max) = params.max_per_continent {
        if max == 0 {
            return error_response(StatusCode::BAD_REQUEST, "max_per_continent must be positive");
        }
        request = request.with_max_per_continent(max);
    }
    if let Some(seed) = params.seed.clone() {
        request = request.with_seed(seed);
    }
    if let Some(region) = params.region {
        request = request.with_region_hint(region);
    }

    let deterministic = params.deterministic.unwrap_or(true);
    let result = if deterministic {
        state.engine.select_cities_for_game_deterministic(&request)
    } else {
        state.engine.select_cities_for_game(&request)
    };

    match result {
        Ok(cities) => {
            if cities.len() < request.count {
                warn!(
                    "Game batch for {} came back short: {} of {}",
                    tier,
                    cities.len(),
                    request.count
                );
            }
            Json(GameResponse {
                difficulty: tier,
                seed: params.seed,
                deterministic,
                continental_stats: continental_diversity_stats(&cities),
                cities,
            })
            .into_response()
        }
        Err(e) => game_error_response(e),
    }
}

pub async fn api_cities_for_tier(
    State(state): State<Arc<AppState>>,
    Path(difficulty): Path<String>,
) -> Response {
    match difficulty.parse::<Tier>() {
        Ok(tier) => Json(state.engine.cities_for(tier).to_vec()).into_response(),
        Err(e) => game_error_response(e),
    }
}

pub async fn api_lookup_city(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Response {
    match state.engine.find_by_name(&name) {
        Some(city) => Json(city.clone()).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("Unknown city: {}", name)),
    }
}

pub async fn api_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        difficulty: state.engine.difficulty_stats(),
        continents: state.engine.continental_distribution(),
    })
}
