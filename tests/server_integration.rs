//! Integration tests for the HTTP surface
//!
//! Requests go straight into the router with `tower::ServiceExt::oneshot`;
//! no socket is bound. Persona routes run either without an LLM client or
//! with one pointed at a closed local port, so no model is ever reached.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use city_persona::catalog::CityCatalog;
use city_persona::core::config::ServerConfig;
use city_persona::core::types::City;
use city_persona::llm::LlmClient;
use city_persona::selection::CitySelectionEngine;
use city_persona::server::{router, AppState};

fn test_app(config: &ServerConfig) -> Router {
    app_with_llm(config, None)
}

fn app_with_llm(config: &ServerConfig, llm: Option<LlmClient>) -> Router {
    let catalog = CityCatalog::new(
        vec![
            City::new("Paris", "France", "Europe").with_region("Ile-de-France"),
            City::new("Tokyo", "Japan", "Asia").with_region("Kanto"),
            City::new("Lima", "Peru", "South America").with_region("Lima Province"),
            City::new("Cairo", "Egypt", "Africa").with_region("Cairo Governorate"),
            City::new("Sydney", "Australia", "Oceania").with_region("New South Wales"),
        ],
        vec![City::new("Porto", "Portugal", "Europe")],
        vec![],
    );
    let state = Arc::new(AppState::new(CitySelectionEngine::new(catalog), llm, config));
    router(state, &config.allowed_origins)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn persona_request() -> Request<Body> {
    persona_request_for("beginner")
}

fn persona_request_for(difficulty: &str) -> Request<Body> {
    let mut request = Request::builder()
        .uri(format!("/generate_persona?difficulty={}", difficulty))
        .body(Body::empty())
        .unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 50000))));
    request
}

#[tokio::test]
async fn test_health() {
    let app = test_app(&ServerConfig::default());
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_select_city() {
    let app = test_app(&ServerConfig::default());
    let (status, body) = get(app, "/api/city?difficulty=beginner&region=kanto").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Tokyo");
}

#[tokio::test]
async fn test_unknown_tier_is_bad_request() {
    let app = test_app(&ServerConfig::default());
    let (status, body) = get(app, "/api/city?difficulty=expert").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("expert"));
}

#[tokio::test]
async fn test_empty_tier_is_conflict() {
    let app = test_app(&ServerConfig::default());
    let (status, _) = get(app, "/api/city?difficulty=advanced").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_game_is_reproducible() {
    let config = ServerConfig::default();
    let app = test_app(&config);
    let uri = "/api/game?difficulty=beginner&count=3&max_per_continent=1&seed=abc";

    let (status, first) = get(app.clone(), uri).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = get(app, uri).await;

    assert_eq!(first["cities"].as_array().unwrap().len(), 3);
    assert_eq!(first["cities"], second["cities"]);
    assert_eq!(first["deterministic"], true);
    let stats = first["continental_stats"].as_object().unwrap();
    assert!(stats.values().all(|n| n == 1));
}

#[tokio::test]
async fn test_game_with_history() {
    let app = test_app(&ServerConfig::default());
    let (status, body) = get(app, "/api/game?count=5&deterministic=false").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deterministic"], false);
    assert_eq!(body["cities"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_game_rejects_bad_parameters() {
    let app = test_app(&ServerConfig::default());
    let (status, _) = get(app.clone(), "/api/game?count=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = get(app, "/api/game?max_per_continent=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tier_listing_and_lookup() {
    let app = test_app(&ServerConfig::default());

    let (status, body) = get(app.clone(), "/api/cities/intermediate").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = get(app.clone(), "/api/lookup/porto").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["country"], "Portugal");

    let (status, _) = get(app, "/api/lookup/Atlantis").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats() {
    let app = test_app(&ServerConfig::default());
    let (status, body) = get(app, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["difficulty"]["beginner"], 5);
    assert_eq!(body["difficulty"]["advanced"], 0);
    assert_eq!(body["continents"]["Europe"], 2);
}

#[tokio::test]
async fn test_persona_without_llm_is_unavailable() {
    let app = test_app(&ServerConfig::default());
    let response = app.oneshot(persona_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_persona_rate_limit() {
    let config = ServerConfig {
        persona_requests_per_minute: 1,
        ..ServerConfig::default()
    };
    let llm = LlmClient::new("test-key", "http://127.0.0.1:9/v1/chat/completions", "test-model");
    let app = app_with_llm(&config, Some(llm));

    // Upstream is unreachable, but the request still used the slot
    let first = app.clone().oneshot(persona_request()).await.unwrap();
    assert_eq!(first.status(), StatusCode::BAD_GATEWAY);

    let second = app.oneshot(persona_request()).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_rejected_persona_requests_keep_quota() {
    let config = ServerConfig {
        persona_requests_per_minute: 1,
        ..ServerConfig::default()
    };

    let app = test_app(&config);
    for _ in 0..3 {
        let response = app.clone().oneshot(persona_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    let llm = LlmClient::new("test-key", "http://127.0.0.1:9/v1/chat/completions", "test-model");
    let app = app_with_llm(&config, Some(llm));
    for _ in 0..3 {
        let response = app.clone().oneshot(persona_request_for("expert")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
    let response = app.oneshot(persona_request()).await.unwrap();
    assert_ne!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}
