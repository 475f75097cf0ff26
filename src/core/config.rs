//! Selection and server configuration
//!
//! Selection constants are collected in `SelectionConfig` with explanations of
//! how they interact. Server settings come from an optional TOML file with
//! environment overrides on top.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::error::{GameError, Result};

/// Tuning for the city selection engine
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    // === HISTORY ===
    /// How many recently selected city names are remembered
    pub recent_city_capacity: usize,

    /// How many recently selected country names are remembered
    ///
    /// Smaller than the city window: there are far fewer countries than
    /// cities, so a long country window starves the candidate pool quickly.
    pub recent_country_capacity: usize,

    /// City names kept when history is compacted
    pub compact_city_keep: usize,

    /// Country names kept when history is compacted
    pub compact_country_keep: usize,

    /// Minimum number of history-filtered candidates before the single selector
    /// compacts history and falls back to the full tier
    pub min_diverse_candidates: usize,

    // === BATCH ===
    /// Cities per game when the caller does not say
    pub default_batch_count: usize,

    /// Per-continent cap for a game batch when the caller does not say
    pub default_max_per_continent: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            recent_city_capacity: 50,
            recent_country_capacity: 20,
            compact_city_keep: 10,
            compact_country_keep: 5,
            min_diverse_candidates: 5,
            default_batch_count: 5,
            default_max_per_continent: 2,
        }
    }
}

impl SelectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.recent_city_capacity == 0 || self.recent_country_capacity == 0 {
            return Err("history capacities must be positive".into());
        }

        if self.compact_city_keep > self.recent_city_capacity {
            return Err(format!(
                "compact_city_keep ({}) should be <= recent_city_capacity ({})",
                self.compact_city_keep, self.recent_city_capacity
            ));
        }

        if self.compact_country_keep > self.recent_country_capacity {
            return Err(format!(
                "compact_country_keep ({}) should be <= recent_country_capacity ({})",
                self.compact_country_keep, self.recent_country_capacity
            ));
        }

        if self.default_batch_count == 0 || self.default_max_per_continent == 0 {
            return Err("batch defaults must be positive".into());
        }

        Ok(())
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding `<tier>_cities.json` files
    pub data_dir: PathBuf,
    /// Origins allowed by CORS
    pub allowed_origins: Vec<String>,
    /// Persona generations allowed per client IP per minute
    pub persona_requests_per_minute: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            data_dir: PathBuf::from("data"),
            allowed_origins: vec!["http://localhost:5173".into()],
            persona_requests_per_minute: 10,
        }
    }
}

impl ServerConfig {
    /// Load from an optional TOML file, then apply environment overrides
    ///
    /// Recognised variables: PERSONA_HOST, PERSONA_PORT, PERSONA_DATA_DIR
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GameError::ConfigError(e.to_string()))
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("PERSONA_HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("PERSONA_PORT") {
            self.port = port
                .parse()
                .map_err(|_| GameError::ConfigError(format!("invalid PERSONA_PORT: {}", port)))?;
        }
        if let Ok(dir) = std::env::var("PERSONA_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
