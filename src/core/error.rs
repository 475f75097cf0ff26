use thiserror::Error;

use crate::core::types::Tier;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Unknown difficulty tier: {0} (expected beginner, intermediate or advanced)")]
    UnknownTier(String),

    #[error("No cities available for difficulty: {0}")]
    NoCitiesAvailable(Tier),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Persona parse error: {0}")]
    PersonaParse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
