//! Language-model collaborators: HTTP client and persona prompts

pub mod client;
pub mod persona;

pub use client::LlmClient;
pub use persona::{generate_persona, Persona};
