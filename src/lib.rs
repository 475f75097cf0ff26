//! City Persona - geography guessing game backend
//!
//! Picks cities with recency and continental diversity guarantees and asks a
//! language model to invent a local resident whose life hints at the city.

pub mod catalog;
pub mod core;
pub mod llm;
pub mod selection;
pub mod server;
