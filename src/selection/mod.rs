//! City selection: recency history, single draws and game batches

pub mod batch;
pub mod engine;
pub mod history;
pub mod rng;
pub mod single;

pub use batch::BatchRequest;
pub use engine::CitySelectionEngine;
pub use history::SelectionHistory;
