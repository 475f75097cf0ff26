//! Load tier files from disk into a `CityCatalog`
//!
//! Each tier lives in `<tier>_cities.json`, a JSON object whose single key is
//! the tier name. A tier that fails to load is logged and left empty so the
//! server can still start; selections on that tier then report
//! `NoCitiesAvailable`.

use ahash::AHashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog::CityCatalog;
use crate::core::types::{City, Tier};

/// Errors that can occur when loading a tier file
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O error
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// JSON parsing failed
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// Top-level object has no key for the tier
    #[error("missing \"{0}\" key")]
    MissingTierKey(Tier),
}

/// File name for a tier inside the data directory
pub fn tier_file_name(tier: Tier) -> String {
    format!("{}_cities.json", tier.as_str())
}

/// Parse a tier document from a JSON string
pub fn parse_tier_json(tier: Tier, json: &str) -> Result<Vec<City>, LoadError> {
    let mut document: AHashMap<String, Vec<City>> = serde_json::from_str(json)?;
    document
        .remove(tier.as_str())
        .ok_or(LoadError::MissingTierKey(tier))
}

/// Load one tier file
pub fn load_tier_file(tier: Tier, path: &Path) -> Result<Vec<City>, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tier_json(tier, &content)
}

/// Load every tier from `data_dir`, degrading failed tiers to empty
pub fn load_catalog(data_dir: &Path) -> CityCatalog {
    let mut tiers = AHashMap::new();

    for tier in Tier::ALL {
        let path = data_dir.join(tier_file_name(tier));
        match load_tier_file(tier, &path) {
            Ok(cities) => {
                tracing::info!("Loaded {} {} cities", cities.len(), tier);
                tiers.insert(tier, cities);
            }
            Err(e) => {
                tracing::warn!("Error loading {} cities from {}: {}", tier, path.display(), e);
            }
        }
    }

    CityCatalog::from_tiers(tiers)
}
