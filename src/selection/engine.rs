//! Shared selection engine
//!
//! Owns the catalog and the process-wide selection history. History sits
//! behind a mutex that is held for an entire read-filter-draw-record
//! sequence, so concurrent selections never observe a half-applied update.
//! Random generators are created per call and never shared.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::catalog::{continental_diversity_stats, CityCatalog};
use crate::core::config::SelectionConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::{City, Tier};
use crate::selection::batch::{self, BatchRequest};
use crate::selection::history::SelectionHistory;
use crate::selection::rng::selection_rng;
use crate::selection::single;

pub struct CitySelectionEngine {
    catalog: CityCatalog,
    config: SelectionConfig,
    history: Mutex<SelectionHistory>,
}

impl CitySelectionEngine {
    pub fn new(catalog: CityCatalog) -> Self {
        Self::build(catalog, SelectionConfig::default())
    }

    /// Engine with custom tuning; rejects configs that fail `SelectionConfig::validate`
    pub fn with_config(catalog: CityCatalog, config: SelectionConfig) -> Result<Self> {
        config.validate().map_err(GameError::ConfigError)?;
        Ok(Self::build(catalog, config))
    }

    fn build(catalog: CityCatalog, config: SelectionConfig) -> Self {
        let history = SelectionHistory::new(&config);
        Self {
            catalog,
            config,
            history: Mutex::new(history),
        }
    }

    pub fn catalog(&self) -> &CityCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    fn history(&self) -> MutexGuard<'_, SelectionHistory> {
        // History stays structurally valid even if a holder panicked
        self.history.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Select one city, avoiding recent cities/countries and balancing continents
    pub fn select_city(&self, tier: Tier, seed: Option<&str>, region_hint: Option<&str>) -> Result<City> {
        let mut rng = selection_rng(seed);
        let mut history = self.history();
        let city = single::select_city(&self.catalog, &mut history, &self.config, tier, region_hint, &mut rng)?;
        tracing::debug!("Selected {} ({}, {}) for {}", city.name, city.country, city.continent, tier);
        Ok(city)
    }

    /// Select a game batch that consults and updates global history
    pub fn select_cities_for_game(&self, request: &BatchRequest) -> Result<Vec<City>> {
        let mut rng = selection_rng(request.seed.as_deref());
        let mut history = self.history();
        batch::select_cities_for_game(&self.catalog, &mut history, request, &mut rng)
    }

    /// Select a game batch reproducible from the request alone
    pub fn select_cities_for_game_deterministic(&self, request: &BatchRequest) -> Result<Vec<City>> {
        let mut rng = selection_rng(request.seed.as_deref());
        batch::select_cities_for_game_deterministic(&self.catalog, request, &mut rng)
    }

    /// Default batch request for a tier using this engine's configuration
    pub fn batch_request(&self, tier: Tier) -> BatchRequest {
        BatchRequest::new(tier)
            .with_count(self.config.default_batch_count)
            .with_max_per_continent(self.config.default_max_per_continent)
    }

    pub fn cities_for(&self, tier: Tier) -> &[City] {
        self.catalog.cities_for(tier)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&City> {
        self.catalog.find_by_name(name)
    }

    pub fn difficulty_stats(&self) -> BTreeMap<Tier, usize> {
        self.catalog.difficulty_stats()
    }

    pub fn continental_distribution(&self) -> BTreeMap<String, usize> {
        self.catalog.continental_distribution()
    }

    pub fn continental_diversity_stats(&self, cities: &[City]) -> BTreeMap<String, usize> {
        continental_diversity_stats(cities)
    }

    /// Recent (city names, country names), oldest first
    pub fn history_snapshot(&self) -> (Vec<String>, Vec<String>) {
        let history = self.history();
        (history.recent_city_names(), history.recent_country_names())
    }
}
