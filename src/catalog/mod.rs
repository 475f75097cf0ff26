//! Immutable city catalog partitioned by difficulty tier.
//!
//! The catalog is built once from three tier lists. Continent, country and
//! name lookups are derived at construction and never change afterwards.

pub mod loader;

use ahash::AHashMap;
use std::collections::BTreeMap;

use crate::core::error::{GameError, Result};
use crate::core::types::{City, Tier};

pub use loader::{load_catalog, load_tier_file, LoadError};

/// All cities known to the game, indexed for filtering
#[derive(Debug, Clone, Default)]
pub struct CityCatalog {
    /// Tier lists in `Tier::ALL` order
    tiers: [Vec<City>; 3],
    by_continent: AHashMap<String, Vec<City>>,
    by_country: AHashMap<String, Vec<City>>,
    /// City name -> continent, first occurrence in tier order wins
    continent_of: AHashMap<String, String>,
}

impl CityCatalog {
    pub fn new(beginner: Vec<City>, intermediate: Vec<City>, advanced: Vec<City>) -> Self {
        let mut catalog = Self {
            tiers: [beginner, intermediate, advanced],
            ..Self::default()
        };
        catalog.build_indices();
        catalog
    }

    /// Build a catalog from a tier -> cities map; absent tiers are empty
    pub fn from_tiers(mut tiers: AHashMap<Tier, Vec<City>>) -> Self {
        let mut take = |tier: Tier| tiers.remove(&tier).unwrap_or_default();
        Self::new(
            take(Tier::Beginner),
            take(Tier::Intermediate),
            take(Tier::Advanced),
        )
    }

    fn build_indices(&mut self) {
        for cities in &self.tiers {
            for city in cities {
                self.by_continent
                    .entry(city.continent.clone())
                    .or_default()
                    .push(city.clone());
                self.by_country
                    .entry(city.country.clone())
                    .or_default()
                    .push(city.clone());
                self.continent_of
                    .entry(city.name.clone())
                    .or_insert_with(|| city.continent.clone());
            }
        }
    }

    /// Cities for a tier (possibly empty if the tier failed to load)
    pub fn cities_for(&self, tier: Tier) -> &[City] {
        &self.tiers[tier.index()]
    }

    /// Like `cities_for`, but an empty tier is an error
    pub fn require_cities(&self, tier: Tier) -> Result<&[City]> {
        let cities = self.cities_for(tier);
        if cities.is_empty() {
            return Err(GameError::NoCitiesAvailable(tier));
        }
        Ok(cities)
    }

    pub fn continent_index(&self) -> &AHashMap<String, Vec<City>> {
        &self.by_continent
    }

    pub fn country_index(&self) -> &AHashMap<String, Vec<City>> {
        &self.by_country
    }

    /// Continent of a city name, as used by continental balancing
    pub fn continent_of(&self, name: &str) -> Option<&str> {
        self.continent_of.get(name).map(String::as_str)
    }

    /// First city whose name matches case-insensitively, scanning tiers in order
    pub fn find_by_name(&self, name: &str) -> Option<&City> {
        let needle = name.to_lowercase();
        self.tiers
            .iter()
            .flatten()
            .find(|city| city.name.to_lowercase() == needle)
    }

    /// Number of cities per tier
    pub fn difficulty_stats(&self) -> BTreeMap<Tier, usize> {
        Tier::ALL
            .iter()
            .map(|&tier| (tier, self.cities_for(tier).len()))
            .collect()
    }

    /// Number of cities per continent across all tiers
    pub fn continental_distribution(&self) -> BTreeMap<String, usize> {
        self.by_continent
            .iter()
            .map(|(continent, cities)| (continent.clone(), cities.len()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tiers.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Count cities per continent in an arbitrary list
pub fn continental_diversity_stats(cities: &[City]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for city in cities {
        *counts.entry(city.continent.clone()).or_insert(0) += 1;
    }
    counts
}
