use std::collections::VecDeque;

use crate::core::config::SelectionConfig;
use crate::core::types::City;

/// Bounded FIFO of recently used names
#[derive(Debug, Clone)]
pub struct RecentNames {
    names: VecDeque<String>,
    capacity: usize,
}

impl RecentNames {
    pub fn new(capacity: usize) -> Self {
        Self {
            names: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, name: &str) {
        if self.names.len() >= self.capacity {
            self.names.pop_front(); // Remove oldest
        }
        self.names.push_back(name.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Keep only the `keep` most recent names
    pub fn truncate_to_recent(&mut self, keep: usize) {
        let excess = self.names.len().saturating_sub(keep);
        self.names.drain(..excess);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Oldest first
    pub fn snapshot(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Recently selected cities and countries, shared by every history-consulting
/// selection for the lifetime of the engine
#[derive(Debug, Clone)]
pub struct SelectionHistory {
    cities: RecentNames,
    countries: RecentNames,
    compact_city_keep: usize,
    compact_country_keep: usize,
}

impl SelectionHistory {
    pub fn new(config: &SelectionConfig) -> Self {
        Self {
            cities: RecentNames::new(config.recent_city_capacity),
            countries: RecentNames::new(config.recent_country_capacity),
            compact_city_keep: config.compact_city_keep,
            compact_country_keep: config.compact_country_keep,
        }
    }

    pub fn record(&mut self, city: &City) {
        self.cities.push(&city.name);
        self.countries.push(&city.country);
    }

    pub fn recent_cities(&self) -> &RecentNames {
        &self.cities
    }

    pub fn recent_countries(&self) -> &RecentNames {
        &self.countries
    }

    pub fn recent_city_names(&self) -> Vec<String> {
        self.cities.snapshot()
    }

    pub fn recent_country_names(&self) -> Vec<String> {
        self.countries.snapshot()
    }

    /// Neither the city nor its country was used recently
    pub fn is_fresh(&self, city: &City) -> bool {
        !self.cities.contains(&city.name) && !self.countries.contains(&city.country)
    }

    /// Shrink both windows so a starved candidate pool can recover
    pub fn compact(&mut self) {
        self.cities.truncate_to_recent(self.compact_city_keep);
        self.countries.truncate_to_recent(self.compact_country_keep);
    }
}

impl Default for SelectionHistory {
    fn default() -> Self {
        Self::new(&SelectionConfig::default())
    }
}
