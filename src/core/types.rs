//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::GameError;

/// Difficulty tier. Each tier owns a disjoint list of cities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Beginner,
    Intermediate,
    Advanced,
}

impl Tier {
    /// All tiers in catalog order
    pub const ALL: [Tier; 3] = [Tier::Beginner, Tier::Intermediate, Tier::Advanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Beginner => "beginner",
            Tier::Intermediate => "intermediate",
            Tier::Advanced => "advanced",
        }
    }

    /// Position of this tier in `Tier::ALL`
    pub fn index(&self) -> usize {
        match self {
            Tier::Beginner => 0,
            Tier::Intermediate => 1,
            Tier::Advanced => 2,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only the exact lowercase names parse; anything else is `UnknownTier`
impl FromStr for Tier {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Tier::Beginner),
            "intermediate" => Ok(Tier::Intermediate),
            "advanced" => Ok(Tier::Advanced),
            _ => Err(GameError::UnknownTier(s.to_string())),
        }
    }
}

/// A city in the catalog. Loaded once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub country: String,
    pub continent: String,
    pub population: u64,
    pub is_capital: bool,
    /// Prominence rank, lower = more prominent
    pub city_rank: u32,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub airport_codes: Vec<String>,
    #[serde(default)]
    pub landmarks: Vec<String>,
    /// State, province or other subdivision
    #[serde(default)]
    pub region: String,
}

impl City {
    /// Minimal city with placeholder statistics, mostly useful for tests and fixtures
    pub fn new(name: impl Into<String>, country: impl Into<String>, continent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            continent: continent.into(),
            population: 0,
            is_capital: false,
            city_rank: 0,
            lat: 0.0,
            lon: 0.0,
            airport_codes: Vec::new(),
            landmarks: Vec::new(),
            region: String::new(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.lat = lat;
        self.lon = lon;
        self
    }

    pub fn with_landmarks(mut self, landmarks: Vec<String>) -> Self {
        self.landmarks = landmarks;
        self
    }

    /// Alias for `region`
    pub fn state_province(&self) -> &str {
        &self.region
    }

    /// Human-readable "Region, Country" (or just the country when no region is known)
    pub fn location_label(&self) -> String {
        if self.region.is_empty() {
            self.country.clone()
        } else {
            format!("{}, {}", self.region, self.country)
        }
    }

    /// Case-insensitive substring match against region, continent or country
    pub fn matches_region_hint(&self, hint: &str) -> bool {
        let hint = hint.to_lowercase();
        self.region.to_lowercase().contains(&hint)
            || self.continent.to_lowercase().contains(&hint)
            || self.country.to_lowercase().contains(&hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_parse_roundtrip() {
        for tier in Tier::ALL {
            assert_eq!(tier.as_str().parse::<Tier>().unwrap(), tier);
        }
    }

    #[test]
    fn test_tier_parse_is_exact() {
        for input in [" advanced", "ADVANCED", "Beginner", "intermediate "] {
            assert!(matches!(input.parse::<Tier>(), Err(GameError::UnknownTier(_))), "{:?}", input);
        }
    }

    #[test]
    fn test_invalid_tier_is_unknown_tier() {
        let err = "invalid_tier".parse::<Tier>().unwrap_err();
        assert!(matches!(err, GameError::UnknownTier(ref s) if s == "invalid_tier"));
    }

    #[test]
    fn test_tier_serialization() {
        let json = serde_json::to_string(&Tier::Intermediate).unwrap();
        assert_eq!(json, "\"intermediate\"");
    }

    #[test]
    fn test_city_deserialization_defaults_optional_lists() {
        let json = r#"{
            "name": "Lima",
            "country": "Peru",
            "continent": "South America",
            "population": 10000000,
            "is_capital": true,
            "city_rank": 1,
            "lat": -12.05,
            "lon": -77.04
        }"#;
        let city: City = serde_json::from_str(json).unwrap();
        assert_eq!(city.name, "Lima");
        assert!(city.airport_codes.is_empty());
        assert!(city.landmarks.is_empty());
        assert_eq!(city.state_province(), "");
        assert_eq!(city.location_label(), "Peru");
    }

    #[test]
    fn test_region_hint_is_case_insensitive() {
        let city = City::new("Kyoto", "Japan", "Asia").with_region("Kansai");
        assert!(city.matches_region_hint("kansai"));
        assert!(city.matches_region_hint("ASIA"));
        assert!(city.matches_region_hint("jap"));
        assert!(!city.matches_region_hint("Europe"));
    }
}
