//! Integration tests for loading the city catalog from disk
//!
//! A broken or missing tier file must not take the whole catalog down:
//! the tier is left empty and only selections on that tier fail.

use std::fs;
use std::path::Path;

use city_persona::catalog::load_catalog;
use city_persona::core::error::GameError;
use city_persona::core::types::Tier;
use city_persona::selection::{BatchRequest, CitySelectionEngine};

fn write_tier(dir: &Path, tier: &str, body: &str) {
    fs::write(dir.join(format!("{}_cities.json", tier)), body).unwrap();
}

fn city_json(name: &str, country: &str, continent: &str) -> String {
    format!(
        r#"{{"name": "{}", "country": "{}", "continent": "{}", "population": 1000,
            "is_capital": false, "city_rank": 3, "lat": 1.5, "lon": -2.5,
            "airport_codes": [], "landmarks": ["Old Bridge"], "region": "North"}}"#,
        name, country, continent
    )
}

#[test]
fn test_broken_tiers_degrade_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    write_tier(
        dir.path(),
        "beginner",
        &format!(
            r#"{{"beginner": [{}, {}]}}"#,
            city_json("Alpha", "Aland", "Europe"),
            city_json("Beta", "Bland", "Asia")
        ),
    );
    write_tier(dir.path(), "intermediate", "{ this is not json");
    // advanced_cities.json deliberately missing

    let catalog = load_catalog(dir.path());

    let stats = catalog.difficulty_stats();
    assert_eq!(stats[&Tier::Beginner], 2);
    assert_eq!(stats[&Tier::Intermediate], 0);
    assert_eq!(stats[&Tier::Advanced], 0);

    let engine = CitySelectionEngine::new(catalog);
    assert!(engine.select_city(Tier::Beginner, None, None).is_ok());
    assert!(matches!(
        engine.select_city(Tier::Intermediate, None, None),
        Err(GameError::NoCitiesAvailable(Tier::Intermediate))
    ));
    assert!(matches!(
        engine.select_cities_for_game_deterministic(&BatchRequest::new(Tier::Advanced)),
        Err(GameError::NoCitiesAvailable(Tier::Advanced))
    ));
}

#[test]
fn test_tier_key_must_match_file() {
    let dir = tempfile::tempdir().unwrap();
    write_tier(
        dir.path(),
        "advanced",
        &format!(r#"{{"beginner": [{}]}}"#, city_json("Gamma", "Gland", "Africa")),
    );

    let catalog = load_catalog(dir.path());
    assert!(catalog.cities_for(Tier::Advanced).is_empty());
    assert!(catalog.is_empty());
}

#[test]
fn test_loaded_fields() {
    let dir = tempfile::tempdir().unwrap();
    write_tier(
        dir.path(),
        "intermediate",
        &format!(r#"{{"intermediate": [{}]}}"#, city_json("Delta", "Dland", "Oceania")),
    );

    let catalog = load_catalog(dir.path());
    let city = catalog.find_by_name("DELTA").unwrap();
    assert_eq!(city.region, "North");
    assert_eq!(city.landmarks, vec!["Old Bridge"]);
    assert!((city.lon + 2.5).abs() < 1e-9);
    assert_eq!(catalog.continent_of("Delta"), Some("Oceania"));
}

#[test]
fn test_bundled_catalog() {
    let data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    let catalog = load_catalog(&data_dir);

    for tier in Tier::ALL {
        assert!(
            catalog.cities_for(tier).len() >= 10,
            "{} tier too small for a game",
            tier
        );
    }

    // Every tier spans enough continents for the default two-per-continent cap
    let engine = CitySelectionEngine::new(catalog);
    for tier in Tier::ALL {
        let request = BatchRequest::new(tier).with_seed("bundled");
        let cities = engine.select_cities_for_game_deterministic(&request).unwrap();
        assert_eq!(cities.len(), 5);
        let stats = engine.continental_diversity_stats(&cities);
        assert!(stats.values().all(|&n| n <= 2), "{} batch over cap: {:?}", tier, stats);
    }
}
