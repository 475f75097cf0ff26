//! Sample Game
//! Select a game batch offline and print it with its continental spread

use std::path::PathBuf;

use city_persona::catalog::{continental_diversity_stats, load_catalog};
use city_persona::core::types::Tier;
use city_persona::selection::CitySelectionEngine;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Sample Game - preview the cities a game session would use
#[derive(Parser, Debug)]
#[command(name = "sample_game")]
#[command(about = "Select a batch of cities for one game and print it")]
struct Args {
    /// Difficulty tier: beginner, intermediate or advanced
    #[arg(long, default_value = "beginner")]
    difficulty: String,

    /// Cities in the batch
    #[arg(long, default_value_t = 5)]
    count: usize,

    /// Seed for reproducible batches
    #[arg(long)]
    seed: Option<String>,

    /// Prefer cities whose region, country or continent contains this text
    #[arg(long)]
    region: Option<String>,

    /// Maximum cities from one continent
    #[arg(long, default_value_t = 2)]
    max_per_continent: usize,

    /// Number of consecutive games to draw
    #[arg(long, default_value_t = 1)]
    games: usize,

    /// Use the history-consulting selector instead of the deterministic one
    #[arg(long, default_value_t = false)]
    with_history: bool,

    /// Directory holding <tier>_cities.json files
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("city_persona=warn")),
        )
        .init();

    let args = Args::parse();
    let tier: Tier = args.difficulty.parse()?;
    let engine = CitySelectionEngine::new(load_catalog(&args.data_dir));

    for game in 0..args.games {
        let mut request = engine
            .batch_request(tier)
            .with_count(args.count)
            .with_max_per_continent(args.max_per_continent);
        if let Some(seed) = &args.seed {
            // Distinct but reproducible seed per game
            request = request.with_seed(format!("{}-{}", seed, game));
        }
        if let Some(region) = &args.region {
            request = request.with_region_hint(region.clone());
        }

        let cities = if args.with_history {
            engine.select_cities_for_game(&request)?
        } else {
            engine.select_cities_for_game_deterministic(&request)?
        };

        println!("=== Game {} ({}) ===", game + 1, tier);
        for (i, city) in cities.iter().enumerate() {
            println!(
                "{:>2}. {:<20} {:<20} {}",
                i + 1,
                city.name,
                city.country,
                city.continent
            );
        }
        if cities.len() < args.count {
            println!("(only {} of {} cities available)", cities.len(), args.count);
        }
        for (continent, n) in continental_diversity_stats(&cities) {
            println!("    {}: {}", continent, n);
        }
        println!();
    }

    Ok(())
}
