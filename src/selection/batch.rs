//! Multi-city game batches with a per-continent cap
//!
//! Each slot is filled from the strictest non-empty rung of a relaxation
//! ladder. The history-consulting variant also folds every pick into global
//! history as it goes; the deterministic variant never looks at history.

use ahash::AHashMap;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::CityCatalog;
use crate::core::config::SelectionConfig;
use crate::core::error::Result;
use crate::core::types::{City, Tier};
use crate::selection::history::SelectionHistory;

/// Parameters for a game batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    pub tier: Tier,
    pub count: usize,
    pub seed: Option<String>,
    pub region_hint: Option<String>,
    pub max_per_continent: usize,
}

impl BatchRequest {
    /// Request with the default count and continent cap
    pub fn new(tier: Tier) -> Self {
        let defaults = SelectionConfig::default();
        Self {
            tier,
            count: defaults.default_batch_count,
            seed: None,
            region_hint: None,
            max_per_continent: defaults.default_max_per_continent,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    pub fn with_region_hint(mut self, hint: impl Into<String>) -> Self {
        self.region_hint = Some(hint.into());
        self
    }

    pub fn with_max_per_continent(mut self, max: usize) -> Self {
        self.max_per_continent = max;
        self
    }
}

/// State for one batch call: continent usage and picks so far
#[derive(Debug, Default)]
struct BatchSession {
    continent_counts: AHashMap<String, usize>,
    chosen: Vec<City>,
}

impl BatchSession {
    fn with_capacity(count: usize) -> Self {
        Self {
            continent_counts: AHashMap::new(),
            chosen: Vec::with_capacity(count),
        }
    }

    fn contains(&self, city: &City) -> bool {
        self.chosen.iter().any(|c| c.name == city.name)
    }

    fn continent_has_room(&self, city: &City, max_per_continent: usize) -> bool {
        self.continent_counts.get(&city.continent).copied().unwrap_or(0) < max_per_continent
    }

    /// Not yet chosen and its continent is under the cap
    fn admits(&self, city: &City, max_per_continent: usize) -> bool {
        !self.contains(city) && self.continent_has_room(city, max_per_continent)
    }

    fn push(&mut self, city: City) {
        *self.continent_counts.entry(city.continent.clone()).or_insert(0) += 1;
        self.chosen.push(city);
    }
}

/// Tier cities, narrowed to a region hint when enough of them match to fill the batch
fn candidate_pool<'a>(available: &'a [City], request: &BatchRequest) -> Vec<&'a City> {
    let all: Vec<&City> = available.iter().collect();
    let Some(hint) = request.region_hint.as_deref().filter(|h| !h.is_empty()) else {
        return all;
    };

    let matching: Vec<&City> = all
        .iter()
        .copied()
        .filter(|city| city.matches_region_hint(hint))
        .collect();
    if matching.len() >= request.count {
        matching
    } else {
        tracing::debug!(
            "Region hint {:?} matches {} cities, fewer than {} requested; ignoring",
            hint,
            matching.len(),
            request.count
        );
        all
    }
}

/// Draw from the first rung of `ladder` with any admitted candidate.
/// Returns the city and the rung index it came from.
fn draw_from_ladder<'a, R: Rng + ?Sized>(
    pool: &[&'a City],
    ladder: &[&dyn Fn(&City) -> bool],
    rng: &mut R,
) -> Option<(&'a City, usize)> {
    for (rung, admits) in ladder.iter().enumerate() {
        let candidates: Vec<&City> = pool.iter().copied().filter(|city| admits(city)).collect();
        if let Some(city) = candidates.choose(rng) {
            return Some((*city, rung));
        }
    }
    None
}

/// Build a batch consulting and updating global history
///
/// Ladder per slot:
/// 0. unchosen, continent under cap, city and country not recent
/// 1. unchosen, city not recent
/// 2. unchosen
///
/// Returns fewer than `request.count` cities when the tier runs out.
pub fn select_cities_for_game<R: Rng + ?Sized>(
    catalog: &CityCatalog,
    history: &mut SelectionHistory,
    request: &BatchRequest,
    rng: &mut R,
) -> Result<Vec<City>> {
    let available = catalog.require_cities(request.tier)?;
    let pool = candidate_pool(available, request);
    let max = request.max_per_continent;
    let mut session = BatchSession::with_capacity(request.count);

    for _ in 0..request.count {
        let drawn = {
            let ladder: [&dyn Fn(&City) -> bool; 3] = [
                &|c: &City| session.admits(c, max) && history.is_fresh(c),
                &|c: &City| !session.contains(c) && !history.recent_cities().contains(&c.name),
                &|c: &City| !session.contains(c),
            ];
            draw_from_ladder(&pool, &ladder, rng)
        };

        let Some((city, rung)) = drawn else {
            tracing::debug!(
                "{} tier exhausted after {} of {} cities",
                request.tier,
                session.chosen.len(),
                request.count
            );
            break;
        };
        if rung > 0 {
            tracing::debug!("Relaxed batch constraints to rung {} for {}", rung, city.name);
        }

        history.record(city);
        session.push(city.clone());
    }

    Ok(session.chosen)
}

/// Build a batch from the catalog alone
///
/// Ladder per slot:
/// 0. unchosen, continent under cap
/// 1. unchosen
///
/// History is neither read nor written, so the output depends only on the
/// request and the generator.
pub fn select_cities_for_game_deterministic<R: Rng + ?Sized>(
    catalog: &CityCatalog,
    request: &BatchRequest,
    rng: &mut R,
) -> Result<Vec<City>> {
    let available = catalog.require_cities(request.tier)?;
    let pool = candidate_pool(available, request);
    let max = request.max_per_continent;
    let mut session = BatchSession::with_capacity(request.count);

    for _ in 0..request.count {
        let drawn = {
            let ladder: [&dyn Fn(&City) -> bool; 2] = [
                &|c: &City| session.admits(c, max),
                &|c: &City| !session.contains(c),
            ];
            draw_from_ladder(&pool, &ladder, rng)
        };

        let Some((city, rung)) = drawn else {
            break;
        };
        if rung > 0 {
            tracing::debug!("Continent cap {} relaxed for {}", max, city.name);
        }

        session.push(city.clone());
    }

    Ok(session.chosen)
}
