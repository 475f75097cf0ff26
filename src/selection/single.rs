//! Single-city selection with recency and continental balancing
//!
//! A greedy heuristic: each narrowing step only applies when it leaves at
//! least one candidate, so short-term non-repetition wins over strict
//! uniformity but a draw is always possible for a non-empty tier.

use ahash::AHashMap;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::CityCatalog;
use crate::core::config::SelectionConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::{City, Tier};
use crate::selection::history::SelectionHistory;

/// Pick one city for `tier` and record it in `history`
pub fn select_city<R: Rng + ?Sized>(
    catalog: &CityCatalog,
    history: &mut SelectionHistory,
    config: &SelectionConfig,
    tier: Tier,
    region_hint: Option<&str>,
    rng: &mut R,
) -> Result<City> {
    let available = catalog.require_cities(tier)?;

    let mut candidates: Vec<&City> = available
        .iter()
        .filter(|city| history.is_fresh(city))
        .collect();

    if candidates.len() < config.min_diverse_candidates {
        tracing::debug!(
            "Only {} fresh {} cities, compacting history",
            candidates.len(),
            tier
        );
        history.compact();
        candidates = available.iter().collect();
    }

    if let Some(hint) = region_hint.filter(|h| !h.is_empty()) {
        candidates = narrow(candidates, |city| city.matches_region_hint(hint));
    }

    if let Some(least_used) = least_used_continents(catalog, history) {
        candidates = narrow(candidates, |city| least_used.contains(&city.continent.as_str()));
    }

    if candidates.is_empty() {
        candidates = available.iter().collect();
    }

    let selected = candidates
        .choose(rng)
        .map(|city| (*city).clone())
        .ok_or(GameError::NoCitiesAvailable(tier))?;

    history.record(&selected);
    Ok(selected)
}

/// Apply a filter only if it keeps at least one candidate
fn narrow<'a>(candidates: Vec<&'a City>, keep: impl Fn(&City) -> bool) -> Vec<&'a City> {
    let narrowed: Vec<&City> = candidates.iter().copied().filter(|c| keep(c)).collect();
    if narrowed.is_empty() {
        candidates
    } else {
        narrowed
    }
}

/// Continents with the lowest tally among recently selected cities
///
/// Only continents that appear in history are tallied, so `None` is returned
/// when history is empty or names nothing in the catalog.
fn least_used_continents<'a>(
    catalog: &'a CityCatalog,
    history: &SelectionHistory,
) -> Option<Vec<&'a str>> {
    let mut tally: AHashMap<&str, usize> = AHashMap::new();
    for name in history.recent_cities().iter() {
        if let Some(continent) = catalog.continent_of(name) {
            *tally.entry(continent).or_insert(0) += 1;
        }
    }

    let min = *tally.values().min()?;
    Some(
        tally
            .into_iter()
            .filter(|&(_, count)| count == min)
            .map(|(continent, _)| continent)
            .collect(),
    )
}
