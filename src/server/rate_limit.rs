use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(60);

/// Sliding one-minute window. Returns false (and records nothing) when the
/// client is already at `max_per_minute`.
pub fn check_rate_limit(entries: &mut Vec<Instant>, now: Instant, max_per_minute: usize) -> bool {
    if let Some(cutoff) = now.checked_sub(WINDOW) {
        entries.retain(|t| *t > cutoff);
    }
    if entries.len() >= max_per_minute {
        return false;
    }
    entries.push(now);
    true
}

/// Drop clients with no requests left in the window
pub fn prune_empty_entries(limiter: &mut HashMap<IpAddr, Vec<Instant>>, now: Instant) {
    if let Some(cutoff) = now.checked_sub(WINDOW) {
        for entries in limiter.values_mut() {
            entries.retain(|t| *t > cutoff);
        }
    }
    limiter.retain(|_, entries| !entries.is_empty());
}
