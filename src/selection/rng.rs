//! Per-call random generators
//!
//! Every selection call owns its generator. A seed string hashes (SHA-256)
//! into a ChaCha seed, so the same string always reproduces the same draws
//! and no other call can disturb them.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Generator for one selection call. Blank seeds fall back to entropy.
pub fn selection_rng(seed: Option<&str>) -> ChaCha8Rng {
    match seed.filter(|s| !s.is_empty()) {
        Some(seed) => seeded_rng(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Deterministic generator derived from a seed string
pub fn seeded_rng(seed: &str) -> ChaCha8Rng {
    let digest: [u8; 32] = Sha256::digest(seed.as_bytes()).into();
    ChaCha8Rng::from_seed(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = seeded_rng("abc");
        let mut b = seeded_rng("abc");
        for _ in 0..16 {
            assert_eq!(a.gen::<u64>(), b.gen::<u64>());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = seeded_rng("abc");
        let mut b = seeded_rng("abd");
        let a_draws: Vec<u64> = (0..4).map(|_| a.gen()).collect();
        let b_draws: Vec<u64> = (0..4).map(|_| b.gen()).collect();
        assert_ne!(a_draws, b_draws);
    }

    #[test]
    fn test_blank_seed_is_not_deterministic_seed() {
        let mut blank = selection_rng(Some(""));
        let mut empty_hash = seeded_rng("");
        // Entropy colliding with the hash of "" over four draws is not a real outcome
        let a: Vec<u64> = (0..4).map(|_| blank.gen()).collect();
        let b: Vec<u64> = (0..4).map(|_| empty_hash.gen()).collect();
        assert_ne!(a, b);
    }
}
