//! The shared random source.
//!
//! A run threads a single [`SimRng`] through every stochastic step, so two populations built
//! from the same seed and driven through the same calls follow identical trajectories.
use std::hash::Hasher;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rustc_hash::FxHasher;

/// The generator owned by each population.
pub type SimRng = SmallRng;

#[must_use]
pub fn rng_from_seed(seed: u64) -> SimRng {
    SimRng::seed_from_u64(seed)
}

/// A deterministic hash of a `&str`. The standard library hasher is randomly seeded per process,
/// so it cannot be used to derive seeds.
#[must_use]
pub fn hash_str(data: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(data.as_bytes());
    hasher.finish()
}

/// Derives an independent seed for a named stream (for example one trial of a policy) from a
/// base seed.
#[must_use]
pub fn derive_seed(base_seed: u64, label: &str) -> u64 {
    base_seed.wrapping_add(hash_str(label))
}
