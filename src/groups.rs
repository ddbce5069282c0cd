//! Group assignment.
//!
//! Each particle carries one integer group tag, generated once at
//! construction and shared between the velocity texture's 4th channel and
//! the rendering consumer's color attributes, so visual grouping and
//! simulated grouping always agree.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Stable per-particle group ids in `0..group_count`.
#[derive(Clone, Debug)]
pub struct GroupAssignment {
    ids: Vec<u32>,
    group_count: u32,
}

impl GroupAssignment {
    /// Generate one id per particle. Deterministic for a given
    /// `(particle_count, group_count, seed)` triple.
    pub fn generate(particle_count: u32, group_count: u32, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let ids = (0..particle_count)
            .map(|_| rng.gen_range(0..group_count))
            .collect();

        Self { ids, group_count }
    }

    /// Group id of particle `index`.
    pub fn id(&self, index: usize) -> u32 {
        self.ids[index]
    }

    /// All ids, in particle order.
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn group_count(&self) -> u32 {
        self.group_count
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
