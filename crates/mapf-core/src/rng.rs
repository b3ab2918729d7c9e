//! Deterministic RNG for planner-side randomness.
//!
//! # Determinism strategy
//!
//! The planner holds exactly one RNG stream per concern (e.g. one for the
//! deadlock handler's random hops).  Streams are derived from the run's
//! global seed:
//!
//!   stream_seed = global_seed XOR (tag * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive tags uniformly across the seed space.  This
//! means:
//!
//! - The same seed always reproduces the same sequence of random hops.
//! - Adding a new derived stream never disturbs existing ones.
//! - All draws are local to the single planning thread; no synchronisation.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// A deterministic `SmallRng` stream owned by one planner component.
pub struct PlannerRng(SmallRng);

impl PlannerRng {
    /// Seed directly from the run's global seed.
    pub fn new(seed: u64) -> Self {
        PlannerRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive an independent stream for a sub-component.
    ///
    /// `tag` identifies the consumer; distinct tags give decorrelated but
    /// reproducible streams from the same global seed.
    pub fn derived(seed: u64, tag: u64) -> Self {
        PlannerRng(SmallRng::seed_from_u64(
            seed ^ tag.wrapping_mul(MIXING_CONSTANT),
        ))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Choose a random element from a slice.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }
}
