//! Deterministic per-unit RNG streams.
//!
//! # Determinism strategy
//!
//! Every independent unit of work (a household draw, a work origin, a
//! person's secondary activities, one facility draw) gets its own `SmallRng`
//! seeded by:
//!
//!   seed = global_seed XOR (unit * MIXING_CONSTANT) XOR (stream * STREAM_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive unit IDs uniformly across the seed space.
//! This means:
//!
//! - Units never share RNG state, so Rayon workers need no synchronisation.
//! - Results do not depend on processing order or thread count.
//! - Each pipeline stage draws from its own `Stream`, so adding a draw to one
//!   stage never shifts the random numbers seen by another.

use rand::distributions::WeightedIndex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;
/// Second odd constant (from SplitMix64) separating stage streams.
const STREAM_CONSTANT: u64 = 0xbf58_476d_1ce4_e5b9;

/// The pipeline stage a random stream belongs to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stream {
    Matching,
    WorkAssignment,
    Secondary,
    Facility,
}

impl Stream {
    fn tag(self) -> u64 {
        match self {
            Stream::Matching       => 1,
            Stream::WorkAssignment => 2,
            Stream::Secondary      => 3,
            Stream::Facility       => 4,
        }
    }
}

// ── UnitRng ───────────────────────────────────────────────────────────────────

/// Per-unit deterministic RNG.
///
/// Create one per unit of work right where it is processed; never share one
/// across threads.
pub struct UnitRng(SmallRng);

impl UnitRng {
    /// Seed deterministically from the run's global seed, the stage stream and
    /// a unit id.
    pub fn new(global_seed: u64, stream: Stream, unit: u64) -> Self {
        let seed = global_seed
            ^ unit.wrapping_mul(MIXING_CONSTANT)
            ^ stream.tag().wrapping_mul(STREAM_CONSTANT);
        UnitRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
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

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }

    /// Choose a random element from a slice.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }

    /// Draw an index with probability proportional to `weights`.
    ///
    /// Returns `None` if `weights` is empty, contains a negative or
    /// non-finite value, or sums to zero.  Callers fall back to a uniform
    /// draw in that case.
    pub fn choose_weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        if weights.iter().any(|w| !w.is_finite()) {
            return None;
        }
        let dist = WeightedIndex::new(weights).ok()?;
        Some(self.0.sample(dist))
    }
}
