//! Deterministic per-aircraft and simulation-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each aircraft gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (aircraft_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive aircraft IDs uniformly across the seed space.
//! This means:
//!
//! - Aircraft never share RNG state (no ordering dependency between draws).
//! - Registering more flights at the end of the scenario does not disturb
//!   the seeds of existing aircraft — runs stay reproducible as scenarios
//!   grow.
//! - The scheduler's prediction sandbox never draws from these streams, so
//!   speculative re-simulation cannot desynchronise the live run.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::AircraftId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── AircraftRng ───────────────────────────────────────────────────────────────

/// Per-aircraft deterministic RNG.
///
/// Create one per aircraft at scenario registration; store in a parallel
/// `Vec<AircraftRng>` alongside the other arena arrays.  Drives the
/// uncertainty-delay draw for that aircraft only.
pub struct AircraftRng(SmallRng);

impl AircraftRng {
    /// Seed deterministically from the run's global seed and an aircraft ID.
    pub fn new(global_seed: u64, aircraft: AircraftId) -> Self {
        let seed = global_seed ^ (aircraft.0 as u64).wrapping_mul(MIXING_CONSTANT);
        AircraftRng(SmallRng::seed_from_u64(seed))
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
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for global operations (runway assignment rotation,
/// scenario shuffling, etc.).
///
/// Used only in single-threaded contexts.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` with a different seed offset — useful for
    /// seeding auxiliary streams deterministically from the root seed.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
