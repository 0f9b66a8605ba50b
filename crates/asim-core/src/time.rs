//! Simulation time model and run configuration.
//!
//! # Design
//!
//! Time is represented as a monotonically increasing `Tick` counter.  The
//! mapping to wall-clock time is held in `SimClock`:
//!
//!   wall_time = start_unix_secs + tick * tick_duration_secs
//!
//! Using an integer tick as the canonical time unit means all schedule
//! arithmetic is exact (no floating-point drift) and comparisons are O(1).
//!
//! The default tick duration is 1 s; surface movement is resolved at that
//! granularity and every per-tick travel distance is `speed * tick_secs`.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
///
/// Stored as `u64` to avoid overflow: at 1 tick/second a u64 lasts ~585
/// billion years, far longer than any conceivable run.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and Unix wall-clock seconds.
///
/// `SimClock` is cheap to copy and intentionally holds no heap data.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Unix timestamp (seconds since epoch) of tick 0.
    pub start_unix_secs: i64,
    /// How many real seconds one tick represents.  Default: 1.
    pub tick_duration_secs: u32,
    /// The current tick — advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    /// Create a clock starting at `start_unix_secs` with the given resolution.
    pub fn new(start_unix_secs: i64, tick_duration_secs: u32) -> Self {
        Self {
            start_unix_secs,
            tick_duration_secs,
            current_tick: Tick::ZERO,
        }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> i64 {
        self.current_tick.0 as i64 * self.tick_duration_secs as i64
    }

    /// Current Unix timestamp corresponding to `current_tick`.
    #[inline]
    pub fn current_unix_secs(&self) -> i64 {
        self.start_unix_secs + self.elapsed_secs()
    }

    /// Break elapsed time into (hour, minute, second) components from sim
    /// start.  Useful for human-readable logging without a datetime library.
    pub fn elapsed_hms(&self) -> (u64, u32, u32) {
        let total_secs = self.elapsed_secs().max(0) as u64;
        let hours = total_secs / 3_600;
        let minutes = ((total_secs % 3_600) / 60) as u32;
        let seconds = (total_secs % 60) as u32;
        (hours, minutes, seconds)
    }

    /// How many ticks span `secs` seconds? (rounds up — events won't be late)
    #[inline]
    pub fn ticks_for_secs(&self, secs: u64) -> u64 {
        secs.div_ceil(self.tick_duration_secs as u64)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = self.elapsed_hms();
        write!(f, "{} ({:02}:{:02}:{:02})", self.current_tick, h, m, s)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Constructed once at simulation start (typically loaded from a JSON file by
/// the application crate) and passed by reference into every component that
/// needs a numeric parameter; nothing reads configuration from global state.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Unix timestamp for tick 0.
    pub start_unix_secs: i64,

    /// Seconds per tick.  Default: 1.
    pub tick_duration_secs: u32,

    /// Total ticks to simulate.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Run a scheduling pass every N ticks.
    pub reschedule_interval_ticks: u64,

    /// Write output every N ticks.  1 = every tick; 0 disables snapshots.
    pub output_interval_ticks: u64,

    /// Two nodes within this distance are one physical point: they collapse
    /// to a single canonical identity for intersection locking.
    pub close_node_tolerance_m: f64,

    /// Two aircraft whose (predicted) precise positions come within this
    /// distance constitute a conflict.
    pub conflict_threshold_m: f64,

    /// How far ahead of an aircraft intersections are claimed for locking.
    /// Must exceed the longest per-tick travel distance so no aircraft can
    /// cross an intersection it never claimed.
    pub lock_lookahead_m: f64,

    /// Per-tick probability that a moving aircraft picks up one exogenous
    /// hold.  0 disables uncertainty injection.
    pub uncertainty_prob: f64,

    /// Minimum ticks between consecutive takeoffs on the same runway.
    pub departure_interval_ticks: u64,

    /// Upper bound on simultaneously active aircraft; later flights queue at
    /// their gates until the surface drains.
    pub max_active_aircraft: usize,
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Tick duration as seconds, for kinematic math.
    #[inline]
    pub fn tick_secs(&self) -> f64 {
        self.tick_duration_secs as f64
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.start_unix_secs, self.tick_duration_secs)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_unix_secs:           0,
            tick_duration_secs:        1,
            total_ticks:               3_600,
            seed:                      42,
            reschedule_interval_ticks: 60,
            output_interval_ticks:     1,
            close_node_tolerance_m:    3.0,
            conflict_threshold_m:      30.0,
            lock_lookahead_m:          120.0,
            uncertainty_prob:          0.0,
            departure_interval_ticks:  60,
            max_active_aircraft:       64,
        }
    }
}
