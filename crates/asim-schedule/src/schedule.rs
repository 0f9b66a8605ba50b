//! The output of a scheduling pass, and the scheduler's configuration.

use rustc_hash::FxHashMap;

use asim_core::AircraftId;
use asim_itinerary::Itinerary;

/// Scheduler parameters, supplied externally once per run.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchedulerConfig {
    /// How many ticks the speculative sandbox runs ahead of the live
    /// simulation per resolution attempt.
    pub lookahead_ticks: u32,
    /// Per-conflict delay-insertion budget before the conflict is declared a
    /// deadlock and abandoned.
    pub max_resolve_attempts: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            lookahead_ticks: 60,
            max_resolve_attempts: 6,
        }
    }
}

/// What one scheduling pass produced: an itinerary per scheduled aircraft
/// plus the pass's resolution counters.
#[derive(Clone, Debug, Default)]
pub struct Schedule {
    /// The assignment at the end of the pass (scheduler delays included).
    pub itineraries: FxHashMap<AircraftId, Itinerary>,
    /// Holds injected to resolve predicted conflicts.
    pub delays_added: usize,
    /// Conflicts the pass gave up on (both-holding or attempt budget
    /// exhausted).  The involved aircraft proceed undelayed.
    pub unsolved_conflicts: usize,
}
