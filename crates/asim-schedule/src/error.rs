//! Scheduling error types.

use thiserror::Error;

use asim_core::AircraftId;
use asim_surface::SurfaceError;

/// Fatal errors of a scheduling pass.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// No path exists for an aircraft's assignment.  The scheduler never
    /// silently hands out an empty route.
    #[error("routing failed for {aircraft} ({callsign})")]
    Routing {
        aircraft: AircraftId,
        callsign: String,
        #[source]
        source: SurfaceError,
    },
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Why one conflict could not be resolved.  Non-fatal: the pass records the
/// conflict as unsolvable and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Both aircraft are already holding (or no delayable itinerary exists) —
    /// an uncertainty-generated situation no additional delay can untangle.
    Unsolvable(u64),
    /// The per-conflict attempt budget ran out; the last delay was retracted.
    Deadlock(u64),
}

impl ResolutionOutcome {
    /// The content identity of the conflict that was given up on.
    pub fn conflict_id(self) -> u64 {
        match self {
            ResolutionOutcome::Unsolvable(id) | ResolutionOutcome::Deadlock(id) => id,
        }
    }
}
