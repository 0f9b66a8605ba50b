//! Read-only per-tick view of the surface, handed to observers/output.
//!
//! Captured strictly after all per-tick mutation, so every row is internally
//! consistent with every other.

use asim_core::{AircraftId, AircraftState, GeoPoint, NodeId, Tick};
use asim_surface::SurfaceGraph;

use crate::flight::FlightKind;
use crate::ground::Ground;

/// One active aircraft's externally visible state.
#[derive(Clone, Debug)]
pub struct AircraftSnapshot {
    pub aircraft: AircraftId,
    pub callsign: String,
    pub kind: FlightKind,
    pub state: AircraftState,
    pub speed_mps: f64,
    pub position: GeoPoint,
    pub coarse_node: NodeId,
    /// Distance left to the destination, metres.
    pub remaining_m: f64,
    pub scheduler_delays: usize,
    pub uncertainty_delays: usize,
}

/// Everything an external sink needs about one tick.
#[derive(Clone, Debug)]
pub struct GroundSnapshot {
    pub tick: Tick,
    pub unix_time_secs: i64,
    /// Active aircraft, ascending `AircraftId`.
    pub aircraft: Vec<AircraftSnapshot>,
    pub takeoff_count: u64,
    pub arrival_count: u64,
    /// Conflicts the latest scheduling pass gave up on.
    pub unresolved_conflicts: u64,
}

impl GroundSnapshot {
    /// Capture the current surface state.  Call only after all per-tick
    /// mutation for `tick` has finished.
    pub fn capture(
        ground: &Ground,
        tick: Tick,
        unix_time_secs: i64,
        unresolved_conflicts: u64,
        surface: &SurfaceGraph,
    ) -> Self {
        let aircraft = ground
            .store
            .active_ids()
            .into_iter()
            .map(|id| {
                let i = id.index();
                let it = ground.store.itinerary[i].as_ref();
                AircraftSnapshot {
                    aircraft: id,
                    callsign: ground.store.callsign[i].clone(),
                    kind: ground.store.kind[i],
                    state: ground.store.state_of(id, surface),
                    speed_mps: ground.store.speed_mps[i],
                    position: ground.store.precise_position(id, surface),
                    coarse_node: ground.store.coarse_location(id, surface),
                    remaining_m: it.map_or(0.0, |it| it.remaining_m()),
                    scheduler_delays: it.map_or(0, |it| it.n_scheduler_delays()),
                    uncertainty_delays: it.map_or(0, |it| it.n_uncertainty_delays()),
                }
            })
            .collect();

        Self {
            tick,
            unix_time_secs,
            aircraft,
            takeoff_count: ground.takeoff_count,
            arrival_count: ground.arrival_count,
            unresolved_conflicts,
        }
    }
}
