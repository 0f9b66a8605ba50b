//! Gate-corridor admission control.
//!
//! The only bidirectional edges on the surface are the gate↔spot corridors.
//! Each corridor is anchored at its *flow spot*; a signed occupancy counter
//! per canonical flow spot tracks who is inside:
//!
//! - positive `n` — `n` arrivals past the flow spot, still short of their
//!   gates;
//! - negative `n` — `n` departures pushed back from their gates, still short
//!   of the flow spot.
//!
//! Departures are admitted onto the surface only while their corridor's
//! counter is ≤ 0.  Arrivals always keep moving toward the gate but are held
//! short of the flow spot while departures occupy the corridor.  This is an
//! admission gate, not a lock: it never blocks an agent already inside.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use asim_core::{AircraftId, NodeId};
use asim_surface::SurfaceGraph;

/// Keeps opposite-direction traffic out of a shared gate↔spot corridor.
#[derive(Clone, Debug, Default)]
pub struct CorridorAdmissionController {
    /// Canonical flow spot → signed corridor occupancy.
    access: FxHashMap<NodeId, i32>,
    /// Arrival aircraft → destination gate.
    arrival_gate: FxHashMap<AircraftId, NodeId>,
    /// Departure aircraft → origin gate.
    departure_gate: FxHashMap<AircraftId, NodeId>,
    /// Arrivals already counted into their corridor.  The surface graph is
    /// drawn by hand, so several nearly-coincident nodes may match one flow
    /// spot; the visited set prevents double counting.
    visited_arrivals: FxHashSet<AircraftId>,
}

impl CorridorAdmissionController {
    pub fn new() -> Self {
        Self::default()
    }

    fn corridor_of(&self, gate: NodeId, surface: &SurfaceGraph) -> Option<NodeId> {
        surface.flow_spot_of(gate).map(|s| surface.canonical_of(s))
    }

    // ── Arrivals ──────────────────────────────────────────────────────────

    /// Start tracking an arrival headed for `gate`.
    pub fn register_arrival(&mut self, aircraft: AircraftId, gate: NodeId) {
        self.arrival_gate.insert(aircraft, gate);
    }

    /// May this arrival keep moving this tick?
    ///
    /// Always yes while its flow spot is outside the lookahead window or
    /// once it is already inside the corridor.  On first approach the
    /// corridor must be free of departures (counter ≥ 0); admission counts
    /// the arrival in immediately.
    pub fn arrival_may_advance(
        &mut self,
        aircraft: AircraftId,
        ahead: &[(NodeId, f64)],
        surface: &SurfaceGraph,
    ) -> bool {
        if self.visited_arrivals.contains(&aircraft) {
            return true;
        }
        let Some(&gate) = self.arrival_gate.get(&aircraft) else {
            return true;
        };
        let Some(spot) = self.corridor_of(gate, surface) else {
            return true;
        };
        let approaching = ahead
            .iter()
            .any(|&(node, _)| surface.canonical_of(node) == spot);
        if !approaching {
            return true;
        }

        let counter = self.access.entry(spot).or_insert(0);
        if *counter >= 0 {
            *counter += 1;
            self.visited_arrivals.insert(aircraft);
            debug!(%aircraft, flow_spot = %spot, occupancy = *counter, "arrival entered corridor");
            true
        } else {
            false
        }
    }

    /// The arrival reached its gate: count it out and stop tracking it.
    pub fn complete_arrival(&mut self, aircraft: AircraftId, surface: &SurfaceGraph) {
        let Some(gate) = self.arrival_gate.remove(&aircraft) else {
            return;
        };
        if self.visited_arrivals.remove(&aircraft)
            && let Some(spot) = self.corridor_of(gate, surface)
        {
            *self.access.entry(spot).or_insert(0) -= 1;
        }
    }

    // ── Departures ────────────────────────────────────────────────────────

    /// May a departure be admitted onto the surface at `gate` right now?
    ///
    /// Only while no arrival occupies the gate's corridor.  Gates without a
    /// corridor are unguarded.
    pub fn may_admit_departure(&self, gate: NodeId, surface: &SurfaceGraph) -> bool {
        match self.corridor_of(gate, surface) {
            Some(spot) => self.access.get(&spot).copied().unwrap_or(0) <= 0,
            None => true,
        }
    }

    /// Admit a departure at `gate`: count it into the corridor.
    ///
    /// Callers check [`may_admit_departure`](Self::may_admit_departure)
    /// first; admission is unconditional here.
    pub fn register_departure(
        &mut self,
        aircraft: AircraftId,
        gate: NodeId,
        surface: &SurfaceGraph,
    ) {
        self.departure_gate.insert(aircraft, gate);
        if let Some(spot) = self.corridor_of(gate, surface) {
            let counter = self.access.entry(spot).or_insert(0);
            *counter -= 1;
            debug!(%aircraft, flow_spot = %spot, occupancy = *counter, "departure entered corridor");
        }
    }

    /// A departure completed links this tick; if its flow spot is among the
    /// passed end nodes it has left the corridor — count it out and stop
    /// tracking it.
    pub fn note_departure_passed(
        &mut self,
        aircraft: AircraftId,
        passed: &[NodeId],
        surface: &SurfaceGraph,
    ) {
        let Some(&gate) = self.departure_gate.get(&aircraft) else {
            return;
        };
        let Some(spot) = self.corridor_of(gate, surface) else {
            self.departure_gate.remove(&aircraft);
            return;
        };
        let crossed = passed
            .iter()
            .any(|&node| surface.canonical_of(node) == spot);
        if crossed {
            *self.access.entry(spot).or_insert(0) += 1;
            self.departure_gate.remove(&aircraft);
        }
    }

    /// Forget a departure that leaves the surface without crossing its flow
    /// spot; its corridor slot is handed back.
    pub fn remove_departure(&mut self, aircraft: AircraftId, surface: &SurfaceGraph) {
        let Some(gate) = self.departure_gate.remove(&aircraft) else {
            return;
        };
        if let Some(spot) = self.corridor_of(gate, surface) {
            *self.access.entry(spot).or_insert(0) += 1;
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// `true` if `aircraft` is tracked as an arrival.
    pub fn is_arrival(&self, aircraft: AircraftId) -> bool {
        self.arrival_gate.contains_key(&aircraft)
    }

    /// The signed occupancy of the corridor anchored at `spot` (0 when
    /// untouched).
    pub fn occupancy(&self, spot: NodeId, surface: &SurfaceGraph) -> i32 {
        self.access
            .get(&surface.canonical_of(spot))
            .copied()
            .unwrap_or(0)
    }
}
