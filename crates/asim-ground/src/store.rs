//! The `AircraftStore` — arena of per-aircraft state.
//!
//! Parallel `Vec`s indexed by `AircraftId`, one slot per scenario flight for
//! the whole run.  An aircraft moves through three lifecycle flags:
//! `spawned` (has entered the system, possibly still queued), `active` (on
//! the surface), `done` (retired).  Everything in here is a value type, so
//! cloning the store snapshots the complete movement state.

use asim_core::{AircraftId, AircraftState, GeoPoint, LinkId, NodeId};
use asim_itinerary::Itinerary;
use asim_surface::{LinkKind, SurfaceGraph};

use crate::flight::{FlightKind, Scenario};

/// Per-aircraft state arrays.  Every `Vec` has exactly `count` elements.
#[derive(Clone, Debug)]
pub struct AircraftStore {
    pub count: usize,

    // ── Static flight data (copied from the scenario) ─────────────────────
    pub callsign: Vec<String>,
    pub kind: Vec<FlightKind>,
    pub gate: Vec<NodeId>,
    pub runway: Vec<LinkId>,

    // ── Lifecycle ─────────────────────────────────────────────────────────
    /// Has entered the system (active or waiting in a gate/runway queue).
    pub spawned: Vec<bool>,
    /// Currently moving or parked on the surface.
    pub active: Vec<bool>,
    /// Retired (departed or parked at the destination gate).
    pub done: Vec<bool>,

    // ── Kinematic state ───────────────────────────────────────────────────
    pub speed_mps: Vec<f64>,
    /// Node occupied when the itinerary provides no position: the gate for
    /// departures, the runway exit for arrivals.
    pub home: Vec<NodeId>,
    /// Each aircraft exclusively owns its itinerary; the store is the only
    /// mutator.
    pub itinerary: Vec<Option<Itinerary>>,
    /// Previous-tick derived state — the one cached value, kept to
    /// distinguish "still at the gate" from "holding mid-taxi".
    pub prev_state: Vec<AircraftState>,
    /// Ticks spent active on the surface (taxi-time statistics).
    pub ticks_on_surface: Vec<u64>,
}

impl AircraftStore {
    /// One slot per scenario flight, everything unspawned.
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let count = scenario.len();
        let mut callsign = Vec::with_capacity(count);
        let mut kind = Vec::with_capacity(count);
        let mut gate = Vec::with_capacity(count);
        let mut runway = Vec::with_capacity(count);
        for (_, flight) in scenario.iter() {
            callsign.push(flight.callsign.clone());
            kind.push(flight.kind);
            gate.push(flight.gate);
            runway.push(flight.runway);
        }
        Self {
            count,
            callsign,
            kind,
            gate,
            runway,
            spawned: vec![false; count],
            active: vec![false; count],
            done: vec![false; count],
            speed_mps: vec![0.0; count],
            home: vec![NodeId::INVALID; count],
            itinerary: vec![None; count],
            prev_state: vec![AircraftState::Stopped; count],
            ticks_on_surface: vec![0; count],
        }
    }

    /// All active aircraft in ascending ID order — the canonical iteration
    /// order of every tick phase.
    pub fn active_ids(&self) -> Vec<AircraftId> {
        (0..self.count as u32)
            .map(AircraftId)
            .filter(|a| self.active[a.index()])
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }

    // ── Derived state ─────────────────────────────────────────────────────

    /// The aircraft's derived surface state.
    ///
    /// Computed purely from the itinerary position, with one hysteresis
    /// exception: a hold at the cursor reads as `Stopped` while the aircraft
    /// has never moved (spool-up at the gate) and as `Holding` once it has.
    pub fn state_of(&self, aircraft: AircraftId, surface: &SurfaceGraph) -> AircraftState {
        let i = aircraft.index();
        let Some(it) = &self.itinerary[i] else {
            return AircraftState::Stopped;
        };
        if it.is_completed() {
            return AircraftState::Stopped;
        }
        if it.is_holding() {
            return if self.prev_state[i] == AircraftState::Stopped {
                AircraftState::Stopped
            } else {
                AircraftState::Holding
            };
        }
        match it.current_link().map(|l| surface.link(l).kind) {
            Some(LinkKind::Pushback) => AircraftState::Pushback,
            Some(LinkKind::Ramp) => AircraftState::Ramp,
            Some(LinkKind::Taxiway) | Some(LinkKind::Runway) => AircraftState::Taxi,
            None => AircraftState::Stopped,
        }
    }

    /// Coarse location: the end node of the current link, falling back to
    /// the home node before a route exists.
    pub fn coarse_location(&self, aircraft: AircraftId, surface: &SurfaceGraph) -> NodeId {
        self.itinerary[aircraft.index()]
            .as_ref()
            .and_then(|it| it.coarse_location(surface))
            .unwrap_or(self.home[aircraft.index()])
    }

    /// Precise location: the interpolated point on the current link, falling
    /// back to the home node's position.
    pub fn precise_position(&self, aircraft: AircraftId, surface: &SurfaceGraph) -> GeoPoint {
        self.itinerary[aircraft.index()]
            .as_ref()
            .and_then(|it| it.precise_location(surface))
            .unwrap_or_else(|| surface.node_pos(self.home[aircraft.index()]))
    }

    /// Where the aircraft will be next tick, assuming its current speed.
    ///
    /// Pure lookahead; completed or route-less aircraft report their current
    /// position.
    pub fn next_position(
        &self,
        aircraft: AircraftId,
        distance_m: f64,
        surface: &SurfaceGraph,
    ) -> GeoPoint {
        match &self.itinerary[aircraft.index()] {
            Some(it) => it
                .lookahead(distance_m, surface)
                .position
                .unwrap_or_else(|| surface.node_pos(self.home[aircraft.index()])),
            None => surface.node_pos(self.home[aircraft.index()]),
        }
    }
}
