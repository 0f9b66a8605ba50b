//! The `Ground` struct and its tick protocol.

use std::collections::{BTreeMap, VecDeque};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info};

use asim_control::{CorridorAdmissionController, IntersectionLockManager};
use asim_core::{AircraftId, AircraftState, LinkId, NodeId, SimConfig, Tick};
use asim_itinerary::{DelayCause, Itinerary};
use asim_motion::{next_speed, tick_distance_m, Leader, MotionProfile};
use asim_surface::SurfaceGraph;

use crate::conflict::Conflict;
use crate::flight::{FlightKind, Scenario};
use crate::store::AircraftStore;

/// What one call to [`Ground::tick`] did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Aircraft that advanced along their itinerary this tick.
    pub advanced: usize,
    /// Aircraft denied advancement (corridor or intersection lock).
    pub held: usize,
}

/// All mutable surface state: the aircraft arena, both access controllers,
/// entry queues, and cumulative operation counters.
///
/// `Clone` produces a fully independent deep copy — the basis of the
/// scheduler's prediction sandbox.
#[derive(Clone)]
pub struct Ground {
    pub store: AircraftStore,
    pub locks: IntersectionLockManager,
    pub corridor: CorridorAdmissionController,

    /// Departures waiting for their gate to free up.  `BTreeMap` so queue
    /// draining iterates gates in a deterministic order.
    gate_queues: BTreeMap<NodeId, VecDeque<AircraftId>>,
    /// Arrivals waiting for their runway exit node to free up.
    runway_queues: BTreeMap<NodeId, VecDeque<AircraftId>>,
    /// Last takeoff tick per runway, for departure spacing.
    last_takeoff: BTreeMap<LinkId, Tick>,

    /// Flights sent to the sky.
    pub takeoff_count: u64,
    /// Sum of surface ticks of all departed flights (taxi-time metric).
    pub takeoff_ticks_total: u64,
    /// Arrivals parked at their gate.
    pub arrival_count: u64,
}

impl Ground {
    pub fn new(scenario: &Scenario) -> Self {
        Self {
            store: AircraftStore::from_scenario(scenario),
            locks: IntersectionLockManager::new(),
            corridor: CorridorAdmissionController::new(),
            gate_queues: BTreeMap::new(),
            runway_queues: BTreeMap::new(),
            last_takeoff: BTreeMap::new(),
            takeoff_count: 0,
            takeoff_ticks_total: 0,
            arrival_count: 0,
        }
    }

    // ── Spawning ──────────────────────────────────────────────────────────

    /// Bring due flights onto the surface: drain entry queues, then admit
    /// every not-yet-spawned flight whose appearance time has come.
    /// Departures blocked by an occupied gate, a busy corridor, or the
    /// active-aircraft cap wait in their gate's queue; arrivals blocked by
    /// an occupied runway exit wait likewise.
    pub fn spawn_due(
        &mut self,
        scenario: &Scenario,
        now: Tick,
        surface: &SurfaceGraph,
        cfg: &SimConfig,
    ) {
        self.drain_gate_queues(surface, cfg);
        self.drain_runway_queues(surface, cfg);

        for (id, flight) in scenario.iter() {
            if self.store.spawned[id.index()] || flight.appears_at > now {
                continue;
            }
            self.store.spawned[id.index()] = true;

            match flight.kind {
                FlightKind::Departure => {
                    let admissible = self.store.active_count() < cfg.max_active_aircraft
                        && !self.is_occupied_at(flight.gate, surface, cfg)
                        && self.corridor.may_admit_departure(flight.gate, surface);
                    if admissible {
                        self.activate_departure(id, surface);
                    } else {
                        debug!(aircraft = %id, gate = %flight.gate, "gate busy, queueing departure");
                        self.gate_queues.entry(flight.gate).or_default().push_back(id);
                    }
                }
                FlightKind::Arrival => {
                    let exit = surface.link(flight.runway).end();
                    if self.is_occupied_at(exit, surface, cfg) {
                        debug!(aircraft = %id, exit = %exit, "runway exit busy, queueing arrival");
                        self.runway_queues.entry(exit).or_default().push_back(id);
                    } else {
                        self.activate_arrival(id, exit);
                    }
                }
            }
        }
    }

    fn drain_gate_queues(&mut self, surface: &SurfaceGraph, cfg: &SimConfig) {
        // One admission per gate per tick.
        let gates: Vec<NodeId> = self.gate_queues.keys().copied().collect();
        for gate in gates {
            let Some(&front) = self.gate_queues.get(&gate).and_then(|q| q.front()) else {
                continue;
            };
            if self.store.active_count() >= cfg.max_active_aircraft
                || self.is_occupied_at(gate, surface, cfg)
                || !self.corridor.may_admit_departure(gate, surface)
            {
                continue;
            }
            if let Some(queue) = self.gate_queues.get_mut(&gate) {
                queue.pop_front();
            }
            self.activate_departure(front, surface);
        }
        self.gate_queues.retain(|_, q| !q.is_empty());
    }

    fn drain_runway_queues(&mut self, surface: &SurfaceGraph, cfg: &SimConfig) {
        let exits: Vec<NodeId> = self.runway_queues.keys().copied().collect();
        for exit in exits {
            let Some(&front) = self.runway_queues.get(&exit).and_then(|q| q.front()) else {
                continue;
            };
            if self.is_occupied_at(exit, surface, cfg) {
                continue;
            }
            if let Some(queue) = self.runway_queues.get_mut(&exit) {
                queue.pop_front();
            }
            self.activate_arrival(front, exit);
        }
        self.runway_queues.retain(|_, q| !q.is_empty());
    }

    fn activate_departure(&mut self, id: AircraftId, surface: &SurfaceGraph) {
        let i = id.index();
        self.store.active[i] = true;
        self.store.home[i] = self.store.gate[i];
        self.store.speed_mps[i] = 0.0;
        self.store.prev_state[i] = AircraftState::Stopped;
        self.corridor.register_departure(id, self.store.gate[i], surface);
        info!(aircraft = %id, callsign = %self.store.callsign[i], gate = %self.store.gate[i],
              "departure on surface");
    }

    fn activate_arrival(&mut self, id: AircraftId, exit: NodeId) {
        let i = id.index();
        self.store.active[i] = true;
        self.store.home[i] = exit;
        self.store.speed_mps[i] = 0.0;
        self.store.prev_state[i] = AircraftState::Stopped;
        self.corridor.register_arrival(id, self.store.gate[i]);
        info!(aircraft = %id, callsign = %self.store.callsign[i], exit = %exit,
              "arrival on surface");
    }

    /// `true` if any active aircraft currently sits on `node`.
    pub fn is_occupied_at(&self, node: NodeId, surface: &SurfaceGraph, cfg: &SimConfig) -> bool {
        let pos = surface.node_pos(node);
        self.store.active_ids().into_iter().any(|id| {
            self.store
                .precise_position(id, surface)
                .close_to(pos, cfg.close_node_tolerance_m)
        })
    }

    // ── Route plumbing (called by the scheduler / simulation) ─────────────

    /// Active aircraft still lacking an itinerary, ascending.
    pub fn ids_needing_route(&self) -> Vec<AircraftId> {
        self.store
            .active_ids()
            .into_iter()
            .filter(|id| self.store.itinerary[id.index()].is_none())
            .collect()
    }

    /// Hand an itinerary to an aircraft (replacing any previous one).
    pub fn set_itinerary(&mut self, id: AircraftId, itinerary: Itinerary) {
        debug!(aircraft = %id, legs = itinerary.len(), "itinerary assigned");
        self.store.itinerary[id.index()] = Some(itinerary);
    }

    /// Insert one exogenous hold at the aircraft's cursor.
    pub fn add_uncertainty_delay(&mut self, id: AircraftId) {
        if let Some(it) = self.store.itinerary[id.index()].as_mut()
            && let Some(at) = it.add_delay(DelayCause::Uncertainty)
        {
            debug!(aircraft = %id, index = at, "uncertainty delay added");
        }
    }

    // ── The tick protocol ─────────────────────────────────────────────────

    /// Advance the surface by one tick.  See the crate docs for the strict
    /// phase ordering; in particular all lock claims land before any lock
    /// check, so claim visibility is order-independent within the tick.
    pub fn tick(
        &mut self,
        surface: &SurfaceGraph,
        profile: &MotionProfile,
        cfg: &SimConfig,
    ) -> TickOutcome {
        let ids = self.store.active_ids();
        let dt = cfg.tick_secs();

        // ① observe leaders from the current (pre-move) state.
        let leaders = self.observe_leaders(&ids, surface, profile);

        // ② next speeds — pure per aircraft.
        let speeds = self.compute_speeds(&ids, &leaders, surface, profile, dt);
        for (&id, &v) in ids.iter().zip(&speeds) {
            self.store.speed_mps[id.index()] = v;
        }

        // Lookahead windows, shared by the corridor check and both lock phases.
        let ahead: Vec<Vec<(NodeId, f64)>> = ids
            .iter()
            .map(|&id| match &self.store.itinerary[id.index()] {
                Some(it) => it.ahead_intersections(cfg.lock_lookahead_m, surface),
                None => Vec::new(),
            })
            .collect();

        // ③ corridor admission (mutates the counters on first approach).
        let corridor = &mut self.corridor;
        let access: Vec<bool> = ids
            .iter()
            .zip(&ahead)
            .map(|(&id, ahead)| {
                if corridor.is_arrival(id) {
                    corridor.arrival_may_advance(id, ahead, surface)
                } else {
                    true
                }
            })
            .collect();

        // ④ claim — every admitted aircraft, before any check.
        for ((&id, ahead), &ok) in ids.iter().zip(&ahead).zip(&access) {
            if ok {
                self.locks.claim(id, ahead, surface);
            }
        }

        // ⑤ advance lock holders.
        let mut outcome = TickOutcome::default();
        let mut passed_by: Vec<(AircraftId, Vec<LinkId>)> = Vec::new();
        for ((&id, ahead), &ok) in ids.iter().zip(&ahead).zip(&access) {
            if !ok || !self.locks.holds_lock(id, ahead, surface) {
                outcome.held += 1;
                continue;
            }
            let i = id.index();
            if let Some(it) = self.store.itinerary[i].as_mut() {
                let distance = tick_distance_m(self.store.speed_mps[i], dt);
                let passed = it.tick(distance, surface);
                outcome.advanced += 1;
                if !passed.is_empty() {
                    passed_by.push((id, passed));
                }
            }
        }

        // ⑥ release passed intersections; departures may leave their corridor.
        for (id, passed) in &passed_by {
            let ends: Vec<NodeId> = passed.iter().map(|&l| surface.link(l).end()).collect();
            self.locks.release(&ends, surface);
            if self.store.kind[id.index()] == FlightKind::Departure {
                self.corridor.note_departure_passed(*id, &ends, surface);
            }
        }

        // ⑦ refresh the previous-tick state cache and surface-time counters.
        let states: Vec<AircraftState> = ids
            .iter()
            .map(|&id| self.store.state_of(id, surface))
            .collect();
        for (&id, &s) in ids.iter().zip(&states) {
            self.store.prev_state[id.index()] = s;
            self.store.ticks_on_surface[id.index()] += 1;
        }

        outcome
    }

    // ── Retirement ────────────────────────────────────────────────────────

    /// Remove finished aircraft from the surface: departures whose itinerary
    /// reached the runway threshold (respecting the per-runway takeoff
    /// spacing) and arrivals parked at their gate.
    pub fn retire_finished(&mut self, now: Tick, surface: &SurfaceGraph, cfg: &SimConfig) {
        for id in self.store.active_ids() {
            let i = id.index();
            let completed = self.store.itinerary[i]
                .as_ref()
                .is_some_and(|it| it.is_completed());
            if !completed {
                continue;
            }

            match self.store.kind[i] {
                FlightKind::Departure => {
                    let runway = self.store.runway[i];
                    let spaced = match self.last_takeoff.get(&runway) {
                        Some(&last) => now.since(last) >= cfg.departure_interval_ticks,
                        None => true,
                    };
                    if !spaced {
                        // Holds short of the runway until the interval opens.
                        continue;
                    }
                    self.last_takeoff.insert(runway, now);
                    self.takeoff_count += 1;
                    self.takeoff_ticks_total += self.store.ticks_on_surface[i];
                    self.store.active[i] = false;
                    self.store.done[i] = true;
                    self.locks.release_all_claims_of(id);
                    self.corridor.remove_departure(id, surface);
                    info!(aircraft = %id, callsign = %self.store.callsign[i], "takeoff");
                }
                FlightKind::Arrival => {
                    self.arrival_count += 1;
                    self.store.active[i] = false;
                    self.store.done[i] = true;
                    self.locks.release_all_claims_of(id);
                    self.corridor.complete_arrival(id, surface);
                    info!(aircraft = %id, callsign = %self.store.callsign[i], "arrival at gate");
                }
            }
        }
    }

    // ── Conflict scans ────────────────────────────────────────────────────

    /// Conflicts between the *next* precise positions of every active pair —
    /// the scheduler's prediction primitive.
    pub fn next_conflicts(&self, surface: &SurfaceGraph, cfg: &SimConfig) -> Vec<Conflict> {
        let ids = self.store.active_ids();
        let dt = cfg.tick_secs();
        let positions: Vec<_> = ids
            .iter()
            .map(|&id| {
                let dist = tick_distance_m(self.store.speed_mps[id.index()], dt);
                self.store.next_position(id, dist, surface)
            })
            .collect();
        self.scan_pairs(&ids, &positions, cfg)
    }

    /// Conflicts between current precise positions.
    pub fn current_conflicts(&self, surface: &SurfaceGraph, cfg: &SimConfig) -> Vec<Conflict> {
        let ids = self.store.active_ids();
        let positions: Vec<_> = ids
            .iter()
            .map(|&id| self.store.precise_position(id, surface))
            .collect();
        self.scan_pairs(&ids, &positions, cfg)
    }

    fn scan_pairs(
        &self,
        ids: &[AircraftId],
        positions: &[asim_core::GeoPoint],
        cfg: &SimConfig,
    ) -> Vec<Conflict> {
        let mut out = Vec::new();
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                if positions[i].close_to(positions[j], cfg.conflict_threshold_m) {
                    out.push(Conflict::new(
                        ids[i],
                        &self.store.callsign[ids[i].index()],
                        positions[i],
                        ids[j],
                        &self.store.callsign[ids[j].index()],
                        positions[j],
                    ));
                }
            }
        }
        out
    }

    // ── Leader observation ────────────────────────────────────────────────

    /// For each aircraft, the nearest aircraft ahead on its own path within
    /// pilot vision, as a `(speed, gap)` pair.
    ///
    /// A leader that is itself entering a conflict (its own gap to *its*
    /// leader is inside the minimum separation) is reported with the
    /// non-positive sentinel speed so the follower brakes as well.
    fn observe_leaders(
        &self,
        ids: &[AircraftId],
        surface: &SurfaceGraph,
        profile: &MotionProfile,
    ) -> Vec<Option<Leader>> {
        // Link-occupancy index: current real link → (offset, aircraft),
        // sorted by offset.
        let mut on_link: FxHashMap<LinkId, Vec<(f64, AircraftId)>> = FxHashMap::default();
        for &id in ids {
            if let Some(it) = &self.store.itinerary[id.index()]
                && !it.is_completed()
                && let Some(link) = it.current_link()
            {
                on_link.entry(link).or_default().push((it.offset_m(), id));
            }
        }
        for v in on_link.values_mut() {
            v.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        }

        let raw: Vec<Option<(AircraftId, f64)>> = ids
            .iter()
            .map(|&id| self.find_ahead(id, &on_link, surface, profile))
            .collect();

        // Aircraft already inside the minimum separation of their leader are
        // "entering a conflict" — their followers must see the sentinel.
        let blocked: FxHashSet<AircraftId> = ids
            .iter()
            .zip(&raw)
            .filter(|(_, l)| l.is_some_and(|(_, gap)| gap <= profile.min_separation_m))
            .map(|(&id, _)| id)
            .collect();

        raw.into_iter()
            .map(|found| {
                found.map(|(leader, gap)| Leader {
                    speed_mps: if blocked.contains(&leader) {
                        -1.0
                    } else {
                        self.store.speed_mps[leader.index()]
                    },
                    gap_m: gap.max(0.0),
                })
            })
            .collect()
    }

    /// Walk the aircraft's remaining legs and find the first other aircraft
    /// ahead, returning `(who, path gap)`.  Gives up past pilot vision.
    fn find_ahead(
        &self,
        id: AircraftId,
        on_link: &FxHashMap<LinkId, Vec<(f64, AircraftId)>>,
        surface: &SurfaceGraph,
        profile: &MotionProfile,
    ) -> Option<(AircraftId, f64)> {
        let it = self.store.itinerary[id.index()].as_ref()?;
        if it.is_completed() {
            return None;
        }
        let cur_idx = it.current_link_index()?;
        let my_offset = it.offset_m();

        let mut rel = -my_offset;
        for (leg_i, leg) in it.legs().iter().enumerate().skip(cur_idx) {
            let Some(link) = leg.link() else { continue };
            if let Some(on_this) = on_link.get(&link) {
                for &(other_offset, other) in on_this {
                    if other == id {
                        continue;
                    }
                    // Behind us on our own link.
                    if leg_i == cur_idx && other_offset <= my_offset {
                        continue;
                    }
                    let gap = rel + other_offset;
                    if gap > profile.pilot_vision_m {
                        return None;
                    }
                    return Some((other, gap));
                }
            }
            rel += surface.link(link).length_m();
            if rel > profile.pilot_vision_m {
                return None;
            }
        }
        None
    }

    // ── Speed computation ─────────────────────────────────────────────────

    #[cfg(not(feature = "parallel"))]
    fn compute_speeds(
        &self,
        ids: &[AircraftId],
        leaders: &[Option<Leader>],
        surface: &SurfaceGraph,
        profile: &MotionProfile,
        dt: f64,
    ) -> Vec<f64> {
        ids.iter()
            .zip(leaders)
            .map(|(&id, &leader)| {
                let state = self.store.state_of(id, surface);
                next_speed(profile, self.store.speed_mps[id.index()], state, leader, dt)
            })
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn compute_speeds(
        &self,
        ids: &[AircraftId],
        leaders: &[Option<Leader>],
        surface: &SurfaceGraph,
        profile: &MotionProfile,
        dt: f64,
    ) -> Vec<f64> {
        use rayon::prelude::*;

        // Pure per-aircraft computation; identical results to the
        // sequential path, just spread over the pool.
        ids.par_iter()
            .zip(leaders.par_iter())
            .map(|(&id, &leader)| {
                let state = self.store.state_of(id, surface);
                next_speed(profile, self.store.speed_mps[id.index()], state, leader, dt)
            })
            .collect()
    }
}
