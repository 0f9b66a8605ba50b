//! The `Scheduler`: assignment plus the speculative resolution loop.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, error, info, warn};

use asim_core::{AircraftId, AircraftState, SimConfig, Tick};
use asim_ground::{Conflict, FlightKind, Ground, Scenario};
use asim_itinerary::{DelayCause, Itinerary, Leg};
use asim_motion::MotionProfile;
use asim_surface::{Router, SurfaceGraph};

use crate::error::{ResolutionOutcome, ScheduleError, ScheduleResult};
use crate::schedule::{Schedule, SchedulerConfig};

/// Assigns itineraries and resolves predicted conflicts by speculative
/// re-simulation.
///
/// `R` is the routing algorithm (e.g. [`asim_surface::DijkstraRouter`]);
/// swap it at compile time with no runtime overhead.
pub struct Scheduler<R: Router> {
    pub router: R,
    pub config: SchedulerConfig,
}

impl<R: Router> Scheduler<R> {
    pub fn new(router: R, config: SchedulerConfig) -> Self {
        Self { router, config }
    }

    // ── Assignment ────────────────────────────────────────────────────────

    /// Compute a fresh itinerary for one aircraft: shortest route from its
    /// coarse location to its destination (runway threshold for departures,
    /// gate for arrivals).
    ///
    /// An aircraft mid-traversal keeps its unfinished link spliced in front
    /// of the new route, and pending uncertainty delays from the previous
    /// itinerary carry forward.
    pub fn route_for(
        &self,
        aircraft: AircraftId,
        ground: &Ground,
        surface: &SurfaceGraph,
    ) -> ScheduleResult<Itinerary> {
        let i = aircraft.index();
        let store = &ground.store;
        let destination = match store.kind[i] {
            FlightKind::Departure => surface.link(store.runway[i]).start(),
            FlightKind::Arrival => store.gate[i],
        };

        let routing_err = |source| ScheduleError::Routing {
            aircraft,
            callsign: store.callsign[i].clone(),
            source,
        };

        let previous = store.itinerary[i].as_ref().filter(|it| !it.is_completed());
        let mut itinerary = match previous.and_then(|it| it.current_link()) {
            // Mid-link: splice the unfinished traversal in front.
            Some(unfinished) => {
                let from = surface.link(unfinished).end();
                let route = self
                    .router
                    .route(surface, from, destination)
                    .map_err(routing_err)?;
                let mut legs = Vec::with_capacity(route.links.len() + 1);
                legs.push(unfinished);
                legs.extend(route.links);
                let offset = previous.map_or(0.0, |it| it.offset_m());
                Itinerary::resuming(legs, offset, surface)
            }
            // Standing at a node: fresh route with a spool-up hold.
            None => {
                let from = store.coarse_location(aircraft, surface);
                let route = self
                    .router
                    .route(surface, from, destination)
                    .map_err(routing_err)?;
                Itinerary::fresh(route.links, surface)
            }
        };

        // Carry forward exogenous delays the aircraft has not served yet.
        if let Some(prev) = previous {
            for _ in 0..prev.pending_uncertainty_delays() {
                itinerary.add_delay(DelayCause::Uncertainty);
            }
        }

        Ok(itinerary)
    }

    // ── The scheduling pass ───────────────────────────────────────────────

    /// Run one full pass at `now`: assign routes to every aircraft lacking
    /// one, then speculatively resolve predicted conflicts until the
    /// lookahead horizon is clean (or every remaining conflict has been
    /// declared unsolvable).
    ///
    /// On success the live ground holds the final assignment; the returned
    /// [`Schedule`] carries a copy plus the pass counters.
    pub fn schedule(
        &self,
        ground: &mut Ground,
        scenario: &Scenario,
        now: Tick,
        surface: &SurfaceGraph,
        profile: &MotionProfile,
        cfg: &SimConfig,
    ) -> ScheduleResult<Schedule> {
        info!(%now, "scheduling pass start");

        let mut attempts: FxHashMap<u64, u32> = FxHashMap::default();
        let mut unsolvable: FxHashSet<u64> = FxHashSet::default();
        let mut delays_added = 0usize;

        // Route every live aircraft that needs one before predicting.
        for id in ground.ids_needing_route() {
            let itinerary = self.route_for(id, ground, surface)?;
            ground.set_itinerary(id, itinerary);
        }

        'resolution: loop {
            // Fresh, fully independent prediction sandbox.
            let mut sandbox = ground.clone();
            let mut sandbox_now = now;

            for _step in 0..self.config.lookahead_ticks {
                sandbox.spawn_due(scenario, sandbox_now, surface, cfg);

                // Aircraft appearing only inside the prediction get a route
                // too; mirroring it into the live store caches it for both
                // later clones and the aircraft's eventual live spawn.
                for id in sandbox.ids_needing_route() {
                    let itinerary = self.route_for(id, &sandbox, surface)?;
                    if ground.store.itinerary[id.index()].is_none() {
                        ground.set_itinerary(id, itinerary.clone());
                    }
                    sandbox.set_itinerary(id, itinerary);
                }

                let conflict = sandbox
                    .next_conflicts(surface, cfg)
                    .into_iter()
                    .find(|c| !unsolvable.contains(&c.id()));

                if let Some(conflict) = conflict {
                    match self.resolve(&conflict, &sandbox, ground, surface, &mut attempts) {
                        Ok(victim) => {
                            delays_added += 1;
                            debug!(%conflict, %victim, "delay injected, restarting prediction");
                        }
                        Err(outcome) => {
                            unsolvable.insert(outcome.conflict_id());
                            match outcome {
                                ResolutionOutcome::Unsolvable(_) => {
                                    warn!(%conflict, "gave up: conflict unsolvable");
                                }
                                ResolutionOutcome::Deadlock(_) => {
                                    attempts.remove(&outcome.conflict_id());
                                    error!(%conflict, "deadlock: attempt budget exhausted");
                                }
                            }
                        }
                    }
                    continue 'resolution;
                }

                sandbox.tick(surface, profile, cfg);
                sandbox.retire_finished(sandbox_now, surface, cfg);
                sandbox_now = sandbox_now + 1;
            }

            // Horizon crossed with no live conflict: accept.
            let itineraries: FxHashMap<AircraftId, Itinerary> = (0..ground.store.count)
                .map(|i| AircraftId(i as u32))
                .filter(|id| !ground.store.done[id.index()])
                .filter_map(|id| {
                    ground.store.itinerary[id.index()]
                        .as_ref()
                        .map(|it| (id, it.clone()))
                })
                .collect();

            let schedule = Schedule {
                itineraries,
                delays_added,
                unsolved_conflicts: unsolvable.len(),
            };
            info!(
                delays = schedule.delays_added,
                unsolved = schedule.unsolved_conflicts,
                "scheduling pass end"
            );
            return Ok(schedule);
        }
    }

    // ── Conflict resolution ───────────────────────────────────────────────

    /// Pick a victim for `conflict` (using the sandbox's predicted states)
    /// and insert one scheduler hold into its *live* itinerary.
    ///
    /// Exceeding the attempt budget retracts that hold and reports a
    /// deadlock.
    fn resolve(
        &self,
        conflict: &Conflict,
        sandbox: &Ground,
        live: &mut Ground,
        surface: &SurfaceGraph,
        attempts: &mut FxHashMap<u64, u32>,
    ) -> Result<AircraftId, ResolutionOutcome> {
        let victim = select_victim(conflict, sandbox, surface)?;

        let Some(itinerary) = live.store.itinerary[victim.index()].as_mut() else {
            return Err(ResolutionOutcome::Unsolvable(conflict.id()));
        };
        let Some(at) = itinerary.add_delay(DelayCause::Scheduler) else {
            // Live itinerary already completed; nothing left to delay.
            return Err(ResolutionOutcome::Unsolvable(conflict.id()));
        };

        let n = attempts.entry(conflict.id()).or_insert(0);
        *n += 1;
        if *n >= self.config.max_resolve_attempts {
            if let Some(itinerary) = live.store.itinerary[victim.index()].as_mut() {
                itinerary.retract_delay(at, DelayCause::Scheduler);
            }
            return Err(ResolutionOutcome::Deadlock(conflict.id()));
        }
        Ok(victim)
    }
}

// ── Victim selection ──────────────────────────────────────────────────────────

/// Deterministic victim-selection policy, in priority order:
///
/// 1. Exactly one of the pair is holding → delay the other.
/// 2. Both holding → unsolvable (an uncertainty-generated situation).
/// 3. Converging paths → delay whichever aircraft is behind in shared-path
///    progress.
/// 4. Fallback: delay the aircraft with the larger remaining distance; on a
///    tie, the lexicographically smaller callsign.
pub(crate) fn select_victim(
    conflict: &Conflict,
    sandbox: &Ground,
    surface: &SurfaceGraph,
) -> Result<AircraftId, ResolutionOutcome> {
    let [a, b] = conflict.pair();
    let store = &sandbox.store;

    let a_holding = store.state_of(a, surface) == AircraftState::Holding;
    let b_holding = store.state_of(b, surface) == AircraftState::Holding;
    match (a_holding, b_holding) {
        (true, false) => return Ok(b),
        (false, true) => return Ok(a),
        (true, true) => return Err(ResolutionOutcome::Unsolvable(conflict.id())),
        (false, false) => {}
    }

    if let (Some(a_it), Some(b_it)) = (
        store.itinerary[a.index()].as_ref(),
        store.itinerary[b.index()].as_ref(),
    ) {
        if let Some(behind) = shared_path_laggard(a, a_it, b, b_it) {
            return Ok(behind);
        }
        if let Some(behind) = shared_path_laggard(b, b_it, a, a_it) {
            return Ok(behind);
        }
    }

    // More remaining distance = more slack to absorb a hold.
    let a_remaining = store.itinerary[a.index()].as_ref().map_or(0.0, |it| it.remaining_m());
    let b_remaining = store.itinerary[b.index()].as_ref().map_or(0.0, |it| it.remaining_m());
    if a_remaining > b_remaining {
        Ok(a)
    } else if b_remaining > a_remaining {
        Ok(b)
    } else if store.callsign[a.index()] <= store.callsign[b.index()] {
        Ok(a)
    } else {
        Ok(b)
    }
}

/// If `a`'s current link lies on `b`'s path, the pair converges: return the
/// aircraft that is behind in progress along the shared path.
fn shared_path_laggard(
    a: AircraftId,
    a_it: &Itinerary,
    b: AircraftId,
    b_it: &Itinerary,
) -> Option<AircraftId> {
    let a_link = a_it.current_link()?;
    let in_b = b_it
        .legs()
        .iter()
        .position(|leg| *leg == Leg::Taxi(a_link))?;
    let b_cursor = b_it.current_link_index()?;

    if in_b > b_cursor {
        // `b` has not yet reached the link `a` occupies.
        Some(b)
    } else if in_b < b_cursor {
        Some(a)
    } else {
        // Same link: the smaller offset is behind.
        if a_it.offset_m() < b_it.offset_m() {
            Some(a)
        } else {
            Some(b)
        }
    }
}
