//! The `Sim` struct and its tick loop.

use tracing::debug;

use asim_core::{AircraftRng, SimClock, SimConfig, Tick};
use asim_ground::{Ground, GroundSnapshot, Scenario, TickOutcome};
use asim_motion::MotionProfile;
use asim_schedule::Scheduler;
use asim_surface::{Router, SurfaceGraph};

use crate::error::SimResult;
use crate::observer::SimObserver;

/// The main simulation runner.
///
/// Holds the static surface, the scenario, the live [`Ground`], and the
/// scheduler; drives the per-tick pipeline described in the crate docs.
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<R: Router> {
    /// Global configuration (total ticks, thresholds, cadences, seed, …).
    pub config: SimConfig,

    /// Simulation clock — tracks the current tick and maps to wall time.
    pub clock: SimClock,

    /// The static surface graph.
    pub surface: SurfaceGraph,

    /// The flights of this run.
    pub scenario: Scenario,

    /// All live surface state.
    pub ground: Ground,

    /// Kinematic parameters.
    pub profile: MotionProfile,

    /// Route assignment + conflict resolution.
    pub scheduler: Scheduler<R>,

    /// Per-aircraft deterministic RNGs driving uncertainty injection.
    rngs: Vec<AircraftRng>,

    /// Unsolved-conflict count of the latest scheduling pass (surfaced in
    /// snapshots for external diagnostics).
    unresolved_conflicts: u64,

    /// Cumulative scheduler delays injected across all passes.
    pub delays_injected: u64,

    /// Cumulative uncertainty holds injected.
    pub uncertainty_injected: u64,
}

impl<R: Router> Sim<R> {
    pub(crate) fn new(
        config: SimConfig,
        surface: SurfaceGraph,
        scenario: Scenario,
        profile: MotionProfile,
        scheduler: Scheduler<R>,
    ) -> Self {
        let rngs = (0..scenario.len() as u32)
            .map(|i| AircraftRng::new(config.seed, asim_core::AircraftId(i)))
            .collect();
        Self {
            clock: config.make_clock(),
            ground: Ground::new(&scenario),
            config,
            surface,
            scenario,
            profile,
            scheduler,
            rngs,
            unresolved_conflicts: 0,
            delays_injected: 0,
            uncertainty_injected: 0,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        loop {
            let now = self.clock.current_tick;
            if now >= self.config.end_tick() {
                break;
            }
            observer.on_tick_start(now);
            let outcome = self.process_tick(now)?;
            observer.on_tick_end(now, outcome);
            if self.config.output_interval_ticks > 0
                && now.0.is_multiple_of(self.config.output_interval_ticks)
            {
                observer.on_snapshot(&self.snapshot());
            }
            self.clock.advance();
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            let now = self.clock.current_tick;
            observer.on_tick_start(now);
            let outcome = self.process_tick(now)?;
            observer.on_tick_end(now, outcome);
            if self.config.output_interval_ticks > 0
                && now.0.is_multiple_of(self.config.output_interval_ticks)
            {
                observer.on_snapshot(&self.snapshot());
            }
            self.clock.advance();
        }
        Ok(())
    }

    /// A consistent read-only view of the surface as of the last completed
    /// tick.
    pub fn snapshot(&self) -> GroundSnapshot {
        GroundSnapshot::capture(
            &self.ground,
            self.clock.current_tick,
            self.clock.current_unix_secs(),
            self.unresolved_conflicts,
            &self.surface,
        )
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick(&mut self, now: Tick) -> SimResult<TickOutcome> {
        // ── Phase 1: scheduling pass on the configured cadence ────────────
        if self.config.reschedule_interval_ticks > 0
            && now.0.is_multiple_of(self.config.reschedule_interval_ticks)
        {
            let schedule = self.scheduler.schedule(
                &mut self.ground,
                &self.scenario,
                now,
                &self.surface,
                &self.profile,
                &self.config,
            )?;
            self.unresolved_conflicts = schedule.unsolved_conflicts as u64;
            self.delays_injected += schedule.delays_added as u64;
        }

        // ── Phase 2: admit due flights; route stragglers ──────────────────
        self.ground
            .spawn_due(&self.scenario, now, &self.surface, &self.config);
        for id in self.ground.ids_needing_route() {
            let itinerary = self
                .scheduler
                .route_for(id, &self.ground, &self.surface)?;
            self.ground.set_itinerary(id, itinerary);
        }

        // ── Phase 3: uncertainty injection ────────────────────────────────
        if self.config.uncertainty_prob > 0.0 {
            for id in self.ground.store.active_ids() {
                let moving = self.ground.store.state_of(id, &self.surface).is_moving();
                if moving && self.rngs[id.index()].gen_bool(self.config.uncertainty_prob) {
                    self.ground.add_uncertainty_delay(id);
                    self.uncertainty_injected += 1;
                    debug!(aircraft = %id, %now, "uncertainty hold injected");
                }
            }
        }

        // ── Phase 4/5: movement and retirement ────────────────────────────
        let outcome = self.ground.tick(&self.surface, &self.profile, &self.config);
        self.ground.retire_finished(now, &self.surface, &self.config);

        Ok(outcome)
    }
}
