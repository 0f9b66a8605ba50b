//! Fluent builder for constructing a [`Sim`].

use asim_core::SimConfig;
use asim_ground::Scenario;
use asim_motion::MotionProfile;
use asim_schedule::{Scheduler, SchedulerConfig};
use asim_surface::{Router, SurfaceGraph};

use crate::error::{SimError, SimResult};
use crate::sim::Sim;

/// Fluent builder for [`Sim<R>`].
///
/// # Required inputs
///
/// - [`SimConfig`] — tick duration, thresholds, cadences, seed, …
/// - [`SurfaceGraph`] — the airport surface
/// - [`Scenario`] — the flights of the run
/// - `R: Router` — the routing algorithm (e.g. [`asim_surface::DijkstraRouter`])
///
/// # Optional inputs (have defaults)
///
/// | Method                | Default                    |
/// |-----------------------|----------------------------|
/// | `.profile(p)`         | `MotionProfile::default()` |
/// | `.scheduler_config(c)`| `SchedulerConfig::default()`|
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, surface, scenario, DijkstraRouter)
///     .profile(profile)
///     .scheduler_config(sched_cfg)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<R: Router> {
    config: SimConfig,
    surface: SurfaceGraph,
    scenario: Scenario,
    profile: Option<MotionProfile>,
    scheduler_config: Option<SchedulerConfig>,
    router: R,
}

impl<R: Router> SimBuilder<R> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, surface: SurfaceGraph, scenario: Scenario, router: R) -> Self {
        Self {
            config,
            surface,
            scenario,
            profile: None,
            scheduler_config: None,
            router,
        }
    }

    /// Supply the kinematic parameters.
    pub fn profile(mut self, profile: MotionProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Supply the scheduler parameters.
    pub fn scheduler_config(mut self, config: SchedulerConfig) -> Self {
        self.scheduler_config = Some(config);
        self
    }

    /// Validate inputs and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<R>> {
        let profile = self.profile.unwrap_or_default();
        let scheduler_config = self.scheduler_config.unwrap_or_default();

        if self.config.tick_duration_secs == 0 {
            return Err(SimError::Config("tick_duration_secs must be > 0".into()));
        }
        // An aircraft must never out-run its own lock claims: the claim
        // window has to cover at least one tick of travel at full speed.
        let max_step = profile.max_speed_mps * self.config.tick_secs();
        if self.config.lock_lookahead_m < max_step {
            return Err(SimError::Config(format!(
                "lock_lookahead_m ({}) must cover one tick at max speed ({max_step})",
                self.config.lock_lookahead_m
            )));
        }
        if self.config.conflict_threshold_m <= 0.0 {
            return Err(SimError::Config("conflict_threshold_m must be > 0".into()));
        }

        let scheduler = Scheduler::new(self.router, scheduler_config);
        Ok(Sim::new(
            self.config,
            self.surface,
            self.scenario,
            profile,
            scheduler,
        ))
    }
}
