//! Simulation observer trait for progress reporting and data collection.

use asim_core::Tick;
use asim_ground::{GroundSnapshot, TickOutcome};

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, outcome: TickOutcome) {
///         if tick.0 % self.interval == 0 {
///             println!("{tick}: {} moved, {} held", outcome.advanced, outcome.held);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after all mutation for the tick has finished.
    fn on_tick_end(&mut self, _tick: Tick, _outcome: TickOutcome) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// ticks) with a fully consistent view of the surface.
    fn on_snapshot(&mut self, _snapshot: &GroundSnapshot) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
