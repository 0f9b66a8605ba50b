//! `asim-sim` — the top-level simulation runner.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① schedule  — on the reschedule cadence, run a full scheduling pass
//!                 (assignment + speculative conflict resolution)
//!   ② spawn     — admit due flights (gate/runway queues honoured) and
//!                 route any aircraft that slipped in between passes
//!   ③ perturb   — inject uncertainty holds (per-aircraft deterministic RNG)
//!   ④ move      — Ground::tick (observe → speeds → corridor → claim →
//!                 advance → release)
//!   ⑤ retire    — takeoffs (spaced per runway) and completed arrivals
//!   ⑥ observe   — hand a consistent GroundSnapshot to the observer
//! ```
//!
//! # Crate layout
//!
//! | Module       | Contents                                          |
//! |--------------|---------------------------------------------------|
//! | [`sim`]      | `Sim` — the runner                                |
//! | [`builder`]  | `SimBuilder` — validated construction             |
//! | [`observer`] | `SimObserver` trait, `NoopObserver`               |
//! | [`error`]    | `SimError`, `SimResult<T>`                        |

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
