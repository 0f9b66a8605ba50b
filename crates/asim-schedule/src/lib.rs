//! `asim-schedule` — route assignment and speculative conflict resolution.
//!
//! The scheduler first gives every aircraft a shortest route with no
//! separation constraints, then repeatedly *predicts* the near future by
//! cloning the whole ground state into a sandbox and ticking it forward.
//! Each predicted conflict is resolved by inserting one hold into the live
//! itinerary of a chosen victim and restarting the prediction from a fresh
//! clone; a clean run over the whole lookahead horizon is accepted as the
//! pass's `Schedule`.
//!
//! Delay insertion is the only side effect a pass may have on live
//! itineraries; every other mutation happens on the disposable sandbox.
//!
//! # Crate layout
//!
//! | Module        | Contents                                            |
//! |---------------|-----------------------------------------------------|
//! | [`schedule`]  | `Schedule`, `SchedulerConfig`                       |
//! | [`scheduler`] | `Scheduler` — assignment + resolution loop          |
//! | [`error`]     | `ScheduleError`, `ResolutionOutcome`                |

pub mod error;
pub mod schedule;
pub mod scheduler;


pub use error::{ResolutionOutcome, ScheduleError, ScheduleResult};
pub use schedule::{Schedule, SchedulerConfig};
pub use scheduler::Scheduler;
