//! `asim-ground` — the live airport surface.
//!
//! `Ground` owns everything that changes per tick: the aircraft arena, the
//! intersection lock table, the corridor counters, gate/runway queues, and
//! the cumulative operation counters.  It is a plain `Clone` of value types,
//! which is what the scheduler's speculative resolution relies on: "clone
//! the world" is a cheap structural copy with no shared mutable state.
//!
//! # Per-tick protocol (strict order)
//!
//! ```text
//! ① observe   — link-occupancy index → each aircraft's leader (speed, gap)
//! ② speeds    — pure next-speed computation for every active aircraft
//! ③ corridor  — arrivals ask the corridor controller for admission
//! ④ claim     — every admitted aircraft claims its ahead intersections
//! ⑤ advance   — aircraft holding ALL their locks tick their itineraries
//! ⑥ release   — passed intersections unlock; corridor counters update
//! ⑦ cache     — derived state is recomputed into the previous-tick cache
//! ```
//!
//! Claiming for all aircraft strictly precedes any checking, so a claim is
//! visible to every peer evaluated in the same tick.  A blocked aircraft
//! simply does not tick; waiting is the absence of advancement.
//!
//! # Crate layout
//!
//! | Module       | Contents                                            |
//! |--------------|-----------------------------------------------------|
//! | [`flight`]   | `Flight`, `FlightKind`, `Scenario`                  |
//! | [`store`]    | `AircraftStore` — arena of per-aircraft state       |
//! | [`conflict`] | `Conflict` — content-hashed proximity violation     |
//! | [`ground`]   | `Ground` — tick loop, spawning, retirement          |
//! | [`snapshot`] | `GroundSnapshot` — read-only per-tick view          |

pub mod conflict;
pub mod flight;
pub mod ground;
pub mod snapshot;
pub mod store;

#[cfg(test)]
mod tests;

pub use conflict::Conflict;
pub use flight::{Flight, FlightKind, Scenario};
pub use ground::{Ground, TickOutcome};
pub use snapshot::{AircraftSnapshot, GroundSnapshot};
pub use store::AircraftStore;
