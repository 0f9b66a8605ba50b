//! `asim-core` — foundational types for the `asim` airport-surface simulation.
//!
//! This crate is a dependency of every other `asim-*` crate.  It intentionally
//! has no `asim-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`ids`]     | `AircraftId`, `NodeId`, `LinkId`                      |
//! | [`geo`]     | `GeoPoint`, haversine distance, interpolation         |
//! | [`time`]    | `Tick`, `SimClock`, `SimConfig`                       |
//! | [`rng`]     | `AircraftRng` (per-aircraft), `SimRng` (global)       |
//! | [`state`]   | `AircraftState` enum                                  |
//! | [`error`]   | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required for loading `SimConfig` from a file.              |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod state;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{AircraftId, LinkId, NodeId};
pub use rng::{AircraftRng, SimRng};
pub use state::AircraftState;
pub use time::{SimClock, SimConfig, Tick};
