//! `asim-surface` — airport surface graph and taxi routing.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                    |
//! |------------|-------------------------------------------------------------|
//! | [`graph`]  | `SurfaceGraph` (nodes, links, canonical intersections),     |
//! |            | `SurfaceGraphBuilder`, `Link`, `LinkKind`                   |
//! | [`router`] | `Router` trait, `TaxiRoute`, `DijkstraRouter`               |
//! | [`error`]  | `SurfaceError`, `SurfaceResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod graph;
pub mod router;

#[cfg(test)]
mod tests;

pub use error::{SurfaceError, SurfaceResult};
pub use graph::{Link, LinkKind, SurfaceGraph, SurfaceGraphBuilder};
pub use router::{DijkstraRouter, Router, TaxiRoute};
