//! `asim-itinerary` — the per-aircraft position state machine.
//!
//! An [`Itinerary`] is an ordered sequence of [`Leg`]s (real surface links
//! plus zero-length hold slots) with a progress cursor.  It is owned by
//! exactly one aircraft at a time and mutated only through [`Itinerary::tick`]
//! and the delay-insertion operations; everything else is a pure query.
//!
//! # Crate layout
//!
//! | Module        | Contents                                             |
//! |---------------|------------------------------------------------------|
//! | [`leg`]       | `Leg` (taxi/hold variant), `DelayCause`              |
//! | [`itinerary`] | `Itinerary`, `Lookahead`                             |

pub mod itinerary;
pub mod leg;


pub use itinerary::{Itinerary, Lookahead};
pub use leg::{DelayCause, Leg};
