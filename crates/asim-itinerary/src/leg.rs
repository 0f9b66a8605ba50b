//! Itinerary legs: real surface links and zero-length hold slots.

use asim_core::LinkId;
use asim_surface::SurfaceGraph;

/// One step of an itinerary.
///
/// A `Hold` is a zero-length placeholder worth exactly one tick of enforced
/// waiting; it carries no surface geometry.  All cursor-skipping logic in
/// [`Itinerary`](crate::Itinerary) reduces to "skip while `is_hold`".
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Leg {
    /// Traverse a real surface link.
    Taxi(LinkId),
    /// Wait in place for one tick.
    Hold,
}

impl Leg {
    #[inline]
    pub fn is_hold(self) -> bool {
        matches!(self, Leg::Hold)
    }

    /// The underlying link for a taxi leg, `None` for a hold.
    #[inline]
    pub fn link(self) -> Option<LinkId> {
        match self {
            Leg::Taxi(l) => Some(l),
            Leg::Hold => None,
        }
    }

    /// Physical length of this leg in metres.  Holds are zero-length.
    #[inline]
    pub fn length_m(self, surface: &SurfaceGraph) -> f64 {
        match self {
            Leg::Taxi(l) => surface.link(l).length_m(),
            Leg::Hold => 0.0,
        }
    }
}

/// Why a hold slot was inserted.
///
/// The two causes are tracked separately: uncertainty holds are exogenous
/// and survive rerouting, scheduler holds are conflict-resolution artifacts
/// recreated on every scheduling pass.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DelayCause {
    /// Exogenous/random delay injected by the simulation.
    Uncertainty,
    /// Delay inserted by the scheduler to resolve a predicted conflict.
    Scheduler,
}
