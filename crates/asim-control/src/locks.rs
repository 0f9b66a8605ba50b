//! Intersection locking.
//!
//! Every canonical intersection node carries a queue of claims
//! `(claim_distance, aircraft)`.  The claimant with the smallest distance is
//! the lock holder; ties are broken by insertion order, so the first
//! claimant wins and repeated equal-distance claims cannot starve anyone.
//!
//! This is a wait-for-grant gate, not a retry protocol: an aircraft that is
//! not the holder of every intersection it is about to enter simply does not
//! advance this tick.  Claims use the distance at claim time; the queue for
//! an intersection is cleared wholesale when an aircraft physically passes
//! it, after which surviving contenders re-claim with fresh distances on the
//! next tick.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use asim_core::{AircraftId, NodeId};
use asim_surface::SurfaceGraph;

/// Serializes access to every canonical intersection node.
#[derive(Clone, Debug, Default)]
pub struct IntersectionLockManager {
    /// Canonical intersection → ordered claims.  Insertion order is the
    /// tie-break, so entries are never re-sorted.
    queues: FxHashMap<NodeId, Vec<(f64, AircraftId)>>,
}

impl IntersectionLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register claims for every intersection in the aircraft's lookahead
    /// window (`ahead` as produced by `Itinerary::ahead_intersections`).
    ///
    /// A claim is skipped when the same aircraft is already the most recent
    /// claimant of that queue, so repeated ticks before release do not pile
    /// up duplicates.  Nearly-coincident ahead nodes that canonicalize to
    /// the same intersection are claimed once per call.
    pub fn claim(
        &mut self,
        aircraft: AircraftId,
        ahead: &[(NodeId, f64)],
        surface: &SurfaceGraph,
    ) {
        let mut claimed_now: FxHashSet<NodeId> = FxHashSet::default();
        for &(node, distance) in ahead {
            let key = surface.canonical_of(node);
            if !claimed_now.insert(key) {
                continue;
            }
            let queue = self.queues.entry(key).or_default();
            if queue.last().map(|&(_, a)| a) != Some(aircraft) {
                queue.push((distance, aircraft));
            }
        }
    }

    /// `true` only if `aircraft` is the minimum-distance claimant of *every*
    /// intersection it is about to enter.
    ///
    /// An empty lookahead window (no intersections within reach) trivially
    /// holds; so does an intersection nobody has claimed.
    pub fn holds_lock(
        &self,
        aircraft: AircraftId,
        ahead: &[(NodeId, f64)],
        surface: &SurfaceGraph,
    ) -> bool {
        for &(node, _) in ahead {
            let key = surface.canonical_of(node);
            match self.queues.get(&key) {
                None => continue,
                Some(queue) => {
                    if min_claimant(queue) != Some(aircraft) {
                        trace!(%aircraft, intersection = %key, "lock held by another aircraft");
                        return false;
                    }
                }
            }
        }
        true
    }

    /// The current holder of an intersection's lock, if anyone claimed it.
    pub fn holder(&self, node: NodeId, surface: &SurfaceGraph) -> Option<AircraftId> {
        self.queues
            .get(&surface.canonical_of(node))
            .and_then(|q| min_claimant(q))
    }

    /// Release the queues of intersections that have now been physically
    /// passed (end nodes of the links completed this tick).
    ///
    /// Releasing an intersection that was never claimed is a no-op.
    pub fn release(&mut self, passed: &[NodeId], surface: &SurfaceGraph) {
        for &node in passed {
            self.queues.remove(&surface.canonical_of(node));
        }
    }

    /// Strip every pending claim of `aircraft` — used when it leaves the
    /// surface without passing its claimed intersections, so nobody waits on
    /// a ghost.
    pub fn release_all_claims_of(&mut self, aircraft: AircraftId) {
        self.queues.retain(|_, queue| {
            queue.retain(|&(_, a)| a != aircraft);
            !queue.is_empty()
        });
    }

    /// Number of intersections with at least one pending claim.
    pub fn claimed_count(&self) -> usize {
        self.queues.len()
    }

    /// Number of pending claims on one intersection's queue.
    pub fn claims_at(&self, node: NodeId, surface: &SurfaceGraph) -> usize {
        self.queues
            .get(&surface.canonical_of(node))
            .map_or(0, |q| q.len())
    }
}

/// Minimum-distance claimant; ties resolve to the earliest insertion.
fn min_claimant(queue: &[(f64, AircraftId)]) -> Option<AircraftId> {
    let mut best: Option<(f64, AircraftId)> = None;
    for &(d, a) in queue {
        match best {
            // Strict `<` keeps the first claimant on equal distances.
            Some((bd, _)) if d < bd => best = Some((d, a)),
            None => best = Some((d, a)),
            _ => {}
        }
    }
    best.map(|(_, a)| a)
}
