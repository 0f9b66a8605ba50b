//! The `Itinerary` cursor state machine.
//!
//! # Cursor model
//!
//! Progress is `(cursor, offset_m)`: the index of the current leg plus the
//! distance already travelled into the first *real* leg at or after the
//! cursor.  Holds are zero-length, so `offset_m` always refers to real
//! geometry and survives hold consumption unchanged.
//!
//! The cursor never moves backwards.  `cursor >= legs.len()` means the
//! itinerary is completed; any excess advance distance is discarded at that
//! point.
//!
//! # Hold semantics
//!
//! - A hold sitting *at the cursor* when `tick` is called consumes the whole
//!   tick: no movement, regardless of the distance passed in.  Consecutive
//!   holds therefore cost one tick each.
//! - Holds crossed *mid-advance* (while consuming real links) are skipped for
//!   free; they already spent their tick back when they were at the cursor,
//!   or were inserted behind a link boundary the aircraft is flying past.
//!
//! # Delay bookkeeping
//!
//! `add_delay` inserts a hold at the cursor and records the insertion index
//! under its cause.  Every previously recorded index ≥ cursor shifts up by
//! one so each marker keeps referring to its original leg.

use asim_core::{GeoPoint, LinkId, NodeId};
use asim_surface::SurfaceGraph;

use crate::leg::{DelayCause, Leg};

// ── Lookahead ─────────────────────────────────────────────────────────────────

/// The result of a pure [`Itinerary::lookahead`] query: what the cursor would
/// become after advancing, without mutating anything.
#[derive(Clone, Debug)]
pub struct Lookahead {
    /// Leg index the cursor would land on.
    pub leg_index: usize,
    /// Offset into the current real leg at that point.
    pub offset_m: f64,
    /// Interpolated position at that point.  `None` only for an itinerary
    /// with zero real legs.
    pub position: Option<GeoPoint>,
    /// Whether the advance would complete the itinerary.
    pub completed: bool,
}

// ── Itinerary ─────────────────────────────────────────────────────────────────

/// An aircraft's planned sequence of legs plus its progress cursor.
///
/// Owned exclusively by one aircraft; the owning store is the only mutator.
/// Cloning is a cheap structural copy of value types, which is what makes
/// the scheduler's "clone the world" speculation affordable.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Itinerary {
    legs: Vec<Leg>,
    cursor: usize,
    offset_m: f64,
    distance_left_m: f64,
    uncertainty_delays: Vec<usize>,
    scheduler_delays: Vec<usize>,
}

/// Internal advance computation shared by `tick` (mutating) and `lookahead`
/// (pure).
struct Advance {
    cursor: usize,
    offset_m: f64,
    passed: Vec<LinkId>,
    consumed_m: f64,
}

impl Itinerary {
    // ── Construction ──────────────────────────────────────────────────────

    /// A fresh itinerary for an aircraft standing at a node.
    ///
    /// Begins with one hold leg (one tick of spool-up before movement), the
    /// behaviour every newly assigned route has.  An empty link list yields
    /// an immediately completed itinerary.
    pub fn fresh(links: Vec<LinkId>, surface: &SurfaceGraph) -> Self {
        let mut legs = Vec::with_capacity(links.len() + 1);
        if !links.is_empty() {
            legs.push(Leg::Hold);
        }
        legs.extend(links.into_iter().map(Leg::Taxi));
        let distance_left_m = total_real_length(&legs, surface);
        Self {
            legs,
            cursor: 0,
            offset_m: 0.0,
            distance_left_m,
            uncertainty_delays: Vec::new(),
            scheduler_delays: Vec::new(),
        }
    }

    /// An itinerary resuming mid-traversal of its first link.
    ///
    /// Used when rerouting an aircraft that is `offset_m` into a link it has
    /// not finished: the unfinished link is spliced in front of the new
    /// route and no spool-up hold is added.
    pub fn resuming(links: Vec<LinkId>, offset_m: f64, surface: &SurfaceGraph) -> Self {
        let legs: Vec<Leg> = links.into_iter().map(Leg::Taxi).collect();
        let offset_m = match legs.first() {
            Some(first) => offset_m.clamp(0.0, first.length_m(surface)),
            None => 0.0,
        };
        let distance_left_m = total_real_length(&legs, surface) - offset_m;
        Self {
            legs,
            cursor: 0,
            offset_m,
            distance_left_m,
            uncertainty_delays: Vec::new(),
            scheduler_delays: Vec::new(),
        }
    }

    // ── State queries ─────────────────────────────────────────────────────

    #[inline]
    pub fn len(&self) -> usize {
        self.legs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Current leg index.  Never decreases.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Distance travelled into the current real leg, in metres.
    #[inline]
    pub fn offset_m(&self) -> f64 {
        self.offset_m
    }

    /// Total real distance left to the destination, in metres.
    #[inline]
    pub fn remaining_m(&self) -> f64 {
        self.distance_left_m
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.cursor >= self.legs.len()
    }

    /// `true` while the cursor sits on a hold slot (the "holding" sub-state).
    #[inline]
    pub fn is_holding(&self) -> bool {
        self.legs.get(self.cursor).is_some_and(|l| l.is_hold())
    }

    /// The current real link: the first non-hold leg at or after the cursor.
    pub fn current_link(&self) -> Option<LinkId> {
        self.legs[self.cursor.min(self.legs.len())..]
            .iter()
            .find_map(|l| l.link())
    }

    /// Index of the current real link within the leg sequence.
    pub fn current_link_index(&self) -> Option<usize> {
        (self.cursor..self.legs.len()).find(|&i| !self.legs[i].is_hold())
    }

    /// End node of the last real leg — the itinerary's destination.
    pub fn terminal_node(&self, surface: &SurfaceGraph) -> Option<NodeId> {
        self.legs
            .iter()
            .rev()
            .find_map(|l| l.link())
            .map(|l| surface.link(l).end())
    }

    /// The coarse location: the end node of the current real link, or the
    /// destination once completed.
    pub fn coarse_location(&self, surface: &SurfaceGraph) -> Option<NodeId> {
        match self.current_link() {
            Some(l) => Some(surface.link(l).end()),
            None => self.terminal_node(surface),
        }
    }

    /// The precise location: interpolated point `offset_m` into the current
    /// real link, or the destination point once completed.  `None` only for
    /// an itinerary with zero real legs.
    pub fn precise_location(&self, surface: &SurfaceGraph) -> Option<GeoPoint> {
        self.position_at_cursor(self.cursor, self.offset_m, surface)
    }

    // ── Advancing ─────────────────────────────────────────────────────────

    /// Advance the cursor by `distance_m` metres of travel.
    ///
    /// Returns the real links fully traversed this tick, in order — the
    /// caller uses their end nodes to release intersection locks.
    ///
    /// A non-positive distance never moves the cursor backwards; it is a
    /// zero-length advance (though a hold at the cursor is still consumed —
    /// waiting happens at any speed).
    pub fn tick(&mut self, distance_m: f64, surface: &SurfaceGraph) -> Vec<LinkId> {
        let adv = self.advance(distance_m, surface);
        self.cursor = adv.cursor;
        self.offset_m = adv.offset_m;
        self.distance_left_m = (self.distance_left_m - adv.consumed_m).max(0.0);
        adv.passed
    }

    /// Pure query: what the cursor would become after advancing `distance_m`.
    ///
    /// Querying a completed itinerary, or a distance beyond the remaining
    /// path, deterministically returns the terminal position.
    pub fn lookahead(&self, distance_m: f64, surface: &SurfaceGraph) -> Lookahead {
        let adv = self.advance(distance_m, surface);
        Lookahead {
            position: self.position_at_cursor(adv.cursor, adv.offset_m, surface),
            completed: adv.cursor >= self.legs.len(),
            leg_index: adv.cursor,
            offset_m: adv.offset_m,
        }
    }

    /// End nodes of every real link reachable within `budget_m` metres from
    /// the cursor, each paired with its cumulative distance.  Holds are
    /// zero-length and skipped.
    ///
    /// This is the primitive the intersection lock manager uses to determine
    /// which intersections an aircraft is about to enter.
    pub fn ahead_intersections(
        &self,
        budget_m: f64,
        surface: &SurfaceGraph,
    ) -> Vec<(NodeId, f64)> {
        let mut out = Vec::new();
        if self.is_completed() {
            return out;
        }
        let mut cum = 0.0;
        let mut offset = self.offset_m;
        for leg in &self.legs[self.cursor..] {
            let Some(link) = leg.link() else { continue };
            cum += (surface.link(link).length_m() - offset).max(0.0);
            offset = 0.0;
            if cum > budget_m {
                break;
            }
            out.push((surface.link(link).end(), cum));
        }
        out
    }

    // ── Delay insertion ───────────────────────────────────────────────────

    /// Insert one hold slot at the cursor, recorded under `cause`.
    ///
    /// Every recorded delay index ≥ cursor shifts up by one so the markers
    /// keep referring to their original legs.  Each call adds exactly one
    /// more hold; repeated calls within one resolution attempt stack.
    ///
    /// Returns the insertion index, or `None` if the itinerary is already
    /// completed (nothing left to delay).
    pub fn add_delay(&mut self, cause: DelayCause) -> Option<usize> {
        if self.is_completed() {
            return None;
        }
        let at = self.cursor;
        for idx in self
            .uncertainty_delays
            .iter_mut()
            .chain(self.scheduler_delays.iter_mut())
        {
            if *idx >= at {
                *idx += 1;
            }
        }
        self.legs.insert(at, Leg::Hold);
        match cause {
            DelayCause::Uncertainty => self.uncertainty_delays.push(at),
            DelayCause::Scheduler => self.scheduler_delays.push(at),
        }
        Some(at)
    }

    /// Undo one `add_delay` call: remove the hold at `index` and drop its
    /// marker.  Recorded indices above it shift back down.
    ///
    /// Returns `false` (and changes nothing) if `index` does not name a hold
    /// recorded under `cause` — retraction is only valid for delays this
    /// itinerary actually carries.
    pub fn retract_delay(&mut self, index: usize, cause: DelayCause) -> bool {
        if !self.legs.get(index).is_some_and(|l| l.is_hold()) {
            return false;
        }
        let markers = match cause {
            DelayCause::Uncertainty => &mut self.uncertainty_delays,
            DelayCause::Scheduler => &mut self.scheduler_delays,
        };
        let Some(pos) = markers.iter().rposition(|&i| i == index) else {
            return false;
        };
        markers.remove(pos);
        self.legs.remove(index);
        for idx in self
            .uncertainty_delays
            .iter_mut()
            .chain(self.scheduler_delays.iter_mut())
        {
            if *idx > index {
                *idx -= 1;
            }
        }
        true
    }

    // ── Delay queries ─────────────────────────────────────────────────────

    pub fn n_scheduler_delays(&self) -> usize {
        self.scheduler_delays.len()
    }

    pub fn n_uncertainty_delays(&self) -> usize {
        self.uncertainty_delays.len()
    }

    /// Uncertainty delays not yet consumed — carried forward when the
    /// aircraft is rerouted.
    pub fn pending_uncertainty_delays(&self) -> usize {
        self.uncertainty_delays
            .iter()
            .filter(|&&i| i >= self.cursor)
            .count()
    }

    /// Recorded scheduler-delay insertion indices (ascending insertion age,
    /// not position).
    pub fn scheduler_delay_indices(&self) -> &[usize] {
        &self.scheduler_delays
    }

    pub fn uncertainty_delay_indices(&self) -> &[usize] {
        &self.uncertainty_delays
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn advance(&self, distance_m: f64, surface: &SurfaceGraph) -> Advance {
        let mut cursor = self.cursor;
        let mut offset = self.offset_m;
        let mut passed = Vec::new();
        let mut consumed = 0.0;

        if cursor >= self.legs.len() {
            return Advance { cursor, offset_m: offset, passed, consumed_m: 0.0 };
        }

        // A hold at the cursor eats the whole tick; offset is preserved for
        // the real leg behind it.
        if self.legs[cursor].is_hold() {
            cursor += 1;
            return Advance { cursor, offset_m: offset, passed, consumed_m: 0.0 };
        }

        let mut remaining = distance_m.max(0.0);
        loop {
            // Cursor always lands on a real leg here; holds are skipped below.
            let Leg::Taxi(link) = self.legs[cursor] else {
                break;
            };
            let room = surface.link(link).length_m() - offset;
            if remaining < room {
                offset += remaining;
                consumed += remaining;
                break;
            }

            remaining -= room;
            consumed += room;
            passed.push(link);
            cursor += 1;
            offset = 0.0;
            while cursor < self.legs.len() && self.legs[cursor].is_hold() {
                cursor += 1;
            }
            if cursor >= self.legs.len() {
                // Completed; any excess distance is discarded.
                break;
            }
        }

        Advance { cursor, offset_m: offset, passed, consumed_m: consumed }
    }

    fn position_at_cursor(
        &self,
        cursor: usize,
        offset_m: f64,
        surface: &SurfaceGraph,
    ) -> Option<GeoPoint> {
        for leg in &self.legs[cursor.min(self.legs.len())..] {
            if let Some(link) = leg.link() {
                return Some(surface.link(link).position_at(offset_m));
            }
        }
        // At or past the end: the destination point.
        self.legs
            .iter()
            .rev()
            .find_map(|l| l.link())
            .map(|l| surface.node_pos(surface.link(l).end()))
    }
}

fn total_real_length(legs: &[Leg], surface: &SurfaceGraph) -> f64 {
    legs.iter().map(|l| l.length_m(surface)).sum()
}
