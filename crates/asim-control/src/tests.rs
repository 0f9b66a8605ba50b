//! Unit tests for asim-control.

#[cfg(test)]
mod helpers {
    use asim_core::{GeoPoint, NodeId};
    use asim_surface::{LinkKind, SurfaceGraph, SurfaceGraphBuilder};

    /// Degrees of latitude per metre, approximately.
    const DEG_PER_M: f64 = 1.0 / 111_195.0;

    pub struct Fixture {
        pub surface: SurfaceGraph,
        pub gate: NodeId,
        pub spot: NodeId,
        /// The flow spot drawn a second time, ~1 m away from `spot`.
        pub spot_twin: NodeId,
        pub crossing: NodeId,
    }

    /// Gate → spot corridor plus one taxiway crossing beyond the spot.  The
    /// spot exists twice in the drawing, canonicalized into one identity.
    pub fn fixture() -> Fixture {
        let mut b = SurfaceGraphBuilder::new();
        let base = 37.6190;
        let gate = b.add_node("G1", GeoPoint::new(base, -122.3920));
        let spot = b.add_node("S1", GeoPoint::new(base + 200.0 * DEG_PER_M, -122.3920));
        let spot_twin =
            b.add_node("S1_0", GeoPoint::new(base + 201.0 * DEG_PER_M, -122.3920));
        let crossing =
            b.add_node("I1", GeoPoint::new(base + 500.0 * DEG_PER_M, -122.3920));

        b.add_two_way("G1-S1", LinkKind::Ramp, vec![gate, spot]).unwrap();
        b.add_link("S1-I1", LinkKind::Taxiway, vec![spot_twin, crossing]).unwrap();
        b.mark_gate(gate, spot);
        b.mark_spot(spot);

        let surface = b.build(3.0);
        Fixture { surface, gate, spot, spot_twin, crossing }
    }
}

// ── IntersectionLockManager ───────────────────────────────────────────────────

#[cfg(test)]
mod locks {
    use asim_core::AircraftId;

    use crate::IntersectionLockManager;

    use super::helpers::fixture;

    const A: AircraftId = AircraftId(0);
    const B: AircraftId = AircraftId(1);

    #[test]
    fn closest_claimant_holds() {
        let f = fixture();
        let mut locks = IntersectionLockManager::new();

        locks.claim(A, &[(f.crossing, 80.0)], &f.surface);
        locks.claim(B, &[(f.crossing, 40.0)], &f.surface);

        assert!(!locks.holds_lock(A, &[(f.crossing, 80.0)], &f.surface));
        assert!(locks.holds_lock(B, &[(f.crossing, 40.0)], &f.surface));
        assert_eq!(locks.holder(f.crossing, &f.surface), Some(B));
    }

    #[test]
    fn at_most_one_holder() {
        let f = fixture();
        let mut locks = IntersectionLockManager::new();

        locks.claim(A, &[(f.crossing, 50.0)], &f.surface);
        locks.claim(B, &[(f.crossing, 50.0)], &f.surface);

        let holders = [A, B]
            .iter()
            .filter(|&&ac| locks.holds_lock(ac, &[(f.crossing, 50.0)], &f.surface))
            .count();
        assert_eq!(holders, 1);
    }

    #[test]
    fn equal_distance_ties_go_to_first_claimant() {
        let f = fixture();
        let mut locks = IntersectionLockManager::new();

        locks.claim(B, &[(f.crossing, 50.0)], &f.surface);
        locks.claim(A, &[(f.crossing, 50.0)], &f.surface);

        assert_eq!(locks.holder(f.crossing, &f.surface), Some(B));
    }

    #[test]
    fn must_hold_every_ahead_intersection() {
        let f = fixture();
        let mut locks = IntersectionLockManager::new();

        // A is closest at the spot, B is closest at the crossing.
        locks.claim(A, &[(f.spot, 10.0), (f.crossing, 90.0)], &f.surface);
        locks.claim(B, &[(f.spot, 60.0), (f.crossing, 30.0)], &f.surface);

        assert!(!locks.holds_lock(A, &[(f.spot, 10.0), (f.crossing, 90.0)], &f.surface));
        assert!(!locks.holds_lock(B, &[(f.spot, 60.0), (f.crossing, 30.0)], &f.surface));
    }

    #[test]
    fn empty_lookahead_trivially_holds() {
        let f = fixture();
        let locks = IntersectionLockManager::new();
        assert!(locks.holds_lock(A, &[], &f.surface));
    }

    #[test]
    fn unclaimed_intersection_does_not_block() {
        let f = fixture();
        let locks = IntersectionLockManager::new();
        assert!(locks.holds_lock(A, &[(f.crossing, 10.0)], &f.surface));
    }

    #[test]
    fn release_clears_queue_for_next_claimant() {
        let f = fixture();
        let mut locks = IntersectionLockManager::new();

        locks.claim(A, &[(f.crossing, 10.0)], &f.surface);
        locks.claim(B, &[(f.crossing, 70.0)], &f.surface);
        assert_eq!(locks.holder(f.crossing, &f.surface), Some(A));

        locks.release(&[f.crossing], &f.surface);
        assert_eq!(locks.holder(f.crossing, &f.surface), None);

        // Survivor re-claims next tick and becomes the holder.
        locks.claim(B, &[(f.crossing, 60.0)], &f.surface);
        assert_eq!(locks.holder(f.crossing, &f.surface), Some(B));
    }

    #[test]
    fn release_unclaimed_is_noop() {
        let f = fixture();
        let mut locks = IntersectionLockManager::new();
        locks.release(&[f.crossing], &f.surface);
        assert_eq!(locks.claimed_count(), 0);
    }

    #[test]
    fn repeat_claims_do_not_duplicate() {
        let f = fixture();
        let mut locks = IntersectionLockManager::new();

        locks.claim(A, &[(f.crossing, 50.0)], &f.surface);
        locks.claim(A, &[(f.crossing, 45.0)], &f.surface);
        locks.claim(A, &[(f.crossing, 40.0)], &f.surface);
        assert_eq!(locks.claims_at(f.crossing, &f.surface), 1);
    }

    #[test]
    fn coincident_nodes_share_one_lock() {
        let f = fixture();
        let mut locks = IntersectionLockManager::new();

        // A claims via the spot, B via its nearly-coincident twin.
        locks.claim(A, &[(f.spot, 20.0)], &f.surface);
        locks.claim(B, &[(f.spot_twin, 55.0)], &f.surface);

        assert_eq!(locks.claims_at(f.spot, &f.surface), 2);
        assert_eq!(locks.holder(f.spot_twin, &f.surface), Some(A));
        assert!(!locks.holds_lock(B, &[(f.spot_twin, 55.0)], &f.surface));
    }

    #[test]
    fn release_all_claims_unblocks_waiters() {
        let f = fixture();
        let mut locks = IntersectionLockManager::new();

        locks.claim(A, &[(f.spot, 5.0), (f.crossing, 45.0)], &f.surface);
        locks.claim(B, &[(f.crossing, 70.0)], &f.surface);

        // A departs the surface without crossing anything.
        locks.release_all_claims_of(A);
        assert!(locks.holds_lock(B, &[(f.crossing, 70.0)], &f.surface));
        assert_eq!(locks.claims_at(f.spot, &f.surface), 0);
    }
}

// ── CorridorAdmissionController ───────────────────────────────────────────────

#[cfg(test)]
mod corridor {
    use asim_core::AircraftId;

    use crate::CorridorAdmissionController;

    use super::helpers::fixture;

    const ARR: AircraftId = AircraftId(0);
    const DEP: AircraftId = AircraftId(1);

    #[test]
    fn departure_admitted_into_empty_corridor() {
        let f = fixture();
        let mut ctl = CorridorAdmissionController::new();

        assert!(ctl.may_admit_departure(f.gate, &f.surface));
        ctl.register_departure(DEP, f.gate, &f.surface);
        assert_eq!(ctl.occupancy(f.spot, &f.surface), -1);
        // Departures may share the corridor with each other.
        assert!(ctl.may_admit_departure(f.gate, &f.surface));
    }

    #[test]
    fn arrival_blocked_while_departure_inside() {
        let f = fixture();
        let mut ctl = CorridorAdmissionController::new();

        ctl.register_departure(DEP, f.gate, &f.surface);
        ctl.register_arrival(ARR, f.gate);

        let ahead = [(f.spot_twin, 42.0)];
        assert!(!ctl.arrival_may_advance(ARR, &ahead, &f.surface));
        assert_eq!(ctl.occupancy(f.spot, &f.surface), -1);

        // Departure leaves the corridor; the arrival is admitted.
        ctl.note_departure_passed(DEP, &[f.spot], &f.surface);
        assert_eq!(ctl.occupancy(f.spot, &f.surface), 0);
        assert!(ctl.arrival_may_advance(ARR, &ahead, &f.surface));
        assert_eq!(ctl.occupancy(f.spot, &f.surface), 1);
    }

    #[test]
    fn arrival_far_from_spot_keeps_moving() {
        let f = fixture();
        let mut ctl = CorridorAdmissionController::new();

        ctl.register_departure(DEP, f.gate, &f.surface);
        ctl.register_arrival(ARR, f.gate);

        // Flow spot not in the lookahead window: free to move, not counted.
        assert!(ctl.arrival_may_advance(ARR, &[(f.crossing, 80.0)], &f.surface));
        assert_eq!(ctl.occupancy(f.spot, &f.surface), -1);
    }

    #[test]
    fn arrival_counted_once_across_coincident_nodes() {
        let f = fixture();
        let mut ctl = CorridorAdmissionController::new();
        ctl.register_arrival(ARR, f.gate);

        assert!(ctl.arrival_may_advance(ARR, &[(f.spot, 30.0)], &f.surface));
        assert!(ctl.arrival_may_advance(ARR, &[(f.spot_twin, 12.0)], &f.surface));
        assert_eq!(ctl.occupancy(f.spot, &f.surface), 1);
    }

    #[test]
    fn departure_blocked_while_arrival_inside() {
        let f = fixture();
        let mut ctl = CorridorAdmissionController::new();
        ctl.register_arrival(ARR, f.gate);
        assert!(ctl.arrival_may_advance(ARR, &[(f.spot, 25.0)], &f.surface));

        assert!(!ctl.may_admit_departure(f.gate, &f.surface));

        // Arrival parks at the gate; the corridor frees up.
        ctl.complete_arrival(ARR, &f.surface);
        assert_eq!(ctl.occupancy(f.spot, &f.surface), 0);
        assert!(ctl.may_admit_departure(f.gate, &f.surface));
    }

    #[test]
    fn occupancy_magnitude_tracks_concurrent_arrivals() {
        let f = fixture();
        let mut ctl = CorridorAdmissionController::new();
        let a2 = AircraftId(7);

        ctl.register_arrival(ARR, f.gate);
        ctl.register_arrival(a2, f.gate);
        assert!(ctl.arrival_may_advance(ARR, &[(f.spot, 30.0)], &f.surface));
        assert!(ctl.arrival_may_advance(a2, &[(f.spot, 55.0)], &f.surface));
        assert_eq!(ctl.occupancy(f.spot, &f.surface), 2);

        ctl.complete_arrival(ARR, &f.surface);
        assert_eq!(ctl.occupancy(f.spot, &f.surface), 1);
        ctl.complete_arrival(a2, &f.surface);
        assert_eq!(ctl.occupancy(f.spot, &f.surface), 0);
    }

    #[test]
    fn departure_crossing_is_counted_once() {
        let f = fixture();
        let mut ctl = CorridorAdmissionController::new();

        ctl.register_departure(DEP, f.gate, &f.surface);
        ctl.note_departure_passed(DEP, &[f.spot_twin], &f.surface);
        assert_eq!(ctl.occupancy(f.spot, &f.surface), 0);

        // Already untracked: further passes change nothing.
        ctl.note_departure_passed(DEP, &[f.spot], &f.surface);
        assert_eq!(ctl.occupancy(f.spot, &f.surface), 0);
    }

    #[test]
    fn removing_untracked_departure_is_noop() {
        let f = fixture();
        let mut ctl = CorridorAdmissionController::new();
        ctl.remove_departure(DEP, &f.surface);
        assert_eq!(ctl.occupancy(f.spot, &f.surface), 0);
    }

    #[test]
    fn removed_departure_returns_its_slot() {
        let f = fixture();
        let mut ctl = CorridorAdmissionController::new();
        ctl.register_departure(DEP, f.gate, &f.surface);
        ctl.remove_departure(DEP, &f.surface);
        assert_eq!(ctl.occupancy(f.spot, &f.surface), 0);
    }

    #[test]
    fn gate_without_corridor_is_unguarded() {
        let f = fixture();
        let ctl = CorridorAdmissionController::new();
        // The crossing node is not a gate; no flow spot is mapped.
        assert!(ctl.may_admit_departure(f.crossing, &f.surface));
    }
}
