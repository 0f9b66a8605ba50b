//! Unit tests for asim-ground.

#[cfg(test)]
mod helpers {
    use asim_core::{AircraftId, GeoPoint, LinkId, NodeId, SimConfig, Tick};
    use asim_surface::{LinkKind, SurfaceGraph, SurfaceGraphBuilder};

    use crate::{Flight, FlightKind, Ground, Scenario};

    /// Degrees of latitude per metre, approximately.
    const DEG_PER_M: f64 = 1.0 / 111_195.0;

    /// A minimal two-gate airport.
    ///
    /// ```text
    /// G1 ═ S1 ═ G2        (bidirectional pushback corridors)
    ///      ║
    ///      S1 ⇄ I1 → T ──runway── E
    ///                ↑____________│   (E-I1 taxiway for arrivals)
    /// ```
    pub struct Airfield {
        pub surface: SurfaceGraph,
        pub g1: NodeId,
        pub g2: NodeId,
        pub s1: NodeId,
        pub i1: NodeId,
        pub threshold: NodeId,
        pub exit: NodeId,
        /// Gate→spot links (outbound) and their reverses (inbound).
        pub g1s1: LinkId,
        pub s1g1: LinkId,
        pub g2s1: LinkId,
        pub s1i1: LinkId,
        pub i1s1: LinkId,
        pub i1t: LinkId,
        pub ei1: LinkId,
        pub rwy: LinkId,
    }

    pub fn airfield() -> Airfield {
        let lat = 37.6100;
        let lon = -122.3900;
        let m = DEG_PER_M;

        let mut b = SurfaceGraphBuilder::new();
        let g1 = b.add_node("G1", GeoPoint::new(lat, lon));
        let g2 = b.add_node("G2", GeoPoint::new(lat, lon + 40.0 * m));
        let s1 = b.add_node("S1", GeoPoint::new(lat + 200.0 * m, lon + 20.0 * m));
        let i1 = b.add_node("I1", GeoPoint::new(lat + 500.0 * m, lon + 20.0 * m));
        let threshold = b.add_node("T", GeoPoint::new(lat + 800.0 * m, lon + 20.0 * m));
        let exit = b.add_node("E", GeoPoint::new(lat + 1300.0 * m, lon + 20.0 * m));

        let (g1s1, s1g1) = b.add_two_way("G1-S1", LinkKind::Pushback, vec![g1, s1]).unwrap();
        let (g2s1, _s1g2) = b.add_two_way("G2-S1", LinkKind::Pushback, vec![g2, s1]).unwrap();
        let s1i1 = b.add_link("S1-I1", LinkKind::Taxiway, vec![s1, i1]).unwrap();
        let i1s1 = b.add_link("I1-S1", LinkKind::Taxiway, vec![i1, s1]).unwrap();
        let i1t = b.add_link("I1-T", LinkKind::Taxiway, vec![i1, threshold]).unwrap();
        let ei1 = b.add_link("E-I1", LinkKind::Taxiway, vec![exit, i1]).unwrap();
        let rwy = b.add_link("10L", LinkKind::Runway, vec![threshold, exit]).unwrap();

        b.mark_gate(g1, s1);
        b.mark_gate(g2, s1);
        b.mark_spot(s1);
        b.mark_runway(rwy);

        Airfield {
            surface: b.build(3.0),
            g1, g2, s1, i1, threshold, exit,
            g1s1, s1g1, g2s1, s1i1, i1s1, i1t, ei1, rwy,
        }
    }

    pub fn cfg() -> SimConfig {
        SimConfig {
            conflict_threshold_m: 30.0,
            lock_lookahead_m: 120.0,
            departure_interval_ticks: 5,
            ..SimConfig::default()
        }
    }

    pub fn departure(callsign: &str, gate: NodeId, rwy: LinkId, at: u64) -> Flight {
        Flight {
            callsign: callsign.to_string(),
            kind: FlightKind::Departure,
            gate,
            runway: rwy,
            appears_at: Tick(at),
        }
    }

    pub fn arrival(callsign: &str, gate: NodeId, rwy: LinkId, at: u64) -> Flight {
        Flight {
            callsign: callsign.to_string(),
            kind: FlightKind::Arrival,
            gate,
            runway: rwy,
            appears_at: Tick(at),
        }
    }

    /// Put an aircraft straight onto the surface, bypassing queues.
    pub fn force_active(ground: &mut Ground, id: AircraftId, home: NodeId) {
        let i = id.index();
        ground.store.spawned[i] = true;
        ground.store.active[i] = true;
        ground.store.home[i] = home;
    }

    pub fn ground_with(flights: Vec<Flight>) -> (Ground, Scenario) {
        let scenario = Scenario::new(flights);
        (Ground::new(&scenario), scenario)
    }
}

// ── Spawning & queues ─────────────────────────────────────────────────────────

#[cfg(test)]
mod spawning {
    use asim_core::Tick;
    use asim_itinerary::Itinerary;

    use super::helpers::{airfield, arrival, cfg, departure, ground_with};

    #[test]
    fn departure_activates_at_gate() {
        let f = airfield();
        let (mut ground, scenario) =
            ground_with(vec![departure("AAL1", f.g1, f.rwy, 0)]);

        ground.spawn_due(&scenario, Tick(0), &f.surface, &cfg());
        assert_eq!(ground.store.active_count(), 1);
        assert_eq!(ground.store.home[0], f.g1);
        // Departure counts into its corridor immediately.
        assert_eq!(ground.corridor.occupancy(f.s1, &f.surface), -1);
    }

    #[test]
    fn flight_waits_for_its_appearance_tick() {
        let f = airfield();
        let (mut ground, scenario) =
            ground_with(vec![departure("AAL1", f.g1, f.rwy, 10)]);

        ground.spawn_due(&scenario, Tick(9), &f.surface, &cfg());
        assert_eq!(ground.store.active_count(), 0);
        ground.spawn_due(&scenario, Tick(10), &f.surface, &cfg());
        assert_eq!(ground.store.active_count(), 1);
    }

    #[test]
    fn occupied_gate_queues_second_departure() {
        let f = airfield();
        let (mut ground, scenario) = ground_with(vec![
            departure("AAL1", f.g1, f.rwy, 0),
            departure("AAL2", f.g1, f.rwy, 0),
        ]);

        ground.spawn_due(&scenario, Tick(0), &f.surface, &cfg());
        assert_eq!(ground.store.active_count(), 1);
        assert!(ground.store.spawned[1]);
        assert!(!ground.store.active[1]);

        // First departure leaves (trivial route, retires as a takeoff);
        // the queued one is admitted on the next spawn pass.
        ground.set_itinerary(asim_core::AircraftId(0), Itinerary::fresh(vec![], &f.surface));
        ground.retire_finished(Tick(1), &f.surface, &cfg());
        assert!(!ground.store.active[0]);

        ground.spawn_due(&scenario, Tick(1), &f.surface, &cfg());
        assert!(ground.store.active[1]);
    }

    #[test]
    fn arrival_activates_at_runway_exit() {
        let f = airfield();
        let (mut ground, scenario) =
            ground_with(vec![arrival("UAL9", f.g1, f.rwy, 0)]);

        ground.spawn_due(&scenario, Tick(0), &f.surface, &cfg());
        assert_eq!(ground.store.active_count(), 1);
        assert_eq!(ground.store.home[0], f.exit);
        // Arrivals only count in when they cross the flow spot.
        assert_eq!(ground.corridor.occupancy(f.s1, &f.surface), 0);
    }

    #[test]
    fn departure_blocked_while_arrival_owns_corridor() {
        let f = airfield();
        let (mut ground, scenario) = ground_with(vec![
            arrival("UAL9", f.g1, f.rwy, 0),
            departure("AAL1", f.g1, f.rwy, 1),
        ]);

        // The arrival spawns first and steps into the corridor.
        ground.spawn_due(&scenario, Tick(0), &f.surface, &cfg());
        let admitted = ground
            .corridor
            .arrival_may_advance(asim_core::AircraftId(0), &[(f.s1, 50.0)], &f.surface);
        assert!(admitted);

        // A departure from a guarded gate must now wait in the gate queue.
        ground.spawn_due(&scenario, Tick(1), &f.surface, &cfg());
        assert!(!ground.store.active[1]);
    }
}

// ── Tick protocol ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod ticking {
    use asim_core::{AircraftId, AircraftState};
    use asim_itinerary::{DelayCause, Itinerary};
    use asim_motion::MotionProfile;

    use super::helpers::{airfield, cfg, departure, force_active, ground_with};

    const A: AircraftId = AircraftId(0);
    const B: AircraftId = AircraftId(1);

    #[test]
    fn aircraft_advances_along_route() {
        let f = airfield();
        let (mut ground, _) = ground_with(vec![departure("AAL1", f.g1, f.rwy, 0)]);
        force_active(&mut ground, A, f.g1);
        ground.set_itinerary(A, Itinerary::fresh(vec![f.g1s1, f.s1i1, f.i1t], &f.surface));

        let profile = MotionProfile::default();
        let start = ground.store.precise_position(A, &f.surface);

        // First tick eats the spool-up hold, later ticks move.
        ground.tick(&f.surface, &profile, &cfg());
        for _ in 0..5 {
            ground.tick(&f.surface, &profile, &cfg());
        }
        let here = ground.store.precise_position(A, &f.surface);
        assert!(here.distance_m(start) > 1.0);
        assert!(ground.store.speed_mps[0] > 0.0);
    }

    #[test]
    fn state_derivation_with_hysteresis() {
        let f = airfield();
        let (mut ground, _) = ground_with(vec![departure("AAL1", f.g1, f.rwy, 0)]);
        force_active(&mut ground, A, f.g1);
        ground.set_itinerary(A, Itinerary::fresh(vec![f.g1s1, f.s1i1], &f.surface));

        // Spool-up hold at the gate reads as still stopped.
        assert_eq!(ground.store.state_of(A, &f.surface), AircraftState::Stopped);

        let profile = MotionProfile::default();
        ground.tick(&f.surface, &profile, &cfg()); // consume hold
        ground.tick(&f.surface, &profile, &cfg()); // start moving
        assert_eq!(ground.store.state_of(A, &f.surface), AircraftState::Pushback);

        // A delay inserted mid-route reads as holding, not stopped.
        if let Some(it) = ground.store.itinerary[0].as_mut() {
            it.add_delay(DelayCause::Scheduler);
        }
        assert_eq!(ground.store.state_of(A, &f.surface), AircraftState::Holding);
    }

    #[test]
    fn close_follower_hard_brakes() {
        let f = airfield();
        let (mut ground, _) = ground_with(vec![
            departure("AAL1", f.g1, f.rwy, 0),
            departure("AAL2", f.g2, f.rwy, 0),
        ]);
        // Both on the same taxiway; B is 20 m behind A (inside the 30 m
        // minimum separation).
        force_active(&mut ground, A, f.s1);
        force_active(&mut ground, B, f.s1);
        ground.set_itinerary(A, Itinerary::resuming(vec![f.s1i1, f.i1t], 100.0, &f.surface));
        ground.set_itinerary(B, Itinerary::resuming(vec![f.s1i1, f.i1t], 80.0, &f.surface));
        ground.store.speed_mps[0] = 10.0;
        ground.store.speed_mps[1] = 10.0;

        ground.tick(&f.surface, &MotionProfile::default(), &cfg());

        assert_eq!(ground.store.speed_mps[1], 0.0, "follower must stop");
        assert!(ground.store.speed_mps[0] > 0.0, "leader keeps going");
    }

    #[test]
    fn lock_loser_does_not_advance() {
        let f = airfield();
        let (mut ground, _) = ground_with(vec![
            departure("AAL1", f.g1, f.rwy, 0),
            departure("AAL2", f.g2, f.rwy, 0),
        ]);
        // A is 80 m short of I1, B is 110 m short of I1 on a different link.
        force_active(&mut ground, A, f.s1);
        force_active(&mut ground, B, f.exit);
        ground.set_itinerary(A, Itinerary::resuming(vec![f.s1i1, f.i1t], 220.0, &f.surface));
        ground.set_itinerary(B, Itinerary::resuming(vec![f.ei1, f.i1s1], 690.0, &f.surface));
        ground.store.speed_mps[0] = 10.0;
        ground.store.speed_mps[1] = 10.0;

        let outcome = ground.tick(&f.surface, &MotionProfile::default(), &cfg());

        assert_eq!(outcome.advanced, 1);
        assert_eq!(outcome.held, 1);
        let a_it = ground.store.itinerary[0].as_ref().unwrap();
        let b_it = ground.store.itinerary[1].as_ref().unwrap();
        assert!(a_it.offset_m() > 220.0);
        assert_eq!(b_it.offset_m(), 690.0, "lock loser must not move");
    }

    #[test]
    fn passing_an_intersection_releases_its_lock() {
        let f = airfield();
        let (mut ground, _) = ground_with(vec![departure("AAL1", f.g1, f.rwy, 0)]);
        force_active(&mut ground, A, f.s1);
        // 5 m short of I1, fast enough to cross it this tick.
        ground.set_itinerary(A, Itinerary::resuming(vec![f.s1i1, f.i1t], 295.0, &f.surface));
        ground.store.speed_mps[0] = 10.0;

        ground.tick(&f.surface, &MotionProfile::default(), &cfg());

        assert_eq!(ground.locks.holder(f.i1, &f.surface), None);
    }

    #[test]
    fn clone_is_a_fully_independent_sandbox() {
        let f = airfield();
        let (mut ground, _) = ground_with(vec![departure("AAL1", f.g1, f.rwy, 0)]);
        force_active(&mut ground, A, f.s1);
        ground.set_itinerary(A, Itinerary::resuming(vec![f.s1i1, f.i1t], 50.0, &f.surface));
        ground.store.speed_mps[0] = 10.0;

        let mut sandbox = ground.clone();
        for _ in 0..5 {
            sandbox.tick(&f.surface, &MotionProfile::default(), &cfg());
        }

        let live = ground.store.itinerary[0].as_ref().unwrap();
        let spec = sandbox.store.itinerary[0].as_ref().unwrap();
        assert_eq!(live.offset_m(), 50.0, "live state must not move");
        assert!(spec.offset_m() > 50.0);
    }
}

// ── Conflicts ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod conflicts {
    use asim_core::{AircraftId, GeoPoint};
    use asim_itinerary::Itinerary;

    use crate::Conflict;

    use super::helpers::{airfield, cfg, departure, force_active, ground_with};

    const A: AircraftId = AircraftId(0);
    const B: AircraftId = AircraftId(1);

    #[test]
    fn converging_next_positions_conflict() {
        let f = airfield();
        let (mut ground, _) = ground_with(vec![
            departure("AAL1", f.g1, f.rwy, 0),
            departure("AAL2", f.g2, f.rwy, 0),
        ]);
        // Both 10 m short of I1 on different links, closing at 10 m/s.
        force_active(&mut ground, A, f.s1);
        force_active(&mut ground, B, f.exit);
        ground.set_itinerary(A, Itinerary::resuming(vec![f.s1i1, f.i1t], 290.0, &f.surface));
        ground.set_itinerary(B, Itinerary::resuming(vec![f.ei1, f.i1s1], 790.0, &f.surface));
        ground.store.speed_mps[0] = 10.0;
        ground.store.speed_mps[1] = 10.0;

        let conflicts = ground.next_conflicts(&f.surface, &cfg());
        assert_eq!(conflicts.len(), 1);
        assert!(conflicts[0].involves(A));
        assert!(conflicts[0].involves(B));
    }

    #[test]
    fn distant_aircraft_do_not_conflict() {
        let f = airfield();
        let (mut ground, _) = ground_with(vec![
            departure("AAL1", f.g1, f.rwy, 0),
            departure("AAL2", f.g2, f.rwy, 0),
        ]);
        force_active(&mut ground, A, f.s1);
        force_active(&mut ground, B, f.exit);
        ground.set_itinerary(A, Itinerary::resuming(vec![f.s1i1], 10.0, &f.surface));
        ground.set_itinerary(B, Itinerary::resuming(vec![f.ei1], 10.0, &f.surface));

        assert!(ground.next_conflicts(&f.surface, &cfg()).is_empty());
    }

    #[test]
    fn conflict_identity_is_content_based() {
        let p1 = GeoPoint::new(37.61, -122.39);
        let p2 = GeoPoint::new(37.6100001, -122.39);
        let c1 = Conflict::new(A, "AAL1", p1, B, "AAL2", p2);
        // Same pair observed in a different speculative run, reversed order.
        let c2 = Conflict::new(B, "AAL2", p2, A, "AAL1", p1);
        assert_eq!(c1, c2);
        assert_eq!(c1.id(), c2.id());
        assert_eq!(c1.first, c2.first);
    }

    #[test]
    fn different_locations_are_different_conflicts() {
        let p1 = GeoPoint::new(37.61, -122.39);
        let p2 = GeoPoint::new(37.62, -122.39);
        let c1 = Conflict::new(A, "AAL1", p1, B, "AAL2", p1);
        let c2 = Conflict::new(A, "AAL1", p2, B, "AAL2", p2);
        assert_ne!(c1, c2);
    }
}

// ── Retirement ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod retirement {
    use asim_core::{AircraftId, Tick};
    use asim_itinerary::Itinerary;

    use super::helpers::{airfield, arrival, cfg, departure, force_active, ground_with};

    const A: AircraftId = AircraftId(0);
    const B: AircraftId = AircraftId(1);

    #[test]
    fn completed_departure_takes_off() {
        let f = airfield();
        let (mut ground, _) = ground_with(vec![departure("AAL1", f.g1, f.rwy, 0)]);
        force_active(&mut ground, A, f.g1);
        ground.set_itinerary(A, Itinerary::resuming(vec![f.i1t], 0.0, &f.surface));
        ground.store.itinerary[0].as_mut().unwrap().tick(10_000.0, &f.surface);

        // Completed: parked at the runway threshold.
        assert_eq!(ground.store.coarse_location(A, &f.surface), f.threshold);

        ground.retire_finished(Tick(10), &f.surface, &cfg());
        assert!(!ground.store.active[0]);
        assert!(ground.store.done[0]);
        assert_eq!(ground.takeoff_count, 1);
    }

    #[test]
    fn takeoffs_respect_runway_spacing() {
        let f = airfield();
        let (mut ground, _) = ground_with(vec![
            departure("AAL1", f.g1, f.rwy, 0),
            departure("AAL2", f.g2, f.rwy, 0),
        ]);
        for (id, home) in [(A, f.g1), (B, f.g2)] {
            force_active(&mut ground, id, home);
            ground.set_itinerary(id, Itinerary::resuming(vec![f.i1t], 0.0, &f.surface));
            ground.store.itinerary[id.index()].as_mut().unwrap().tick(10_000.0, &f.surface);
        }

        // cfg.departure_interval_ticks = 5: only the first gets out now.
        ground.retire_finished(Tick(10), &f.surface, &cfg());
        assert_eq!(ground.takeoff_count, 1);
        assert!(ground.store.active[1]);

        ground.retire_finished(Tick(14), &f.surface, &cfg());
        assert_eq!(ground.takeoff_count, 1);

        ground.retire_finished(Tick(15), &f.surface, &cfg());
        assert_eq!(ground.takeoff_count, 2);
        assert!(!ground.store.active[1]);
    }

    #[test]
    fn completed_arrival_frees_its_corridor() {
        let f = airfield();
        let (mut ground, scenario) = ground_with(vec![arrival("UAL9", f.g1, f.rwy, 0)]);
        ground.spawn_due(&scenario, Tick(0), &f.surface, &cfg());

        // Walk it into the corridor, then to the gate.
        assert!(ground
            .corridor
            .arrival_may_advance(A, &[(f.s1, 40.0)], &f.surface));
        ground.set_itinerary(A, Itinerary::resuming(vec![f.s1g1], 0.0, &f.surface));
        ground.store.itinerary[0].as_mut().unwrap().tick(10_000.0, &f.surface);

        ground.retire_finished(Tick(20), &f.surface, &cfg());
        assert!(!ground.store.active[0]);
        assert_eq!(ground.arrival_count, 1);
        assert_eq!(ground.corridor.occupancy(f.s1, &f.surface), 0);
    }
}

// ── Snapshots ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod snapshots {
    use asim_core::{AircraftId, Tick};
    use asim_itinerary::Itinerary;

    use crate::GroundSnapshot;

    use super::helpers::{airfield, departure, force_active, ground_with};

    #[test]
    fn snapshot_reflects_active_aircraft() {
        let f = airfield();
        let (mut ground, _) = ground_with(vec![
            departure("AAL1", f.g1, f.rwy, 0),
            departure("AAL2", f.g2, f.rwy, 5),
        ]);
        force_active(&mut ground, AircraftId(0), f.g1);
        ground.set_itinerary(
            AircraftId(0),
            Itinerary::fresh(vec![f.g1s1, f.s1i1], &f.surface),
        );

        let snap = GroundSnapshot::capture(&ground, Tick(3), 1_000_003, 2, &f.surface);
        assert_eq!(snap.tick, Tick(3));
        assert_eq!(snap.aircraft.len(), 1);
        assert_eq!(snap.aircraft[0].callsign, "AAL1");
        assert!(snap.aircraft[0].remaining_m > 400.0);
        assert_eq!(snap.unresolved_conflicts, 2);
    }
}
