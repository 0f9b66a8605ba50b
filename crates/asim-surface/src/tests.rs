//! Unit tests for asim-surface.
//!
//! All tests use hand-crafted graphs so they run without any surface data
//! files.

#[cfg(test)]
mod helpers {
    use asim_core::GeoPoint;

    use crate::{LinkKind, SurfaceGraph, SurfaceGraphBuilder};

    /// Degrees of latitude per metre, approximately.
    pub const DEG_PER_M: f64 = 1.0 / 111_195.0;

    /// Build a diamond network for routing tests.
    ///
    /// ```text
    ///        B
    ///       / \
    ///      A   D ---- E
    ///       \ /
    ///        C
    /// ```
    ///
    /// A→B→D is ~200 m, A→C→D is ~600 m, D→E is ~100 m.  All links one-way
    /// left-to-right so return routes don't exist.
    pub fn diamond() -> (SurfaceGraph, [asim_core::NodeId; 5]) {
        let mut b = SurfaceGraphBuilder::new();
        let a = b.add_node("A", GeoPoint::new(37.6100, -122.3900));
        let nb = b.add_node("B", GeoPoint::new(37.6100 + 100.0 * DEG_PER_M, -122.3900));
        let c = b.add_node("C", GeoPoint::new(37.6100 - 300.0 * DEG_PER_M, -122.3900));
        let d = b.add_node("D", GeoPoint::new(37.6100, -122.3900 + 250.0 * DEG_PER_M));
        let e = b.add_node("E", GeoPoint::new(37.6100, -122.3900 + 350.0 * DEG_PER_M));

        b.add_link("A-B", LinkKind::Taxiway, vec![a, nb]).unwrap();
        b.add_link("B-D", LinkKind::Taxiway, vec![nb, d]).unwrap();
        b.add_link("A-C", LinkKind::Taxiway, vec![a, c]).unwrap();
        b.add_link("C-D", LinkKind::Taxiway, vec![c, d]).unwrap();
        b.add_link("D-E", LinkKind::Taxiway, vec![d, e]).unwrap();

        (b.build(3.0), [a, nb, c, d, e])
    }
}

// ── Builder & graph structure ─────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use asim_core::GeoPoint;

    use crate::{LinkKind, SurfaceError, SurfaceGraphBuilder};

    #[test]
    fn empty_build() {
        let surface = SurfaceGraphBuilder::new().build(3.0);
        assert_eq!(surface.node_count(), 0);
        assert_eq!(surface.link_count(), 0);
        assert!(surface.is_empty());
    }

    #[test]
    fn malformed_link_rejected() {
        let mut b = SurfaceGraphBuilder::new();
        let a = b.add_node("A", GeoPoint::new(37.0, -122.0));
        let result = b.add_link("stub", LinkKind::Taxiway, vec![a]);
        assert!(matches!(result, Err(SurfaceError::MalformedLink(_))));
    }

    #[test]
    fn two_way_creates_reverse() {
        let mut b = SurfaceGraphBuilder::new();
        let a = b.add_node("A", GeoPoint::new(37.0, -122.0));
        let c = b.add_node("C", GeoPoint::new(37.001, -122.0));
        let (fwd, rev) = b.add_two_way("A-C", LinkKind::Ramp, vec![a, c]).unwrap();
        let surface = b.build(3.0);

        assert_eq!(surface.link(fwd).start(), a);
        assert_eq!(surface.link(fwd).end(), c);
        assert_eq!(surface.link(rev).start(), c);
        assert_eq!(surface.link(rev).end(), a);
        assert!((surface.link(fwd).length_m() - surface.link(rev).length_m()).abs() < 1e-9);
    }

    #[test]
    fn csr_out_links() {
        let (surface, [a, nb, c, d, e]) = super::helpers::diamond();

        assert_eq!(surface.out_degree(a), 2); // A→B, A→C
        assert_eq!(surface.out_degree(nb), 1);
        assert_eq!(surface.out_degree(c), 1);
        assert_eq!(surface.out_degree(d), 1);
        assert_eq!(surface.out_degree(e), 0);

        // Every link departing A actually starts at A.
        for l in surface.out_links(a) {
            assert_eq!(surface.link(l).start(), a);
        }
    }

    #[test]
    fn marked_features_retained() {
        let mut b = SurfaceGraphBuilder::new();
        let g = b.add_node("G1", GeoPoint::new(37.0, -122.0));
        let s = b.add_node("S1", GeoPoint::new(37.001, -122.0));
        let r0 = b.add_node("R0", GeoPoint::new(37.002, -122.0));
        let r1 = b.add_node("R1", GeoPoint::new(37.003, -122.0));
        let rwy = b.add_link("28R", LinkKind::Runway, vec![r0, r1]).unwrap();
        b.mark_gate(g, s);
        b.mark_spot(s);
        b.mark_runway(rwy);
        let surface = b.build(3.0);

        assert_eq!(surface.gates(), &[g]);
        assert_eq!(surface.spots(), &[s]);
        assert_eq!(surface.runways(), &[rwy]);
        assert_eq!(surface.flow_spot_of(g), Some(s));
        assert_eq!(surface.flow_spot_of(s), None);
    }
}

// ── Link geometry ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod link_geometry {
    use asim_core::GeoPoint;

    use crate::{LinkKind, SurfaceGraphBuilder};

    use super::helpers::DEG_PER_M;

    #[test]
    fn length_sums_segments() {
        let mut b = SurfaceGraphBuilder::new();
        let n0 = b.add_node("0", GeoPoint::new(37.61, -122.39));
        let n1 = b.add_node("1", GeoPoint::new(37.61 + 100.0 * DEG_PER_M, -122.39));
        let n2 = b.add_node("2", GeoPoint::new(37.61 + 250.0 * DEG_PER_M, -122.39));
        let l = b.add_link("T", LinkKind::Taxiway, vec![n0, n1, n2]).unwrap();
        let surface = b.build(3.0);

        assert!((surface.link(l).length_m() - 250.0).abs() < 0.5);
    }

    #[test]
    fn position_at_interpolates() {
        let mut b = SurfaceGraphBuilder::new();
        let n0 = b.add_node("0", GeoPoint::new(37.61, -122.39));
        let n1 = b.add_node("1", GeoPoint::new(37.61 + 100.0 * DEG_PER_M, -122.39));
        let l = b.add_link("T", LinkKind::Taxiway, vec![n0, n1]).unwrap();
        let surface = b.build(3.0);

        let mid = surface.link(l).position_at(50.0);
        let expected = GeoPoint::new(37.61 + 50.0 * DEG_PER_M, -122.39);
        assert!(mid.distance_m(expected) < 0.5);
    }

    #[test]
    fn position_at_clamps_both_ends() {
        let mut b = SurfaceGraphBuilder::new();
        let p0 = GeoPoint::new(37.61, -122.39);
        let p1 = GeoPoint::new(37.61 + 100.0 * DEG_PER_M, -122.39);
        let n0 = b.add_node("0", p0);
        let n1 = b.add_node("1", p1);
        let l = b.add_link("T", LinkKind::Taxiway, vec![n0, n1]).unwrap();
        let surface = b.build(3.0);

        assert!(surface.link(l).position_at(-5.0).distance_m(p0) < 1e-6);
        assert!(surface.link(l).position_at(9_999.0).distance_m(p1) < 1e-6);
    }

    #[test]
    fn position_at_multi_segment() {
        let mut b = SurfaceGraphBuilder::new();
        let n0 = b.add_node("0", GeoPoint::new(37.61, -122.39));
        let n1 = b.add_node("1", GeoPoint::new(37.61 + 100.0 * DEG_PER_M, -122.39));
        let n2 = b.add_node("2", GeoPoint::new(37.61 + 100.0 * DEG_PER_M, -122.39 + 100.0 * DEG_PER_M));
        let l = b.add_link("T", LinkKind::Taxiway, vec![n0, n1, n2]).unwrap();
        let surface = b.build(3.0);

        // 150 m in: 50 m into the second segment.
        let pos = surface.link(l).position_at(150.0);
        assert!(pos.distance_m(surface.node_pos(n1)) > 40.0);
        assert!(pos.distance_m(surface.node_pos(n2)) > 20.0);
    }
}

// ── Canonicalization ──────────────────────────────────────────────────────────

#[cfg(test)]
mod canonical {
    use asim_core::GeoPoint;

    use crate::SurfaceGraphBuilder;

    use super::helpers::DEG_PER_M;

    #[test]
    fn coincident_nodes_merge_to_first() {
        let mut b = SurfaceGraphBuilder::new();
        let n0 = b.add_node("I4_0", GeoPoint::new(37.620453, -122.392242));
        // ~1.1 m north of n0 — drawn twice, physically the same intersection.
        let n1 = b.add_node("I4_1", GeoPoint::new(37.620453 + 1.0 * DEG_PER_M, -122.392242));
        let n2 = b.add_node("I9", GeoPoint::new(37.6207975, -122.3930747));
        let surface = b.build(3.0);

        assert_eq!(surface.canonical_of(n0), n0);
        assert_eq!(surface.canonical_of(n1), n0);
        assert_eq!(surface.canonical_of(n2), n2);
        assert!(surface.same_point(n0, n1));
        assert!(!surface.same_point(n0, n2));
    }

    #[test]
    fn distinct_nodes_stay_distinct() {
        let (surface, nodes) = super::helpers::diamond();
        for (i, &a) in nodes.iter().enumerate() {
            assert_eq!(surface.canonical_of(a), a);
            for &other in &nodes[i + 1..] {
                assert!(!surface.same_point(a, other));
            }
        }
    }

    #[test]
    fn snap_to_nearest() {
        let (surface, [a, ..]) = super::helpers::diamond();
        let near_a = GeoPoint::new(37.6100 + 2.0 * DEG_PER_M, -122.3900);
        assert_eq!(surface.snap_to_node(near_a), Some(a));
    }

    #[test]
    fn snap_empty_graph_is_none() {
        let surface = SurfaceGraphBuilder::new().build(3.0);
        assert!(surface.snap_to_node(GeoPoint::new(0.0, 0.0)).is_none());
    }
}

// ── Dijkstra routing ──────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use asim_core::GeoPoint;

    use crate::{DijkstraRouter, LinkKind, Router, SurfaceError, SurfaceGraphBuilder};

    #[test]
    fn trivial_same_node() {
        let (surface, [a, ..]) = super::helpers::diamond();
        let r = DijkstraRouter.route(&surface, a, a).unwrap();
        assert!(r.is_trivial());
        assert_eq!(r.length_m, 0.0);
    }

    #[test]
    fn shortest_path_takes_short_branch() {
        let (surface, [a, nb, _, d, _]) = super::helpers::diamond();
        let route = DijkstraRouter.route(&surface, a, d).unwrap();

        // Via B (~200 m+across) beats via C (~600 m+across).
        assert_eq!(route.links.len(), 2);
        assert_eq!(surface.link(route.links[0]).start(), a);
        assert_eq!(surface.link(route.links[0]).end(), nb);
        assert_eq!(surface.link(route.links[1]).end(), d);
        assert!(route.length_m < 500.0, "got {}", route.length_m);
    }

    #[test]
    fn route_length_sums_links() {
        let (surface, [a, _, _, _, e]) = super::helpers::diamond();
        let route = DijkstraRouter.route(&surface, a, e).unwrap();
        let sum: f64 = route.links.iter().map(|&l| surface.link(l).length_m()).sum();
        assert!((route.length_m - sum).abs() < 1e-9);
    }

    #[test]
    fn one_way_blocks_return() {
        let (surface, [a, _, _, d, _]) = super::helpers::diamond();
        assert!(DijkstraRouter.route(&surface, a, d).is_ok());
        let back = DijkstraRouter.route(&surface, d, a);
        assert!(matches!(back, Err(SurfaceError::NoRoute { .. })));
    }

    #[test]
    fn disconnected_is_no_route() {
        let mut b = SurfaceGraphBuilder::new();
        let a = b.add_node("A", GeoPoint::new(37.0, -122.0));
        let c = b.add_node("C", GeoPoint::new(37.1, -122.0));
        // No links at all.
        let surface = b.build(3.0);
        let result = DijkstraRouter.route(&surface, a, c);
        assert!(matches!(result, Err(SurfaceError::NoRoute { .. })));
    }

    #[test]
    fn unknown_node_rejected() {
        let mut b = SurfaceGraphBuilder::new();
        let a = b.add_node("A", GeoPoint::new(37.0, -122.0));
        let c = b.add_node("C", GeoPoint::new(37.001, -122.0));
        b.add_link("A-C", LinkKind::Taxiway, vec![a, c]).unwrap();
        let surface = b.build(3.0);

        let bogus = asim_core::NodeId(99);
        assert!(matches!(
            DijkstraRouter.route(&surface, a, bogus),
            Err(SurfaceError::NodeNotFound(_))
        ));
    }
}
