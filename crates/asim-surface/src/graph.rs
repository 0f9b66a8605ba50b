//! Surface graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing links.
//! Given a `NodeId n`, the IDs of links departing from it occupy the slice:
//!
//! ```text
//! out_link_ids[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Links are polylines: an ordered sequence of ≥2 nodes with cached
//! per-segment lengths, so interpolating a position at any distance along a
//! link is a local scan of the segment table.
//!
//! # Canonical intersections
//!
//! Airport surface data is drawn by hand; the same physical intersection is
//! frequently present as several nearly-coincident nodes.  `build()` merges
//! every group of nodes within `close_node_tolerance_m` into one *canonical*
//! identity, computed once at load time.  Intersection locking and flow-spot
//! matching operate exclusively on canonical IDs.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest `NodeId`.  Used
//! at build time for the canonicalization pass and by callers that need to
//! snap an arbitrary position to the nearest surface node.

use std::collections::HashMap;

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use asim_core::{GeoPoint, LinkId, NodeId};

use crate::error::{SurfaceError, SurfaceResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[lat, lon]` point with
/// the associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Sufficient to order
    /// candidates; exact haversine distances are checked afterwards.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── LinkKind ──────────────────────────────────────────────────────────────────

/// What part of the surface a link belongs to.
///
/// The aircraft's derived state maps the kind of its current link to the
/// matching kinematic phase (pushback / ramp / taxi).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LinkKind {
    /// Gate-to-ramp pushback way.
    Pushback,
    /// Ramp segment between pushback way and flow spot.
    Ramp,
    /// Ordinary taxiway.
    #[default]
    Taxiway,
    /// Runway surface.
    Runway,
}

impl LinkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkKind::Pushback => "pushback",
            LinkKind::Ramp     => "ramp",
            LinkKind::Taxiway  => "taxiway",
            LinkKind::Runway   => "runway",
        }
    }
}

// ── Link ──────────────────────────────────────────────────────────────────────

/// A directed surface link: an immutable polyline of ≥2 nodes.
#[derive(Clone, Debug)]
pub struct Link {
    pub name: String,
    pub kind: LinkKind,
    nodes: Vec<NodeId>,
    points: Vec<GeoPoint>,
    seg_len: Vec<f64>,
    length_m: f64,
}

impl Link {
    /// First node of the polyline.
    #[inline]
    pub fn start(&self) -> NodeId {
        self.nodes[0]
    }

    /// Last node of the polyline.
    #[inline]
    pub fn end(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// Physical length in metres (sum of segment distances).
    #[inline]
    pub fn length_m(&self) -> f64 {
        self.length_m
    }

    /// All polyline nodes in traversal order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Interpolated point at `distance_m` from the start of the link.
    ///
    /// Distances below 0 clamp to the start point; distances beyond the
    /// link's length clamp to the end point.  Querying past the end is a
    /// legitimate, common case (a trailing aircraft near link completion).
    pub fn position_at(&self, distance_m: f64) -> GeoPoint {
        if distance_m <= 0.0 {
            return self.points[0];
        }
        let mut remaining = distance_m;
        for (i, &seg) in self.seg_len.iter().enumerate() {
            if remaining <= seg {
                if seg == 0.0 {
                    return self.points[i];
                }
                return self.points[i].lerp(self.points[i + 1], remaining / seg);
            }
            remaining -= seg;
        }
        self.points[self.points.len() - 1]
    }
}

// ── SurfaceGraph ──────────────────────────────────────────────────────────────

/// The static airport surface: nodes, directed links, canonical intersection
/// identities, and marked gates / spots / runways.
///
/// Do not construct directly; use [`SurfaceGraphBuilder`].
pub struct SurfaceGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    node_name: Vec<String>,
    node_pos: Vec<GeoPoint>,

    /// Canonical representative for each node.  Nodes within the merge
    /// tolerance of each other share one representative (the lowest ID in
    /// the group).  Indexed by `NodeId`.
    canonical: Vec<NodeId>,

    // ── Link data ─────────────────────────────────────────────────────────
    links: Vec<Link>,

    // ── CSR adjacency (outgoing links per node) ───────────────────────────
    node_out_start: Vec<u32>,
    out_link_ids: Vec<LinkId>,

    // ── Marked features ───────────────────────────────────────────────────
    gates: Vec<NodeId>,
    spots: Vec<NodeId>,
    runways: Vec<LinkId>,
    gate_flow_spot: HashMap<NodeId, NodeId>,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: RTree<NodeEntry>,
}

impl SurfaceGraph {
    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    // ── Node accessors ────────────────────────────────────────────────────

    #[inline]
    pub fn node_pos(&self, node: NodeId) -> GeoPoint {
        self.node_pos[node.index()]
    }

    #[inline]
    pub fn node_name(&self, node: NodeId) -> &str {
        &self.node_name[node.index()]
    }

    /// The canonical intersection identity for `node`.
    ///
    /// All lock-table and flow-spot bookkeeping is keyed by canonical IDs so
    /// that a physically single intersection drawn as several nodes is one
    /// lockable resource.
    #[inline]
    pub fn canonical_of(&self, node: NodeId) -> NodeId {
        self.canonical[node.index()]
    }

    /// `true` if two nodes denote the same physical point.
    #[inline]
    pub fn same_point(&self, a: NodeId, b: NodeId) -> bool {
        self.canonical_of(a) == self.canonical_of(b)
    }

    // ── Link accessors ────────────────────────────────────────────────────

    #[inline]
    pub fn link(&self, link: LinkId) -> &Link {
        &self.links[link.index()]
    }

    /// Iterator over the `LinkId`s of all links departing from `node`.
    #[inline]
    pub fn out_links(&self, node: NodeId) -> impl Iterator<Item = LinkId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        self.out_link_ids[start..end].iter().copied()
    }

    /// Out-degree of `node` (number of departing links).
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    // ── Marked features ───────────────────────────────────────────────────

    pub fn gates(&self) -> &[NodeId] {
        &self.gates
    }

    pub fn spots(&self) -> &[NodeId] {
        &self.spots
    }

    pub fn runways(&self) -> &[LinkId] {
        &self.runways
    }

    /// The flow spot guarding the gate's corridor, if the gate has one.
    pub fn flow_spot_of(&self, gate: NodeId) -> Option<NodeId> {
        self.gate_flow_spot.get(&gate).copied()
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the `NodeId` of the nearest surface node to `pos`.
    ///
    /// Returns `None` only if the graph has no nodes.
    pub fn snap_to_node(&self, pos: GeoPoint) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| e.id)
    }
}

// ── SurfaceGraphBuilder ───────────────────────────────────────────────────────

/// Construct a [`SurfaceGraph`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts nodes and directed links in any order.  `build()`
/// sorts outgoing links per node into CSR arrays, bulk-loads the R-tree, and
/// runs the one-shot node canonicalization pass.
///
/// # Example
///
/// ```
/// use asim_core::GeoPoint;
/// use asim_surface::{LinkKind, SurfaceGraphBuilder};
///
/// let mut b = SurfaceGraphBuilder::new();
/// let g1 = b.add_node("G1", GeoPoint::new(37.6190, -122.3920));
/// let s1 = b.add_node("S1", GeoPoint::new(37.6200, -122.3920));
/// b.add_two_way("G1-S1", LinkKind::Ramp, vec![g1, s1]).unwrap();
/// b.mark_gate(g1, s1);
/// b.mark_spot(s1);
/// let surface = b.build(3.0);
/// assert_eq!(surface.node_count(), 2);
/// assert_eq!(surface.link_count(), 2); // bidirectional
/// ```
pub struct SurfaceGraphBuilder {
    node_name: Vec<String>,
    node_pos: Vec<GeoPoint>,
    raw_links: Vec<RawLink>,
    gates: Vec<NodeId>,
    spots: Vec<NodeId>,
    runways: Vec<LinkId>,
    gate_flow_spot: HashMap<NodeId, NodeId>,
}

struct RawLink {
    name: String,
    kind: LinkKind,
    nodes: Vec<NodeId>,
}

impl SurfaceGraphBuilder {
    pub fn new() -> Self {
        Self {
            node_name:      Vec::new(),
            node_pos:       Vec::new(),
            raw_links:      Vec::new(),
            gates:          Vec::new(),
            spots:          Vec::new(),
            runways:        Vec::new(),
            gate_flow_spot: HashMap::new(),
        }
    }

    /// Add a surface node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, name: impl Into<String>, pos: GeoPoint) -> NodeId {
        let id = NodeId(self.node_pos.len() as u32);
        self.node_name.push(name.into());
        self.node_pos.push(pos);
        id
    }

    /// Add a **directed** polyline link through `nodes`.
    ///
    /// Returns [`SurfaceError::MalformedLink`] if fewer than two nodes are
    /// given.
    pub fn add_link(
        &mut self,
        name: impl Into<String>,
        kind: LinkKind,
        nodes: Vec<NodeId>,
    ) -> SurfaceResult<LinkId> {
        let name = name.into();
        if nodes.len() < 2 {
            return Err(SurfaceError::MalformedLink(name));
        }
        let id = LinkId(self.raw_links.len() as u32);
        self.raw_links.push(RawLink { name, kind, nodes });
        Ok(id)
    }

    /// Convenience: add a link and its reverse.  The only legitimately
    /// bidirectional edges on an airport surface are the gate↔spot corridor
    /// segments.
    pub fn add_two_way(
        &mut self,
        name: impl Into<String>,
        kind: LinkKind,
        nodes: Vec<NodeId>,
    ) -> SurfaceResult<(LinkId, LinkId)> {
        let name = name.into();
        let reversed: Vec<NodeId> = nodes.iter().rev().copied().collect();
        let fwd = self.add_link(name.clone(), kind, nodes)?;
        let rev = self.add_link(format!("{name}-rev"), kind, reversed)?;
        Ok((fwd, rev))
    }

    /// Mark `node` as a gate guarded by the corridor anchored at `flow_spot`.
    pub fn mark_gate(&mut self, node: NodeId, flow_spot: NodeId) {
        self.gates.push(node);
        self.gate_flow_spot.insert(node, flow_spot);
    }

    /// Mark `node` as a flow spot.
    pub fn mark_spot(&mut self, node: NodeId) {
        self.spots.push(node);
    }

    /// Mark a previously added link as a runway.
    pub fn mark_runway(&mut self, link: LinkId) {
        self.runways.push(link);
    }

    /// Look up the position of a node added earlier.
    pub fn node_pos(&self, id: NodeId) -> GeoPoint {
        self.node_pos[id.index()]
    }

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn link_count(&self) -> usize {
        self.raw_links.len()
    }

    /// Consume the builder and produce a [`SurfaceGraph`].
    ///
    /// `close_node_tolerance_m` controls the canonicalization pass: every
    /// group of nodes within this distance collapses to one canonical ID.
    pub fn build(self, close_node_tolerance_m: f64) -> SurfaceGraph {
        let node_count = self.node_pos.len();
        let link_count = self.raw_links.len();

        // Materialise links: cache points, segment lengths, total length.
        let links: Vec<Link> = self
            .raw_links
            .into_iter()
            .map(|raw| {
                let points: Vec<GeoPoint> =
                    raw.nodes.iter().map(|&n| self.node_pos[n.index()]).collect();
                let seg_len: Vec<f64> = points
                    .windows(2)
                    .map(|w| w[0].distance_m(w[1]))
                    .collect();
                let length_m = seg_len.iter().sum();
                Link {
                    name: raw.name,
                    kind: raw.kind,
                    nodes: raw.nodes,
                    points,
                    seg_len,
                    length_m,
                }
            })
            .collect();

        // Build CSR adjacency: sort LinkIds by their start node.
        let mut order: Vec<LinkId> = (0..link_count as u32).map(LinkId).collect();
        order.sort_unstable_by_key(|&l| links[l.index()].start().0);

        let mut node_out_start = vec![0u32; node_count + 1];
        for link in &links {
            node_out_start[link.start().index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, link_count);

        // Bulk-load R-tree for O(N log N) construction.
        let entries: Vec<NodeEntry> = self
            .node_pos
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry {
                point: [pos.lat, pos.lon],
                id: NodeId(i as u32),
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        // One-shot canonicalization: ascending node order, first ID wins the
        // group.  Candidate neighbours come from the R-tree sorted by lat/lon
        // distance; the exact haversine check decides membership.  The degree
        // cut-off is generous (×2) because a metre spans fewer longitude
        // degrees than latitude degrees away from the equator.
        let deg_cutoff = (close_node_tolerance_m / 111_000.0) * 2.0;
        let cutoff_2 = deg_cutoff * deg_cutoff;
        let mut canonical = vec![NodeId::INVALID; node_count];
        for i in 0..node_count {
            let id = NodeId(i as u32);
            if canonical[i] != NodeId::INVALID {
                continue;
            }
            canonical[i] = id;
            let here = self.node_pos[i];
            for entry in spatial_idx.nearest_neighbor_iter(&[here.lat, here.lon]) {
                let d2 = {
                    let dlat = entry.point[0] - here.lat;
                    let dlon = entry.point[1] - here.lon;
                    dlat * dlat + dlon * dlon
                };
                if d2 > cutoff_2 {
                    break;
                }
                let j = entry.id.index();
                if j > i
                    && canonical[j] == NodeId::INVALID
                    && here.close_to(self.node_pos[j], close_node_tolerance_m)
                {
                    canonical[j] = id;
                }
            }
        }

        SurfaceGraph {
            node_name: self.node_name,
            node_pos: self.node_pos,
            canonical,
            links,
            node_out_start,
            out_link_ids: order,
            gates: self.gates,
            spots: self.spots,
            runways: self.runways,
            gate_flow_spot: self.gate_flow_spot,
            spatial_idx,
        }
    }
}

impl Default for SurfaceGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
