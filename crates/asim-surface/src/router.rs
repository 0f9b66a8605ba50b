//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! The scheduler requests routes through the [`Router`] trait, so
//! applications can swap in custom implementations (A*, precomputed
//! all-pairs tables) without touching the scheduling core.  The default
//! [`DijkstraRouter`] is sufficient for airport-scale graphs.
//!
//! # Cost units
//!
//! Link length is the edge cost.  Costs are carried internally as integer
//! centimetres so the heap ordering is exact and deterministic; `TaxiRoute`
//! exposes the total as metres.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use asim_core::{LinkId, NodeId};

use crate::error::SurfaceError;
use crate::graph::SurfaceGraph;

// ── TaxiRoute ─────────────────────────────────────────────────────────────────

/// The result of a routing query: an ordered list of `LinkId`s and the total
/// taxi distance.
#[derive(Debug, Clone)]
pub struct TaxiRoute {
    /// Links to traverse in order, from source to destination.
    pub links: Vec<LinkId>,
    /// Cumulative length in metres.
    pub length_m: f64,
}

impl TaxiRoute {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.links.is_empty()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so a single router instance can be
/// shared between the live simulation and concurrent tooling.
pub trait Router: Send + Sync {
    /// Compute a route from `from` to `to`.
    ///
    /// `from == to` is a valid query answered with an empty route;
    /// disconnected endpoints produce [`SurfaceError::NoRoute`].
    fn route(
        &self,
        surface: &SurfaceGraph,
        from: NodeId,
        to: NodeId,
    ) -> Result<TaxiRoute, SurfaceError>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over the CSR surface graph, with link
/// length as cost and `NodeId` as the deterministic heap tie-break.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(
        &self,
        surface: &SurfaceGraph,
        from: NodeId,
        to: NodeId,
    ) -> Result<TaxiRoute, SurfaceError> {
        dijkstra(surface, from, to)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Link cost in integer centimetres.
#[inline]
fn link_cost_cm(surface: &SurfaceGraph, link: LinkId) -> u64 {
    (surface.link(link).length_m() * 100.0).round() as u64
}

fn dijkstra(
    surface: &SurfaceGraph,
    from: NodeId,
    to: NodeId,
) -> Result<TaxiRoute, SurfaceError> {
    if from.index() >= surface.node_count() {
        return Err(SurfaceError::NodeNotFound(from));
    }
    if to.index() >= surface.node_count() {
        return Err(SurfaceError::NodeNotFound(to));
    }
    if from == to {
        return Ok(TaxiRoute { links: vec![], length_m: 0.0 });
    }

    let n = surface.node_count();
    // dist[v] = best known cost (cm) to reach v.
    let mut dist = vec![u64::MAX; n];
    // prev_link[v] = LinkId that reached v; LinkId::INVALID for unreached nodes.
    let mut prev_link = vec![LinkId::INVALID; n];

    dist[from.index()] = 0;

    // Min-heap: (cost, node). Reverse makes BinaryHeap (max) behave as min-heap.
    // Secondary key NodeId ensures deterministic tie-breaking.
    let mut heap: BinaryHeap<Reverse<(u64, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((0, from)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        if node == to {
            return Ok(reconstruct(surface, prev_link, to));
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for link in surface.out_links(node) {
            let neighbor = surface.link(link).end();
            let new_cost = cost.saturating_add(link_cost_cm(surface, link));

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_link[neighbor.index()] = link;
                heap.push(Reverse((new_cost, neighbor)));
            }
        }
    }

    Err(SurfaceError::NoRoute { from, to })
}

fn reconstruct(surface: &SurfaceGraph, prev_link: Vec<LinkId>, to: NodeId) -> TaxiRoute {
    let mut links = Vec::new();
    let mut cur = to;
    loop {
        let l = prev_link[cur.index()];
        if l == LinkId::INVALID {
            break;
        }
        links.push(l);
        cur = surface.link(l).start();
    }
    links.reverse();
    let length_m = links.iter().map(|&l| surface.link(l).length_m()).sum();
    TaxiRoute { links, length_m }
}
