//! Waypoint graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format, once for outgoing
//! edges and once for the transpose.  Given a `NodeId n`, its outgoing edges
//! occupy the slice:
//!
//! ```text
//! out_to / out_cost [ out_start[n] .. out_start[n+1] ]
//! ```
//!
//! and the edges *into* `n` occupy the matching `in_*` slice.  Iteration over
//! a node's neighbors is a contiguous memory scan — ideal for the inner loops
//! of the forward and backward searches.
//!
//! The transpose is built in `build()` and the graph is immutable afterwards,
//! so forward and backward adjacency can never disagree.
//!
//! # Node data
//!
//! Nodes carry planar positions in metres (warehouse floor coordinates) as
//! parallel `node_x`/`node_y` arrays, plus a `blocked` marker for cells that
//! only capability-flagged agents may traverse (storage locations with
//! inventory parked on them).
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(x, y)` to the nearest `NodeId`.  Used by
//! host layers to snap a robot's continuous position to its waypoint.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use mapf_core::NodeId;

use crate::error::{GraphError, GraphResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[x, y]` point with the
/// associated `NodeId`.
#[derive(Clone, Debug)]
struct NodeEntry {
    point: [f64; 2],
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Graph ─────────────────────────────────────────────────────────────────────

/// Directed waypoint graph in CSR format (forward + transpose) plus a spatial
/// index for node snapping.
///
/// All fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`GraphBuilder`].
#[derive(Debug)]
pub struct Graph {
    // ── Node data ─────────────────────────────────────────────────────────
    /// X coordinate (metres) of each node.  Indexed by `NodeId`.
    pub node_x: Vec<f64>,
    /// Y coordinate (metres) of each node.  Indexed by `NodeId`.
    pub node_y: Vec<f64>,
    /// `true` for cells only capability-flagged agents may enter.
    pub blocked: Vec<bool>,

    // ── Forward CSR adjacency ─────────────────────────────────────────────
    /// CSR row pointer; outgoing edges of node `n` are at positions
    /// `out_start[n] .. out_start[n+1]`.  Length = `node_count + 1`.
    pub out_start: Vec<u32>,
    /// Destination node of each outgoing edge.
    pub out_to: Vec<NodeId>,
    /// Travel time of each outgoing edge in seconds.  Strictly positive.
    pub out_cost: Vec<f64>,

    // ── Backward CSR adjacency (exact transpose of the forward arrays) ────
    /// CSR row pointer for incoming edges.
    pub in_start: Vec<u32>,
    /// Source node of each incoming edge.
    pub in_from: Vec<NodeId>,
    /// Travel time of each incoming edge in seconds.
    pub in_cost: Vec<f64>,

    // ── Derived ───────────────────────────────────────────────────────────
    /// Best observed seconds-per-metre over all edges; scales the Euclidean
    /// metric into an admissible travel-time lower bound.
    secs_per_meter_lb: f64,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: RTree<NodeEntry>,
}

impl Graph {
    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_x.len()
    }

    pub fn edge_count(&self) -> usize {
        self.out_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_x.is_empty()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over `(neighbor, travel_time)` for all outgoing edges of
    /// `node`.  Contiguous index range — no heap allocation.
    #[inline]
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        let start = self.out_start[node.index()] as usize;
        let end   = self.out_start[node.index() + 1] as usize;
        (start..end).map(|i| (self.out_to[i], self.out_cost[i]))
    }

    /// Iterator over `(predecessor, travel_time)` for all incoming edges of
    /// `node` — the backward search's expansion order.
    #[inline]
    pub fn backward_neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        let start = self.in_start[node.index()] as usize;
        let end   = self.in_start[node.index() + 1] as usize;
        (start..end).map(|i| (self.in_from[i], self.in_cost[i]))
    }

    /// Out-degree of `node`.
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        (self.out_start[node.index() + 1] - self.out_start[node.index()]) as usize
    }

    /// Whether `node` is a blocked cell (traversable only with capability).
    #[inline]
    pub fn is_blocked(&self, node: NodeId) -> bool {
        self.blocked[node.index()]
    }

    // ── Metric ────────────────────────────────────────────────────────────

    /// Planar position of `node` in metres.
    #[inline]
    pub fn position(&self, node: NodeId) -> (f64, f64) {
        (self.node_x[node.index()], self.node_y[node.index()])
    }

    /// Euclidean distance between two nodes in metres.
    #[inline]
    pub fn distance(&self, a: NodeId, b: NodeId) -> f64 {
        let dx = self.node_x[a.index()] - self.node_x[b.index()];
        let dy = self.node_y[a.index()] - self.node_y[b.index()];
        (dx * dx + dy * dy).sqrt()
    }

    /// Admissible lower bound on the travel time from `a` to `b` in seconds.
    ///
    /// Scales the Euclidean metric by the best seconds-per-metre ratio seen
    /// on any edge, so no real path can beat the bound.
    #[inline]
    pub fn time_lower_bound(&self, a: NodeId, b: NodeId) -> f64 {
        self.distance(a, b) * self.secs_per_meter_lb
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The `NodeId` of the waypoint nearest to the planar point `(x, y)`.
    ///
    /// Returns `None` only if the graph has no nodes.
    pub fn nearest_node(&self, x: f64, y: f64) -> Option<NodeId> {
        self.spatial_idx.nearest_neighbor(&[x, y]).map(|e| e.id)
    }
}

// ── GraphBuilder ──────────────────────────────────────────────────────────────

/// Construct a [`Graph`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts nodes and directed edges in any order.  `build()`
/// validates edge endpoints and costs, sorts edges into the two CSR layouts,
/// and bulk-loads the R-tree.
///
/// # Example
///
/// ```
/// use mapf_graph::GraphBuilder;
///
/// let mut b = GraphBuilder::new();
/// let a = b.add_node(0.0, 0.0);
/// let c = b.add_node(1.0, 0.0);
/// b.add_lane(a, c, 1.0); // 1 s each way
/// let g = b.build().unwrap();
/// assert_eq!(g.node_count(), 2);
/// assert_eq!(g.edge_count(), 2); // bidirectional
/// ```
pub struct GraphBuilder {
    nodes_x:   Vec<f64>,
    nodes_y:   Vec<f64>,
    blocked:   Vec<bool>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from: NodeId,
    to:   NodeId,
    cost: f64,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            nodes_x:   Vec::new(),
            nodes_y:   Vec::new(),
            blocked:   Vec::new(),
            raw_edges: Vec::new(),
        }
    }

    /// Pre-allocate for the expected number of nodes and edges to reduce
    /// reallocations when bulk-loading a large layout.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes_x:   Vec::with_capacity(nodes),
            nodes_y:   Vec::with_capacity(nodes),
            blocked:   Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
        }
    }

    /// Add a waypoint at `(x, y)` metres and return its `NodeId`
    /// (sequential from 0).
    pub fn add_node(&mut self, x: f64, y: f64) -> NodeId {
        let id = NodeId(self.nodes_x.len() as u32);
        self.nodes_x.push(x);
        self.nodes_y.push(y);
        self.blocked.push(false);
        id
    }

    /// Mark a previously added node as a blocked cell.
    pub fn set_blocked(&mut self, node: NodeId, blocked: bool) {
        self.blocked[node.index()] = blocked;
    }

    /// Add a **directed** edge with travel time `cost` seconds.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, cost: f64) {
        self.raw_edges.push(RawEdge { from, to, cost });
    }

    /// Convenience: add edges in **both directions** for a two-way lane.
    pub fn add_lane(&mut self, a: NodeId, b: NodeId, cost: f64) {
        self.add_edge(a, b, cost);
        self.add_edge(b, a, cost);
    }

    /// Position of a node added earlier (used by layout generators to derive
    /// travel times from cell spacing).
    pub fn node_position(&self, id: NodeId) -> (f64, f64) {
        (self.nodes_x[id.index()], self.nodes_y[id.index()])
    }

    pub fn node_count(&self) -> usize { self.nodes_x.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`Graph`].
    ///
    /// Fails if any edge endpoint is out of range or any travel time is not
    /// strictly positive (a zero-cost edge would let the forward search stall
    /// time and never exhaust its window).
    pub fn build(self) -> GraphResult<Graph> {
        let node_count = self.nodes_x.len();
        let edge_count = self.raw_edges.len();

        for e in &self.raw_edges {
            for endpoint in [e.from, e.to] {
                if endpoint.index() >= node_count {
                    return Err(GraphError::EdgeOutOfRange { node: endpoint, count: node_count });
                }
            }
            if !(e.cost > 0.0) || !e.cost.is_finite() {
                return Err(GraphError::NonPositiveCost { from: e.from, to: e.to, cost: e.cost });
            }
        }

        // Forward CSR: sort edges by source node.
        let mut raw = self.raw_edges;
        raw.sort_unstable_by_key(|e| (e.from.0, e.to.0));

        let out_to:   Vec<NodeId> = raw.iter().map(|e| e.to).collect();
        let out_cost: Vec<f64>    = raw.iter().map(|e| e.cost).collect();

        let mut out_start = vec![0u32; node_count + 1];
        for e in &raw {
            out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            out_start[i] += out_start[i - 1];
        }
        debug_assert_eq!(out_start[node_count] as usize, edge_count);

        // Backward CSR: the exact transpose, sorted by destination node.
        raw.sort_unstable_by_key(|e| (e.to.0, e.from.0));

        let in_from: Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let in_cost: Vec<f64>    = raw.iter().map(|e| e.cost).collect();

        let mut in_start = vec![0u32; node_count + 1];
        for e in &raw {
            in_start[e.to.index() + 1] += 1;
        }
        for i in 1..=node_count {
            in_start[i] += in_start[i - 1];
        }

        // Best seconds-per-metre ratio for the admissible time lower bound.
        // Coincident endpoints contribute nothing (ratio would be infinite).
        let mut secs_per_meter_lb = f64::INFINITY;
        for e in &raw {
            let dx = self.nodes_x[e.from.index()] - self.nodes_x[e.to.index()];
            let dy = self.nodes_y[e.from.index()] - self.nodes_y[e.to.index()];
            let len = (dx * dx + dy * dy).sqrt();
            if len > f64::EPSILON {
                secs_per_meter_lb = secs_per_meter_lb.min(e.cost / len);
            }
        }
        if !secs_per_meter_lb.is_finite() {
            secs_per_meter_lb = 0.0;
        }

        // Bulk-load R-tree for O(N log N) construction (faster than N inserts).
        let entries: Vec<NodeEntry> = self
            .nodes_x
            .iter()
            .zip(&self.nodes_y)
            .enumerate()
            .map(|(i, (&x, &y))| NodeEntry { point: [x, y], id: NodeId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        Ok(Graph {
            node_x: self.nodes_x,
            node_y: self.nodes_y,
            blocked: self.blocked,
            out_start,
            out_to,
            out_cost,
            in_start,
            in_from,
            in_cost,
            secs_per_meter_lb,
            spatial_idx,
        })
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
