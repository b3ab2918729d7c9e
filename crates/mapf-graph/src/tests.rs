//! Unit tests for the waypoint graph.

/// A 2×2 grid with 1 m spacing and 1 s two-way lanes:
///
/// ```text
/// 2 — 3
/// |   |
/// 0 — 1
/// ```
#[cfg(test)]
fn square() -> crate::Graph {
    let mut b = crate::GraphBuilder::new();
    let n0 = b.add_node(0.0, 0.0);
    let n1 = b.add_node(1.0, 0.0);
    let n2 = b.add_node(0.0, 1.0);
    let n3 = b.add_node(1.0, 1.0);
    b.add_lane(n0, n1, 1.0);
    b.add_lane(n0, n2, 1.0);
    b.add_lane(n1, n3, 1.0);
    b.add_lane(n2, n3, 1.0);
    b.build().expect("square grid is valid")
}

#[cfg(test)]
mod build {
    use mapf_core::NodeId;

    use crate::{GraphBuilder, GraphError};

    #[test]
    fn counts_and_degrees() {
        let g = super::square();
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 8);
        assert_eq!(g.out_degree(NodeId(0)), 2);
        assert_eq!(g.out_degree(NodeId(3)), 2);
    }

    #[test]
    fn rejects_out_of_range_edge() {
        let mut b = GraphBuilder::new();
        let a = b.add_node(0.0, 0.0);
        b.add_edge(a, NodeId(9), 1.0);
        match b.build() {
            Err(GraphError::EdgeOutOfRange { node, count }) => {
                assert_eq!(node, NodeId(9));
                assert_eq!(count, 1);
            }
            other => panic!("expected EdgeOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_positive_cost() {
        let mut b = GraphBuilder::new();
        let a = b.add_node(0.0, 0.0);
        let c = b.add_node(1.0, 0.0);
        b.add_edge(a, c, 0.0);
        assert!(matches!(b.build(), Err(GraphError::NonPositiveCost { .. })));
    }

    #[test]
    fn empty_graph_builds() {
        let g = GraphBuilder::new().build().unwrap();
        assert!(g.is_empty());
        assert!(g.nearest_node(0.0, 0.0).is_none());
    }
}

#[cfg(test)]
mod adjacency {
    use mapf_core::NodeId;

    #[test]
    fn neighbors_match_layout() {
        let g = super::square();
        let mut out: Vec<u32> = g.neighbors(NodeId(0)).map(|(n, _)| n.0).collect();
        out.sort_unstable();
        assert_eq!(out, vec![1, 2]);
    }

    #[test]
    fn backward_is_exact_transpose() {
        let g = super::square();
        for node in 0..g.node_count() as u32 {
            let node = NodeId(node);
            for (succ, cost) in g.neighbors(node) {
                assert!(
                    g.backward_neighbors(succ).any(|(p, c)| p == node && c == cost),
                    "edge {node} -> {succ} missing from transpose"
                );
            }
        }
        let fwd: usize = (0..g.node_count() as u32)
            .map(|n| g.neighbors(NodeId(n)).count())
            .sum();
        let bwd: usize = (0..g.node_count() as u32)
            .map(|n| g.backward_neighbors(NodeId(n)).count())
            .sum();
        assert_eq!(fwd, bwd, "transpose must have identical edge count");
    }

    #[test]
    fn blocked_flag_survives_build() {
        let mut b = crate::GraphBuilder::new();
        let a = b.add_node(0.0, 0.0);
        let c = b.add_node(1.0, 0.0);
        b.add_lane(a, c, 1.0);
        b.set_blocked(c, true);
        let g = b.build().unwrap();
        assert!(!g.is_blocked(a));
        assert!(g.is_blocked(c));
    }
}

#[cfg(test)]
mod metric {
    use mapf_core::NodeId;

    #[test]
    fn euclidean_distance() {
        let g = super::square();
        assert!((g.distance(NodeId(0), NodeId(3)) - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(g.distance(NodeId(1), NodeId(1)), 0.0);
    }

    #[test]
    fn time_lower_bound_is_admissible_on_the_grid() {
        // All lanes are 1 m / 1 s, so the bound equals the straight-line time
        // and can never exceed a real path's cost.
        let g = super::square();
        assert!(g.time_lower_bound(NodeId(0), NodeId(1)) <= 1.0 + 1e-12);
        assert!(g.time_lower_bound(NodeId(0), NodeId(3)) <= 2.0);
    }

    #[test]
    fn nearest_node_snaps_to_closest_waypoint() {
        let g = super::square();
        assert_eq!(g.nearest_node(0.1, -0.2), Some(NodeId(0)));
        assert_eq!(g.nearest_node(1.2, 1.1), Some(NodeId(3)));
    }
}
