//! Shared warehouse floor definition.
//!
//! A synthetic aisle-and-rack grid: every third column is a storage rack
//! (blocked waypoints that only rack shuttles may cross), the south row is
//! the depot lane where robots park, and the north row carries the outbound
//! conveyors.  One-metre cell spacing, unit edge costs, bidirectional lanes.

use mapf_core::NodeId;
use mapf_graph::{Graph, GraphBuilder, GraphResult};

// ── Floor dimensions ──────────────────────────────────────────────────────────

const WIDTH:       usize = 13;
const HEIGHT:      usize = 8;
const RACK_STRIDE: usize = 3; // columns 2, 5, 8, 11 are racks

/// Surveyed floor coordinates of the depot chargers (south wall) and the
/// conveyor heads (north wall).  Snapped onto the waypoint grid at build
/// time rather than hand-matched to cell indices.
const DEPOT_MARKS:    [f64; 5] = [0.0, 3.0, 6.0, 9.0, 12.0];
const CONVEYOR_MARKS: [f64; 3] = [0.0, 6.0, 12.0];

// ── Warehouse ─────────────────────────────────────────────────────────────────

/// The floor graph plus the job-relevant waypoint sets.
pub struct Warehouse {
    pub graph:     Graph,
    /// Aisle cells facing a rack, where items are handed to a robot.
    pub picks:     Vec<NodeId>,
    /// South-row parking cells, one per robot.
    pub depots:    Vec<NodeId>,
    /// North-row conveyor heads receiving finished totes.
    pub conveyors: Vec<NodeId>,
}

fn is_rack(x: usize, y: usize) -> bool {
    x % RACK_STRIDE == RACK_STRIDE - 1 && y > 0 && y < HEIGHT - 1
}

/// Build the demo floor.
pub fn build_warehouse() -> GraphResult<Warehouse> {
    let mut b = GraphBuilder::with_capacity(WIDTH * HEIGHT, 4 * WIDTH * HEIGHT);

    let mut cells = Vec::with_capacity(WIDTH * HEIGHT);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let node = b.add_node(x as f64, y as f64);
            if is_rack(x, y) {
                b.set_blocked(node, true);
            }
            cells.push(node);
        }
    }

    let at = |x: usize, y: usize| cells[y * WIDTH + x];
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            if x + 1 < WIDTH {
                b.add_lane(at(x, y), at(x + 1, y), 1.0);
            }
            if y + 1 < HEIGHT {
                b.add_lane(at(x, y), at(x, y + 1), 1.0);
            }
        }
    }

    // Each rack cell is served from the aisle cell west of it.
    let mut picks = Vec::new();
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            if is_rack(x, y) {
                picks.push(at(x - 1, y));
            }
        }
    }

    let graph = b.build()?;

    // Snap the surveyed marks onto the grid.  The marks sit just outside the
    // floor, so the nearest waypoint is the adjacent wall cell.
    let depots = DEPOT_MARKS
        .iter()
        .filter_map(|&x| graph.nearest_node(x, -1.0))
        .collect();
    let conveyors = CONVEYOR_MARKS
        .iter()
        .filter_map(|&x| graph.nearest_node(x, HEIGHT as f64))
        .collect();

    Ok(Warehouse { graph, picks, depots, conveyors })
}
