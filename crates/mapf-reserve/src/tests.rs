//! Integration tests for mapf-reserve.

use mapf_core::{AgentId, FOREVER, NodeId, PlannerRng};

use crate::{Interval, ReservationTable, ReserveError};

// ── Helpers ───────────────────────────────────────────────────────────────────

const A0: AgentId = AgentId(0);
const A1: AgentId = AgentId(1);

fn iv(node: u32, start: f64, end: f64) -> Interval {
    Interval::new(NodeId(node), start, end)
}

/// Every node's claims must be start-sorted and pairwise disjoint
/// (touching endpoints allowed).
fn assert_disjoint(table: &ReservationTable) {
    for n in 0..table.node_count() {
        let claims: Vec<_> = table.intervals_at(NodeId(n as u32)).collect();
        for w in claims.windows(2) {
            let (a, _) = w[0];
            let (b, _) = w[1];
            assert!(
                a.end <= b.start,
                "node {n}: [{}, {}) overlaps [{}, {})",
                a.start, a.end, b.start, b.end
            );
        }
    }
}

// ── Add / remove ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod add_remove_tests {
    use super::*;

    #[test]
    fn disjoint_claims_coexist() {
        let mut table = ReservationTable::new(4);
        table.add(iv(0, 0.0, 5.0), A0).unwrap();
        table.add(iv(0, 10.0, 15.0), A1).unwrap();
        table.add(iv(1, 0.0, 5.0), A1).unwrap();
        assert_eq!(table.len(), 3);
        assert_disjoint(&table);
    }

    #[test]
    fn touching_endpoints_do_not_conflict() {
        let mut table = ReservationTable::new(2);
        table.add(iv(0, 0.0, 5.0), A0).unwrap();
        table.add(iv(0, 5.0, 9.0), A1).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn overlap_is_rejected_with_the_holder() {
        let mut table = ReservationTable::new(2);
        table.add(iv(0, 2.0, 8.0), A1).unwrap();
        let err = table.add(iv(0, 6.0, 10.0), A0).unwrap_err();
        assert_eq!(
            err,
            ReserveError::Conflict { node: NodeId(0), start: 2.0, end: 8.0, holder: A1 }
        );
        // The rejected claim must not have been inserted.
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn own_overlap_is_rejected_too() {
        // Re-planning agents must remove stale claims before re-adding.
        let mut table = ReservationTable::new(1);
        table.add(iv(0, 0.0, 5.0), A0).unwrap();
        assert!(table.add(iv(0, 3.0, 6.0), A0).is_err());
    }

    #[test]
    fn remove_then_readd_succeeds() {
        let mut table = ReservationTable::new(1);
        table.add(iv(0, 0.0, 5.0), A0).unwrap();
        assert!(table.remove(iv(0, 0.0, 5.0)));
        table.add(iv(0, 2.0, 7.0), A0).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn remove_of_absent_interval_is_a_noop() {
        let mut table = ReservationTable::new(1);
        table.add(iv(0, 0.0, 5.0), A0).unwrap();
        assert!(!table.remove(iv(0, 0.0, 4.0)), "bounds must match exactly");
        assert!(!table.remove(iv(0, 1.0, 5.0)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn add_all_stops_at_first_conflict() {
        let mut table = ReservationTable::new(2);
        table.add(iv(1, 4.0, 6.0), A1).unwrap();
        let batch = [iv(0, 0.0, 2.0), iv(1, 5.0, 7.0), iv(0, 8.0, 9.0)];
        assert!(table.add_all(&batch, A0).is_err());
        // First entry landed, third was never attempted.
        assert_eq!(table.len(), 2);
        assert!(table.get(NodeId(0), 8.0, 9.0).is_none());
    }

    #[test]
    fn out_of_range_node_is_an_error() {
        let mut table = ReservationTable::new(2);
        let err = table.add(iv(7, 0.0, 1.0), A0).unwrap_err();
        assert_eq!(err, ReserveError::NodeOutOfRange { node: NodeId(7), count: 2 });
    }
}

// ── Queries ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod query_tests {
    use super::*;

    fn table() -> ReservationTable {
        let mut t = ReservationTable::new(3);
        t.add(iv(0, 0.0, 4.0), A0).unwrap();
        t.add(iv(0, 6.0, 9.0), A1).unwrap();
        t.add(iv(0, 12.0, FOREVER), A0).unwrap();
        t
    }

    #[test]
    fn get_returns_earliest_overlap() {
        let t = table();
        let (found, owner) = t.get(NodeId(0), 3.0, 8.0).unwrap();
        assert_eq!(found, iv(0, 0.0, 4.0));
        assert_eq!(owner, A0);
    }

    #[test]
    fn get_misses_gaps_and_touching_ranges() {
        let t = table();
        assert!(t.get(NodeId(0), 4.0, 6.0).is_none());
        assert!(t.get(NodeId(1), 0.0, 100.0).is_none());
    }

    #[test]
    fn get_last_sees_the_open_ended_tail() {
        let t = table();
        let (last, owner) = t.get_last(NodeId(0)).unwrap();
        assert!(last.is_open_ended());
        assert_eq!(last.start, 12.0);
        assert_eq!(owner, A0);
        assert!(t.get_last(NodeId(2)).is_none());
    }

    #[test]
    fn is_free_matches_get() {
        let t = table();
        assert!(t.is_free(NodeId(0), 4.0, 6.0));
        assert!(!t.is_free(NodeId(0), 8.0, 10.0));
        assert!(!t.is_free(NodeId(0), 100.0, 101.0), "open-ended tail covers all of the future");
        assert!(t.is_free(NodeId(1), 0.0, FOREVER));
    }

    #[test]
    fn clear_drops_every_claim_on_the_node() {
        let mut t = table();
        t.clear(NodeId(0));
        assert!(t.is_empty());
        assert!(t.is_free(NodeId(0), 0.0, FOREVER));
    }
}

// ── Careful removal ───────────────────────────────────────────────────────────

#[cfg(test)]
mod careful_tests {
    use super::*;

    #[test]
    fn removes_trimmed_claims_by_original_bounds() {
        let mut table = ReservationTable::new(1);
        let original = [iv(0, 0.0, 10.0)];
        table.add_all(&original, A0).unwrap();

        // An independent reorganize leaves a trimmed copy the exact-match
        // removal can no longer see.
        table.reorganize(3.0);
        table.remove_all(&original);
        assert_eq!(table.len(), 1, "exact removal must miss the trimmed claim");

        assert_eq!(table.careful_remove_all(&original, A0), 1);
        assert!(table.is_empty());
    }

    #[test]
    fn leaves_other_owners_claims_alone() {
        let mut table = ReservationTable::new(1);
        table.add(iv(0, 0.0, 5.0), A1).unwrap();
        assert_eq!(table.careful_remove_all(&[iv(0, 0.0, 5.0)], A0), 0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn leaves_non_overlapping_claims_alone() {
        let mut table = ReservationTable::new(1);
        table.add(iv(0, 0.0, 5.0), A0).unwrap();
        table.add(iv(0, 8.0, 12.0), A0).unwrap();
        assert_eq!(table.careful_remove_all(&[iv(0, 5.5, 7.5)], A0), 0);
        assert_eq!(table.len(), 2);
    }
}

// ── Reorganize ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod reorganize_tests {
    use super::*;

    #[test]
    fn past_claims_are_dropped_and_straddlers_trimmed() {
        let mut table = ReservationTable::new(1);
        table.add(iv(0, 0.0, 4.0), A0).unwrap();
        table.add(iv(0, 5.0, 9.0), A1).unwrap();
        table.add(iv(0, 10.0, 14.0), A0).unwrap();

        table.reorganize(7.0);

        let claims: Vec<_> = table.intervals_at(NodeId(0)).collect();
        assert_eq!(claims.len(), 2);
        assert_eq!(claims[0].0, iv(0, 7.0, 9.0), "straddler keeps its end, start clipped");
        assert_eq!(claims[1].0, iv(0, 10.0, 14.0), "future claim untouched");
    }

    #[test]
    fn claim_ending_exactly_at_t_is_past() {
        let mut table = ReservationTable::new(1);
        table.add(iv(0, 0.0, 7.0), A0).unwrap();
        table.reorganize(7.0);
        assert!(table.is_empty());
    }

    #[test]
    fn open_ended_tail_survives_with_clipped_start() {
        let mut table = ReservationTable::new(1);
        table.add(iv(0, 2.0, FOREVER), A0).unwrap();
        table.reorganize(50.0);
        let (tail, _) = table.get_last(NodeId(0)).unwrap();
        assert_eq!(tail, iv(0, 50.0, FOREVER));
    }
}

// ── Snapshot isolation ────────────────────────────────────────────────────────

#[cfg(test)]
mod snapshot_tests {
    use super::*;

    #[test]
    fn clone_is_fully_independent() {
        let mut live = ReservationTable::new(2);
        live.add(iv(0, 0.0, 5.0), A0).unwrap();
        live.add(iv(1, 3.0, FOREVER), A1).unwrap();
        let before = live.clone();

        let mut snapshot = live.clone();
        snapshot.clear(NodeId(0));
        snapshot.add(iv(0, 1.0, 2.0), A1).unwrap();
        snapshot.reorganize(4.0);

        assert_eq!(live, before, "mutating the snapshot must not touch the live table");
        assert_ne!(snapshot, live);
    }
}

// ── Randomized disjointness ───────────────────────────────────────────────────

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Random adds and removes must never leave two overlapping claims,
    /// and the table must match a mirror of every successful operation.
    #[test]
    fn random_workload_preserves_disjointness() {
        let mut rng = PlannerRng::new(7);
        let mut table = ReservationTable::new(5);
        let mut mirror: Vec<(Interval, AgentId)> = Vec::new();

        for _ in 0..2000 {
            if mirror.is_empty() || rng.gen_bool(0.6) {
                // Integer-derived bounds so exact removal can always match.
                let node = rng.gen_range(0..5u32);
                let start = rng.gen_range(0..60u32) as f64;
                let len = rng.gen_range(1..10u32) as f64;
                let owner = AgentId(rng.gen_range(0..3u32));
                let interval = iv(node, start, start + len);
                if table.add(interval, owner).is_ok() {
                    mirror.push((interval, owner));
                }
            } else {
                let idx = rng.gen_range(0..mirror.len());
                let (interval, _) = mirror.swap_remove(idx);
                assert!(table.remove(interval), "mirrored claim must be removable");
            }
            assert_disjoint(&table);
        }

        assert_eq!(table.len(), mirror.len());
        for (interval, owner) in &mirror {
            let (found, holder) = table
                .get(interval.node, interval.start, interval.end)
                .unwrap_or_else(|| panic!("mirrored claim {interval:?} missing"));
            assert_eq!(found, *interval);
            assert_eq!(holder, *owner);
        }
    }
}
