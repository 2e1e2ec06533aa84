//! Tests for lane allocation: determinism, lane reuse, and optimality in the
//! number of lanes used.

use chrono::{DateTime, TimeZone, Utc};
use slot_engine::{allocate_lanes, Interval};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, d, 0, 0, 0).unwrap()
}

fn interval(owner: &str, start_day: u32, end_day: u32) -> Interval {
    Interval::new(day(start_day), day(end_day), owner).unwrap()
}

#[test]
fn overlapping_pair_splits_lanes_and_disjoint_reuses_lane_zero() {
    // A Jan 1-3 and B Jan 2-4 overlap; C Jan 5-6 is clear of both.
    let lanes = allocate_lanes(&[
        interval("a", 1, 3),
        interval("b", 2, 4),
        interval("c", 5, 6),
    ]);

    assert_eq!(lanes["a"], 0);
    assert_eq!(lanes["b"], 1, "B overlaps A and must move down a lane");
    assert_eq!(lanes["c"], 0, "C is disjoint and reuses the top lane");
    assert_eq!(lanes.values().max(), Some(&1), "two lanes suffice");
}

#[test]
fn empty_input_yields_empty_assignment() {
    assert!(allocate_lanes(&[]).is_empty());
}

#[test]
fn disjoint_intervals_all_share_lane_zero() {
    let lanes = allocate_lanes(&[
        interval("a", 1, 2),
        interval("b", 3, 4),
        interval("c", 5, 6),
    ]);
    assert!(lanes.values().all(|&lane| lane == 0));
}

#[test]
fn adjacent_intervals_share_a_lane() {
    // Half-open ranges: one ending exactly when the next starts do not overlap.
    let lanes = allocate_lanes(&[interval("a", 1, 3), interval("b", 3, 5)]);
    assert_eq!(lanes["a"], 0);
    assert_eq!(lanes["b"], 0);
}

#[test]
fn identical_intervals_stack_deterministically() {
    let lanes = allocate_lanes(&[
        interval("c", 1, 2),
        interval("a", 1, 2),
        interval("b", 1, 2),
    ]);

    // Full ties fall back to owner-id order.
    assert_eq!(lanes["a"], 0);
    assert_eq!(lanes["b"], 1);
    assert_eq!(lanes["c"], 2);
}

#[test]
fn longer_interval_wins_the_top_lane_on_equal_starts() {
    let lanes = allocate_lanes(&[
        interval("short", 1, 2),
        interval("long", 1, 5),
    ]);

    assert_eq!(lanes["long"], 0, "longer duration sorts first on tied starts");
    assert_eq!(lanes["short"], 1);
}

#[test]
fn lane_count_equals_maximum_simultaneous_overlap() {
    // Three intervals alive at once around Jan 3, never four.
    let intervals = [
        interval("a", 1, 4),
        interval("b", 2, 5),
        interval("c", 3, 6),
        interval("d", 5, 8),
        interval("e", 6, 9),
    ];
    let lanes = allocate_lanes(&intervals);

    let max_lane = lanes.values().copied().max().expect("nonempty assignment");
    assert_eq!(max_lane, 2, "greedy coloring uses exactly the clique number of lanes");

    // And no two intervals in one lane overlap.
    for x in &intervals {
        for y in &intervals {
            if x.owner_id != y.owner_id && lanes[&x.owner_id] == lanes[&y.owner_id] {
                assert!(!x.overlaps(y), "{} and {} share a lane but overlap", x.owner_id, y.owner_id);
            }
        }
    }
}

#[test]
fn assignment_is_stable_across_input_permutations() {
    let forward = allocate_lanes(&[
        interval("a", 1, 4),
        interval("b", 2, 5),
        interval("c", 3, 6),
    ]);
    let backward = allocate_lanes(&[
        interval("c", 3, 6),
        interval("b", 2, 5),
        interval("a", 1, 4),
    ]);
    assert_eq!(forward, backward, "input order must not change the assignment");
}
