//! Lane allocation -- stack overlapping intervals into non-overlapping rows.
//!
//! Greedy interval-graph coloring: intervals sorted by start take the lowest
//! lane that is already clear, opening a new lane only when none is. For
//! interval graphs this greedy order is optimal -- the number of lanes used
//! equals the maximum number of intervals alive at any one instant.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::interval::Interval;

/// Assign each interval the lowest lane index it fits in without overlap.
///
/// Returns a map from owner id to lane index (0-based). The assignment is
/// deterministic: intervals are processed by ascending start, ties broken by
/// longer duration first (keeps long events visually stable at the top),
/// residual ties by owner id. Valid only for the interval set it was computed
/// from; rendering passes recompute it rather than caching it.
pub fn allocate_lanes(intervals: &[Interval]) -> HashMap<String, usize> {
    let mut ordered: Vec<&Interval> = intervals.iter().collect();
    ordered.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| b.end.cmp(&a.end))
            .then_with(|| a.owner_id.cmp(&b.owner_id))
    });

    // Latest end time currently held by each lane.
    let mut lane_ends: Vec<DateTime<Utc>> = Vec::new();
    let mut assignment = HashMap::with_capacity(intervals.len());

    for interval in ordered {
        // Lowest-indexed lane already clear of this interval's start, if any.
        let lane = match lane_ends.iter().position(|&lane_end| lane_end <= interval.start) {
            Some(lane) => {
                lane_ends[lane] = interval.end;
                lane
            }
            None => {
                lane_ends.push(interval.end);
                lane_ends.len() - 1
            }
        };
        assignment.insert(interval.owner_id.clone(), lane);
    }

    assignment
}
