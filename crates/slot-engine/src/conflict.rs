//! Conflict queries over the interval index.
//!
//! A thin, side-effect-free layer: overlap search with self-exclusion (an
//! indexed interval never conflicts with its own candidate during an
//! update-in-place check) and a whole-range availability test.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::index::IntervalIndex;
use crate::interval::Interval;

/// A detected conflict: the stored interval plus how long it overlaps the
/// candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub interval: Interval,
    pub overlap_minutes: i64,
}

/// All indexed intervals overlapping `candidate`, excluding the candidate's
/// own owner id.
///
/// Two intervals overlap iff `a.start < b.end && b.start < a.end`; adjacent
/// intervals are not conflicts.
pub fn find_conflicts(index: &IntervalIndex, candidate: &Interval) -> Vec<Interval> {
    index
        .find_overlapping(candidate.start, candidate.end)
        .into_iter()
        .filter(|stored| stored.owner_id != candidate.owner_id)
        .collect()
}

/// Like [`find_conflicts`], with the overlap duration of each conflict.
///
/// The overlap is `min(a.end, b.end) - max(a.start, b.start)`.
pub fn conflict_details(index: &IntervalIndex, candidate: &Interval) -> Vec<Conflict> {
    find_conflicts(index, candidate)
        .into_iter()
        .map(|stored| {
            let overlap_start = stored.start.max(candidate.start);
            let overlap_end = stored.end.min(candidate.end);
            Conflict {
                interval: stored,
                overlap_minutes: (overlap_end - overlap_start).num_minutes(),
            }
        })
        .collect()
}

/// Whether the half-open range `[start, end)` is completely free.
pub fn is_available(index: &IntervalIndex, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    index.find_overlapping(start, end).is_empty()
}
