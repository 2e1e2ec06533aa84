//! Free-window computation over the index.
//!
//! Queries the index for everything touching a window, clips to the window,
//! merges overlapping or adjacent busy periods, then emits the gaps between
//! them. Useful when a caller wants contiguous free ranges rather than the
//! scored candidates produced by the slot finder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::index::IntervalIndex;

/// A free time window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

/// Merge the indexed intervals touching `[window_start, window_end)` into
/// non-overlapping busy periods, clipped to the window.
fn merge_busy_periods(
    index: &IntervalIndex,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    // Overlap results arrive sorted by start; clipping preserves that order.
    let intervals: Vec<(DateTime<Utc>, DateTime<Utc>)> = index
        .find_overlapping(window_start, window_end)
        .into_iter()
        .map(|i| (i.start.max(window_start), i.end.min(window_end)))
        .collect();

    let mut merged: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::new();
    for (start, end) in intervals {
        if let Some(last) = merged.last_mut() {
            if start <= last.1 {
                // Overlapping or adjacent -- extend the current period.
                last.1 = last.1.max(end);
                continue;
            }
        }
        merged.push((start, end));
    }
    merged
}

/// Free windows within `[window_start, window_end)`, sorted by start.
///
/// A degenerate window (`start >= end`) yields no free slots. Overlapping
/// busy intervals are merged before the gaps are computed.
pub fn find_free_windows(
    index: &IntervalIndex,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<FreeSlot> {
    if window_start >= window_end {
        return Vec::new();
    }

    let merged = merge_busy_periods(index, window_start, window_end);

    let mut free = Vec::new();
    let mut cursor = window_start;
    for (busy_start, busy_end) in &merged {
        if cursor < *busy_start {
            free.push(FreeSlot {
                start: cursor,
                end: *busy_start,
                duration_minutes: (*busy_start - cursor).num_minutes(),
            });
        }
        cursor = cursor.max(*busy_end);
    }

    // Trailing gap after the last busy period.
    if cursor < window_end {
        free.push(FreeSlot {
            start: cursor,
            end: window_end,
            duration_minutes: (window_end - cursor).num_minutes(),
        });
    }

    free
}

/// The first free window of at least `min_duration_minutes`, if any.
pub fn first_free_window(
    index: &IntervalIndex,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    min_duration_minutes: i64,
) -> Option<FreeSlot> {
    find_free_windows(index, window_start, window_end)
        .into_iter()
        .find(|slot| slot.duration_minutes >= min_duration_minutes)
}
