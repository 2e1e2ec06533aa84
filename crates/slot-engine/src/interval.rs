//! The `Interval` value type -- a half-open time range owned by one calendar event.
//!
//! Intervals use half-open `[start, end)` semantics throughout the engine:
//! two intervals overlap iff `a.start < b.end && b.start < a.end`, so an event
//! ending at 10:00 never collides with one starting at 10:00.

use crate::error::{Result, SlotError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A half-open time range `[start, end)` tied to the calendar event that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Identifier of the owning event. Opaque to the engine; unique per event.
    pub owner_id: String,
}

impl Interval {
    /// Build an interval, rejecting zero-length and inverted ranges.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidInterval` if `end <= start`.
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        owner_id: impl Into<String>,
    ) -> Result<Self> {
        if end <= start {
            return Err(SlotError::InvalidInterval { start, end });
        }
        Ok(Self {
            start,
            end,
            owner_id: owner_id.into(),
        })
    }

    /// Whether this interval overlaps `other` under half-open semantics.
    /// Adjacent intervals (one ends exactly when the other starts) do NOT overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Length of the interval in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}
