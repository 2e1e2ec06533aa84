//! Slot finding -- scan a bounded horizon for open windows and rank them.
//!
//! The finder slides a cursor across each day's working hours at a fixed
//! granularity, discards any candidate that collides with an indexed
//! interval, scores the survivors, and returns the best of them with
//! runner-up alternatives attached. Scoring is accumulated in a structured
//! breakdown so the confidence value and the human-readable rationale are
//! derived from the same record.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conflict::is_available;
use crate::error::{Result, SlotError};
use crate::index::IntervalIndex;
use crate::interval::Interval;

/// What kind of calendar entry a slot is being searched for. The type biases
/// scoring: meetings prefer mid-day, focus work prefers the configured focus
/// windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    #[default]
    Meeting,
    Focus,
    Break,
    Task,
}

/// A clock-hour span within a single day, half-open on the end hour.
/// `end_hour` may be 24 to reach midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourSpan {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl HourSpan {
    /// Whether a clock hour falls inside this span.
    pub fn contains_hour(&self, hour: u32) -> bool {
        self.start_hour <= hour && hour < self.end_hour
    }
}

/// Tuning knobs for the slot search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    /// Daily window candidates are drawn from.
    pub working_hours: HourSpan,
    /// Hours that earn focus-type requests a bonus.
    pub focus_windows: Vec<HourSpan>,
    /// Breathing room wanted on either side of a slot, in minutes.
    pub buffer_minutes: i64,
    /// How many days forward to search, anchor day included.
    pub horizon_days: u32,
    /// Cursor granularity in minutes.
    pub step_minutes: u32,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            working_hours: HourSpan {
                start_hour: 9,
                end_hour: 17,
            },
            focus_windows: vec![HourSpan {
                start_hour: 9,
                end_hour: 12,
            }],
            buffer_minutes: 15,
            horizon_days: 7,
            step_minutes: 15,
        }
    }
}

/// One slot search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRequest {
    /// Length of the wanted slot in minutes. Must be positive.
    pub duration_minutes: u32,
    /// Day the horizon starts on. Defaults to the current instant's day.
    pub anchor: Option<DateTime<Utc>>,
    pub event_type: EventType,
}

/// A scored, conflict-free candidate window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Desirability on a 0..=100 scale.
    pub confidence: u8,
    /// Human-readable rationale for the confidence value.
    pub reason: String,
    /// Intervals colliding with this slot. Always empty for slots produced by
    /// the finder -- candidates with conflicts are discarded -- but carried so
    /// external layers can reuse the shape for occupied windows.
    pub conflicts: Vec<Interval>,
    /// The next lower-ranked candidates, best first.
    pub alternatives: Vec<RankedSlot>,
}

/// Outcome of a slot search. An exhausted horizon is a soft outcome: `slots`
/// is empty and `message` explains why, no error is raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRecommendations {
    pub slots: Vec<RankedSlot>,
    pub message: Option<String>,
}

// Adjustment labels double as match keys for the rationale builder.
const OUTSIDE_WORKING_HOURS: &str = "outside working hours";
const MIDDAY_MEETING: &str = "mid-day meeting time";
const LATE_MEETING: &str = "late-day meeting";
const FOCUS_WINDOW: &str = "inside a focus window";
const LATER_DAY: &str = "later in the horizon";
const TIGHT_SCHEDULE: &str = "tight against another event";

/// One signed scoring step and why it was applied.
#[derive(Debug, Clone)]
struct Adjustment {
    reason: &'static str,
    delta: i32,
}

/// Score accumulator: a base value plus every adjustment that touched it.
/// The final confidence and the rationale text both derive from this.
#[derive(Debug, Clone)]
struct ScoreBreakdown {
    base: i32,
    adjustments: Vec<Adjustment>,
}

impl ScoreBreakdown {
    fn new() -> Self {
        Self {
            base: 100,
            adjustments: Vec::new(),
        }
    }

    fn apply(&mut self, reason: &'static str, delta: i32) {
        self.adjustments.push(Adjustment { reason, delta });
    }

    fn has(&self, reason: &str) -> bool {
        self.adjustments.iter().any(|a| a.reason == reason)
    }

    /// Final score, clamped to 0..=100.
    fn total(&self) -> i32 {
        let raw: i32 = self.base + self.adjustments.iter().map(|a| a.delta).sum::<i32>();
        raw.clamp(0, 100)
    }
}

struct ScoredCandidate {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    day_offset: u32,
    total: i32,
    breakdown: ScoreBreakdown,
}

/// Search the horizon for open windows and return the ten best, ranked by
/// confidence (ties broken by earlier start), each carrying its next three
/// runners-up as alternatives.
///
/// # Errors
/// `SlotError::InvalidDuration` for a zero duration,
/// `SlotError::InvalidSearchConfig` for a zero step or an unusable
/// working-hours span. An empty horizon is not an error; see
/// [`SlotRecommendations`].
pub fn find_optimal_slots(
    index: &IntervalIndex,
    request: &SlotRequest,
    config: &SlotConfig,
) -> Result<SlotRecommendations> {
    if request.duration_minutes == 0 {
        return Err(SlotError::InvalidDuration);
    }
    validate_config(config)?;

    let anchor = request.anchor.unwrap_or_else(Utc::now);
    let duration = Duration::minutes(i64::from(request.duration_minutes));
    let step = Duration::minutes(i64::from(config.step_minutes));

    let mut scored: Vec<ScoredCandidate> = Vec::new();
    for day_offset in 0..config.horizon_days {
        let day = anchor.date_naive() + chrono::Days::new(u64::from(day_offset));
        let Some((day_start, day_end)) = day_bounds(day, &config.working_hours) else {
            continue;
        };

        let mut cursor = day_start;
        while cursor + duration <= day_end {
            let (slot_start, slot_end) = (cursor, cursor + duration);
            cursor = cursor + step;

            // A candidate must be fully free; partial fits are discarded.
            if !is_available(index, slot_start, slot_end) {
                continue;
            }

            let breakdown =
                score_candidate(index, slot_start, slot_end, request.event_type, day_offset, config);
            scored.push(ScoredCandidate {
                start: slot_start,
                end: slot_end,
                day_offset,
                total: breakdown.total(),
                breakdown,
            });
        }
    }

    scored.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.start.cmp(&b.start)));

    let slots: Vec<RankedSlot> = scored
        .iter()
        .take(10)
        .enumerate()
        .map(|(rank, candidate)| {
            let alternatives = scored
                .iter()
                .skip(rank + 1)
                .take(3)
                .map(|alt| to_ranked_slot(alt, Vec::new()))
                .collect();
            to_ranked_slot(candidate, alternatives)
        })
        .collect();

    debug!(
        candidates = scored.len(),
        returned = slots.len(),
        "slot search complete"
    );

    let message = if slots.is_empty() {
        Some(format!(
            "No open {}-minute window found in the next {} days; try a shorter duration or a wider horizon.",
            request.duration_minutes, config.horizon_days
        ))
    } else {
        None
    };

    Ok(SlotRecommendations { slots, message })
}

fn validate_config(config: &SlotConfig) -> Result<()> {
    if config.step_minutes == 0 {
        return Err(SlotError::InvalidSearchConfig(
            "step_minutes must be positive".to_string(),
        ));
    }
    let hours = &config.working_hours;
    if hours.start_hour >= hours.end_hour || hours.end_hour > 24 {
        return Err(SlotError::InvalidSearchConfig(format!(
            "working hours {}..{} are not a valid span",
            hours.start_hour, hours.end_hour
        )));
    }
    Ok(())
}

/// The working-hours window of one day as concrete instants. An end hour of
/// 24 lands on the next day's midnight.
fn day_bounds(day: NaiveDate, hours: &HourSpan) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = day.and_hms_opt(hours.start_hour, 0, 0)?.and_utc();
    let end = if hours.end_hour == 24 {
        day.succ_opt()?.and_hms_opt(0, 0, 0)?.and_utc()
    } else {
        day.and_hms_opt(hours.end_hour, 0, 0)?.and_utc()
    };
    Some((start, end))
}

fn score_candidate(
    index: &IntervalIndex,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    event_type: EventType,
    day_offset: u32,
    config: &SlotConfig,
) -> ScoreBreakdown {
    let mut score = ScoreBreakdown::new();
    let hour = start.hour();

    if !config.working_hours.contains_hour(hour) {
        score.apply(OUTSIDE_WORKING_HOURS, -40);
    }

    match event_type {
        EventType::Meeting => {
            if (10..=16).contains(&hour) {
                score.apply(MIDDAY_MEETING, 20);
            }
            if hour >= 16 {
                score.apply(LATE_MEETING, -15);
            }
        }
        EventType::Focus => {
            if config.focus_windows.iter().any(|w| w.contains_hour(hour)) {
                score.apply(FOCUS_WINDOW, 30);
            }
        }
        EventType::Break | EventType::Task => {}
    }

    if day_offset > 0 {
        // Earlier days win, all else equal.
        score.apply(LATER_DAY, -5 * day_offset as i32);
    }

    // The candidate itself is free, so anything the widened query hits is a
    // neighboring event inside the buffer.
    let buffer = Duration::minutes(config.buffer_minutes);
    if !index.find_overlapping(start - buffer, end + buffer).is_empty() {
        score.apply(TIGHT_SCHEDULE, -20);
    }

    score
}

fn to_ranked_slot(candidate: &ScoredCandidate, alternatives: Vec<RankedSlot>) -> RankedSlot {
    RankedSlot {
        start: candidate.start,
        end: candidate.end,
        confidence: candidate.total as u8,
        reason: build_reason(&candidate.breakdown, candidate.day_offset),
        conflicts: Vec::new(),
        alternatives,
    }
}

/// Derive the rationale from the same breakdown the score came from.
fn build_reason(breakdown: &ScoreBreakdown, day_offset: u32) -> String {
    let quality = match breakdown.total() {
        80.. => "optimal",
        60..=79 => "good",
        40..=59 => "acceptable",
        _ => "poor",
    };
    let day_phrase = match day_offset {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        n => format!("in {} days", n),
    };
    let buffer_note = if breakdown.has(TIGHT_SCHEDULE) {
        "tight against another event"
    } else {
        "clear buffer on both sides"
    };
    format!("{} slot {}, {}", quality, day_phrase, buffer_note)
}
