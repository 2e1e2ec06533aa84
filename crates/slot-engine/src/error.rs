//! Error types for slot-engine operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlotError {
    /// An interval whose end does not come strictly after its start.
    #[error("Invalid interval: end {end} is not after start {start}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A slot request with a zero-length duration.
    #[error("Invalid duration: must be a positive number of minutes")]
    InvalidDuration,

    /// A search configuration the scan cannot make sense of (inverted
    /// working hours, zero step, hours outside 0..=24).
    #[error("Invalid search configuration: {0}")]
    InvalidSearchConfig(String),
}

pub type Result<T> = std::result::Result<T, SlotError>;
