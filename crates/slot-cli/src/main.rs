//! `slots` CLI -- run the scheduling engine against an event set from the shell.
//!
//! ## Usage
//!
//! ```sh
//! # Suggest open 30-minute meeting slots (events JSON from a file)
//! slots suggest --events week.json --duration 30 --event-type meeting
//!
//! # Same, reading events from stdin and anchoring the search
//! cat week.json | slots suggest --duration 45 --anchor 2026-03-16T00:00:00Z
//!
//! # List conflicts for a candidate window
//! slots conflicts --events week.json \
//!     --start 2026-03-16T09:30:00Z --end 2026-03-16T10:30:00Z
//!
//! # Free windows inside a range, at least an hour long
//! slots free --events week.json \
//!     --from 2026-03-16T08:00:00Z --to 2026-03-16T18:00:00Z --min-minutes 60
//!
//! # Stacking lanes for a visible window's events
//! slots lanes --events week.json
//! ```
//!
//! Events files are JSON arrays of `{"start", "end", "owner_id"}` objects
//! with RFC 3339 timestamps. All commands print JSON to stdout.

use std::collections::BTreeMap;
use std::io::{self, Read};
use std::process;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use slot_engine::{
    allocate_lanes, conflict_details, find_free_windows, find_optimal_slots, EventType, FreeSlot,
    Interval, IntervalIndex, SlotConfig, SlotRequest,
};

#[derive(Parser)]
#[command(name = "slots", version, about = "Calendar conflict and slot-search engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest ranked open slots for a new event
    Suggest {
        /// Events JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        events: Option<String>,
        /// Slot duration in minutes
        #[arg(short, long)]
        duration: u32,
        /// Event type: meeting, focus, break, or task
        #[arg(short = 't', long, default_value = "meeting")]
        event_type: String,
        /// Anchor day for the search horizon (RFC 3339; defaults to now)
        #[arg(long)]
        anchor: Option<String>,
        /// Search configuration JSON file (working hours, horizon, step, ...)
        #[arg(long)]
        config: Option<String>,
    },
    /// List conflicts for a candidate interval
    Conflicts {
        /// Events JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        events: Option<String>,
        /// Candidate start (RFC 3339)
        #[arg(long)]
        start: String,
        /// Candidate end (RFC 3339)
        #[arg(long)]
        end: String,
        /// Owner id of the candidate; its own indexed interval never
        /// counts as a conflict (update-in-place checks)
        #[arg(long, default_value = "candidate")]
        owner: String,
    },
    /// List free windows inside a time range
    Free {
        /// Events JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        events: Option<String>,
        /// Window start (RFC 3339)
        #[arg(long)]
        from: String,
        /// Window end (RFC 3339)
        #[arg(long)]
        to: String,
        /// Keep only windows of at least this many minutes
        #[arg(long, default_value_t = 0)]
        min_minutes: i64,
    },
    /// Assign stacking lanes to overlapping events
    Lanes {
        /// Events JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        events: Option<String>,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init: a test harness may have installed a subscriber already.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Commands::Suggest {
            events,
            duration,
            event_type,
            anchor,
            config,
        } => {
            let (index, _) = load_index(events.as_deref())?;
            let config = load_config(config.as_deref())?;
            let request = SlotRequest {
                duration_minutes: *duration,
                anchor: anchor.as_deref().map(parse_instant).transpose()?,
                event_type: parse_event_type(event_type)?,
            };
            let recommendations = find_optimal_slots(&index, &request, &config)?;
            println!("{}", serde_json::to_string_pretty(&recommendations)?);
        }
        Commands::Conflicts {
            events,
            start,
            end,
            owner,
        } => {
            let (index, _) = load_index(events.as_deref())?;
            let candidate =
                Interval::new(parse_instant(start)?, parse_instant(end)?, owner.clone())?;
            let conflicts = conflict_details(&index, &candidate);
            println!("{}", serde_json::to_string_pretty(&conflicts)?);
        }
        Commands::Free {
            events,
            from,
            to,
            min_minutes,
        } => {
            let (index, _) = load_index(events.as_deref())?;
            let windows: Vec<FreeSlot> =
                find_free_windows(&index, parse_instant(from)?, parse_instant(to)?)
                    .into_iter()
                    .filter(|w| w.duration_minutes >= *min_minutes)
                    .collect();
            println!("{}", serde_json::to_string_pretty(&windows)?);
        }
        Commands::Lanes { events } => {
            let (_, intervals) = load_index(events.as_deref())?;
            // BTreeMap for stable, diffable output.
            let lanes: BTreeMap<String, usize> = allocate_lanes(&intervals).into_iter().collect();
            println!("{}", serde_json::to_string_pretty(&lanes)?);
        }
    }

    Ok(())
}

/// Read a file, or stdin when no path is given.
fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

/// Parse an events JSON array and index every interval in it.
fn load_index(path: Option<&str>) -> Result<(IntervalIndex, Vec<Interval>)> {
    let raw = read_input(path)?;
    let intervals: Vec<Interval> = serde_json::from_str(&raw)
        .context("events input is not a JSON array of {start, end, owner_id} intervals")?;

    let mut index = IntervalIndex::new();
    for interval in &intervals {
        index
            .insert(interval.clone())
            .with_context(|| format!("invalid interval for owner {}", interval.owner_id))?;
    }
    tracing::debug!(count = intervals.len(), "indexed events");
    Ok((index, intervals))
}

fn load_config(path: Option<&str>) -> Result<SlotConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path))?;
            serde_json::from_str(&raw).with_context(|| format!("invalid search config in {}", path))
        }
        None => Ok(SlotConfig::default()),
    }
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .with_context(|| format!("invalid RFC 3339 timestamp: {}", raw))
}

fn parse_event_type(raw: &str) -> Result<EventType> {
    match raw {
        "meeting" => Ok(EventType::Meeting),
        "focus" => Ok(EventType::Focus),
        "break" => Ok(EventType::Break),
        "task" => Ok(EventType::Task),
        other => anyhow::bail!(
            "unknown event type: {} (expected meeting, focus, break, or task)",
            other
        ),
    }
}
