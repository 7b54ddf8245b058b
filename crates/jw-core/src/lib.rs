//! Core domain logic for the Jira worklogger.
//!
//! This crate turns user input into submittable worklogs:
//! - Durations: `1.5h`, `90m`, `1:30`, `1h30m`, `2` to seconds
//! - Entries: `meetings=1h; PROJ-12 30m` to resolved [`TimeEntry`] values
//! - Timestamps: a date, time of day and IANA zone to the wire format

mod duration;
mod entry;
mod timestamp;
pub mod types;

pub use duration::{DurationError, DurationForm, format_hours_minutes, parse_duration};
pub use entry::{EntryError, parse_entries};
pub use timestamp::{
    DEFAULT_START_HOUR, DEFAULT_START_MINUTE, DateParseError, ResolvedZone, build_timestamp,
    default_date_str, parse_date, resolve_timezone,
};
pub use types::{CategoryAliases, Epic, EpicKind, SKIPPED_BODY, TimeEntry, WorklogResult};
