//! Worklog start timestamps.
//!
//! The worklog API expects `YYYY-MM-DDTHH:MM:SS.mmm±HHMM`: millisecond
//! precision and a numeric offset without a colon.

use std::fmt;
use std::sync::LazyLock;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone};
use chrono_tz::Tz;
use regex::Regex;
use thiserror::Error;

/// Hour of day worklogs are started at.
pub const DEFAULT_START_HOUR: u32 = 17;
/// Minute of the hour worklogs are started at.
pub const DEFAULT_START_MINUTE: u32 = 0;

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";
const DATE_FORMAT: &str = "%Y-%m-%d";

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());

/// Date and time-of-day errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateParseError {
    /// Input is not shaped like `YYYY-MM-DD`.
    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    Format { input: String },
    /// Input is shaped correctly but names no calendar day.
    #[error("invalid date '{input}': {source}")]
    Calendar {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
    /// Hour or minute out of range.
    #[error("invalid time of day {hour:02}:{minute:02}")]
    TimeOfDay { hour: u32, minute: u32 },
}

/// The zone a timestamp is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedZone {
    /// An IANA zone from the timezone database.
    Named(Tz),
    /// The OS local offset, used when no IANA name is available.
    Local,
}

impl fmt::Display for ResolvedZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(tz) => write!(f, "{}", tz.name()),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Today's local date as `YYYY-MM-DD`.
pub fn default_date_str() -> String {
    Local::now().date_naive().format(DATE_FORMAT).to_string()
}

/// Parses a `YYYY-MM-DD` date; blank input is today's local date.
pub fn parse_date(date_str: &str) -> Result<NaiveDate, DateParseError> {
    let input = date_str.trim();
    if input.is_empty() {
        return Ok(Local::now().date_naive());
    }
    if !DATE_RE.is_match(input) {
        return Err(DateParseError::Format {
            input: input.to_string(),
        });
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|source| DateParseError::Calendar {
        input: input.to_string(),
        source,
    })
}

/// Resolves an IANA timezone name, falling back to the local zone.
///
/// An unknown name is logged as a warning; it is never an error.
pub fn resolve_timezone(name: &str) -> ResolvedZone {
    match name.trim().parse::<Tz>() {
        Ok(tz) => ResolvedZone::Named(tz),
        Err(err) => {
            let fallback = local_zone();
            tracing::warn!("Could not load timezone {name}: {err}, using system default ({fallback})");
            fallback
        }
    }
}

fn local_zone() -> ResolvedZone {
    iana_time_zone::get_timezone()
        .ok()
        .and_then(|name| name.parse::<Tz>().ok())
        .map_or(ResolvedZone::Local, ResolvedZone::Named)
}

/// Builds the worklog start timestamp for `date_str` at `hour:minute` in
/// `timezone`.
///
/// # Examples
///
/// ```
/// use jw_core::build_timestamp;
///
/// let started = build_timestamp("2024-03-01", 17, 0, "Europe/London").unwrap();
/// assert_eq!(started, "2024-03-01T17:00:00.000+0000");
/// ```
pub fn build_timestamp(
    date_str: &str,
    hour: u32,
    minute: u32,
    timezone: &str,
) -> Result<String, DateParseError> {
    let date = parse_date(date_str)?;
    let time =
        NaiveTime::from_hms_opt(hour, minute, 0).ok_or(DateParseError::TimeOfDay { hour, minute })?;
    let naive = date.and_time(time);

    Ok(match resolve_timezone(timezone) {
        ResolvedZone::Named(tz) => format_in_zone(&tz, naive),
        ResolvedZone::Local => format_in_zone(&Local, naive),
    })
}

fn format_in_zone<Z>(zone: &Z, naive: NaiveDateTime) -> String
where
    Z: TimeZone,
    Z::Offset: fmt::Display,
{
    let zoned = zone.from_local_datetime(&naive).earliest().unwrap_or_else(|| {
        // Skipped by a DST jump: apply the offset in force before the gap.
        let before = zone
            .offset_from_utc_datetime(&(naive - TimeDelta::days(1)))
            .fix();
        zone.from_utc_datetime(&(naive - before))
    });
    zoned.format(WIRE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    static WIRE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:00\.000[+-][0-9]{4}$").unwrap()
    });

    #[test]
    fn test_london_winter_has_zero_offset() {
        let started = build_timestamp("2024-03-01", 17, 0, "Europe/London").unwrap();
        assert_eq!(started, "2024-03-01T17:00:00.000+0000");
    }

    #[test]
    fn test_london_summer_has_bst_offset() {
        let started = build_timestamp("2024-07-01", 17, 0, "Europe/London").unwrap();
        assert_eq!(started, "2024-07-01T17:00:00.000+0100");
    }

    #[test]
    fn test_negative_offsets_have_no_colon() {
        let started = build_timestamp("2024-01-15", 9, 30, "America/New_York").unwrap();
        assert_eq!(started, "2024-01-15T09:30:00.000-0500");
    }

    #[test]
    fn test_unknown_timezone_falls_back() {
        let started = build_timestamp("2024-03-01", 17, 0, "Not/AZone").unwrap();
        assert!(started.starts_with("2024-03-01T17:00:00.000"), "{started}");
        assert!(WIRE_RE.is_match(&started), "{started}");
    }

    #[test]
    fn test_blank_date_uses_today() {
        let started = build_timestamp("  ", 17, 0, "UTC").unwrap();
        assert!(WIRE_RE.is_match(&started), "{started}");
        assert!(started.ends_with("+0000"));
    }

    #[test]
    fn test_malformed_dates_are_rejected() {
        for input in ["03/01/2024", "2024-3-1", "yesterday", "2024-03-01T00:00"] {
            assert!(
                matches!(
                    build_timestamp(input, 17, 0, "UTC"),
                    Err(DateParseError::Format { .. })
                ),
                "{input}"
            );
        }
    }

    #[test]
    fn test_impossible_dates_are_rejected() {
        assert!(matches!(
            build_timestamp("2024-02-30", 17, 0, "UTC"),
            Err(DateParseError::Calendar { .. })
        ));
    }

    #[test]
    fn test_out_of_range_time_is_rejected() {
        assert_eq!(
            build_timestamp("2024-03-01", 24, 0, "UTC"),
            Err(DateParseError::TimeOfDay {
                hour: 24,
                minute: 0
            })
        );
    }

    #[test]
    fn test_dst_gap_moves_forward() {
        // 01:30 does not exist in London on 2024-03-31.
        let started = build_timestamp("2024-03-31", 1, 30, "Europe/London").unwrap();
        assert_eq!(started, "2024-03-31T02:30:00.000+0100");
    }

    #[test]
    fn test_dst_overlap_takes_earlier_instant() {
        let started = build_timestamp("2024-10-27", 1, 30, "Europe/London").unwrap();
        assert_eq!(started, "2024-10-27T01:30:00.000+0100");
    }

    #[test]
    fn test_resolve_timezone_accepts_padded_names() {
        assert_eq!(
            resolve_timezone(" Europe/London "),
            ResolvedZone::Named(chrono_tz::Europe::London)
        );
    }
}
