//! Human-readable duration parsing.
//!
//! A duration token is normalized (trimmed, lower-cased) and then offered to
//! each [`DurationForm`] in [`DurationForm::PRIORITY`] order. The first form
//! that accepts the token decides its value, so the order is part of the
//! contract: `1h30m` must be read as hours-and-minutes before the plain
//! hours form gets a chance to reject it.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static HOURS_AND_MINUTES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+(?:\.[0-9]+)?)\s*h\s*([0-9]+)\s*m$").unwrap()
});
static HOURS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+(?:\.[0-9]+)?)\s*h$").unwrap());
static MINUTES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([0-9]+)\s*m$").unwrap());
static CLOCK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([0-9]+):([0-9]+)$").unwrap());

const SECONDS_PER_HOUR: i64 = 3600;
const SECONDS_PER_MINUTE: i64 = 60;

/// Duration parsing errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DurationError {
    /// No duration form accepted the token.
    #[error("unable to parse time: {token}")]
    Unrecognized { token: String },
}

/// The duration spellings understood by [`parse_duration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationForm {
    /// `1.5h30m`: fractional hours followed by whole minutes.
    HoursAndMinutes,
    /// `1.5h`: fractional hours.
    Hours,
    /// `90m`: whole minutes.
    Minutes,
    /// `1:30`: hours and minutes on a clock face.
    Clock,
    /// `1.5`: a bare number of hours.
    DecimalHours,
}

impl DurationForm {
    /// Matching order. The first form to accept a token wins.
    pub const PRIORITY: [Self; 5] = [
        Self::HoursAndMinutes,
        Self::Hours,
        Self::Minutes,
        Self::Clock,
        Self::DecimalHours,
    ];

    /// Tries this form against an already-normalized token.
    ///
    /// Returns `None` when the form does not apply, including when the value
    /// would not fit in an `i64` second count.
    pub fn try_match(self, token: &str) -> Option<i64> {
        match self {
            Self::HoursAndMinutes => {
                let caps = HOURS_AND_MINUTES_RE.captures(token)?;
                let hours = hours_to_seconds(&caps[1])?;
                hours.checked_add(minutes_to_seconds(&caps[2])?)
            }
            Self::Hours => {
                let caps = HOURS_RE.captures(token)?;
                hours_to_seconds(&caps[1])
            }
            Self::Minutes => minutes_to_seconds(&MINUTES_RE.captures(token)?[1]),
            Self::Clock => {
                let caps = CLOCK_RE.captures(token)?;
                let hours = caps[1].parse::<i64>().ok()?.checked_mul(SECONDS_PER_HOUR)?;
                hours.checked_add(minutes_to_seconds(&caps[2])?)
            }
            // Signed on purpose: "-1" parses to -3600 and is left for callers to drop.
            Self::DecimalHours => match token.strip_prefix('-') {
                Some(magnitude) => hours_to_seconds(magnitude)?.checked_neg(),
                None => hours_to_seconds(token.strip_prefix('+').unwrap_or(token)),
            },
        }
    }
}

/// Parses a duration token into whole seconds.
///
/// Blank input is zero seconds rather than an error. Negative bare numbers
/// are not clamped.
///
/// # Examples
///
/// ```
/// use jw_core::parse_duration;
///
/// assert_eq!(parse_duration("1h30m").unwrap(), 5400);
/// assert_eq!(parse_duration("90m").unwrap(), 5400);
/// assert_eq!(parse_duration("").unwrap(), 0);
/// assert!(parse_duration("soon").is_err());
/// ```
pub fn parse_duration(token: &str) -> Result<i64, DurationError> {
    let normalized = token.trim().to_lowercase();
    if normalized.is_empty() {
        return Ok(0);
    }

    DurationForm::PRIORITY
        .iter()
        .find_map(|form| form.try_match(&normalized))
        .ok_or(DurationError::Unrecognized { token: normalized })
}

/// Renders seconds as `XhYm`, dropping leftover seconds.
pub fn format_hours_minutes(seconds: i64) -> String {
    let hours = seconds / SECONDS_PER_HOUR;
    let minutes = (seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    format!("{hours}h{minutes}m")
}

/// Converts unsigned decimal hours (`1`, `1.5`, `.25`, `2.`) to seconds.
///
/// Works on the digits directly so `4.1` is exactly 14760. Only a leftover
/// fraction of a second is truncated.
fn hours_to_seconds(hours: &str) -> Option<i64> {
    let (whole, fraction) = hours.split_once('.').unwrap_or((hours, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole_seconds = if whole.is_empty() {
        0
    } else {
        whole.parse::<i64>().ok()?.checked_mul(SECONDS_PER_HOUR)?
    };
    // floor(3600 * 0.d1..dn), folded from the last digit; stays below 3600.
    let fraction_seconds = fraction
        .bytes()
        .rev()
        .fold(0, |acc, digit| (SECONDS_PER_HOUR * i64::from(digit - b'0') + acc) / 10);
    whole_seconds.checked_add(fraction_seconds)
}

fn minutes_to_seconds(digits: &str) -> Option<i64> {
    digits.parse::<i64>().ok()?.checked_mul(SECONDS_PER_MINUTE)
}
