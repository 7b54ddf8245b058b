//! Time entry parsing: `issue=duration` fragments to [`TimeEntry`] values.

use thiserror::Error;

use crate::duration::{DurationError, parse_duration};
use crate::types::{CategoryAliases, TimeEntry};

/// Entry parsing errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntryError {
    /// The duration of one fragment could not be parsed.
    #[error("failed to parse time for entry {fragment}: {source}")]
    InvalidDuration {
        fragment: String,
        #[source]
        source: DurationError,
    },
}

/// Parses a raw entries string into resolved time entries.
///
/// Fragments are separated by newlines and semicolons and keep their input
/// order. Each fragment is `ISSUE=DURATION`, `ISSUE DURATION` or a bare
/// `ISSUE` (zero time). Issue tokens lose a trailing `:` and are looked up in
/// `aliases`; unknown tokens are used verbatim.
///
/// Entries with an empty issue or a non-positive duration are dropped. A
/// single unparseable duration fails the whole call.
pub fn parse_entries(raw: &str, aliases: &CategoryAliases) -> Result<Vec<TimeEntry>, EntryError> {
    let mut entries = Vec::new();

    for fragment in fragments(raw) {
        let (token, duration) = split_fragment(fragment);
        let token = token.strip_suffix(':').unwrap_or(token);

        let issue = match aliases.resolve(token) {
            Some(key) => {
                tracing::info!("Using alias '{token}' -> {key}");
                key
            }
            None => token,
        };

        let seconds = parse_duration(duration).map_err(|source| EntryError::InvalidDuration {
            fragment: fragment.to_string(),
            source,
        })?;

        if issue.is_empty() || seconds <= 0 {
            tracing::debug!(fragment, seconds, "skipping entry without issue or time");
            continue;
        }
        entries.push(TimeEntry::new(issue, seconds));
    }

    Ok(entries)
}

/// Splits raw input on newlines, then semicolons, skipping blank fragments.
fn fragments(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines()
        .flat_map(|line| line.split(';'))
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
}

/// Splits a trimmed fragment into `(issue, duration)` tokens.
fn split_fragment(fragment: &str) -> (&str, &str) {
    if let Some((issue, duration)) = fragment.split_once('=') {
        return (issue.trim(), duration.trim());
    }

    let mut fields = fragment.split_whitespace();
    match (fields.next(), fields.next()) {
        (Some(issue), Some(duration)) => (issue, duration),
        _ => (fragment, "0"),
    }
}
