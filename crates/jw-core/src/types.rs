//! Core type definitions shared by the parser, the API client and the CLI.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Body recorded for entries that were skipped because they carry no time.
pub const SKIPPED_BODY: &str = "Skipped zero seconds";

/// A resolved time entry: an issue key and the seconds to log against it.
///
/// Produced by [`crate::parse_entries`], which only emits entries with a
/// non-empty issue and a strictly positive duration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimeEntry {
    pub issue: String,
    pub seconds: i64,
}

impl TimeEntry {
    pub fn new(issue: impl Into<String>, seconds: i64) -> Self {
        Self {
            issue: issue.into(),
            seconds,
        }
    }
}

/// Shorthand aliases for issue keys, e.g. `meetings -> PROJ-123`.
///
/// Alias keys are stored lower-cased so lookups are case-insensitive no
/// matter how the configuration spells them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct CategoryAliases(BTreeMap<String, String>);

impl CategoryAliases {
    /// Looks up the issue key for an alias, ignoring case.
    pub fn resolve(&self, alias: &str) -> Option<&str> {
        self.0.get(&alias.to_lowercase()).map(String::as_str)
    }

    /// Iterates over `(alias, issue key)` pairs in alias order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, String>> for CategoryAliases {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl From<CategoryAliases> for BTreeMap<String, String> {
    fn from(aliases: CategoryAliases) -> Self {
        aliases.0
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for CategoryAliases {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.as_ref().trim().to_lowercase(), v.into()))
                .collect(),
        )
    }
}

/// How an [`Epic`] suggestion was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EpicKind {
    /// The assigned issue is itself an epic.
    Epic,
    /// The parent of an assigned issue.
    Parent,
    /// Referenced through the legacy epic-link field.
    EpicLink,
}

impl EpicKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Epic => "epic",
            Self::Parent => "parent",
            Self::EpicLink => "epic_link",
        }
    }
}

impl fmt::Display for EpicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An epic suggested to the user as a likely place to log time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Epic {
    pub key: String,
    pub summary: String,
    pub kind: EpicKind,
}

/// Outcome of a single worklog submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklogResult {
    pub issue: String,
    pub seconds: i64,
    pub success: bool,
    /// HTTP status code, or 0 when no response was received.
    pub code: u16,
    pub body: String,
}

impl WorklogResult {
    /// A synthetic success for an entry that carried no time.
    pub fn skipped(issue: impl Into<String>, seconds: i64) -> Self {
        Self {
            issue: issue.into(),
            seconds,
            success: true,
            code: 0,
            body: SKIPPED_BODY.to_string(),
        }
    }

    /// A failure that never produced an HTTP response.
    pub fn transport_failure(issue: impl Into<String>, seconds: i64, body: impl Into<String>) -> Self {
        Self {
            issue: issue.into(),
            seconds,
            success: false,
            code: 0,
            body: body.into(),
        }
    }

    /// Returns the body cut to at most `limit` characters.
    pub fn truncated_body(&self, limit: usize) -> &str {
        match self.body.char_indices().nth(limit) {
            Some((idx, _)) => &self.body[..idx],
            None => &self.body,
        }
    }
}
