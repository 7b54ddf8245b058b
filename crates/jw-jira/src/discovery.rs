//! Assigned-issue search results and epic suggestions derived from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use jw_core::{Epic, EpicKind};

/// Fields requested from the search endpoint.
pub const SEARCH_FIELDS: [&str; 5] = ["key", "summary", "parent", "issuetype", "customfield_10014"];

/// Maximum number of issues fetched for suggestions.
pub const SEARCH_LIMIT: u32 = 100;

const BASE_JQL: &str =
    "assignee = currentUser() AND status NOT IN (Done, Closed, Completed, Wasted)";
const NO_SUMMARY: &str = "No summary";

/// An issue returned by the search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Issue {
    #[serde(default, deserialize_with = "string_or_absent")]
    pub key: Option<String>,
    pub fields: Option<IssueFields>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IssueFields {
    #[serde(default, deserialize_with = "string_or_absent")]
    pub summary: Option<String>,
    pub issuetype: Option<IssueType>,
    pub parent: Option<ParentRef>,
    /// Legacy "Epic Link" custom field. Non-string values read as absent.
    #[serde(
        rename = "customfield_10014",
        default,
        deserialize_with = "string_or_absent"
    )]
    pub epic_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IssueType {
    #[serde(default, deserialize_with = "string_or_absent")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ParentRef {
    #[serde(default, deserialize_with = "string_or_absent")]
    pub key: Option<String>,
    pub fields: Option<ParentFields>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ParentFields {
    #[serde(default, deserialize_with = "string_or_absent")]
    pub summary: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    /// Issues that do not decode are dropped one by one.
    #[serde(default, deserialize_with = "decodable_issues")]
    pub issues: Vec<Issue>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchRequest<'a> {
    pub jql: &'a str,
    pub fields: &'a [&'a str],
    pub max_results: u32,
}

fn string_or_absent<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_str().map(str::to_owned)))
}

fn decodable_issues<'de, D>(deserializer: D) -> Result<Vec<Issue>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(issue) => Some(issue),
            Err(err) => {
                tracing::debug!("Skipping undecodable issue: {err}");
                None
            }
        })
        .collect())
}

/// Builds the JQL for open issues assigned to the current user.
///
/// Each excluded key is filtered out both as an issue and as a parent.
pub fn assigned_issues_jql(exclude: &[String]) -> String {
    let clauses: String = exclude
        .iter()
        .map(|key| {
            let key = key.replace('\'', "\\'");
            format!(" AND key != '{key}' AND parent != '{key}'")
        })
        .collect();
    format!("{BASE_JQL}{clauses}")
}

/// Derives epic suggestions from assigned issues, keyed by epic key.
///
/// Issues typed as epics overwrite earlier entries; parents and epic links
/// only fill keys not seen yet. Keys in `exclude` are never suggested.
pub fn epics_from_issues(issues: &[Issue], exclude: &[String]) -> BTreeMap<String, Epic> {
    let excluded = |key: &str| exclude.iter().any(|ex| ex == key);
    let mut epics = BTreeMap::new();

    for issue in issues {
        let (Some(issue_key), Some(fields)) = (
            issue.key.as_deref().filter(|k| !k.is_empty()),
            issue.fields.as_ref(),
        ) else {
            continue;
        };

        let is_epic = fields
            .issuetype
            .as_ref()
            .and_then(|t| t.name.as_deref())
            .is_some_and(|name| name.eq_ignore_ascii_case("epic"));
        if is_epic && !excluded(issue_key) {
            epics.insert(
                issue_key.to_string(),
                Epic {
                    key: issue_key.to_string(),
                    summary: fields.summary.clone().unwrap_or_default(),
                    kind: EpicKind::Epic,
                },
            );
        }

        if let Some(parent) = fields.parent.as_ref() {
            if let Some(key) = parent.key.as_deref().filter(|k| !k.is_empty() && !excluded(k)) {
                epics.entry(key.to_string()).or_insert_with(|| Epic {
                    key: key.to_string(),
                    summary: parent
                        .fields
                        .as_ref()
                        .and_then(|f| f.summary.clone())
                        .filter(|s| !s.is_empty())
                        .unwrap_or_else(|| NO_SUMMARY.to_string()),
                    kind: EpicKind::Parent,
                });
            }
        }

        if let Some(key) = fields.epic_link.as_deref().filter(|k| !k.is_empty() && !excluded(k)) {
            epics.entry(key.to_string()).or_insert_with(|| Epic {
                key: key.to_string(),
                summary: format!("Epic: {key}"),
                kind: EpicKind::EpicLink,
            });
        }
    }

    epics
}
