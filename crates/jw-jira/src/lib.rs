//! Jira REST API integration for the worklogger.
//!
//! Provides:
//! - Worklog submission, one POST per entry
//! - Assigned-issue discovery for epic suggestions

mod discovery;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use jw_core::WorklogResult;

pub use discovery::{
    Issue, IssueFields, IssueType, ParentFields, ParentRef, SEARCH_FIELDS, SEARCH_LIMIT,
    assigned_issues_jql, epics_from_issues,
};

use discovery::{SearchRequest, SearchResponse};

/// Default request timeout for API calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const JSON: &str = "application/json";

/// Jira client errors.
#[derive(Debug, Error)]
pub enum JiraError {
    /// The configured base URL cannot host REST endpoints.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("failed to send request: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an unexpected status.
    #[error("API returned error: HTTP {status} - {body}")]
    Api { status: u16, body: String },
    /// Failed to parse response.
    #[error("failed to parse response: {0}")]
    InvalidResponse(String),
}

/// Unrecognized REST API version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported API version '{0}' (expected 2 or 3)")]
pub struct UnknownApiVersion(pub String);

/// Jira REST API version: 2 for Server/Data Center, 3 for Cloud.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawApiVersion", into = "String")]
pub enum ApiVersion {
    V2,
    #[default]
    V3,
}

impl ApiVersion {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::V2 => "2",
            Self::V3 => "3",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = UnknownApiVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "2" | "v2" => Ok(Self::V2),
            "3" | "v3" => Ok(Self::V3),
            _ => Err(UnknownApiVersion(s.to_string())),
        }
    }
}

/// YAML and environment values may carry the version as a number or a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawApiVersion {
    Number(u64),
    Text(String),
}

impl TryFrom<RawApiVersion> for ApiVersion {
    type Error = UnknownApiVersion;

    fn try_from(raw: RawApiVersion) -> Result<Self, Self::Error> {
        match raw {
            RawApiVersion::Number(n) => n.to_string().parse(),
            RawApiVersion::Text(s) => s.parse(),
        }
    }
}

impl From<ApiVersion> for String {
    fn from(version: ApiVersion) -> Self {
        version.as_str().to_string()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorklogPayload<'a> {
    started: &'a str,
    time_spent_seconds: i64,
}

/// Jira REST client authenticated with an email and API token.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    email: String,
    api_token: String,
    api_version: ApiVersion,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("email", &self.email)
            .field("api_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client for the Jira instance at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute `http(s)` URL or
    /// the HTTP client fails to build.
    pub fn new(
        base_url: &str,
        email: impl Into<String>,
        api_token: impl Into<String>,
        api_version: ApiVersion,
    ) -> Result<Self, JiraError> {
        let base_url = parse_base_url(base_url)?;
        Ok(Self {
            http: build_http(DEFAULT_TIMEOUT)?,
            base_url,
            email: email.into(),
            api_token: api_token.into(),
            api_version,
        })
    }

    /// Replaces the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, JiraError> {
        self.http = build_http(timeout)?;
        Ok(self)
    }

    /// Posts one worklog and classifies the outcome.
    ///
    /// Non-positive durations are skipped without a request. Transport
    /// failures and non-200/201 responses come back as unsuccessful results
    /// rather than errors so callers can continue with the next entry.
    pub async fn submit_worklog(&self, issue: &str, seconds: i64, started: &str) -> WorklogResult {
        if seconds <= 0 {
            return WorklogResult::skipped(issue, seconds);
        }

        let url = self.endpoint(&["issue", issue, "worklog"]);
        let payload = WorklogPayload {
            started,
            time_spent_seconds: seconds,
        };

        tracing::debug!(
            "Posting worklog to {issue} with {seconds} seconds using API v{}",
            self.api_version
        );
        tracing::debug!(
            payload = %serde_json::to_string(&payload).unwrap_or_default(),
            "POST request to: {url}"
        );

        let response = match self.authed(self.http.post(url)).json(&payload).send().await {
            Ok(response) => response,
            Err(err) => {
                let body = if err.is_timeout() {
                    format!("request timed out: {err}")
                } else {
                    format!("failed to send request: {err}")
                };
                return WorklogResult::transport_failure(issue, seconds, body);
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => format!("failed to read response: {err}"),
        };
        let success = matches!(status, StatusCode::OK | StatusCode::CREATED);
        if !success {
            tracing::error!("HTTP {} response: {body}", status.as_u16());
        }

        WorklogResult {
            issue: issue.to_string(),
            seconds,
            success,
            code: status.as_u16(),
            body,
        }
    }

    /// Fetches open issues assigned to the authenticated user.
    pub async fn assigned_issues(&self, exclude: &[String]) -> Result<Vec<Issue>, JiraError> {
        let jql = assigned_issues_jql(exclude);
        let request = match self.api_version {
            ApiVersion::V3 => {
                let url = self.endpoint(&["search", "jql"]);
                tracing::debug!("Fetching issues from API endpoint: {url}");
                self.http.post(url).json(&SearchRequest {
                    jql: &jql,
                    fields: &SEARCH_FIELDS,
                    max_results: SEARCH_LIMIT,
                })
            }
            ApiVersion::V2 => {
                let url = self.endpoint(&["search"]);
                tracing::debug!("Fetching issues from API endpoint: {url}");
                let fields = SEARCH_FIELDS.join(",");
                let limit = SEARCH_LIMIT.to_string();
                self.http.get(url).query(&[
                    ("jql", jql.as_str()),
                    ("fields", fields.as_str()),
                    ("maxResults", limit.as_str()),
                ])
            }
        };

        let response = self.authed(request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(JiraError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: SearchResponse = serde_json::from_str(&body)
            .map_err(|err| JiraError::InvalidResponse(err.to_string()))?;
        tracing::debug!("Found {} issues assigned to current user", payload.issues.len());
        Ok(payload.issues)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.email, Some(&self.api_token))
            .header(ACCEPT, JSON)
    }

    /// Builds `{base}/rest/api/{version}/{segments..}`, escaping each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // parse_base_url rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["rest", "api", self.api_version.as_str()])
                .extend(segments);
        }
        url
    }
}

fn build_http(timeout: Duration) -> Result<reqwest::Client, JiraError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(JiraError::ClientBuild)
}

fn parse_base_url(raw: &str) -> Result<Url, JiraError> {
    let invalid = |reason: &str| JiraError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };
    let url = Url::parse(raw.trim()).map_err(|err| invalid(&err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot have a path"));
    }
    Ok(url)
}
