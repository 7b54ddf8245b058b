//! Posting worklogs: discovery, input, parsing, submission, report.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use jw_core::{
    DEFAULT_START_HOUR, DEFAULT_START_MINUTE, Epic, TimeEntry, build_timestamp, default_date_str,
    parse_entries,
};
use jw_jira::{Client, epics_from_issues};

use super::prompt::{self, Answers};
use super::report::{self, Report};
use crate::Config;

/// Values supplied on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostArgs<'a> {
    pub date: Option<&'a str>,
    /// When present the interactive prompt is skipped.
    pub entries: Option<&'a str>,
}

/// Runs one worklogger session and returns the submission report.
///
/// Input problems (bad date, bad duration) fail before any worklog is sent.
/// Submission problems are collected in the report.
pub fn run<R: BufRead, W: Write>(
    input: &mut R,
    writer: &mut W,
    args: PostArgs<'_>,
    config: &Config,
) -> Result<Report> {
    let client = Client::new(
        &config.jira_base_url,
        &config.jira_email,
        &config.jira_api_token,
        config.api_version,
    )
    .context("invalid Jira settings")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to initialize tokio runtime")?;

    let epics = runtime.block_on(suggested_epics(&client, &config.discovery.exclude));

    let answers = match args.entries {
        Some(entries) => {
            tracing::info!("Running in non-interactive mode with provided parameters");
            Answers {
                date: args.date.unwrap_or_default().to_string(),
                entries: entries.to_string(),
            }
        }
        None => prompt::ask(
            input,
            writer,
            &epics,
            &config.defaults.category_aliases,
            &default_date_str(),
        )?,
    };

    let started = build_timestamp(
        &answers.date,
        DEFAULT_START_HOUR,
        DEFAULT_START_MINUTE,
        &config.timezone,
    )
    .context("failed to parse date")?;
    let entries = parse_entries(&answers.entries, &config.defaults.category_aliases)
        .context("failed to parse time entries")?;

    if entries.is_empty() {
        writeln!(writer, "No time entries to post.")?;
        return Ok(Report::default());
    }

    let report = runtime.block_on(submit_entries(&client, &entries, &started));
    report::render(writer, &report)?;
    Ok(report)
}

/// Fetches assigned issues and derives epic suggestions.
///
/// Failures are logged and yield no suggestions.
pub async fn suggested_epics(client: &Client, exclude: &[String]) -> BTreeMap<String, Epic> {
    match client.assigned_issues(exclude).await {
        Ok(issues) => {
            let epics = epics_from_issues(&issues, exclude);
            for epic in epics.values() {
                tracing::debug!(key = %epic.key, kind = %epic.kind, "suggesting epic");
            }
            epics
        }
        Err(err) => {
            tracing::warn!("Failed to load issues: {err}");
            BTreeMap::new()
        }
    }
}

/// Submits entries one at a time, in order, collecting every outcome.
pub async fn submit_entries(client: &Client, entries: &[TimeEntry], started: &str) -> Report {
    let mut report = Report::default();
    for entry in entries {
        let result = client
            .submit_worklog(&entry.issue, entry.seconds, started)
            .await;
        report.record(result);
    }
    report
}
