//! Aggregated submission results and the final summary.

use std::io::{self, Write};

use jw_core::{WorklogResult, format_hours_minutes};

/// Response bodies longer than this are cut in the failure listing.
pub const MAX_BODY_CHARS: usize = 500;

/// Successes and failures of a run, in submission order.
#[derive(Debug, Default)]
pub struct Report {
    pub successes: Vec<WorklogResult>,
    pub failures: Vec<WorklogResult>,
}

impl Report {
    pub fn record(&mut self, result: WorklogResult) {
        if result.success {
            self.successes.push(result);
        } else {
            self.failures.push(result);
        }
    }

    /// Seconds logged by successful submissions.
    pub fn total_seconds(&self) -> i64 {
        self.successes.iter().map(|r| r.seconds).sum()
    }

    /// True when nothing failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Writes the end-of-run summary.
pub fn render<W: Write>(writer: &mut W, report: &Report) -> io::Result<()> {
    if !report.successes.is_empty() {
        let total = report.total_seconds();
        writeln!(
            writer,
            "Posted {} worklogs ({}h {}m).",
            report.successes.len(),
            total / 3600,
            (total % 3600) / 60
        )?;
        for success in &report.successes {
            writeln!(
                writer,
                "  - {}: {}",
                success.issue,
                format_hours_minutes(success.seconds)
            )?;
        }
    }

    if !report.failures.is_empty() {
        writeln!(writer, "Some entries failed:")?;
        for failure in &report.failures {
            writeln!(writer, "  - {}: HTTP {}", failure.issue, failure.code)?;
            writeln!(writer, "    {}", failure.truncated_body(MAX_BODY_CHARS))?;
        }
    }

    Ok(())
}
