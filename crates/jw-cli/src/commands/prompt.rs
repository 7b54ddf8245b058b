//! Interactive prompt for the worklog date and time entries.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use jw_core::{CategoryAliases, Epic};

/// Raw answers collected from the user or the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers {
    pub date: String,
    pub entries: String,
}

/// Shows suggestions and asks for the date and the time entries.
///
/// A blank date answer keeps `default_date`. End of input counts as a blank
/// answer.
pub fn ask<R: BufRead, W: Write>(
    input: &mut R,
    writer: &mut W,
    epics: &BTreeMap<String, Epic>,
    aliases: &CategoryAliases,
    default_date: &str,
) -> Result<Answers> {
    writeln!(writer, "=== Jira Worklogger ===")?;

    if !epics.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Suggested Epics (You Are Possibly Working On):")?;
        for (i, epic) in epics.values().enumerate() {
            writeln!(writer, "  {}. {}: {}", i + 1, epic.key, epic.summary)?;
        }
        writeln!(writer)?;
        writeln!(writer, "To log time to an epic, use its key in the time entries field.")?;
    }

    if !aliases.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Available Category Aliases:")?;
        for (alias, key) in aliases.iter() {
            writeln!(writer, "  {alias:<10} -> {key}")?;
        }
    }

    write!(writer, "Date [YYYY-MM-DD] (default {default_date}): ")?;
    writer.flush()?;
    let date = read_answer(input).context("failed to read date")?;

    write!(writer, "Time entries (e.g., meetings=1h; support=30m; PROJ-123=1.5h): ")?;
    writer.flush()?;
    let entries = read_answer(input).context("failed to read time entries")?;

    Ok(Answers {
        date: if date.is_empty() {
            default_date.to_string()
        } else {
            date
        },
        entries,
    })
}

fn read_answer<R: BufRead>(input: &mut R) -> std::io::Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
