//! Command-line argument definitions.

use std::path::PathBuf;
use std::sync::LazyLock;

use clap::{ArgAction, Parser};

const AFTER_HELP: &str = "\
Configuration:
  The tool looks for configuration in the following locations:
  1. The --config flag
  2. Environment variable WORKLOG_CONFIG
  3. Current working directory (worklog_config.yaml)
  4. Executable directory
  5. User's home directory (~/.worklog_config.yaml)
  6. System-wide config (/etc/jira-worklogger/worklog_config.yaml)

Environment Variables:
  JIRA_BASE_URL     Jira instance URL (e.g. https://company.atlassian.net)
  JIRA_EMAIL        Your Jira email address
  JIRA_API_TOKEN    Your Jira API token
  TIMEZONE          Your timezone (e.g. Europe/London)
  JIRA_API_VERSION  API version (2 for Server, 3 for Cloud)
  LOG_LEVEL         Logging verbosity (debug, info, warn, error)

Category Aliases:
  Define shorthand names for issue keys under defaults.category_aliases:

    defaults:
      category_aliases:
        meetings: \"PROJ-123\"
        support: \"PROJ-456\"

  Then log time with: meetings=1h; support=30m; PROJ-789=2h";

/// Version text with build metadata stamped in at compile time through
/// `JW_BUILD_DATE` and `JW_COMMIT`.
static VERSION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{}\nBuild date: {}\nCommit: {}",
        env!("CARGO_PKG_VERSION"),
        option_env!("JW_BUILD_DATE").unwrap_or("unknown"),
        option_env!("JW_COMMIT").unwrap_or("unknown"),
    )
});

/// Command-line tool for posting worklogs to Jira Cloud/Server.
///
/// Without --entries, prompts for a date and time entries, showing epics
/// assigned to you and the configured category aliases.
#[derive(Debug, Parser)]
#[command(
    name = "jira-worklogger",
    version = VERSION.as_str(),
    about,
    long_about = None,
    disable_version_flag = true,
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// Worklog date (YYYY-MM-DD, default: today).
    #[arg(long, value_name = "DATE")]
    pub date: Option<String>,

    /// Time entries, e.g. "meetings=1h;support=30m". Skips the interactive prompt.
    #[arg(long, value_name = "ENTRIES")]
    pub entries: Option<String>,

    /// Path to config file.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print version.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    pub version: Option<bool>,
}

impl Cli {
    /// Entries given on the command line, if any. Blank counts as absent.
    pub fn provided_entries(&self) -> Option<&str> {
        self.entries.as_deref().filter(|e| !e.trim().is_empty())
    }
}
