//! Jira worklogger CLI library.
//!
//! Argument parsing, configuration, logging setup and the posting flow behind
//! the `jira-worklogger` binary.

mod cli;
pub mod commands;
mod config;
pub mod logging;

pub use cli::Cli;
pub use config::{Config, ConfigError, candidate_paths};
