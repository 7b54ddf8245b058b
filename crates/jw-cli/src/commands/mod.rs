//! Worklog session steps.

pub mod post;
pub mod prompt;
pub mod report;
