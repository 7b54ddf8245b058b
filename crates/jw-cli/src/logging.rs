//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Maps a configured level name to a filter; `None` for unknown names.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warn" | "warning" => Some(LevelFilter::WARN),
        "error" => Some(LevelFilter::ERROR),
        "off" => Some(LevelFilter::OFF),
        _ => None,
    }
}

/// Installs the stderr subscriber at `level`. `RUST_LOG` takes precedence.
pub fn init(level: &str) {
    let parsed = parse_level(level);
    let filter = EnvFilter::builder()
        .with_default_directive(parsed.unwrap_or(LevelFilter::INFO).into())
        .from_env_lossy();

    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if parsed.is_none() {
        tracing::warn!("Invalid log level '{level}', defaulting to 'info'");
    }
}
