use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use super::{AppError, Result};

pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";

pub fn parse_level(value: &str) -> Level {
    match value.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Installs the global subscriber. Output goes to stderr so command output on
/// stdout stays machine readable.
pub fn init_logging() -> Result<()> {
    let level = std::env::var(LOG_LEVEL_VAR)
        .map(|value| parse_level(&value))
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|error| AppError::Logging(error.to_string()))
}
