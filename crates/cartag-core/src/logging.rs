//! Logging initialization.
//!
//! Uses the `tracing` ecosystem with either human-readable or JSON output on
//! stderr. Installation uses `try_init`, so an application that already set a
//! global subscriber keeps it.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize the logging subsystem.
///
/// * `verbose` - If true, enables DEBUG level logging; otherwise INFO level.
/// * `json_format` - If true, outputs structured JSON logs.
///
/// The RUST_LOG environment variable overrides the level. Returns false if a
/// global subscriber was already installed.
pub fn init(verbose: bool, json_format: bool) -> bool {
    init_with_level(if verbose { "debug" } else { "info" }, json_format)
}

/// Initialize logging from the `[logging]` config section.
///
/// Unrecognised levels fall back to INFO.
pub fn init_from_config(config: &LoggingConfig) -> bool {
    let level = match config.level.to_ascii_lowercase().as_str() {
        level @ ("error" | "warn" | "info" | "debug" | "trace") => level.to_string(),
        _ => "info".to_string(),
    };
    init_with_level(&level, config.format == "json")
}

fn init_with_level(default_level: &str, json_format: bool) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let installed = if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .try_init()
    };
    installed.is_ok()
}
