//! Logging functionality for latexify
//!
//! This module provides utilities for configuring and working with logging
//! through the `tracing` crate.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log levels supported by latexify.
///
/// These map to the tracing level hierarchy: ERROR, WARN, INFO, DEBUG, TRACE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Error logs only - highest priority messages for critical failures
    Error,
    /// Warning and error logs - indicate potential issues
    Warn,
    /// Info, warning, and error logs - normal operational messages
    Info,
    /// Debug, info, warning, and error logs - detailed information for troubleshooting
    Debug,
    /// Trace, debug, info, warning, and error logs - highly detailed diagnostics
    Trace,
}

impl LogLevel {
    /// Convert to the corresponding tracing level
    fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Initialize logging with a specific log level.
///
/// Typically called once at the start of your application.
///
/// # Environment Variable
///
/// The level can be overridden with the `LATEXIFY_LOG` environment variable:
///
/// ```bash
/// LATEXIFY_LOG=debug cargo run
/// ```
///
/// This takes precedence over the level passed to `init_logging()`.
pub fn init_logging(level: LogLevel) {
    let env_filter = EnvFilter::try_from_env("LATEXIFY_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("latexify={}", level.to_tracing_level())));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(env_filter)
        .init();

    tracing::debug!("latexify logging initialized at level: {:?}", level);
}

/// Initialize logging with a custom environment filter string.
///
/// Allows more granular control over what gets logged, e.g.
/// `"latexify=debug,latexify::backend=trace"`.
pub fn init_logging_with_filter(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("latexify=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(env_filter)
        .init();

    tracing::debug!("latexify logging initialized with custom filter: {}", filter);
}
