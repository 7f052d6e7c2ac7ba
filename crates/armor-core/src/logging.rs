//! Logging initialization
//!
//! Provides the single initialization point for the tracing subscriber.
//! The logger is the only process-wide state in the tool; everything in the
//! core emits through `tracing` macros and stays agnostic of the sink.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production
    Production,
}

/// Verbosity selected on the command line.
///
/// `Log` is the default operational level and maps to `warn`; `Info` and
/// `Debug` progressively widen the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Log,
    Info,
    Debug,
}

impl LogLevel {
    /// The tracing filter directive for this level.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Log => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Call once at process entry. Subsequent calls are no-ops, so tests may
/// call it freely.
pub fn init(profile: Profile, level: LogLevel) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("armor={}", level.as_filter())));
        match profile {
            Profile::Development => {
                tracing_subscriber::fmt().with_env_filter(filter).init();
            }
            Profile::Production => {
                tracing_subscriber::fmt().json().with_env_filter(filter).init();
            }
        }
    });
}
