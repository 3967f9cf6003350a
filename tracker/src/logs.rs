//! Logging setup for the tracker and its client modes
//!
//! The configured level applies to this crate and the HTTP middleware;
//! dependencies stay at `warn` unless `RUST_LOG` says otherwise.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::TrackerError;

/// Targets that follow the configured level
const TRACKED_TARGETS: [&str; 3] = ["fleet_tracker", "openapi_server", "tower_http"];

/// Level for everything not in `TRACKED_TARGETS`
const DEPENDENCY_LEVEL: LogLevel = LogLevel::Warn;

/// Verbosity of the tracker's own events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    #[serde(alias = "warning")]
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_lowercase()))
            .map_err(|_| TrackerError::ConfigError(format!("unknown log level '{}'", s)))
    }
}

/// Filter directives used when `RUST_LOG` is unset
///
/// Dependencies are never made noisier than `warn`, but a stricter
/// configured level quiets them too.
pub fn default_directives(level: LogLevel) -> String {
    let base = level.max(DEPENDENCY_LEVEL);
    let mut directives = vec![base.to_string()];
    directives.extend(
        TRACKED_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, level)),
    );
    directives.join(",")
}

/// Logging options
#[derive(Debug, Clone)]
pub struct LogOptions {
    pub log_level: LogLevel,

    /// Write events to stdout; nothing is emitted otherwise
    pub stdout: bool,

    /// Emit one JSON object per event
    pub json_format: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            stdout: true,
            json_format: false,
        }
    }
}

/// Install the global subscriber
///
/// Fails if a subscriber is already installed or the directives do not parse.
pub fn init_logging(options: LogOptions) -> Result<(), TrackerError> {
    if !options.stdout {
        return Ok(());
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(options.log_level))
            .map_err(|e| TrackerError::ConfigError(e.to_string()))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if options.json_format {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };
    result.map_err(|e| TrackerError::ConfigError(e.to_string()))
}
