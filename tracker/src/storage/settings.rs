//! Settings file management

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::TrackerError;
use crate::filesys::file::File;
use crate::logs::LogLevel;

/// Environment variable overriding the server port
pub const PORT_ENV: &str = "PORT";

/// Environment variable overriding the client's API base URL
pub const API_URL_ENV: &str = "TRACKER_API_URL";

/// Tracker settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub log_json: bool,

    /// HTTP facade configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Deployment lifecycle simulation
    #[serde(default)]
    pub lifecycle: LifecycleSettings,

    /// Synchronizer configuration
    #[serde(default)]
    pub client: ClientSettings,
}

impl Settings {
    /// Load settings from `file`
    ///
    /// A missing file yields the defaults only when `required` is false.
    pub async fn load(file: &File, required: bool) -> Result<Self, TrackerError> {
        if !file.exists().await {
            if required {
                return Err(TrackerError::ConfigError(format!(
                    "settings file not found: {}",
                    file.path().display()
                )));
            }
            info!(
                "No settings file at {}, using defaults",
                file.path().display()
            );
            return Ok(Self::default());
        }

        let settings: Settings = file.read_json().await.map_err(|e| {
            TrackerError::ConfigError(format!("{}: {}", file.path().display(), e))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), TrackerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port.trim().parse().map_err(|_| {
                TrackerError::ConfigError(format!("invalid {} value: {}", PORT_ENV, port))
            })?;
        }
        if let Some(url) = lookup(API_URL_ENV) {
            self.client.base_url = url;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        let rate = self.lifecycle.failure_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(TrackerError::ConfigError(format!(
                "lifecycle.failure_rate must be within [0, 1], got {}",
                rate
            )));
        }
        if self.lifecycle.default_version.trim().is_empty() {
            return Err(TrackerError::ConfigError(
                "lifecycle.default_version must not be empty".to_string(),
            ));
        }
        if self.client.poll_interval_secs == 0 {
            return Err(TrackerError::ConfigError(
                "client.poll_interval_secs must be positive".to_string(),
            ));
        }
        if self.client.request_timeout_secs == 0 {
            return Err(TrackerError::ConfigError(
                "client.request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// HTTP facade settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_server_host")]
    pub host: String,

    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    3002
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

/// Lifecycle simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleSettings {
    /// Milliseconds before a deployment completes
    #[serde(default = "default_deploy_delay_ms")]
    pub deploy_delay_ms: u64,

    /// Milliseconds before a rollback completes
    #[serde(default = "default_rollback_delay_ms")]
    pub rollback_delay_ms: u64,

    #[serde(default = "default_deploy_duration_label")]
    pub deploy_duration_label: String,

    #[serde(default = "default_rollback_duration_label")]
    pub rollback_duration_label: String,

    /// Probability that a completion ends in `failed`
    #[serde(default)]
    pub failure_rate: f64,

    /// Version deployed when a request names none
    #[serde(default = "default_version")]
    pub default_version: String,

    /// Author stamped on new records
    #[serde(default = "default_author")]
    pub author: String,
}

fn default_deploy_delay_ms() -> u64 {
    5000
}

fn default_rollback_delay_ms() -> u64 {
    4000
}

fn default_deploy_duration_label() -> String {
    "2m 15s".to_string()
}

fn default_rollback_duration_label() -> String {
    "1m 45s".to_string()
}

fn default_version() -> String {
    "v1.2.1".to_string()
}

fn default_author() -> String {
    "system".to_string()
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            deploy_delay_ms: default_deploy_delay_ms(),
            rollback_delay_ms: default_rollback_delay_ms(),
            deploy_duration_label: default_deploy_duration_label(),
            rollback_duration_label: default_rollback_duration_label(),
            failure_rate: 0.0,
            default_version: default_version(),
            author: default_author(),
        }
    }
}

/// Synchronizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Base URL for the tracker API
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// Polling interval in seconds
    #[serde(default = "default_polling_interval")]
    pub poll_interval_secs: u64,

    /// Outbound request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:3002/api".to_string()
}

fn default_polling_interval() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            poll_interval_secs: default_polling_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}
