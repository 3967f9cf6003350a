//! Application configuration options

use std::time::Duration;

use crate::ledger::LifecycleSettings;
use crate::storage::settings::Settings;
use crate::workers::poller;

/// Main application options
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Lifecycle configuration
    pub lifecycle: LifecycleOptions,

    /// Server configuration
    pub server: ServerOptions,

    /// Deployment ledger configuration
    pub ledger: LedgerOptions,

    /// API client configuration
    pub client: ClientOptions,

    /// Poller worker options
    pub poller: poller::Options,
}

impl From<&Settings> for AppOptions {
    fn from(settings: &Settings) -> Self {
        let lifecycle = &settings.lifecycle;
        Self {
            lifecycle: LifecycleOptions::default(),
            server: ServerOptions {
                host: settings.server.host.clone(),
                port: settings.server.port,
            },
            ledger: LedgerOptions {
                simulation: LifecycleSettings {
                    deploy_delay: Duration::from_millis(lifecycle.deploy_delay_ms),
                    rollback_delay: Duration::from_millis(lifecycle.rollback_delay_ms),
                    deploy_duration_label: lifecycle.deploy_duration_label.clone(),
                    rollback_duration_label: lifecycle.rollback_duration_label.clone(),
                    failure_rate: lifecycle.failure_rate,
                },
                default_version: lifecycle.default_version.clone(),
                author: lifecycle.author.clone(),
            },
            client: ClientOptions {
                base_url: settings.client.base_url.clone(),
                request_timeout: Duration::from_secs(settings.client.request_timeout_secs),
            },
            poller: poller::Options {
                interval: Duration::from_secs(settings.client.poll_interval_secs),
            },
        }
    }
}

/// Lifecycle options for the process
#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            max_shutdown_delay: Duration::from_secs(30),
        }
    }
}

/// HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3002,
        }
    }
}

/// Deployment ledger options
#[derive(Debug, Clone)]
pub struct LedgerOptions {
    /// Completion delays, labels and failure rate
    pub simulation: LifecycleSettings,

    /// Version deployed when a request names none
    pub default_version: String,

    /// Author stamped on new records
    pub author: String,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            simulation: LifecycleSettings::default(),
            default_version: "v1.2.1".to_string(),
            author: "system".to_string(),
        }
    }
}

/// API client options
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL for the tracker API
    pub base_url: String,

    /// Outbound request timeout
    pub request_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3002/api".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_settings() {
        let mut settings = Settings::default();
        settings.lifecycle.deploy_delay_ms = 250;
        settings.client.poll_interval_secs = 5;

        let options = AppOptions::from(&settings);
        assert_eq!(options.ledger.simulation.deploy_delay, Duration::from_millis(250));
        assert_eq!(options.ledger.simulation.rollback_delay, Duration::from_secs(4));
        assert_eq!(options.poller.interval, Duration::from_secs(5));
        assert_eq!(options.client.request_timeout, Duration::from_secs(10));
        assert_eq!(options.server.port, 3002);
    }
}
