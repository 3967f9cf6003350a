//! Data sources backing the telemetry and command endpoints

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use openapi_server::{LogEntry, MonitoringSample, Severity};

use crate::errors::TrackerError;
use crate::telemetry::generate_samples;

/// Source of metrics, logs and command execution
///
/// The facade only talks to this trait, so a source backed by real hosts can
/// replace the mock without touching the handlers.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Hourly metric samples ending now
    fn sample_metrics(&self, count: usize) -> Vec<MonitoringSample>;

    /// Recent log entries, oldest first
    fn recent_logs(&self) -> Vec<LogEntry>;

    /// Run a named operational command and return its textual output
    async fn run_command(&self, command: &str, args: &[String]) -> Result<String, TrackerError>;
}

/// Randomized data source for demos and tests
#[derive(Debug, Clone)]
pub struct MockDataSource {
    node_names: Vec<String>,
}

impl MockDataSource {
    /// `node_names` feeds the canned `status` output
    pub fn new(node_names: Vec<String>) -> Self {
        Self { node_names }
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    fn sample_metrics(&self, count: usize) -> Vec<MonitoringSample> {
        generate_samples(count, Utc::now(), &mut rand::thread_rng())
    }

    fn recent_logs(&self) -> Vec<LogEntry> {
        fixture_logs(Utc::now())
    }

    async fn run_command(&self, command: &str, _args: &[String]) -> Result<String, TrackerError> {
        let output = match command {
            "status" => {
                let mut output = String::from("Server status check complete\n");
                for name in &self.node_names {
                    output.push_str(&format!("{}: ✓ healthy\n", name));
                }
                output
            }
            "deploy" => [
                "Deploying to all servers...",
                "Syncing files... ✓",
                "Installing dependencies... ✓",
                "Restarting services... ✓",
                "Health check... ✓",
                "Deployment complete!",
            ]
            .iter()
            .map(|line| format!("{}\n", line))
            .collect(),
            other => format!("command {} completed", other),
        };
        Ok(output)
    }
}

/// The fixed operational log, timestamped relative to `now`
pub fn fixture_logs(now: DateTime<Utc>) -> Vec<LogEntry> {
    let entry = |id: &str, level, message: &str, ago: Duration, server: &str| LogEntry {
        id: id.to_string(),
        level,
        message: message.to_string(),
        timestamp: now - ago,
        server: Some(server.to_string()),
    };

    vec![
        entry(
            "1",
            Severity::Info,
            "deployment started: v1.2.0",
            Duration::minutes(60),
            "alijack",
        ),
        entry(
            "2",
            Severity::Success,
            "deployment completed successfully",
            Duration::seconds(3500),
            "alijack",
        ),
        entry(
            "3",
            Severity::Info,
            "health check passed",
            Duration::minutes(30),
            "tenjack",
        ),
        entry(
            "4",
            Severity::Warning,
            "CPU usage above 80%",
            Duration::minutes(15),
            "tenjack",
        ),
        entry(
            "5",
            Severity::Info,
            "load balancer configuration updated",
            Duration::minutes(5),
            "alijack",
        ),
    ]
}
