//! Telemetry and command API client

use openapi_server::{CommandOutput, CommandRequest, LogEntry, MonitoringSample};

use crate::errors::TrackerError;
use crate::http::client::ApiClient;

impl ApiClient {
    /// Fetch the default window of monitoring samples
    pub async fn monitoring(&self) -> Result<Vec<MonitoringSample>, TrackerError> {
        self.get("/monitoring").await
    }

    /// Fetch recent log entries
    pub async fn logs(&self) -> Result<Vec<LogEntry>, TrackerError> {
        self.get("/logs").await
    }

    /// Run a command against the fleet
    pub async fn execute_command(
        &self,
        request: &CommandRequest,
    ) -> Result<CommandOutput, TrackerError> {
        Ok(self.post_observed("/command", request).await?.data)
    }
}
