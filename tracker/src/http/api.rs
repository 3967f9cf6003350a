//! Client-side seam over the tracker API

use async_trait::async_trait;
use openapi_server::{
    CommandOutput, CommandRequest, DeployRequest, DeploymentRecord, LogEntry, MonitoringSample,
    Node,
};

use crate::errors::TrackerError;
use crate::http::client::{ApiClient, Observed};

/// Tracker API operations used by the synchronizer, as a trait for testability
#[async_trait]
pub trait FleetApiExt: Send + Sync {
    async fn list_servers(&self) -> Result<Vec<Node>, TrackerError>;

    async fn list_deployments(&self) -> Result<Observed<Vec<DeploymentRecord>>, TrackerError>;

    async fn monitoring(&self) -> Result<Vec<MonitoringSample>, TrackerError>;

    async fn logs(&self) -> Result<Vec<LogEntry>, TrackerError>;

    async fn deploy(
        &self,
        request: &DeployRequest,
    ) -> Result<Observed<DeploymentRecord>, TrackerError>;

    async fn rollback(&self, id: &str) -> Result<Observed<DeploymentRecord>, TrackerError>;

    async fn execute_command(
        &self,
        request: &CommandRequest,
    ) -> Result<CommandOutput, TrackerError>;
}

#[async_trait]
impl FleetApiExt for ApiClient {
    async fn list_servers(&self) -> Result<Vec<Node>, TrackerError> {
        ApiClient::list_servers(self).await
    }

    async fn list_deployments(&self) -> Result<Observed<Vec<DeploymentRecord>>, TrackerError> {
        ApiClient::list_deployments(self).await
    }

    async fn monitoring(&self) -> Result<Vec<MonitoringSample>, TrackerError> {
        ApiClient::monitoring(self).await
    }

    async fn logs(&self) -> Result<Vec<LogEntry>, TrackerError> {
        ApiClient::logs(self).await
    }

    async fn deploy(
        &self,
        request: &DeployRequest,
    ) -> Result<Observed<DeploymentRecord>, TrackerError> {
        ApiClient::deploy(self, request).await
    }

    async fn rollback(&self, id: &str) -> Result<Observed<DeploymentRecord>, TrackerError> {
        ApiClient::rollback(self, id).await
    }

    async fn execute_command(
        &self,
        request: &CommandRequest,
    ) -> Result<CommandOutput, TrackerError> {
        ApiClient::execute_command(self, request).await
    }
}
