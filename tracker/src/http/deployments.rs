//! Deployment API client

use openapi_server::{DeployRequest, DeploymentRecord};

use crate::errors::TrackerError;
use crate::http::client::{ApiClient, Observed};

impl ApiClient {
    /// List deployments, newest first
    pub async fn list_deployments(&self) -> Result<Observed<Vec<DeploymentRecord>>, TrackerError> {
        self.get_observed("/deployments").await
    }

    /// Get a single deployment record
    pub async fn get_deployment(&self, id: &str) -> Result<DeploymentRecord, TrackerError> {
        self.get(&format!("/deployments/{}", id)).await
    }

    /// Start a deployment
    pub async fn deploy(
        &self,
        request: &DeployRequest,
    ) -> Result<Observed<DeploymentRecord>, TrackerError> {
        self.post_observed("/deploy", request).await
    }

    /// Roll back to the state of an earlier deployment
    pub async fn rollback(&self, id: &str) -> Result<Observed<DeploymentRecord>, TrackerError> {
        self.post_observed(&format!("/rollback/{}", id), &serde_json::json!({}))
            .await
    }
}
