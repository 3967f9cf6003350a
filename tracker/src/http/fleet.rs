//! Fleet API client

use openapi_server::{HealthReport, Node};

use crate::errors::TrackerError;
use crate::http::client::ApiClient;

impl ApiClient {
    /// List every node in the fleet
    pub async fn list_servers(&self) -> Result<Vec<Node>, TrackerError> {
        self.get("/servers").await
    }

    /// Get a single node by id or name
    pub async fn get_server(&self, id_or_name: &str) -> Result<Node, TrackerError> {
        self.get(&format!("/servers/{}", id_or_name)).await
    }

    /// Liveness probe
    pub async fn health(&self) -> Result<HealthReport, TrackerError> {
        self.get("/health").await
    }
}
