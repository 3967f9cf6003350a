//! Client state synchronization

use std::sync::Arc;

use chrono::{DateTime, Utc};
use openapi_server::{
    CommandRequest, DeployRequest, DeploymentRecord, LogEntry, MonitoringSample, Node,
};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::cache::deployments::DeploymentCache;
use crate::errors::TrackerError;
use crate::http::api::FleetApiExt;
use crate::sync::fallback::offline_snapshot;
use crate::sync::summary::DashboardSummary;

/// Sync state
#[derive(Debug, Clone)]
pub struct SyncState {
    pub nodes: Vec<Node>,
    pub monitoring: Vec<MonitoringSample>,
    pub logs: Vec<LogEntry>,
    pub loading: bool,
    /// Message of the last failed refresh; cleared by the next successful one
    pub error: Option<String>,
    pub last_attempted_sync_at: DateTime<Utc>,
    pub last_synced_at: DateTime<Utc>,
    pub err_streak: u32,
}

impl Default for SyncState {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            monitoring: Vec::new(),
            logs: Vec::new(),
            loading: false,
            error: None,
            last_attempted_sync_at: DateTime::<Utc>::MIN_UTC,
            last_synced_at: DateTime::<Utc>::MIN_UTC,
            err_streak: 0,
        }
    }
}

/// Point-in-time copy of everything the synchronizer holds
#[derive(Debug, Clone)]
pub struct FleetSnapshot {
    pub nodes: Vec<Node>,
    pub deployments: Vec<DeploymentRecord>,
    pub monitoring: Vec<MonitoringSample>,
    pub logs: Vec<LogEntry>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_synced_at: DateTime<Utc>,
}

/// Keeps a local copy of the fleet state in sync with the tracker API
pub struct Synchronizer<A: FleetApiExt> {
    api: Arc<A>,
    deployments: DeploymentCache,
    state: RwLock<SyncState>,
}

impl<A: FleetApiExt> Synchronizer<A> {
    /// Create a new synchronizer
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            deployments: DeploymentCache::new(),
            state: RwLock::new(SyncState::default()),
        }
    }

    /// Refresh nodes, deployments, monitoring and logs concurrently
    ///
    /// On failure the offline snapshot replaces nodes and deployments, the
    /// error flag is set and the error is returned.
    pub async fn refresh(&self) -> Result<(), TrackerError> {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.last_attempted_sync_at = Utc::now();
        }

        let result = futures::try_join!(
            self.api.list_servers(),
            self.api.list_deployments(),
            self.api.monitoring(),
            self.api.logs(),
        );

        let mut state = self.state.write().await;
        state.loading = false;

        match result {
            Ok((nodes, deployments, monitoring, logs)) => {
                debug!(
                    "Fetched {} nodes, {} deployments, {} samples, {} log entries",
                    nodes.len(),
                    deployments.data.len(),
                    monitoring.len(),
                    logs.len()
                );
                self.deployments
                    .reconcile(deployments.data, deployments.observed_at);
                state.nodes = nodes;
                state.monitoring = monitoring;
                state.logs = logs;
                state.error = None;
                state.err_streak = 0;
                state.last_synced_at = Utc::now();
                info!("Sync completed successfully");
                Ok(())
            }
            Err(e) => {
                state.err_streak += 1;
                error!(
                    "Sync failed (attempt {}), showing offline snapshot: {}",
                    state.err_streak, e
                );

                // stamped as the oldest possible observation so any real listing replaces it
                let snapshot = offline_snapshot(Utc::now());
                state.nodes = snapshot.nodes;
                self.deployments
                    .replace_all(snapshot.deployments, DateTime::<Utc>::MIN_UTC);
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Start a deployment and merge the new record into the local cache
    ///
    /// `servers` of `None` targets the whole fleet.
    pub async fn deploy(
        &self,
        version: &str,
        servers: Option<Vec<String>>,
    ) -> Result<DeploymentRecord, TrackerError> {
        let request = DeployRequest {
            version: Some(version.to_string()),
            servers,
        };
        let observed = self.api.deploy(&request).await?;
        info!(
            "Deployment {} of {} started",
            observed.data.id, observed.data.version
        );
        self.deployments
            .upsert(observed.data.clone(), observed.observed_at);
        Ok(observed.data)
    }

    /// Roll back a deployment and merge the rollback record into the local cache
    pub async fn rollback(&self, id: &str) -> Result<DeploymentRecord, TrackerError> {
        let observed = self.api.rollback(id).await?;
        info!(
            "Rollback {} of deployment {} started",
            observed.data.id, id
        );
        self.deployments
            .upsert(observed.data.clone(), observed.observed_at);
        Ok(observed.data)
    }

    /// Run a command and return its textual output
    pub async fn execute_command(
        &self,
        command: &str,
        args: Vec<String>,
    ) -> Result<String, TrackerError> {
        let request = CommandRequest {
            command: command.to_string(),
            args,
        };
        let output = self.api.execute_command(&request).await?;
        Ok(output.output)
    }

    /// Get sync state
    pub async fn get_state(&self) -> SyncState {
        self.state.read().await.clone()
    }

    /// Cached deployments, newest first
    pub fn deployments(&self) -> Vec<DeploymentRecord> {
        self.deployments.list()
    }

    /// Copy of the whole local state
    pub async fn snapshot(&self) -> FleetSnapshot {
        let state = self.state.read().await;
        FleetSnapshot {
            nodes: state.nodes.clone(),
            deployments: self.deployments.list(),
            monitoring: state.monitoring.clone(),
            logs: state.logs.clone(),
            loading: state.loading,
            error: state.error.clone(),
            last_synced_at: state.last_synced_at,
        }
    }

    /// Dashboard figures over the local state
    pub async fn summary(&self) -> DashboardSummary {
        let state = self.state.read().await;
        DashboardSummary::compute(&state.nodes, &self.deployments.list())
    }
}
