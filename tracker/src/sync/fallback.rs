//! Offline snapshot shown when the tracker API cannot be reached

use chrono::{DateTime, Duration, Utc};
use openapi_server::{DeploymentRecord, DeploymentStatus, Node};

use crate::fleet::registry::default_nodes;

/// Id of the placeholder deployment; never issued by a ledger
pub const OFFLINE_DEPLOYMENT_ID: &str = "offline-1";

/// Nodes and deployments substituted for a failed refresh
#[derive(Debug, Clone)]
pub struct OfflineSnapshot {
    pub nodes: Vec<Node>,
    pub deployments: Vec<DeploymentRecord>,
}

/// Build the offline snapshot as of `now`
pub fn offline_snapshot(now: DateTime<Utc>) -> OfflineSnapshot {
    let last_release = DeploymentRecord {
        id: OFFLINE_DEPLOYMENT_ID.to_string(),
        version: "v1.2.0".to_string(),
        status: DeploymentStatus::Success,
        servers: vec!["alijack".to_string(), "tenjack".to_string()],
        started_at: now - Duration::hours(1),
        completed_at: Some(now),
        duration: Some("1m 30s".to_string()),
        commit: "a1b2c3d".to_string(),
        author: "Walson".to_string(),
        rollback: false,
        original_deployment: None,
    };

    OfflineSnapshot {
        nodes: default_nodes(now),
        deployments: vec![last_release],
    }
}
