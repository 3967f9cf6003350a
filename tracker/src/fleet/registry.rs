//! Fleet registry
//!
//! A fixed set of managed nodes populated at startup. Reads only.

use chrono::{DateTime, Utc};
use openapi_server::{Node, NodeStatus};

use crate::errors::TrackerError;

/// In-memory node registry
#[derive(Debug, Clone)]
pub struct FleetRegistry {
    nodes: Vec<Node>,
}

impl FleetRegistry {
    /// Create a registry over the given nodes
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Registry populated with the demo fleet
    pub fn with_defaults() -> Self {
        Self::new(default_nodes(Utc::now()))
    }

    /// List every node, in registration order
    pub fn list_nodes(&self) -> Vec<Node> {
        self.nodes.clone()
    }

    /// Look a node up by id or by name
    pub fn get_node(&self, id_or_name: &str) -> Result<Node, TrackerError> {
        self.find(id_or_name)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound(format!("server '{}' not found", id_or_name)))
    }

    /// Names of every registered node
    pub fn node_names(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve deployment targets to canonical node names
    ///
    /// `None` targets the whole fleet. An explicit list must be non-empty and
    /// every entry must match a node id or name.
    pub fn resolve_targets(&self, targets: Option<&[String]>) -> Result<Vec<String>, TrackerError> {
        let Some(targets) = targets else {
            return Ok(self.node_names());
        };

        if targets.is_empty() {
            return Err(TrackerError::Validation(
                "servers must list at least one target".to_string(),
            ));
        }

        let mut resolved: Vec<String> = Vec::with_capacity(targets.len());
        for target in targets {
            let node = self.find(target.trim()).ok_or_else(|| {
                TrackerError::Validation(format!("unknown server '{}'", target))
            })?;
            if !resolved.contains(&node.name) {
                resolved.push(node.name.clone());
            }
        }
        Ok(resolved)
    }

    fn find(&self, id_or_name: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|n| n.id == id_or_name || n.name == id_or_name)
    }
}

/// The demo fleet: one load balancer and one application server
pub fn default_nodes(last_check: DateTime<Utc>) -> Vec<Node> {
    vec![
        Node {
            id: "1".to_string(),
            name: "alijack".to_string(),
            host: "182.92.31.155".to_string(),
            status: NodeStatus::Healthy,
            cpu: 45,
            memory: 68,
            disk: 32,
            uptime: "15d 8h".to_string(),
            last_check,
            services: vec!["demo-service".to_string(), "nginx".to_string()],
            tags: vec!["aliyun".to_string(), "load-balancer".to_string()],
        },
        Node {
            id: "2".to_string(),
            name: "tenjack".to_string(),
            host: "152.136.16.77".to_string(),
            status: NodeStatus::Healthy,
            cpu: 52,
            memory: 72,
            disk: 45,
            uptime: "12d 3h".to_string(),
            last_check,
            services: vec!["demo-service".to_string()],
            tags: vec!["tencent-cloud".to_string(), "app-server".to_string()],
        },
    ]
}
