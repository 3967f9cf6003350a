//! Dashboard summary figures

use openapi_server::{DeploymentRecord, DeploymentStatus, Node, NodeStatus};
use serde::Serialize;

/// Headline figures for the fleet dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub nodes: usize,
    pub healthy_nodes: usize,
    pub running_deployments: usize,
    /// Share of successful deployments, in whole percent
    pub success_rate: u32,
}

impl DashboardSummary {
    pub fn compute(nodes: &[Node], deployments: &[DeploymentRecord]) -> Self {
        let healthy_nodes = nodes
            .iter()
            .filter(|n| n.status == NodeStatus::Healthy)
            .count();
        let running_deployments = deployments
            .iter()
            .filter(|d| d.status == DeploymentStatus::Running)
            .count();
        let succeeded = deployments
            .iter()
            .filter(|d| d.status == DeploymentStatus::Success)
            .count();

        let success_rate = if deployments.is_empty() {
            0
        } else {
            ((succeeded as f64 / deployments.len() as f64) * 100.0).round() as u32
        };

        Self {
            nodes: nodes.len(),
            healthy_nodes,
            running_deployments,
            success_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::registry::default_nodes;
    use crate::ledger::seed_deployments;
    use chrono::Utc;

    #[test]
    fn test_summary_of_empty_ledger() {
        let summary = DashboardSummary::compute(&[], &[]);
        assert_eq!(summary.success_rate, 0);
        assert_eq!(summary.nodes, 0);
    }

    #[test]
    fn test_success_rate_is_rounded() {
        let now = Utc::now();
        let mut deployments = seed_deployments(now);
        let mut running = deployments[0].clone();
        running.id = "3".to_string();
        running.status = DeploymentStatus::Running;
        deployments.insert(0, running);

        let summary = DashboardSummary::compute(&default_nodes(now), &deployments);
        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.healthy_nodes, 2);
        assert_eq!(summary.running_deployments, 1);
        // 2 of 3
        assert_eq!(summary.success_rate, 67);
    }
}
