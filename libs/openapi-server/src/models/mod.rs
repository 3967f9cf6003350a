//! Tracker API models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ================================= FLEET ======================================= //

/// Health of a managed node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Healthy,
    Warning,
    Error,
    Offline,
}

/// A managed node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,

    /// Network address
    pub host: String,

    pub status: NodeStatus,

    /// Resource gauges, in percent
    pub cpu: u32,
    pub memory: u32,
    pub disk: u32,

    /// Human readable uptime, e.g. "15d 8h"
    pub uptime: String,

    pub last_check: DateTime<Utc>,
    pub services: Vec<String>,
    pub tags: Vec<String>,
}

// ============================== DEPLOYMENTS ==================================== //

/// Deployment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Running,
    Success,
    Failed,
}

impl DeploymentStatus {
    /// Whether the record has reached its final state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DeploymentStatus::Running)
    }
}

/// A deployment or rollback record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// Time-based, strictly increasing id
    pub id: String,

    pub version: String,
    pub status: DeploymentStatus,

    /// Target node names
    pub servers: Vec<String>,

    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Human readable duration, set on completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    pub commit: String,
    pub author: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub rollback: bool,

    /// Id of the record this one rolls back
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_deployment: Option<String>,
}

/// Deploy request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Node ids or names; every registered node when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<String>>,
}

// =============================== TELEMETRY ===================================== //

/// One synthetic monitoring sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringSample {
    #[serde(rename = "time")]
    pub timestamp: DateTime<Utc>,
    pub cpu: u32,
    pub memory: u32,

    /// Requests per minute
    pub requests: u32,
    pub errors: u32,

    /// Response time in milliseconds
    pub response_time: u32,
}

/// Log severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub level: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,

    /// Originating node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
}

// =============================== COMMANDS ====================================== //

/// Command request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandRequest {
    #[serde(default)]
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,
}

/// Command execution output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOutput {
    pub command: String,
    pub output: String,
}

/// Liveness report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub version: String,
}

// =============================== ENVELOPE ====================================== //

/// Uniform response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,

    // no `default`: it would add a T: Default bound to Deserialize
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl<T> ApiEnvelope<T> {
    /// Successful envelope carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            timestamp: None,
            total: None,
        }
    }

    /// Failed envelope carrying an error message
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
            timestamp: None,
            total: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Unwrap the payload, or the error reported by the server
    pub fn into_result(self) -> Result<T, String> {
        if !self.success {
            return Err(self
                .error
                .unwrap_or_else(|| "request failed without an error message".to_string()));
        }
        self.data
            .ok_or_else(|| "successful response is missing its data".to_string())
    }
}
