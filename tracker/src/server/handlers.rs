//! HTTP request handlers
//!
//! Every handler answers with an `ApiEnvelope`; failures go through
//! `TrackerError`'s `IntoResponse`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use chrono::Utc;
use openapi_server::{
    ApiEnvelope, CommandOutput, CommandRequest, DeployRequest, DeploymentRecord, HealthReport,
    LogEntry, MonitoringSample, Node,
};
use serde::{de::DeserializeOwned, Deserialize};

use crate::errors::TrackerError;
use crate::server::state::ServerState;
use crate::telemetry::{DEFAULT_SAMPLE_COUNT, MAX_SAMPLE_COUNT};
use crate::utils::version_info;

type ApiResult<T> = Result<Json<ApiEnvelope<T>>, TrackerError>;

/// Parse an optional JSON body; an empty body yields the defaults
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, TrackerError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| TrackerError::Validation(format!("malformed request body: {}", e)))
}

fn query_or_reject<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, TrackerError> {
    query
        .map(|Query(q)| q)
        .map_err(|e| TrackerError::Validation(e.body_text()))
}

// ================================= HEALTH ====================================== //

/// Health check handler
pub async fn health_handler() -> ApiResult<HealthReport> {
    Ok(Json(
        ApiEnvelope::ok(HealthReport {
            status: "healthy".to_string(),
            version: version_info().version,
        })
        .with_timestamp(Utc::now()),
    ))
}

// ================================= FLEET ======================================= //

/// List servers handler
pub async fn list_servers_handler(State(state): State<Arc<ServerState>>) -> ApiResult<Vec<Node>> {
    let nodes = state.registry.list_nodes();
    let total = nodes.len();
    Ok(Json(
        ApiEnvelope::ok(nodes)
            .with_total(total)
            .with_timestamp(Utc::now()),
    ))
}

/// Single server handler, by id or name
pub async fn get_server_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ApiResult<Node> {
    let node = state.registry.get_node(&id)?;
    Ok(Json(ApiEnvelope::ok(node)))
}

// ============================== DEPLOYMENTS ==================================== //

/// List deployments handler, newest first
pub async fn list_deployments_handler(
    State(state): State<Arc<ServerState>>,
) -> ApiResult<Vec<DeploymentRecord>> {
    let deployments = state.ledger.list_deployments();
    let total = deployments.len();
    Ok(Json(
        ApiEnvelope::ok(deployments)
            .with_total(total)
            .with_timestamp(Utc::now()),
    ))
}

/// Single deployment handler
pub async fn get_deployment_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ApiResult<DeploymentRecord> {
    let record = state.ledger.get_deployment(&id)?;
    Ok(Json(ApiEnvelope::ok(record).with_timestamp(Utc::now())))
}

/// Deploy handler
pub async fn deploy_handler(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> ApiResult<DeploymentRecord> {
    let request: DeployRequest = parse_body(&body)?;

    let version = match request.version {
        Some(version) if version.trim().is_empty() => {
            return Err(TrackerError::Validation(
                "version must not be empty".to_string(),
            ))
        }
        Some(version) => version.trim().to_string(),
        None => state.default_version.clone(),
    };
    let servers = state.registry.resolve_targets(request.servers.as_deref())?;

    let record = state.ledger.create_deployment(version, servers);
    Ok(Json(
        ApiEnvelope::ok(record)
            .with_message("deployment started")
            .with_timestamp(Utc::now()),
    ))
}

/// Rollback handler
pub async fn rollback_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ApiResult<DeploymentRecord> {
    let record = state.ledger.create_rollback(&id)?;
    Ok(Json(
        ApiEnvelope::ok(record)
            .with_message("rollback started")
            .with_timestamp(Utc::now()),
    ))
}

// =============================== TELEMETRY ===================================== //

#[derive(Debug, Deserialize)]
pub struct MonitoringQuery {
    pub count: Option<usize>,
}

/// Monitoring samples handler
pub async fn monitoring_handler(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<MonitoringQuery>, QueryRejection>,
) -> ApiResult<Vec<MonitoringSample>> {
    let query = query_or_reject(query)?;
    let count = query.count.unwrap_or(DEFAULT_SAMPLE_COUNT);
    if count == 0 || count > MAX_SAMPLE_COUNT {
        return Err(TrackerError::Validation(format!(
            "count must be between 1 and {}",
            MAX_SAMPLE_COUNT
        )));
    }

    let samples = state.source.sample_metrics(count);
    Ok(Json(ApiEnvelope::ok(samples).with_timestamp(Utc::now())))
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub server: Option<String>,
}

/// Logs handler, optionally filtered by originating server
pub async fn logs_handler(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<LogsQuery>, QueryRejection>,
) -> ApiResult<Vec<LogEntry>> {
    let query = query_or_reject(query)?;
    let logs: Vec<LogEntry> = state
        .source
        .recent_logs()
        .into_iter()
        .filter(|entry| match &query.server {
            Some(server) => entry.server.as_deref() == Some(server.as_str()),
            None => true,
        })
        .collect();
    let total = logs.len();
    Ok(Json(ApiEnvelope::ok(logs).with_total(total)))
}

// =============================== COMMANDS ====================================== //

/// Command handler
pub async fn command_handler(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> ApiResult<CommandOutput> {
    let request: CommandRequest = parse_body(&body)?;
    let command = request.command.trim();
    if command.is_empty() {
        return Err(TrackerError::Validation("command must not be empty".to_string()));
    }

    let output = state.source.run_command(command, &request.args).await?;
    Ok(Json(
        ApiEnvelope::ok(CommandOutput {
            command: command.to_string(),
            output,
        })
        .with_timestamp(Utc::now()),
    ))
}

/// Fallback for unknown routes
pub async fn fallback_handler() -> TrackerError {
    TrackerError::NotFound("endpoint not found".to_string())
}

/// Fallback for known routes hit with an unsupported method
pub async fn method_not_allowed_handler() -> TrackerError {
    TrackerError::MethodNotAllowed("method not allowed".to_string())
}
