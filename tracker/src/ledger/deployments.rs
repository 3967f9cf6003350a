//! Deployment ledger
//!
//! Append-only list of deployment and rollback records, newest first. A
//! record is created `running` and receives exactly one terminal transition,
//! applied in place by the lifecycle simulator. Records are never removed.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock, Weak};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use openapi_server::{DeploymentRecord, DeploymentStatus};
use tracing::{debug, info, warn};

use crate::errors::TrackerError;
use crate::ledger::lifecycle::{
    CompletionHandle, CompletionOutcome, CompletionTarget, LifecycleSimulator, RecordKind,
};
use crate::utils::{commit_token, epoch_millis};

struct LedgerEntry {
    record: DeploymentRecord,
    completion: Option<CompletionHandle>,
}

struct LedgerState {
    /// Newest first
    entries: VecDeque<LedgerEntry>,

    /// Last id handed out, ids are strictly increasing
    last_id: u64,
}

impl LedgerState {
    fn next_id(&mut self, now: DateTime<Utc>) -> String {
        let id = epoch_millis(now).max(self.last_id + 1);
        self.last_id = id;
        id.to_string()
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut LedgerEntry> {
        self.entries.iter_mut().find(|e| e.record.id == id)
    }
}

/// In-memory deployment ledger
pub struct DeploymentLedger {
    state: RwLock<LedgerState>,
    simulator: LifecycleSimulator,
    author: String,
}

impl DeploymentLedger {
    /// Create an empty ledger
    pub fn new(simulator: LifecycleSimulator, author: impl Into<String>) -> Self {
        Self::with_records(simulator, author, Vec::new())
    }

    /// Create a ledger holding `records`, given newest first
    ///
    /// Seeded records are stored as-is; any that are still `running` have no
    /// pending completion.
    pub fn with_records(
        simulator: LifecycleSimulator,
        author: impl Into<String>,
        records: Vec<DeploymentRecord>,
    ) -> Self {
        let last_id = records
            .iter()
            .filter_map(|r| r.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        let entries = records
            .into_iter()
            .map(|record| LedgerEntry {
                record,
                completion: None,
            })
            .collect();

        Self {
            state: RwLock::new(LedgerState { entries, last_id }),
            simulator,
            author: author.into(),
        }
    }

    /// List every record, newest first
    pub fn list_deployments(&self) -> Vec<DeploymentRecord> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.entries.iter().map(|e| e.record.clone()).collect()
    }

    /// Get a single record
    pub fn get_deployment(&self, id: &str) -> Result<DeploymentRecord, TrackerError> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state
            .entries
            .iter()
            .find(|e| e.record.id == id)
            .map(|e| e.record.clone())
            .ok_or_else(|| TrackerError::NotFound(format!("deployment '{}' not found", id)))
    }

    pub fn len(&self) -> usize {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of records waiting for their completion to fire
    pub fn pending_completions(&self) -> usize {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state
            .entries
            .iter()
            .filter(|e| e.completion.as_ref().is_some_and(|c| !c.is_finished()))
            .count()
    }

    /// Record a new deployment of `version` to `servers` and schedule its completion
    ///
    /// The returned record is still `running`.
    pub fn create_deployment(
        self: &Arc<Self>,
        version: impl Into<String>,
        servers: Vec<String>,
    ) -> DeploymentRecord {
        let now = Utc::now();
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());

        let record = DeploymentRecord {
            id: state.next_id(now),
            version: version.into(),
            status: DeploymentStatus::Running,
            servers,
            started_at: now,
            completed_at: None,
            duration: None,
            commit: commit_token(&mut rand::thread_rng()),
            author: self.author.clone(),
            rollback: false,
            original_deployment: None,
        };

        info!(
            "Deployment {} created: {} -> {:?}",
            record.id, record.version, record.servers
        );
        self.append(&mut state, record.clone(), RecordKind::Deploy);
        record
    }

    /// Record a rollback to the version of `original_id` and schedule its completion
    ///
    /// A rollback of a record that is still running cancels that record's
    /// pending completion and marks it failed. Terminal originals are left
    /// untouched. Unknown ids leave the ledger unchanged.
    pub fn create_rollback(self: &Arc<Self>, original_id: &str) -> Result<DeploymentRecord, TrackerError> {
        let now = Utc::now();
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());

        let original = state.find_mut(original_id).ok_or_else(|| {
            TrackerError::NotFound(format!("deployment '{}' not found", original_id))
        })?;

        if original.record.status == DeploymentStatus::Running {
            if let Some(completion) = original.completion.take() {
                completion.cancel();
            }
            original.record.status = DeploymentStatus::Failed;
            original.record.completed_at = Some(now.max(original.record.started_at));
            info!(
                "Deployment {} superseded by rollback before completing",
                original.record.id
            );
        }

        let (version, servers, commit) = (
            original.record.version.clone(),
            original.record.servers.clone(),
            original.record.commit.clone(),
        );

        let record = DeploymentRecord {
            id: state.next_id(now),
            version,
            status: DeploymentStatus::Running,
            servers,
            started_at: now,
            completed_at: None,
            duration: None,
            commit,
            author: self.author.clone(),
            rollback: true,
            original_deployment: Some(original_id.to_string()),
        };

        info!(
            "Rollback {} created: {} back to {}",
            record.id, original_id, record.version
        );
        self.append(&mut state, record.clone(), RecordKind::Rollback);
        Ok(record)
    }

    /// Cancel every pending completion, returning how many were cancelled
    ///
    /// Affected records stay `running`.
    pub fn shutdown(&self) -> usize {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let mut cancelled = 0;
        for entry in state.entries.iter_mut() {
            if let Some(completion) = entry.completion.take() {
                if !completion.is_finished() {
                    completion.cancel();
                    cancelled += 1;
                }
            }
        }
        if cancelled > 0 {
            warn!(
                "Ledger shut down with {} deployment(s) still running",
                cancelled
            );
        }
        cancelled
    }

    // Registers the completion while the write lock is held, so a zero delay
    // cannot fire before the record is visible.
    fn append(
        self: &Arc<Self>,
        state: &mut LedgerState,
        record: DeploymentRecord,
        kind: RecordKind,
    ) {
        let target: Arc<dyn CompletionTarget> = self.clone();
        let target: Weak<dyn CompletionTarget> = Arc::downgrade(&target);
        let completion = self.simulator.schedule_for(target, record.id.clone(), kind);

        state.entries.push_front(LedgerEntry {
            record,
            completion: Some(completion),
        });
    }
}

impl CompletionTarget for DeploymentLedger {
    fn complete(&self, id: &str, outcome: CompletionOutcome, duration_label: &str) {
        let now = Utc::now();
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());

        let Some(entry) = state.find_mut(id) else {
            warn!("Completion fired for unknown deployment {}", id);
            return;
        };

        entry.completion = None;
        if entry.record.status.is_terminal() {
            debug!("Deployment {} already {:?}, ignoring completion", id, entry.record.status);
            return;
        }

        entry.record.status = match outcome {
            CompletionOutcome::Success => DeploymentStatus::Success,
            CompletionOutcome::Failed => DeploymentStatus::Failed,
        };
        entry.record.completed_at = Some(now.max(entry.record.started_at));
        entry.record.duration = Some(duration_label.to_string());

        info!("Deployment {} finished: {:?}", id, entry.record.status);
    }
}

/// Historical records the demo ledger starts with, newest first
pub fn seed_deployments(now: DateTime<Utc>) -> Vec<DeploymentRecord> {
    vec![
        DeploymentRecord {
            id: "2".to_string(),
            version: "v1.2.0".to_string(),
            status: DeploymentStatus::Success,
            servers: vec!["alijack".to_string(), "tenjack".to_string()],
            started_at: now - ChronoDuration::hours(1),
            completed_at: Some(now - ChronoDuration::hours(1) + ChronoDuration::seconds(90)),
            duration: Some("1m 30s".to_string()),
            commit: "a1b2c3d".to_string(),
            author: "Walson".to_string(),
            rollback: false,
            original_deployment: None,
        },
        DeploymentRecord {
            id: "1".to_string(),
            version: "v1.1.0".to_string(),
            status: DeploymentStatus::Success,
            servers: vec!["alijack".to_string()],
            started_at: now - ChronoDuration::days(1),
            completed_at: Some(now - ChronoDuration::days(1) + ChronoDuration::seconds(50)),
            duration: Some("50s".to_string()),
            commit: "e4f5g6h".to_string(),
            author: "Walson".to_string(),
            rollback: false,
            original_deployment: None,
        },
    ]
}
