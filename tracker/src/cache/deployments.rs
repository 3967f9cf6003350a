//! Client-side deployment cache
//!
//! One entry per record id. Every write carries the time the data was
//! observed and an older observation never replaces a newer one, so optimistic
//! writes and periodic refreshes can arrive in any order.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use openapi_server::DeploymentRecord;
use tracing::debug;

/// Deployment cache entry
#[derive(Debug, Clone)]
pub struct CachedDeployment {
    pub record: DeploymentRecord,
    pub observed_at: DateTime<Utc>,
}

/// In-memory deployment cache keyed by record id
#[derive(Default)]
pub struct DeploymentCache {
    entries: RwLock<HashMap<String, CachedDeployment>>,
}

impl DeploymentCache {
    /// Create an empty deployment cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a record from cache
    pub fn get(&self, id: &str) -> Option<CachedDeployment> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(id).cloned()
    }

    /// Insert or update a record
    ///
    /// Returns false when the cache already holds a newer observation.
    pub fn upsert(&self, record: DeploymentRecord, observed_at: DateTime<Utc>) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Self::upsert_locked(&mut entries, record, observed_at)
    }

    /// Merge a full listing observed at `observed_at`
    ///
    /// Records missing from the listing are dropped unless they were observed
    /// after it (e.g. an optimistic write racing the refresh).
    pub fn reconcile(&self, records: Vec<DeploymentRecord>, observed_at: DateTime<Utc>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());

        let listed: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        for record in records {
            Self::upsert_locked(&mut entries, record, observed_at);
        }

        entries.retain(|id, entry| {
            let keep = listed.contains(id) || entry.observed_at > observed_at;
            if !keep {
                debug!("Dropping deployment {} no longer listed", id);
            }
            keep
        });
    }

    /// Replace the whole cache content
    pub fn replace_all(&self, records: Vec<DeploymentRecord>, observed_at: DateTime<Utc>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.clear();
        for record in records {
            entries.insert(
                record.id.clone(),
                CachedDeployment {
                    record,
                    observed_at,
                },
            );
        }
    }

    /// Every cached record, newest first
    pub fn list(&self) -> Vec<DeploymentRecord> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let mut records: Vec<DeploymentRecord> =
            entries.values().map(|e| e.record.clone()).collect();
        records.sort_by(|a, b| {
            b.started_at
                .cmp(&a.started_at)
                .then_with(|| id_key(&b.id).cmp(&id_key(&a.id)))
        });
        records
    }

    /// Get cache size
    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn upsert_locked(
        entries: &mut HashMap<String, CachedDeployment>,
        record: DeploymentRecord,
        observed_at: DateTime<Utc>,
    ) -> bool {
        if let Some(existing) = entries.get(&record.id) {
            if existing.observed_at > observed_at {
                return false;
            }
        }
        entries.insert(
            record.id.clone(),
            CachedDeployment {
                record,
                observed_at,
            },
        );
        true
    }
}

// numeric ids sort numerically, anything else after them lexically
fn id_key(id: &str) -> (u64, &str) {
    (id.parse::<u64>().unwrap_or(u64::MAX), id)
}
