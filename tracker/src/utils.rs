//! Utility functions

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Version information for the tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
    }
}

/// Length of generated commit tokens
pub const COMMIT_TOKEN_LEN: usize = 7;

/// Short lowercase alphanumeric token standing in for a commit hash
pub fn commit_token<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(COMMIT_TOKEN_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

/// Milliseconds since the Unix epoch, never negative
pub fn epoch_millis(at: DateTime<Utc>) -> u64 {
    at.timestamp_millis().max(0) as u64
}
