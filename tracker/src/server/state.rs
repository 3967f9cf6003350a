//! Server state

use std::sync::Arc;

use crate::fleet::registry::FleetRegistry;
use crate::ledger::DeploymentLedger;
use crate::telemetry::source::DataSource;

/// Server state shared across handlers
pub struct ServerState {
    pub registry: Arc<FleetRegistry>,
    pub ledger: Arc<DeploymentLedger>,
    pub source: Arc<dyn DataSource>,

    /// Version deployed when a request does not name one
    pub default_version: String,
}

impl ServerState {
    pub fn new(
        registry: Arc<FleetRegistry>,
        ledger: Arc<DeploymentLedger>,
        source: Arc<dyn DataSource>,
        default_version: String,
    ) -> Self {
        Self {
            registry,
            ledger,
            source,
            default_version,
        }
    }
}
