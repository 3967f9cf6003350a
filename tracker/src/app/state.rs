//! Application state management

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::app::options::LedgerOptions;
use crate::fleet::registry::FleetRegistry;
use crate::ledger::{seed_deployments, DeploymentLedger, LifecycleSimulator};
use crate::server::state::ServerState;
use crate::telemetry::source::{DataSource, MockDataSource};

/// Main application state
pub struct AppState {
    /// Managed nodes
    pub registry: Arc<FleetRegistry>,

    /// Deployment history
    pub ledger: Arc<DeploymentLedger>,

    /// Metrics, logs and command execution
    pub source: Arc<dyn DataSource>,

    /// Version deployed when a request names none
    pub default_version: String,
}

impl AppState {
    /// Initialize application state with the demo fleet and seeded history
    pub fn init(options: &LedgerOptions) -> Self {
        info!("Initializing application state...");

        let registry = Arc::new(FleetRegistry::with_defaults());
        let ledger = Arc::new(DeploymentLedger::with_records(
            LifecycleSimulator::new(options.simulation.clone()),
            options.author.clone(),
            seed_deployments(Utc::now()),
        ));
        let source: Arc<dyn DataSource> = Arc::new(MockDataSource::new(registry.node_names()));

        info!(
            "Tracking {} nodes with {} recorded deployments",
            registry.len(),
            ledger.len()
        );

        Self {
            registry,
            ledger,
            source,
            default_version: options.default_version.clone(),
        }
    }

    /// State handed to the HTTP handlers
    pub fn server_state(&self) -> ServerState {
        ServerState::new(
            self.registry.clone(),
            self.ledger.clone(),
            self.source.clone(),
            self.default_version.clone(),
        )
    }

    /// Shutdown application state
    pub fn shutdown(&self) {
        info!("Shutting down application state...");
        let cancelled = self.ledger.shutdown();
        info!("Cancelled {} pending completions", cancelled);
    }
}
