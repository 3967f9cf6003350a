//! Polling worker for periodic sync

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::http::api::FleetApiExt;
use crate::sync::syncer::Synchronizer;

/// Poller worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Polling interval
    pub interval: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
        }
    }
}

/// Run the poller worker
///
/// Refreshes once right away, then after every `interval` until shutdown.
pub async fn run<A, S, F>(
    options: &Options,
    syncer: &Synchronizer<A>,
    sleep_fn: S,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) where
    A: FleetApiExt,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!("Poller worker starting...");

    loop {
        debug!("Polling for updates...");

        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("Poller worker shutting down...");
                return;
            }
            result = syncer.refresh() => {
                if let Err(e) = result {
                    warn!("Refresh failed, keeping offline snapshot: {}", e);
                }
            }
        }

        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("Poller worker shutting down...");
                return;
            }
            _ = sleep_fn(options.interval) => {}
        }
    }
}
