//! Synchronizer tests against a live facade

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use fleet_tracker::app::options::{LedgerOptions, ServerOptions};
use fleet_tracker::app::state::AppState;
use fleet_tracker::errors::TrackerError;
use fleet_tracker::http::client::ApiClient;
use fleet_tracker::ledger::LifecycleSettings;
use fleet_tracker::server::serve::serve;
use fleet_tracker::sync::syncer::Synchronizer;
use fleet_tracker::workers::poller;
use openapi_server::DeploymentStatus;
use tokio::sync::oneshot;

struct TestServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn start_server() -> TestServer {
    let options = LedgerOptions {
        simulation: LifecycleSettings {
            deploy_delay: Duration::from_millis(50),
            rollback_delay: Duration::from_millis(50),
            ..Default::default()
        },
        ..Default::default()
    };
    let state = AppState::init(&options);
    let server_options = ServerOptions {
        host: "127.0.0.1".to_string(),
        port: 0,
    };

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let (addr, _handle) = serve(&server_options, Arc::new(state.server_state()), async move {
        let _ = shutdown_rx.await;
    })
    .await
    .unwrap();

    TestServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
    }
}

fn create_syncer(addr: SocketAddr) -> Synchronizer<ApiClient> {
    let client = ApiClient::new(&format!("http://{}/api", addr), Duration::from_secs(2)).unwrap();
    Synchronizer::new(Arc::new(client))
}

#[tokio::test]
async fn test_refresh_and_deploy_round_trip() {
    let server = start_server().await;
    let syncer = create_syncer(server.addr);

    syncer.refresh().await.unwrap();
    let snapshot = syncer.snapshot().await;
    assert_eq!(snapshot.nodes.len(), 2);
    assert_eq!(snapshot.deployments.len(), 2);
    assert_eq!(snapshot.monitoring.len(), 24);
    assert_eq!(snapshot.logs.len(), 5);
    assert!(snapshot.error.is_none());

    let record = syncer
        .deploy("v2.0.0", Some(vec!["alijack".to_string()]))
        .await
        .unwrap();
    assert_eq!(record.status, DeploymentStatus::Running);
    assert_eq!(syncer.deployments()[0].id, record.id);

    tokio::time::sleep(Duration::from_millis(300)).await;
    syncer.refresh().await.unwrap();

    let deployments = syncer.deployments();
    assert_eq!(deployments.len(), 3);
    assert_eq!(deployments[0].id, record.id);
    assert_eq!(deployments[0].status, DeploymentStatus::Success);

    let summary = syncer.summary().await;
    assert_eq!(summary.running_deployments, 0);
    assert_eq!(summary.success_rate, 100);
}

#[tokio::test]
async fn test_client_errors_are_classified() {
    let server = start_server().await;
    let syncer = create_syncer(server.addr);

    let err = syncer.rollback("999").await.unwrap_err();
    assert!(matches!(err, TrackerError::NotFound(_)));

    let err = syncer
        .deploy("v2.0.0", Some(vec!["nowhere".to_string()]))
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Validation(_)));

    let output = syncer.execute_command("status", Vec::new()).await.unwrap();
    assert!(output.contains("alijack: ✓ healthy"));
}

#[tokio::test]
async fn test_unreachable_tracker_falls_back() {
    // bind and release a port so nothing is listening on it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let syncer = create_syncer(addr);
    let err = syncer.refresh().await.unwrap_err();
    assert!(matches!(err, TrackerError::Network(_)));

    let snapshot = syncer.snapshot().await;
    assert!(snapshot.error.is_some());
    assert!(!snapshot.loading);
    assert_eq!(snapshot.nodes.len(), 2);
    assert_eq!(snapshot.deployments.len(), 1);
    assert_eq!(snapshot.deployments[0].version, "v1.2.0");
}

#[tokio::test]
async fn test_stalled_tracker_times_out_and_falls_back() {
    // accept connections but never answer them
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let stall = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let client =
        ApiClient::new(&format!("http://{}/api", addr), Duration::from_millis(100)).unwrap();
    let syncer = Synchronizer::new(Arc::new(client));

    let started = std::time::Instant::now();
    let err = syncer.refresh().await.unwrap_err();
    assert!(matches!(err, TrackerError::Network(_)));
    assert!(started.elapsed() < Duration::from_secs(2));

    let snapshot = syncer.snapshot().await;
    assert!(snapshot.error.is_some());
    assert_eq!(snapshot.nodes.len(), 2);
    assert_eq!(snapshot.deployments.len(), 1);

    stall.abort();
}

#[tokio::test]
async fn test_single_resource_lookups() {
    let server = start_server().await;
    let client =
        ApiClient::new(&format!("http://{}/api", server.addr), Duration::from_secs(2)).unwrap();

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "healthy");

    let node = client.get_server("tenjack").await.unwrap();
    assert_eq!(node.name, "tenjack");

    let record = client.get_deployment("1").await.unwrap();
    assert_eq!(record.version, "v1.1.0");

    let err = client.get_deployment("999").await.unwrap_err();
    assert!(matches!(err, TrackerError::NotFound(_)));
}

#[tokio::test]
async fn test_poller_refreshes_until_shutdown() {
    let server = start_server().await;
    let syncer = Arc::new(create_syncer(server.addr));

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let options = poller::Options {
        interval: Duration::from_millis(20),
    };
    let worker_syncer = syncer.clone();
    let handle = tokio::spawn(async move {
        poller::run(
            &options,
            worker_syncer.as_ref(),
            tokio::time::sleep,
            Box::pin(async move {
                let _ = shutdown_rx.await;
            }),
        )
        .await;
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    let _ = shutdown_tx.send(());
    handle.await.unwrap();

    let state = syncer.get_state().await;
    assert!(state.last_synced_at > chrono::DateTime::<chrono::Utc>::MIN_UTC);
    assert_eq!(state.err_streak, 0);
    assert_eq!(state.nodes.len(), 2);
}
