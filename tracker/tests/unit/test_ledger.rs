//! Deployment ledger tests

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use fleet_tracker::errors::TrackerError;
use fleet_tracker::ledger::{
    seed_deployments, DeploymentLedger, LifecycleSettings, LifecycleSimulator,
};
use openapi_server::DeploymentStatus;

fn create_test_ledger() -> Arc<DeploymentLedger> {
    Arc::new(DeploymentLedger::with_records(
        LifecycleSimulator::new(LifecycleSettings::default()),
        "system",
        seed_deployments(Utc::now()),
    ))
}

fn servers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_ids_are_unique_and_increasing() {
    let ledger = create_test_ledger();

    let created: Vec<_> = (0..20)
        .map(|i| ledger.create_deployment(format!("v2.0.{}", i), servers(&["alijack"])))
        .collect();

    let ids: HashSet<String> = ledger
        .list_deployments()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids.len(), 22);

    let numeric: Vec<u64> = created.iter().map(|r| r.id.parse().unwrap()).collect();
    assert!(numeric.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test(start_paused = true)]
async fn test_new_record_starts_running() {
    let ledger = create_test_ledger();
    let record = ledger.create_deployment("v2.0.0", servers(&["alijack"]));

    assert_eq!(record.status, DeploymentStatus::Running);
    assert!(record.completed_at.is_none());
    assert!(record.duration.is_none());
    assert_eq!(record.author, "system");
    assert_eq!(record.commit.len(), 7);
    assert_eq!(ledger.pending_completions(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_record_completes_after_delay() {
    let ledger = create_test_ledger();
    let record = ledger.create_deployment("v2.0.0", servers(&["alijack"]));

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(
        ledger.get_deployment(&record.id).unwrap().status,
        DeploymentStatus::Running
    );

    tokio::time::sleep(Duration::from_secs(2)).await;
    let completed = ledger.get_deployment(&record.id).unwrap();
    assert_eq!(completed.status, DeploymentStatus::Success);
    assert_eq!(completed.duration.as_deref(), Some("2m 15s"));
    assert!(completed.completed_at.unwrap() >= completed.started_at);
    assert_eq!(ledger.pending_completions(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_rollback_of_unknown_id_leaves_ledger_unchanged() {
    let ledger = create_test_ledger();
    let before = ledger.list_deployments();

    let err = ledger.create_rollback("999").unwrap_err();
    assert!(matches!(err, TrackerError::NotFound(_)));

    let after = ledger.list_deployments();
    assert_eq!(before.len(), after.len());
    assert_eq!(
        before.iter().map(|r| &r.id).collect::<Vec<_>>(),
        after.iter().map(|r| &r.id).collect::<Vec<_>>()
    );
}

#[tokio::test(start_paused = true)]
async fn test_rollback_references_source_and_leaves_it_unmodified() {
    let ledger = create_test_ledger();
    let source = ledger.get_deployment("2").unwrap();

    let rollback = ledger.create_rollback("2").unwrap();
    assert!(rollback.rollback);
    assert_eq!(rollback.original_deployment.as_deref(), Some("2"));
    assert_eq!(rollback.version, source.version);
    assert_eq!(rollback.servers, source.servers);
    assert_eq!(rollback.status, DeploymentStatus::Running);

    let after = ledger.get_deployment("2").unwrap();
    assert_eq!(after.status, source.status);
    assert_eq!(after.completed_at, source.completed_at);
    assert_eq!(after.duration, source.duration);

    tokio::time::sleep(Duration::from_secs(5)).await;
    let completed = ledger.get_deployment(&rollback.id).unwrap();
    assert_eq!(completed.status, DeploymentStatus::Success);
    assert_eq!(completed.duration.as_deref(), Some("1m 45s"));
}

#[tokio::test(start_paused = true)]
async fn test_rollback_of_running_record_cancels_its_completion() {
    let ledger = create_test_ledger();
    let deployed = ledger.create_deployment("v2.0.0", servers(&["alijack"]));
    let rollback = ledger.create_rollback(&deployed.id).unwrap();

    let superseded = ledger.get_deployment(&deployed.id).unwrap();
    assert_eq!(superseded.status, DeploymentStatus::Failed);
    assert!(superseded.completed_at.is_some());

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(
        ledger.get_deployment(&deployed.id).unwrap().status,
        DeploymentStatus::Failed
    );
    assert_eq!(
        ledger.get_deployment(&rollback.id).unwrap().status,
        DeploymentStatus::Success
    );
}

#[tokio::test(start_paused = true)]
async fn test_listing_is_newest_first() {
    let ledger = create_test_ledger();
    let first = ledger.create_deployment("v2.0.0", servers(&["alijack"]));
    let second = ledger.create_deployment("v2.0.1", servers(&["tenjack"]));
    let third = ledger.create_rollback(&first.id).unwrap();

    let ids: Vec<String> = ledger
        .list_deployments()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![third.id, second.id, first.id, "2".to_string(), "1".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_completions() {
    let ledger = create_test_ledger();
    let record = ledger.create_deployment("v2.0.0", servers(&["alijack"]));

    assert_eq!(ledger.shutdown(), 1);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(
        ledger.get_deployment(&record.id).unwrap().status,
        DeploymentStatus::Running
    );
}
