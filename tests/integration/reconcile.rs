//! Reconciliation scenarios: advancement, materialization, retries.

use std::sync::atomic::Ordering;
use std::time::Duration;

use dockflow_client::{Reconciler, Submitter};
use dockflow_core::task::TaskStatus;
use serde_json::json;

use crate::{cube_pocket, docking_limits, temp_ledger, MockBackend};

fn interval() -> Duration {
    Duration::from_secs(7)
}

#[tokio::test]
async fn cycle_advances_queued_to_running() {
    let ledger = temp_ledger();
    let mock = MockBackend::new();
    let submitter = Submitter::new(&mock, ledger.clone(), docking_limits());
    let reconciler = Reconciler::new(&mock, ledger.clone(), interval());

    let identity = submitter
        .submit_docking(&cube_pocket(1), "CCO", 8, "a")
        .await
        .unwrap();
    mock.set_status(identity.as_str(), TaskStatus::Running);

    let report = reconciler.cycle().await.unwrap();
    assert!(!report.skipped);
    assert_eq!(report.advanced, 1);
    assert_eq!(ledger.server_tasks().unwrap()[0].status, TaskStatus::Running);
}

#[tokio::test]
async fn successful_task_materializes_its_result() {
    let ledger = temp_ledger();
    let mock = MockBackend::new();
    let submitter = Submitter::new(&mock, ledger.clone(), docking_limits());
    let reconciler = Reconciler::new(&mock, ledger.clone(), interval());

    let identity = submitter
        .submit_docking(&cube_pocket(1), "CCO", 8, "a")
        .await
        .unwrap();
    mock.set_status(identity.as_str(), TaskStatus::Successful);
    mock.set_result(identity.as_str(), json!({"poses": [1, 2, 3]}));

    let report = reconciler.cycle().await.unwrap();
    assert_eq!(report.advanced, 1);
    assert_eq!(report.materialized, 1);

    let record = &ledger.server_tasks().unwrap()[0];
    assert_eq!(record.status, TaskStatus::Successful);
    assert_eq!(record.result, Some(json!({"poses": [1, 2, 3]})));
}

#[tokio::test]
async fn settled_ledger_skips_the_network_and_stays_byte_identical() {
    let ledger = temp_ledger();
    let mock = MockBackend::new();
    let submitter = Submitter::new(&mock, ledger.clone(), docking_limits());
    let reconciler = Reconciler::new(&mock, ledger.clone(), interval());

    let identity = submitter
        .submit_docking(&cube_pocket(1), "CCO", 8, "a")
        .await
        .unwrap();
    mock.set_status(identity.as_str(), TaskStatus::Successful);
    mock.set_result(identity.as_str(), json!([42]));
    reconciler.cycle().await.unwrap();

    let before = ledger.server_tasks_bytes().unwrap();
    let calls_before = mock.list_call_count();

    let report = reconciler.cycle().await.unwrap();
    assert!(report.skipped);
    assert_eq!(mock.list_call_count(), calls_before);
    assert_eq!(ledger.server_tasks_bytes().unwrap(), before);
}

#[tokio::test]
async fn terminal_status_never_regresses() {
    let ledger = temp_ledger();
    let mock = MockBackend::new();
    let submitter = Submitter::new(&mock, ledger.clone(), docking_limits());
    let reconciler = Reconciler::new(&mock, ledger.clone(), interval());

    let done = submitter
        .submit_docking(&cube_pocket(1), "CCO", 8, "done")
        .await
        .unwrap();
    mock.set_status(done.as_str(), TaskStatus::Successful);
    mock.set_result(done.as_str(), json!([1]));
    reconciler.cycle().await.unwrap();

    // a second pending task keeps the next cycle polling while the
    // backend now (bogusly) reports the finished task as queued again
    submitter
        .submit_docking(&cube_pocket(2), "CCO", 8, "pending")
        .await
        .unwrap();
    mock.set_status(done.as_str(), TaskStatus::Queued);

    reconciler.cycle().await.unwrap();

    let records = ledger.server_tasks().unwrap();
    let done_record = records.iter().find(|r| r.identity == done).unwrap();
    assert_eq!(done_record.status, TaskStatus::Successful);
    assert!(done_record.result.is_some());
}

#[tokio::test]
async fn list_failure_aborts_the_cycle_without_changes() {
    let ledger = temp_ledger();
    let mock = MockBackend::new();
    let submitter = Submitter::new(&mock, ledger.clone(), docking_limits());
    let reconciler = Reconciler::new(&mock, ledger.clone(), interval());

    let identity = submitter
        .submit_docking(&cube_pocket(1), "CCO", 8, "a")
        .await
        .unwrap();
    mock.set_status(identity.as_str(), TaskStatus::Running);
    mock.fail_lists.store(true, Ordering::SeqCst);

    assert!(reconciler.cycle().await.is_err());
    assert_eq!(ledger.server_tasks().unwrap()[0].status, TaskStatus::Queued);

    // the next cycle converges once the backend recovers
    mock.fail_lists.store(false, Ordering::SeqCst);
    reconciler.cycle().await.unwrap();
    assert_eq!(ledger.server_tasks().unwrap()[0].status, TaskStatus::Running);
}

#[tokio::test]
async fn failed_result_fetch_still_advances_then_retries() {
    let ledger = temp_ledger();
    let mock = MockBackend::new();
    let submitter = Submitter::new(&mock, ledger.clone(), docking_limits());
    let reconciler = Reconciler::new(&mock, ledger.clone(), interval());

    let identity = submitter
        .submit_docking(&cube_pocket(1), "CCO", 8, "a")
        .await
        .unwrap();
    mock.set_status(identity.as_str(), TaskStatus::Successful);
    mock.fail_results.store(true, Ordering::SeqCst);

    let report = reconciler.cycle().await.unwrap();
    assert_eq!(report.advanced, 1);
    assert_eq!(report.materialized, 0);
    let record = &ledger.server_tasks().unwrap()[0];
    assert_eq!(record.status, TaskStatus::Successful);
    assert!(record.result.is_none());

    // result becomes available later
    mock.fail_results.store(false, Ordering::SeqCst);
    mock.set_result(identity.as_str(), json!({"poses": []}));

    let report = reconciler.cycle().await.unwrap();
    assert_eq!(report.advanced, 0);
    assert_eq!(report.materialized, 1);
    assert!(ledger.server_tasks().unwrap()[0].result.is_some());
}

#[tokio::test]
async fn task_unknown_to_backend_stays_queued() {
    let ledger = temp_ledger();
    let mock = MockBackend::new();
    let reconciler = Reconciler::new(&mock, ledger.clone(), interval());

    // record exists locally but the submission never reached the
    // backend
    use dockflow_core::task::{ServerTaskKind, ServerTaskRecord};
    use dockflow_core::compute_identity;
    let params = vec!["CCO".to_string(), "8".to_string()];
    ledger
        .append_server(ServerTaskRecord::new(
            compute_identity(1, &params),
            ServerTaskKind::Docking,
            1,
            "lost".into(),
            params,
        ))
        .unwrap();

    let report = reconciler.cycle().await.unwrap();
    assert!(!report.skipped);
    assert_eq!(report.advanced, 0);
    assert_eq!(ledger.server_tasks().unwrap()[0].status, TaskStatus::Queued);
}
