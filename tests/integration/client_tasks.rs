//! Client-side task scenarios: volume caching, backend task counts.

use dockflow_client::client_tasks::{
    docking_task_count, pocket_volume, sample_task_count, ClientTaskError,
};
use dockflow_client::{ComputeCache, Submitter};
use dockflow_core::geometry::{Pocket, Point3};
use dockflow_core::task::ClientTaskKind;

use crate::{cube_pocket, docking_limits, temp_ledger, MockBackend};

#[tokio::test]
async fn volume_is_computed_once_per_pocket() {
    let ledger = temp_ledger();
    let cache = ComputeCache::new();
    let pocket = cube_pocket(1);

    let first = pocket_volume(&cache, &ledger, &pocket).await.unwrap();
    let second = pocket_volume(&cache, &ledger, &pocket).await.unwrap();

    assert!((first - 8.0).abs() < 1e-6, "got {first}");
    assert_eq!(first, second);

    // only the miss wrote a ledger record
    let records = ledger.client_tasks().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, ClientTaskKind::Volume);
    assert_eq!(records[0].pocket_rank, 1);
    assert!((records[0].value.as_f64().unwrap() - 8.0).abs() < 1e-6);
}

#[tokio::test]
async fn distinct_pockets_have_distinct_cache_entries() {
    let ledger = temp_ledger();
    let cache = ComputeCache::new();

    pocket_volume(&cache, &ledger, &cube_pocket(1)).await.unwrap();
    pocket_volume(&cache, &ledger, &cube_pocket(2)).await.unwrap();

    assert_eq!(ledger.client_tasks().unwrap().len(), 2);
}

#[tokio::test]
async fn degenerate_pocket_yields_no_volume_and_no_record() {
    let ledger = temp_ledger();
    let cache = ComputeCache::new();
    let flat = Pocket {
        name: "pocket9".into(),
        rank: 9,
        center: Point3::new(0.0, 0.0, 0.0),
        surface: vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
    };

    let result = pocket_volume(&cache, &ledger, &flat).await;
    assert!(matches!(
        result,
        Err(ClientTaskError::DegeneratePocket { .. })
    ));
    assert!(ledger.client_tasks().unwrap().is_empty());
}

#[tokio::test]
async fn docking_count_filters_by_pocket() {
    let ledger = temp_ledger();
    let mock = MockBackend::new();
    let submitter = Submitter::new(&mock, ledger.clone(), docking_limits());

    submitter
        .submit_docking(&cube_pocket(1), "CCO", 8, "a")
        .await
        .unwrap();
    submitter
        .submit_docking(&cube_pocket(1), "c1ccccc1", 8, "b")
        .await
        .unwrap();
    submitter
        .submit_docking(&cube_pocket(2), "CCO", 8, "c")
        .await
        .unwrap();

    let count = docking_task_count(&mock, &ledger, 1).await.unwrap();
    assert_eq!(count, 2);

    let record = ledger
        .client_tasks()
        .unwrap()
        .into_iter()
        .find(|r| r.kind == ClientTaskKind::DockingTaskCount)
        .unwrap();
    assert_eq!(record.pocket_rank, 1);
    assert_eq!(record.value, serde_json::json!(2));
}

#[tokio::test]
async fn sample_count_is_prediction_wide() {
    let ledger = temp_ledger();
    let mock = MockBackend::new();
    let submitter = Submitter::new(&mock, ledger.clone(), docking_limits());

    submitter.submit_sample(&cube_pocket(1)).await.unwrap();
    submitter.submit_sample(&cube_pocket(2)).await.unwrap();

    let count = sample_task_count(&mock, &ledger).await.unwrap();
    assert_eq!(count, 2);

    let record = ledger
        .client_tasks()
        .unwrap()
        .into_iter()
        .find(|r| r.kind == ClientTaskKind::SampleTaskCount)
        .unwrap();
    assert_eq!(record.pocket_rank, 0);
}
