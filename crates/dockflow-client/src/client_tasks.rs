//! Client-side tasks — computed in-process, recorded terminal.
//!
//! Volume is pure geometry and is cached per pocket name, since hull
//! computation over large surfaces is the one expensive client task and
//! pocket geometry never changes within a prediction. The count tasks
//! poll the backend each time: counts move as other clients submit.

use thiserror::Error;
use tracing::info;

use dockflow_core::geometry::{convex_hull_volume, Pocket};
use dockflow_core::task::{ClientTaskKind, ClientTaskRecord, ServerTaskKind};

use crate::backend::{BackendError, TaskBackend};
use crate::compute_cache::ComputeCache;
use crate::ledger::{LedgerError, TaskLedger};

#[derive(Debug, Error)]
pub enum ClientTaskError {
    #[error("pocket {name} has degenerate geometry, no volume")]
    DegeneratePocket { name: String },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Convex-hull volume of a pocket's surface atoms, in Å³. Cached by
/// pocket name; the ledger record is appended only when the value is
/// actually computed.
pub async fn pocket_volume(
    cache: &ComputeCache<f64>,
    ledger: &TaskLedger,
    pocket: &Pocket,
) -> Result<f64, ClientTaskError> {
    let (volume, hit) = cache
        .get_or_compute(&pocket.name, || async {
            convex_hull_volume(&pocket.surface).ok_or(ClientTaskError::DegeneratePocket {
                name: pocket.name.clone(),
            })
        })
        .await?;

    if !hit {
        ledger.append_client(ClientTaskRecord::new(
            pocket.rank,
            ClientTaskKind::Volume,
            serde_json::json!(volume),
        ))?;
        info!(pocket = %pocket.name, volume, "pocket volume computed");
    }
    Ok(volume)
}

/// Number of docking tasks the backend has seen for one pocket, across
/// all clients of this prediction.
pub async fn docking_task_count<B: TaskBackend>(
    backend: &B,
    ledger: &TaskLedger,
    pocket_rank: u32,
) -> Result<usize, ClientTaskError> {
    let views = backend.list_tasks(ServerTaskKind::Docking).await?;
    let count = views
        .iter()
        .filter(|v| v.initial_data.pocket == pocket_rank)
        .count();

    ledger.append_client(ClientTaskRecord::new(
        pocket_rank,
        ClientTaskKind::DockingTaskCount,
        serde_json::json!(count),
    ))?;
    Ok(count)
}

/// Number of sample tasks the backend has seen for the whole
/// prediction. Recorded prediction-wide (pocket rank 0).
pub async fn sample_task_count<B: TaskBackend>(
    backend: &B,
    ledger: &TaskLedger,
) -> Result<usize, ClientTaskError> {
    let views = backend.list_tasks(ServerTaskKind::Sample).await?;
    let count = views.len();

    ledger.append_client(ClientTaskRecord::new(
        0,
        ClientTaskKind::SampleTaskCount,
        serde_json::json!(count),
    ))?;
    Ok(count)
}
