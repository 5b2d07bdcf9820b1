//! Reconciliation loop — converge the ledger toward the backend's view.
//!
//! The backend is authoritative for status; the ledger only ever moves
//! forward. Each cycle snapshots the ledger, polls the task list for
//! every kind that still has pending records, and advances matching
//! records. A cycle with nothing pending skips the network entirely.
//!
//! The loop is self-rescheduling: the delay is armed only after a cycle
//! fully settles, so slow cycles never overlap.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use dockflow_core::task::{ServerTaskKind, ServerTaskRecord, TaskStatus};
use dockflow_core::TaskIdentity;

use crate::backend::{BackendError, TaskBackend};
use crate::ledger::{LedgerError, TaskLedger};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(7);

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// What one reconciliation cycle did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// True if every record was already settled and no poll was made.
    pub skipped: bool,
    /// Records whose status moved forward.
    pub advanced: usize,
    /// Results fetched and attached, including late retries.
    pub materialized: usize,
}

pub struct Reconciler<B> {
    backend: B,
    ledger: Arc<TaskLedger>,
    interval: Duration,
}

impl<B: TaskBackend> Reconciler<B> {
    pub fn new(backend: B, ledger: Arc<TaskLedger>, interval: Duration) -> Self {
        Self {
            backend,
            ledger,
            interval,
        }
    }

    /// Run cycles forever. Backend failures are logged and retried on
    /// the next cycle; ledger failures are fatal.
    pub async fn run(&self) -> Result<(), LedgerError> {
        loop {
            match self.cycle().await {
                Ok(report) if !report.skipped => {
                    debug!(
                        advanced = report.advanced,
                        materialized = report.materialized,
                        "reconcile cycle settled"
                    );
                }
                Ok(_) => {}
                Err(ReconcileError::Backend(e)) => {
                    warn!(error = %e, "reconcile cycle aborted, will retry");
                }
                Err(ReconcileError::Ledger(e)) => return Err(e),
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One reconciliation pass over the whole ledger.
    pub async fn cycle(&self) -> Result<CycleReport, ReconcileError> {
        let snapshot = self.ledger.server_tasks()?;
        let pending: Vec<&ServerTaskRecord> =
            snapshot.iter().filter(|r| needs_reconciliation(r)).collect();
        if pending.is_empty() {
            return Ok(CycleReport {
                skipped: true,
                ..CycleReport::default()
            });
        }

        let mut report = CycleReport::default();
        for kind in ServerTaskKind::ALL {
            let records: Vec<&&ServerTaskRecord> =
                pending.iter().filter(|r| r.kind == kind).collect();
            if records.is_empty() {
                continue;
            }

            // A failed poll aborts the whole cycle; nothing is advanced
            // on partial information.
            let views = self.backend.list_tasks(kind).await?;
            let statuses: HashMap<TaskIdentity, TaskStatus> = views
                .iter()
                .map(|v| (TaskIdentity::from_hash(v.initial_data.hash.as_str()), v.status))
                .collect();

            for record in records {
                // Late materialization: a successful record whose result
                // fetch failed earlier gets another chance each cycle.
                if record.status == TaskStatus::Successful && record.result.is_none() {
                    if let Some(result) = self.fetch_result_logged(kind, record).await {
                        if self.ledger.attach_result(&record.identity, result)? {
                            report.materialized += 1;
                        }
                    }
                    continue;
                }

                let Some(&backend_status) = statuses.get(&record.identity) else {
                    // Unknown to the backend: submission may still be in
                    // flight, or the POST was lost. Leave the record be.
                    continue;
                };
                if !record.status.can_advance_to(backend_status) {
                    continue;
                }

                let result = if backend_status == TaskStatus::Successful {
                    self.fetch_result_logged(kind, record).await
                } else {
                    None
                };
                let materialized = result.is_some();
                if self.ledger.advance_status(&record.identity, backend_status, result)? {
                    report.advanced += 1;
                    if materialized {
                        report.materialized += 1;
                    }
                    info!(
                        task = %record.identity.short(),
                        ?kind,
                        status = ?backend_status,
                        "task advanced"
                    );
                }
            }
        }

        Ok(report)
    }

    /// Fetch a result, degrading to `None` on failure. The status
    /// advance still happens; materialization retries next cycle.
    async fn fetch_result_logged(
        &self,
        kind: ServerTaskKind,
        record: &ServerTaskRecord,
    ) -> Option<serde_json::Value> {
        match self.backend.fetch_result(kind, &record.identity).await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(
                    task = %record.identity.short(),
                    ?kind,
                    error = %e,
                    "result fetch failed, will retry"
                );
                None
            }
        }
    }
}

/// A record needs attention until it is terminal with its result (if
/// any) in hand.
fn needs_reconciliation(record: &ServerTaskRecord) -> bool {
    !record.status.is_terminal()
        || (record.status == TaskStatus::Successful && record.result.is_none())
}
