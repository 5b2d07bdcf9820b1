//! Task submission — validate, deduplicate, record, post.
//!
//! The ledger append happens before the network call. A lost POST
//! leaves a `queued` record behind that the reconciler will pick up if
//! the backend ever saw the task; the client never double-submits
//! because an identity with a live record is a no-op.

use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use dockflow_core::config::DockingConfig;
use dockflow_core::geometry::{bounding_box, Pocket};
use dockflow_core::task::{ServerTaskKind, ServerTaskRecord};
use dockflow_core::{compute_identity, TaskIdentity};

use crate::backend::{BackendError, TaskBackend};
use crate::ledger::{LedgerError, TaskLedger};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid {kind:?} submission: {reason}")]
    Validation { kind: ServerTaskKind, reason: String },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("submission for task {identity} did not reach the backend: {source}")]
    Backend {
        identity: TaskIdentity,
        source: BackendError,
    },
}

/// Submits server tasks for one prediction.
pub struct Submitter<B> {
    backend: B,
    ledger: Arc<TaskLedger>,
    docking: DockingConfig,
}

impl<B: TaskBackend> Submitter<B> {
    pub fn new(backend: B, ledger: Arc<TaskLedger>, docking: DockingConfig) -> Self {
        Self {
            backend,
            ledger,
            docking,
        }
    }

    /// Submit a docking run against one pocket. Returns the task
    /// identity whether the task was freshly submitted or already live.
    pub async fn submit_docking(
        &self,
        pocket: &Pocket,
        smiles: &str,
        exhaustiveness: u32,
        display_name: &str,
    ) -> Result<TaskIdentity, SubmitError> {
        let smiles = smiles.trim();
        if smiles.is_empty() {
            return Err(SubmitError::Validation {
                kind: ServerTaskKind::Docking,
                reason: "empty SMILES string".into(),
            });
        }
        if smiles.chars().any(char::is_whitespace) {
            return Err(SubmitError::Validation {
                kind: ServerTaskKind::Docking,
                reason: format!("SMILES contains whitespace: {smiles:?}"),
            });
        }
        if exhaustiveness < self.docking.min_exhaustiveness
            || exhaustiveness > self.docking.max_exhaustiveness
        {
            return Err(SubmitError::Validation {
                kind: ServerTaskKind::Docking,
                reason: format!(
                    "exhaustiveness {exhaustiveness} outside {}..={}",
                    self.docking.min_exhaustiveness, self.docking.max_exhaustiveness
                ),
            });
        }

        let params = vec![smiles.to_string(), exhaustiveness.to_string()];
        let identity = compute_identity(pocket.rank, &params);
        let body = json!({
            "hash": identity.as_str(),
            "pocket": pocket.rank,
            "smiles": smiles,
            "exhaustiveness": exhaustiveness,
            "bounding_box": bounding_box(pocket),
        });

        self.submit(ServerTaskKind::Docking, pocket.rank, identity, params, display_name, body)
            .await
    }

    /// Submit a sample task for one pocket. No parameters, so at most
    /// one live sample task can exist per pocket.
    pub async fn submit_sample(&self, pocket: &Pocket) -> Result<TaskIdentity, SubmitError> {
        let identity = compute_identity(pocket.rank, &[]);
        let body = json!({
            "hash": identity.as_str(),
            "pocket": pocket.rank,
        });
        self.submit(
            ServerTaskKind::Sample,
            pocket.rank,
            identity,
            Vec::new(),
            "sample",
            body,
        )
        .await
    }

    async fn submit(
        &self,
        kind: ServerTaskKind,
        pocket_rank: u32,
        identity: TaskIdentity,
        params: Vec<String>,
        display_name: &str,
        body: serde_json::Value,
    ) -> Result<TaskIdentity, SubmitError> {
        if self.ledger.has_live_task(&identity)? {
            debug!(task = %identity.short(), ?kind, "identity already live, skipping submit");
            return Ok(identity);
        }

        self.ledger.append_server(ServerTaskRecord::new(
            identity.clone(),
            kind,
            pocket_rank,
            display_name.to_string(),
            params,
        ))?;
        info!(task = %identity.short(), ?kind, pocket = pocket_rank, "task recorded");

        // The record is not rolled back on failure: it stays queued so
        // the caller can see what was attempted, and the reconciler
        // ignores it since the backend never saw the task.
        if let Err(e) = self.backend.post_task(kind, body).await {
            warn!(task = %identity.short(), error = %e, "task submission failed");
            return Err(SubmitError::Backend {
                identity,
                source: e,
            });
        }

        Ok(identity)
    }
}
