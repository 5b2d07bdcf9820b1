//! CLI command modules.

mod client;
mod submit;
mod tasks;
mod watch;

pub use client::{cmd_count_docking, cmd_count_sample, cmd_volume};
pub use submit::{cmd_submit_docking, cmd_submit_sample};
pub use tasks::{cmd_config, cmd_remove, cmd_reset, cmd_tasks};
pub use watch::{cmd_reconcile, cmd_watch};

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use dockflow_client::{HttpBackend, TaskLedger};
use dockflow_core::config::DockflowConfig;
use dockflow_core::geometry::Pocket;

/// Shared command context: effective config plus the prediction's
/// ledger and backend handle.
pub struct Ctx {
    pub config: DockflowConfig,
    pub prediction_id: String,
    pub ledger: Arc<TaskLedger>,
}

impl Ctx {
    pub fn new(prediction_id: String) -> Result<Self> {
        let config = DockflowConfig::load().context("failed to load configuration")?;
        let ledger = Arc::new(
            TaskLedger::open(&config.storage.ledger_dir, &prediction_id)
                .context("failed to open task ledger")?,
        );
        Ok(Self {
            config,
            prediction_id,
            ledger,
        })
    }

    pub fn backend(&self) -> HttpBackend {
        HttpBackend::new(
            &self.config.backend.base_url,
            &self.config.backend.database,
            &self.prediction_id,
        )
    }
}

// ── Pocket files ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PredictionFile {
    pockets: Vec<Pocket>,
}

/// Load one pocket by rank from a prediction JSON export.
pub(crate) fn load_pocket(path: &str, rank: u32) -> Result<Pocket> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read pocket file {path}"))?;
    let file: PredictionFile =
        serde_json::from_str(&text).with_context(|| format!("failed to parse {path}"))?;
    file.pockets
        .into_iter()
        .find(|p| p.rank == rank)
        .with_context(|| format!("no pocket with rank {rank} in {path}"))
}
