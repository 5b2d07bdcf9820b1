//! Task records and lifecycle status.
//!
//! Two task families: server tasks run on the backend job queue and go
//! through the full `Queued → Running → {Successful, Failed}` cycle;
//! client tasks run in-process and are written to the ledger already
//! finished. Wire types for the backend's task list live here too.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::identity::TaskIdentity;

// ── Task kinds ────────────────────────────────────────────────────────────────

/// Server-executed task kinds — the backend job queue runs these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerTaskKind {
    Docking,
    Sample,
}

impl ServerTaskKind {
    pub const ALL: [ServerTaskKind; 2] = [ServerTaskKind::Docking, ServerTaskKind::Sample];

    /// URL path segment for this kind's backend endpoints.
    pub fn as_path(&self) -> &'static str {
        match self {
            ServerTaskKind::Docking => "docking",
            ServerTaskKind::Sample => "sample",
        }
    }
}

/// Client-executed task kinds — computed entirely in this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientTaskKind {
    Volume,
    SampleTaskCount,
    DockingTaskCount,
}

// ── Status ────────────────────────────────────────────────────────────────────

/// Lifecycle status of a server task. Serialized snake_case to match
/// the backend's wire strings ("queued", "successful", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    Running,
    Successful,
    Failed,
}

impl TaskStatus {
    /// Terminal statuses are never mutated again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Successful | TaskStatus::Failed)
    }

    /// Position in the `Queued → Running → terminal` order.
    fn order(&self) -> u8 {
        match self {
            TaskStatus::Queued => 0,
            TaskStatus::Running => 1,
            TaskStatus::Successful | TaskStatus::Failed => 2,
        }
    }

    /// True if moving from `self` to `next` goes strictly forward.
    /// `Queued → Successful` is allowed — the backend may never report
    /// an intermediate `Running`.
    pub fn can_advance_to(&self, next: TaskStatus) -> bool {
        !self.is_terminal() && next.order() > self.order()
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

/// One server task as persisted in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerTaskRecord {
    /// Deduplication key; matched against `initialData.hash` on poll.
    pub identity: TaskIdentity,
    pub kind: ServerTaskKind,
    /// 1-based pocket rank, stable within a session.
    pub pocket_rank: u32,
    /// User-supplied label. Not part of the identity.
    pub display_name: String,
    /// Kind-specific parameters; order matters for the identity.
    pub params: Vec<String>,
    /// Unix ms when the record was created.
    pub created_at: u64,
    pub status: TaskStatus,
    /// Result artifact, present once materialized after success.
    pub result: Option<serde_json::Value>,
}

impl ServerTaskRecord {
    /// A fresh record in `Queued` state, created at submission time.
    pub fn new(
        identity: TaskIdentity,
        kind: ServerTaskKind,
        pocket_rank: u32,
        display_name: String,
        params: Vec<String>,
    ) -> Self {
        Self {
            identity,
            kind,
            pocket_rank,
            display_name,
            params,
            created_at: now_ms(),
            status: TaskStatus::Queued,
            result: None,
        }
    }
}

/// One client task as persisted in the ledger. Created terminal,
/// immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientTaskRecord {
    /// 1-based pocket rank; 0 for prediction-wide tasks.
    pub pocket_rank: u32,
    pub kind: ClientTaskKind,
    /// Unix ms when the computation finished.
    pub created_at: u64,
    pub value: serde_json::Value,
}

impl ClientTaskRecord {
    pub fn new(pocket_rank: u32, kind: ClientTaskKind, value: serde_json::Value) -> Self {
        Self {
            pocket_rank,
            kind,
            created_at: now_ms(),
            value,
        }
    }
}

// ── Backend wire types ────────────────────────────────────────────────────────

/// The backend's view of one task, authoritative for `status`.
/// Matched to local records by `initial_data.hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendTaskView {
    pub status: TaskStatus,
    #[serde(rename = "initialData")]
    pub initial_data: BackendInitialData,
}

/// The submission data the backend echoes back, for matching and
/// independent verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendInitialData {
    pub hash: String,
    pub pocket: u32,
    /// Kind-specific fields (smiles, exhaustiveness, ...).
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// Payload of `GET .../tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<BackendTaskView>,
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
