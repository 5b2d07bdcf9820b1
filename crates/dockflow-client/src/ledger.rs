//! Durable task ledger — the only client state that survives a restart.
//!
//! One prediction's ledger is two JSON files under the ledger
//! directory, `{id}_serverTasks.json` and `{id}_clientTasks.json`,
//! each an ordered array of records. There is no partial-update
//! primitive: every mutation reads the whole array, edits it, and
//! writes it back while holding the ledger lock. Writes go through a
//! temp file and rename, so a crash never leaves a half-written file
//! behind.
//!
//! Server tasks persist across restarts — they represent backend-owned,
//! possibly still-running work. Client tasks are session-scoped and are
//! wiped via `reset_client_tasks`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use dockflow_core::task::{ClientTaskRecord, ServerTaskRecord, TaskStatus};
use dockflow_core::TaskIdentity;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("corrupt ledger {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Durable, per-prediction task ledger.
pub struct TaskLedger {
    dir: PathBuf,
    prediction_id: String,
    /// Serializes every read-modify-write of the backing files.
    lock: Mutex<()>,
}

impl TaskLedger {
    /// Open (creating the directory if needed) the ledger for one
    /// prediction.
    pub fn open(dir: impl Into<PathBuf>, prediction_id: impl Into<String>) -> Result<Self, LedgerError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| LedgerError::Write {
            path: dir.clone(),
            source: e,
        })?;
        Ok(Self {
            dir,
            prediction_id: prediction_id.into(),
            lock: Mutex::new(()),
        })
    }

    fn server_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}_serverTasks.json", self.prediction_id))
    }

    fn client_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}_clientTasks.json", self.prediction_id))
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    /// All server task records, in append order.
    pub fn server_tasks(&self) -> Result<Vec<ServerTaskRecord>, LedgerError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        read_list(&self.server_path())
    }

    /// All client task records, in append order.
    pub fn client_tasks(&self) -> Result<Vec<ClientTaskRecord>, LedgerError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        read_list(&self.client_path())
    }

    /// Server task records for one pocket.
    pub fn server_tasks_for_pocket(&self, rank: u32) -> Result<Vec<ServerTaskRecord>, LedgerError> {
        Ok(self
            .server_tasks()?
            .into_iter()
            .filter(|r| r.pocket_rank == rank)
            .collect())
    }

    /// Client task records for one pocket.
    pub fn client_tasks_for_pocket(&self, rank: u32) -> Result<Vec<ClientTaskRecord>, LedgerError> {
        Ok(self
            .client_tasks()?
            .into_iter()
            .filter(|r| r.pocket_rank == rank)
            .collect())
    }

    /// True if a non-terminal server task with this identity exists.
    /// Submission consults this to stay idempotent.
    pub fn has_live_task(&self, identity: &TaskIdentity) -> Result<bool, LedgerError> {
        Ok(self
            .server_tasks()?
            .iter()
            .any(|r| &r.identity == identity && !r.status.is_terminal()))
    }

    // ── Writes ────────────────────────────────────────────────────────────────

    /// Append a server task record.
    pub fn append_server(&self, record: ServerTaskRecord) -> Result<(), LedgerError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.server_path();
        let mut records: Vec<ServerTaskRecord> = read_list(&path)?;
        records.push(record);
        write_list(&path, &records)
    }

    /// Append a (terminal) client task record.
    pub fn append_client(&self, record: ClientTaskRecord) -> Result<(), LedgerError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.client_path();
        let mut records: Vec<ClientTaskRecord> = read_list(&path)?;
        records.push(record);
        write_list(&path, &records)
    }

    /// Advance the status of the record matching `identity`, attaching
    /// `result` if given. Strictly monotonic: records already terminal,
    /// and backward transitions, are left untouched. Returns true if a
    /// record changed.
    pub fn advance_status(
        &self,
        identity: &TaskIdentity,
        status: TaskStatus,
        result: Option<serde_json::Value>,
    ) -> Result<bool, LedgerError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.server_path();
        let mut records: Vec<ServerTaskRecord> = read_list(&path)?;
        let Some(record) = records
            .iter_mut()
            .find(|r| &r.identity == identity && r.status.can_advance_to(status))
        else {
            return Ok(false);
        };
        record.status = status;
        if result.is_some() {
            record.result = result;
        }
        write_list(&path, &records)?;
        Ok(true)
    }

    /// Attach a late-fetched result to an already-successful record
    /// that is still missing one. Returns true if a record changed.
    pub fn attach_result(
        &self,
        identity: &TaskIdentity,
        result: serde_json::Value,
    ) -> Result<bool, LedgerError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.server_path();
        let mut records: Vec<ServerTaskRecord> = read_list(&path)?;
        let Some(record) = records.iter_mut().find(|r| {
            &r.identity == identity && r.status == TaskStatus::Successful && r.result.is_none()
        }) else {
            return Ok(false);
        };
        record.result = Some(result);
        write_list(&path, &records)?;
        Ok(true)
    }

    /// Remove one server task record by creation timestamp.
    pub fn remove_server(&self, created_at: u64) -> Result<bool, LedgerError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.server_path();
        let mut records: Vec<ServerTaskRecord> = read_list(&path)?;
        let before = records.len();
        records.retain(|r| r.created_at != created_at);
        if records.len() == before {
            return Ok(false);
        }
        write_list(&path, &records)?;
        Ok(true)
    }

    /// Remove one client task record by creation timestamp.
    pub fn remove_client(&self, created_at: u64) -> Result<bool, LedgerError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.client_path();
        let mut records: Vec<ClientTaskRecord> = read_list(&path)?;
        let before = records.len();
        records.retain(|r| r.created_at != created_at);
        if records.len() == before {
            return Ok(false);
        }
        write_list(&path, &records)?;
        Ok(true)
    }

    /// Wipe the client task list. Called once at the start of a fresh
    /// session; server tasks are deliberately left alone.
    pub fn reset_client_tasks(&self) -> Result<(), LedgerError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        write_list::<ClientTaskRecord>(&self.client_path(), &[])
    }

    /// Raw bytes of the server task file. Empty if it does not exist.
    /// Exposed so tests can assert that no-op cycles leave the ledger
    /// byte-identical.
    pub fn server_tasks_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.server_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        fs::read(&path).map_err(|e| LedgerError::Read { path, source: e })
    }
}

// ── File helpers ──────────────────────────────────────────────────────────────

fn read_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LedgerError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let bytes = fs::read(path).map_err(|e| LedgerError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_slice(&bytes).map_err(|e| LedgerError::Corrupt {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Atomic write: temp file, sync, rename.
fn write_list<T: Serialize>(path: &Path, records: &[T]) -> Result<(), LedgerError> {
    let bytes = serde_json::to_vec(records).map_err(|e| LedgerError::Corrupt {
        path: path.to_path_buf(),
        source: e,
    })?;

    let tmp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&tmp_path).map_err(|e| LedgerError::Write {
            path: tmp_path.clone(),
            source: e,
        })?;
        file.write_all(&bytes).map_err(|e| LedgerError::Write {
            path: tmp_path.clone(),
            source: e,
        })?;
        file.sync_all().map_err(|e| LedgerError::Write {
            path: tmp_path.clone(),
            source: e,
        })?;
    }
    fs::rename(&tmp_path, path).map_err(|e| LedgerError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}
