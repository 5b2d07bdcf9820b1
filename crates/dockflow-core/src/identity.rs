//! Task identity hashing.
//!
//! A task's identity is a BLAKE3 digest over its semantic inputs: the
//! pocket rank followed by the kind-specific parameters, joined with
//! `_`. Both the submission path and the reconciliation path derive
//! identities through this module, so the two agree byte for byte —
//! which is what makes deduplication against the backend work at all.

use serde::{Deserialize, Serialize};

/// Hex-encoded BLAKE3 digest identifying one task.
///
/// The identity is the deduplication key across submission, polling,
/// and result retrieval. It is not a primary key assigned by the
/// backend — the backend echoes it back verbatim in `initialData.hash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskIdentity(String);

impl TaskIdentity {
    /// Wrap an identity string received from the backend.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 16 hex chars, for log output.
    pub fn short(&self) -> &str {
        &self.0[..16.min(self.0.len())]
    }
}

impl std::fmt::Display for TaskIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive a task identity from its ordered semantic inputs.
///
/// Order-sensitive by design: re-ordering parameters yields a
/// different digest and therefore a logically distinct task. The
/// display name a user attaches to a task is never part of the input.
pub fn compute_identity(pocket_rank: u32, params: &[String]) -> TaskIdentity {
    let mut input = pocket_rank.to_string();
    for param in params {
        input.push('_');
        input.push_str(param);
    }
    TaskIdentity(hex::encode(blake3::hash(input.as_bytes()).as_bytes()))
}
