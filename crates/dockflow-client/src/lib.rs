//! dockflow-client — the remote-task orchestration layer: identity-keyed
//! submission, the durable task ledger, the reconciliation loop against
//! the backend job queue, result materialization, and client-side
//! compute tasks.

pub mod backend;
pub mod client_tasks;
pub mod compute_cache;
pub mod ledger;
pub mod reconcile;
pub mod submit;

pub use backend::{BackendError, HttpBackend, TaskBackend};
pub use compute_cache::ComputeCache;
pub use ledger::TaskLedger;
pub use reconcile::Reconciler;
pub use submit::Submitter;
