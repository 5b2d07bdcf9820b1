//! dockflow-core — shared types, task identity hashing, and pocket geometry.
//! All other dockflow crates depend on this one.

pub mod config;
pub mod geometry;
pub mod identity;
pub mod task;

pub use identity::{compute_identity, TaskIdentity};
pub use task::{
    ClientTaskKind, ClientTaskRecord, ServerTaskKind, ServerTaskRecord, TaskStatus,
};
