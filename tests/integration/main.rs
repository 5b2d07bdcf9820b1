//! dockflow integration test harness.
//!
//! Scenario tests wire the real submitter, reconciler, and ledger
//! against an in-memory mock backend. Every test gets its own ledger
//! directory under the system temp dir.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dockflow_client::TaskLedger;
use dockflow_core::config::DockingConfig;
use dockflow_core::geometry::{Pocket, Point3};

mod client_tasks;
mod reconcile;

pub use mock::MockBackend;

// ── Harness ───────────────────────────────────────────────────────────────────

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// A fresh ledger in an isolated temp directory.
pub fn temp_ledger() -> Arc<TaskLedger> {
    let id = COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!(
        "dockflow-integration-{}-{}",
        std::process::id(),
        id
    ));
    let _ = std::fs::remove_dir_all(&dir);
    Arc::new(TaskLedger::open(&dir, "2SRC").expect("ledger open"))
}

pub fn docking_limits() -> DockingConfig {
    DockingConfig {
        min_exhaustiveness: 1,
        max_exhaustiveness: 64,
    }
}

/// A pocket whose surface is a 2 Å cube around its center, so its hull
/// volume is exactly 8 Å³.
pub fn cube_pocket(rank: u32) -> Pocket {
    let center = Point3::new(10.0, -4.0, 2.5);
    let mut surface = Vec::new();
    for &x in &[-1.0, 1.0] {
        for &y in &[-1.0, 1.0] {
            for &z in &[-1.0, 1.0] {
                surface.push(Point3::new(center.x + x, center.y + y, center.z + z));
            }
        }
    }
    Pocket {
        name: format!("pocket{rank}"),
        rank,
        center,
        surface,
    }
}
