//! Reconciliation commands.

use std::time::Duration;

use anyhow::Result;

use dockflow_client::Reconciler;

use super::Ctx;

pub async fn cmd_reconcile(ctx: &Ctx) -> Result<()> {
    let reconciler = reconciler(ctx);
    let report = reconciler.cycle().await?;

    if report.skipped {
        println!("Nothing pending, no poll made.");
    } else {
        println!("Cycle settled:");
        println!("  Advanced     : {}", report.advanced);
        println!("  Materialized : {}", report.materialized);
    }
    Ok(())
}

pub async fn cmd_watch(ctx: &Ctx) -> Result<()> {
    let reconciler = reconciler(ctx);
    println!(
        "Watching prediction {} every {}s (Ctrl-C to stop)...",
        ctx.prediction_id, ctx.config.reconcile.poll_interval_secs
    );
    reconciler.run().await?;
    Ok(())
}

fn reconciler(ctx: &Ctx) -> Reconciler<dockflow_client::HttpBackend> {
    Reconciler::new(
        ctx.backend(),
        ctx.ledger.clone(),
        Duration::from_secs(ctx.config.reconcile.poll_interval_secs),
    )
}
