//! Client-side task commands.

use anyhow::Result;

use dockflow_client::client_tasks;
use dockflow_client::ComputeCache;

use super::{load_pocket, Ctx};

pub async fn cmd_volume(ctx: &Ctx, pockets_path: &str, rank: u32) -> Result<()> {
    let pocket = load_pocket(pockets_path, rank)?;

    // One-shot process: the cache exists for API parity, every call is
    // a miss here.
    let cache = ComputeCache::new();
    let volume = client_tasks::pocket_volume(&cache, &ctx.ledger, &pocket).await?;

    println!("Pocket {} (rank {})", pocket.name, pocket.rank);
    println!("  Volume : {:.1} Å³", volume);

    Ok(())
}

pub async fn cmd_count_docking(ctx: &Ctx, rank: u32) -> Result<()> {
    let count = client_tasks::docking_task_count(&ctx.backend(), &ctx.ledger, rank).await?;
    println!("Docking tasks for pocket {}: {}", rank, count);
    Ok(())
}

pub async fn cmd_count_sample(ctx: &Ctx) -> Result<()> {
    let count = client_tasks::sample_task_count(&ctx.backend(), &ctx.ledger).await?;
    println!("Sample tasks for prediction {}: {}", ctx.prediction_id, count);
    Ok(())
}
