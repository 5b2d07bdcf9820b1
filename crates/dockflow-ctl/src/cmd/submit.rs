//! Submission commands.

use anyhow::Result;

use dockflow_client::Submitter;

use super::{load_pocket, Ctx};

pub async fn cmd_submit_docking(
    ctx: &Ctx,
    pockets_path: &str,
    rank: u32,
    smiles: &str,
    exhaustiveness: u32,
    name: Option<&str>,
) -> Result<()> {
    let pocket = load_pocket(pockets_path, rank)?;
    let display_name = name.unwrap_or(smiles);

    let submitter = Submitter::new(ctx.backend(), ctx.ledger.clone(), ctx.config.docking.clone());
    let identity = submitter
        .submit_docking(&pocket, smiles, exhaustiveness, display_name)
        .await?;

    println!("Docking task submitted:");
    println!("  Task            : {}...", identity.short());
    println!("  Pocket          : {} (rank {})", pocket.name, pocket.rank);
    println!("  SMILES          : {}", smiles);
    println!("  Exhaustiveness  : {}", exhaustiveness);

    Ok(())
}

pub async fn cmd_submit_sample(ctx: &Ctx, pockets_path: &str, rank: u32) -> Result<()> {
    let pocket = load_pocket(pockets_path, rank)?;

    let submitter = Submitter::new(ctx.backend(), ctx.ledger.clone(), ctx.config.docking.clone());
    let identity = submitter.submit_sample(&pocket).await?;

    println!("Sample task submitted:");
    println!("  Task   : {}...", identity.short());
    println!("  Pocket : {} (rank {})", pocket.name, pocket.rank);

    Ok(())
}
