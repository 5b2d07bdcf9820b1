//! Ledger inspection and maintenance commands.

use anyhow::{Context, Result};

use dockflow_core::config::DockflowConfig;
use dockflow_core::task::{ClientTaskRecord, ServerTaskRecord};

use super::Ctx;

pub fn cmd_tasks(ctx: &Ctx) -> Result<()> {
    let server = ctx.ledger.server_tasks()?;
    let client = ctx.ledger.client_tasks()?;

    println!("═══════════════════════════════════════");
    println!("  Tasks for prediction {}", ctx.prediction_id);
    println!("═══════════════════════════════════════");

    if server.is_empty() {
        println!("  No server tasks.");
    } else {
        println!("  Server tasks:");
        for t in &server {
            print_server_task(t);
        }
    }

    if !client.is_empty() {
        println!();
        println!("  Client tasks:");
        for t in &client {
            print_client_task(t);
        }
    }

    Ok(())
}

fn print_server_task(t: &ServerTaskRecord) {
    println!("  ┌─ {}...", t.identity.short());
    println!("  │  kind    : {}", t.kind.as_path());
    println!("  │  pocket  : {}", t.pocket_rank);
    if !t.display_name.is_empty() {
        println!("  │  name    : {}", t.display_name);
    }
    println!("  │  status  : {:?}", t.status);
    println!("  │  created : {}", t.created_at);
    println!("  └─ result  : {}", if t.result.is_some() { "yes" } else { "no" });
}

fn print_client_task(t: &ClientTaskRecord) {
    println!("  ┌─ {:?}", t.kind);
    if t.pocket_rank > 0 {
        println!("  │  pocket : {}", t.pocket_rank);
    }
    println!("  │  created : {}", t.created_at);
    println!("  └─ value   : {}", t.value);
}

pub fn cmd_remove(ctx: &Ctx, which: &str, created_at: u64) -> Result<()> {
    let removed = match which {
        "server" => ctx.ledger.remove_server(created_at)?,
        "client" => ctx.ledger.remove_client(created_at)?,
        other => anyhow::bail!("expected 'server' or 'client', got {other:?}"),
    };
    if removed {
        println!("Removed {} task created at {}.", which, created_at);
    } else {
        println!("No {} task created at {}.", which, created_at);
    }
    Ok(())
}

pub fn cmd_reset(ctx: &Ctx) -> Result<()> {
    ctx.ledger.reset_client_tasks()?;
    println!("Client tasks cleared for prediction {}.", ctx.prediction_id);
    Ok(())
}

pub fn cmd_config() -> Result<()> {
    let path = DockflowConfig::write_default_if_missing()?;
    let config = DockflowConfig::load()?;
    let text = toml::to_string_pretty(&config).context("failed to render configuration")?;

    println!("# {}", path.display());
    print!("{text}");
    Ok(())
}
