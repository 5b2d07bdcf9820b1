//! dockflow-ctl — command-line interface for dockflow predictions.

use anyhow::{Context, Result};

mod cmd;

use cmd::Ctx;

fn print_usage() {
    println!("Usage: dockflow-ctl --prediction <id> [options] <command>");
    println!();
    println!("Commands:");
    println!("  tasks                                  List all ledger tasks for the prediction");
    println!("  submit docking <pockets.json> <rank> <smiles>");
    println!("                                         Submit a docking run against one pocket");
    println!("  submit sample <pockets.json> <rank>    Submit a sample task for one pocket");
    println!("  volume <pockets.json> <rank>           Compute the pocket's convex-hull volume");
    println!("  count docking <rank>                   Count backend docking tasks for a pocket");
    println!("  count sample                           Count backend sample tasks");
    println!("  remove <server|client> <created_at>    Remove one ledger record by its timestamp");
    println!("  reconcile                              Run one reconciliation cycle");
    println!("  watch                                  Run the reconciliation loop until killed");
    println!("  reset                                  Wipe the client task list");
    println!("  config                                 Show the effective configuration");
    println!();
    println!("Options:");
    println!("  --prediction <id>        Prediction identifier (required except for config)");
    println!("  --exhaustiveness <n>     Vina exhaustiveness for docking (default: 32)");
    println!("  --name <label>           Display name for a submitted task");
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    // Parse options
    let mut prediction: Option<String> = None;
    let mut exhaustiveness: u32 = 32;
    let mut name: Option<String> = None;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--prediction" => {
                i += 1;
                prediction = Some(
                    args.get(i)
                        .context("--prediction requires a value")?
                        .clone(),
                );
            }
            "--exhaustiveness" => {
                i += 1;
                exhaustiveness = args
                    .get(i)
                    .context("--exhaustiveness requires a value")?
                    .parse()
                    .context("--exhaustiveness must be a number")?;
            }
            "--name" => {
                i += 1;
                name = Some(args.get(i).context("--name requires a value")?.clone());
            }
            _ => remaining.push(&args[i]),
        }
        i += 1;
    }

    if matches!(remaining.as_slice(), ["config"]) {
        return cmd::cmd_config();
    }
    if matches!(remaining.as_slice(), ["help"] | ["--help"] | ["-h"] | []) {
        print_usage();
        return Ok(());
    }

    let ctx = Ctx::new(prediction.context("--prediction is required")?)?;

    match remaining.as_slice() {
        ["tasks"] => cmd::cmd_tasks(&ctx),
        ["submit", "docking", pockets, rank, smiles] => {
            let rank = parse_rank(rank)?;
            cmd::cmd_submit_docking(&ctx, pockets, rank, smiles, exhaustiveness, name.as_deref())
                .await
        }
        ["submit", "sample", pockets, rank] => {
            let rank = parse_rank(rank)?;
            cmd::cmd_submit_sample(&ctx, pockets, rank).await
        }
        ["volume", pockets, rank] => {
            let rank = parse_rank(rank)?;
            cmd::cmd_volume(&ctx, pockets, rank).await
        }
        ["count", "docking", rank] => cmd::cmd_count_docking(&ctx, parse_rank(rank)?).await,
        ["count", "sample"] => cmd::cmd_count_sample(&ctx).await,
        ["remove", which, created_at] => {
            let created_at = created_at
                .parse()
                .context("creation timestamp must be a number")?;
            cmd::cmd_remove(&ctx, which, created_at)
        }
        ["reconcile"] => cmd::cmd_reconcile(&ctx).await,
        ["watch"] => cmd::cmd_watch(&ctx).await,
        ["reset"] => cmd::cmd_reset(&ctx),
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn parse_rank(raw: &str) -> Result<u32> {
    raw.parse().context("pocket rank must be a number")
}
