use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

mod cli;

use cli::op::{Op, OpContext};
use cli::ops::{Create, Get, Health, Init, Serve, Version};

#[derive(Parser, Debug)]
#[command(name = "minibin", version, about = "Paste, save, share")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Base URL of a running minibin service
    #[arg(
        long,
        global = true,
        env = "MINIBIN_REMOTE",
        default_value = "http://localhost:8080"
    )]
    remote: Url,

    /// minibin directory holding config.toml (default: ~/.minibin)
    #[arg(long, global = true, env = "MINIBIN_DIR")]
    config_path: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the minibin directory and config file
    Init(Init),
    /// Run the HTTP service
    Serve(Serve),
    /// Store a new bin
    Create(Create),
    /// Fetch a bin or resolve a short link
    Get(Get),
    /// Check config and service health
    Health(Health),
    /// Print build information
    Version(Version),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let ctx = OpContext::new(&cli.remote, cli.config_path)?;

    match cli.command {
        Command::Init(op) => run(op, &ctx).await,
        Command::Serve(op) => run(op, &ctx).await,
        Command::Create(op) => run(op, &ctx).await,
        Command::Get(op) => run(op, &ctx).await,
        Command::Health(op) => run(op, &ctx).await,
        Command::Version(op) => run(op, &ctx).await,
    }
}

async fn run<O: Op>(op: O, ctx: &OpContext) -> anyhow::Result<()> {
    let output = op.execute(ctx).await?;
    println!("{output}");
    Ok(())
}
