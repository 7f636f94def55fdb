use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "wellness",
    about = "Wellness Ledger: records, policies, claims and billing",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a call script against a freshly bootstrapped ledger
    Run(RunArgs),
    /// Compute the reimbursement for a claim amount
    Claim(ClaimArgs),
    /// Print the effective configuration (TOML, or JSON with `--format json`)
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// JSON script: `{"deployer": ..., "calls": [{"caller": ..., "request": ...}]}`
    pub script: PathBuf,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Also print the event journal
    #[arg(long)]
    pub events: bool,
}

#[derive(Args)]
pub struct ClaimArgs {
    pub amount: u128,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
