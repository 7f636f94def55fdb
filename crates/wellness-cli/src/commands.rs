use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde::Serialize;
use tracing::debug;
use wellness_ledger::{
    reimbursement, CallOutcome, CallResult, LedgerConfig, LedgerEvent, ReplayEngine, Script,
};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Run(args) => cmd_run(args, &cli.format),
        Command::Claim(args) => cmd_claim(args, &cli.format),
        Command::Config(args) => cmd_config(args, &cli.format),
    }
}

// Amounts may exceed u64::MAX, so reports never go through `serde_json::Value`.
#[derive(Serialize)]
struct RunReport<'a> {
    outcomes: &'a [CallOutcome],
    failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<&'a [LedgerEvent]>,
}

#[derive(Serialize)]
struct ClaimReport {
    amount: u128,
    reimbursement: u128,
}

pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<LedgerConfig> {
    match path {
        Some(path) => LedgerConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => {
            debug!("using default configuration");
            Ok(LedgerConfig::default())
        }
    }
}

fn cmd_run(args: RunArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let text = std::fs::read_to_string(&args.script)
        .with_context(|| format!("reading script {}", args.script.display()))?;
    let script = Script::from_json(&text)
        .with_context(|| format!("parsing script {}", args.script.display()))?;

    let result = ReplayEngine::run(&script, config)?;

    match format {
        OutputFormat::Json => {
            let report = RunReport {
                outcomes: &result.outcomes,
                failed: result.failed(),
                events: args.events.then(|| result.ledger.events()),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            for outcome in &result.outcomes {
                print_outcome(outcome);
            }
            if args.events {
                println!("\n{}", "Events:".bold());
                for event in result.ledger.events() {
                    print_event(event);
                }
            }
            let failed = result.failed();
            let total = result.outcomes.len();
            if failed == 0 {
                println!("\n{} {} call(s) succeeded", "✓".green().bold(), total);
            } else {
                println!(
                    "\n{} {} of {} call(s) failed",
                    "✗".red().bold(),
                    failed.to_string().red(),
                    total
                );
            }
        }
    }
    Ok(())
}

fn print_outcome(outcome: &CallOutcome) {
    let prefix = format!("[{}] {}", outcome.index, outcome.op);
    match &outcome.result {
        CallResult::Ok(response) => println!(
            "{} {} {}",
            "✓".green(),
            prefix.bold(),
            response.to_string().cyan()
        ),
        CallResult::Err { kind, message } => println!(
            "{} {} {} {}",
            "✗".red(),
            prefix.bold(),
            kind.to_string().yellow(),
            message
        ),
    }
}

fn print_event(event: &LedgerEvent) {
    println!(
        "  {} {} by {}",
        format!("#{}", event.seq).dimmed(),
        event.kind.to_string().yellow(),
        event.caller.short_id()
    );
}

fn cmd_claim(args: ClaimArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let paid = reimbursement(args.amount);
    match format {
        OutputFormat::Json => {
            let report = ClaimReport {
                amount: args.amount,
                reimbursement: paid,
            };
            println!("{}", serde_json::to_string(&report)?);
        }
        OutputFormat::Text => println!(
            "Claim {} → reimbursement {}",
            args.amount.to_string().bold(),
            paid.to_string().green().bold()
        ),
    }
    Ok(())
}

fn cmd_config(args: ConfigArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    print!("{}", render_config(&config, format)?);
    Ok(())
}

fn render_config(config: &LedgerConfig, format: &OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(config)? + "\n",
        OutputFormat::Text => config.to_toml_string()?,
    })
}
