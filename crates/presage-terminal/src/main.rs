//! Presage terminal front end.
//!
//! Runs the forecast engine against the console transport and bridges stdin
//! to the event queue: plain lines go to the round feed, `stats:`-prefixed
//! lines to the stats feed, and `/`-prefixed lines become admin commands.

use anyhow::{bail, Context, Result};
use clap::Parser;
use presage_core::EngineConfig;
use presage_effects::ConsoleTransportHandler;
use presage_engine::admin::{AdminCommand, AdminReply};
use presage_engine::runtime::{spawn_engine, EngineHandle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "presage", about = "Suit forecast engine over a round feed")]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log verbosely (same as RUST_LOG=debug).
    #[arg(short, long)]
    verbose: bool,
}

/// What one stdin line means.
#[derive(Debug)]
enum InputLine {
    Round(String),
    Stats(String),
    Admin(AdminCommandLine),
    Quit,
    Empty,
}

/// Admin command lines, parsed before they touch the engine.
#[derive(Debug)]
enum AdminCommandLine {
    Engine(Box<AdminCommand>),
    Unknown(String),
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let config = EngineConfig::from_toml_str(&raw)
        .with_context(|| format!("parsing config file {}", path.display()))?;
    Ok(config)
}

fn classify_line(line: &str) -> InputLine {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return InputLine::Empty;
    }
    if let Some(rest) = trimmed.strip_prefix("stats:") {
        // Stats messages are multiline on the wire; stdin carries them on one
        // line with literal \n separators.
        return InputLine::Stats(rest.trim().replace("\\n", "\n"));
    }
    if let Some(rest) = trimmed.strip_prefix('/') {
        if rest == "quit" || rest == "exit" {
            return InputLine::Quit;
        }
        return InputLine::Admin(parse_admin(rest));
    }
    InputLine::Round(trimmed.replace("\\n", "\n"))
}

fn parse_admin(input: &str) -> AdminCommandLine {
    let mut parts = input.split_whitespace();
    let verb = parts.next().unwrap_or_default();
    let arg = parts.next();
    let command = match (verb, arg) {
        ("status", None) => AdminCommand::Status,
        ("threshold", Some(value)) => match value.parse() {
            Ok(threshold) => AdminCommand::SetMirrorThreshold(threshold),
            Err(_) => return AdminCommandLine::Unknown(input.to_string()),
        },
        ("pause", Some(value)) => {
            let mut cycle = Vec::new();
            for entry in value.split(',') {
                match entry.parse::<u64>() {
                    Ok(secs) => cycle.push(Duration::from_secs(secs)),
                    Err(_) => return AdminCommandLine::Unknown(input.to_string()),
                }
            }
            AdminCommand::SetPauseCycle(cycle)
        }
        ("interval", Some(value)) => match value.parse::<u64>() {
            Ok(minutes) => AdminCommand::SetSummaryInterval(Duration::from_secs(minutes * 60)),
            Err(_) => return AdminCommandLine::Unknown(input.to_string()),
        },
        ("force", None) => AdminCommand::ForceForecast,
        ("clear", None) => AdminCommand::ClearPending,
        ("resume", None) => AdminCommand::ForceResume,
        ("reset", None) => AdminCommand::Reset,
        ("summary", None) => AdminCommand::SendSummary,
        _ => return AdminCommandLine::Unknown(input.to_string()),
    };
    AdminCommandLine::Engine(Box::new(command))
}

async fn run_admin(handle: &EngineHandle, command: AdminCommand) {
    match handle.admin(command).await {
        Ok(AdminReply::Status(report)) => println!("{report}"),
        Ok(AdminReply::Done(text)) => println!("{text}"),
        Err(error) => eprintln!("refused: {error}"),
    }
}

fn print_usage() {
    println!(
        "feed lines:
    <text>              round feed message (\\n for embedded newlines)
    stats:<text>        stats feed message

admin commands:
    /status             engine state snapshot
    /threshold N        set the mirror trip threshold
    /pause S1,S2,...    replace the pause cycle (seconds)
    /interval N         set the summary interval (minutes)
    /force              emit a forecast now
    /clear              release the pending record
    /resume             end an active pause
    /reset              full state reset
    /summary            publish the win/loss summary
    /quit               stop"
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_ref())?;
    config.validate().context("invalid configuration")?;

    let transport = Arc::new(ConsoleTransportHandler::new());
    let (handle, join) = spawn_engine(&config, transport)?;
    print_usage();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        match classify_line(&line) {
            InputLine::Round(text) => {
                if let Err(error) = handle.round_text(text).await {
                    error!(%error, "engine rejected round feed line");
                    break;
                }
            }
            InputLine::Stats(text) => {
                if let Err(error) = handle.stats_text(text).await {
                    error!(%error, "engine rejected stats feed line");
                    break;
                }
            }
            InputLine::Admin(AdminCommandLine::Engine(command)) => {
                run_admin(&handle, *command).await;
            }
            InputLine::Admin(AdminCommandLine::Unknown(input)) => {
                eprintln!("unknown command: /{input}");
            }
            InputLine::Quit => break,
            InputLine::Empty => {}
        }
    }

    handle.shutdown().await.ok();
    if join.await.is_err() {
        bail!("engine loop panicked");
    }
    Ok(())
}
