//! Crewbook launcher.
//!
//! Resolves which screen the app opens on (registration or sign-in) and
//! prints it to stdout:
//!
//! ```text
//! main() -> CrewbookConfig::load() -> decide_start_destination(RosterFile, policy)
//!                                              |
//!                                              v
//!                                    "register" | "sign_in"
//! ```
//!
//! The roster lookup is bounded by the configured timeout; a slow or broken
//! roster resolves to the configured fallback instead of an error.

use anyhow::{Result, bail};
use clap::Parser;
use std::{
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};
use tracing_subscriber::{EnvFilter, fmt, fmt::writer::BoxMakeWriter, prelude::*};

use crewbook_config::CrewbookConfig;
use crewbook_core::{RosterFile, StartupPolicy, decide_start_destination};
use crewbook_types::StartDestination;

#[derive(Debug, Parser)]
#[command(name = "crewbook")]
#[command(about = "Resolve the screen Crewbook opens on")]
struct Args {
    /// JSON roster of registered users
    #[arg(long, value_name = "PATH")]
    roster: Option<PathBuf>,
    /// Give up on the roster lookup after this many milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,
    /// Destination when the lookup fails or times out
    #[arg(long, value_name = "DEST", value_parser = parse_destination)]
    fallback: Option<StartDestination>,
    /// Also print what the decision was based on
    #[arg(long)]
    explain: bool,
}

fn parse_destination(raw: &str) -> Result<StartDestination, String> {
    StartDestination::parse(raw).ok_or_else(|| format!("unknown destination: {raw}"))
}

/// Logs go to the first writable `logs/crewbook.log`, else stderr.
/// stdout carries the answer, so nothing is logged there.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let mut warnings = Vec::new();
    let log_file = log_dirs().find_map(|dir| {
        let path = dir.join("logs").join("crewbook.log");
        match open_append(&path) {
            Ok(file) => Some((path, file)),
            Err(e) => {
                warnings.push(format!("Failed to open log file {}: {e}", path.display()));
                None
            }
        }
    });

    let (writer, log_path) = match log_file {
        Some((path, file)) => (BoxMakeWriter::new(Mutex::new(file)), Some(path)),
        None => (BoxMakeWriter::new(io::stderr), None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(log_path.is_none()).with_writer(writer))
        .with(env_filter)
        .init();

    if let Some(path) = log_path {
        tracing::info!(path = %path.display(), "Logging initialized");
    }
    for warning in warnings {
        tracing::warn!("{warning}");
    }
}

fn open_append(path: &Path) -> io::Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// `~/.crewbook`, then `./.crewbook` for constrained environments.
fn log_dirs() -> impl Iterator<Item = PathBuf> {
    crewbook_dir()
        .into_iter()
        .chain(Some(PathBuf::from(".crewbook")))
}

fn crewbook_dir() -> Option<PathBuf> {
    CrewbookConfig::path().and_then(|path| path.parent().map(PathBuf::from))
}

fn resolve_policy(args: &Args, config: Option<&CrewbookConfig>) -> StartupPolicy {
    let mut policy = config.map(CrewbookConfig::startup_policy).unwrap_or_default();
    if let Some(ms) = args.timeout_ms {
        policy.lookup_timeout = Duration::from_millis(ms);
    }
    if let Some(fallback) = args.fallback {
        policy.fallback = fallback;
    }
    policy
}

fn resolve_roster(args: &Args, config: Option<&CrewbookConfig>) -> Option<PathBuf> {
    args.roster
        .clone()
        .or_else(|| config.and_then(CrewbookConfig::roster_path))
        .or_else(|| crewbook_dir().map(|dir| dir.join("users.json")))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing();

    let config = match CrewbookConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %err.path().display(), "Ignoring unusable config: {err}");
            None
        }
    };

    let policy = resolve_policy(&args, config.as_ref());
    let Some(roster_path) = resolve_roster(&args, config.as_ref()) else {
        bail!("no roster path: pass --roster or set [roster] path in the config");
    };
    tracing::debug!(
        roster = %roster_path.display(),
        timeout_ms = policy.lookup_timeout.as_millis(),
        fallback = %policy.fallback,
        "Resolving start destination"
    );

    let decision = decide_start_destination(Arc::new(RosterFile::new(roster_path)), policy).await;

    if args.explain {
        println!("{} ({:?})", decision.destination, decision.basis);
    } else {
        println!("{}", decision.destination);
    }
    Ok(())
}
