//! # parts-monitor
//!
//! Watches the parts-weights sheet and posts a chat message when a value
//! changes. Meant to be triggered on a schedule (cron, CI):
//!
//! - `parts-monitor run` — one fetch/compare/notify/persist pass
//! - `parts-monitor state show|reset` — inspect or drop the stored snapshot
//! - `parts-monitor config check` — validate settings, secrets masked
//!
//! Settings come from the environment (`SPREADSHEET_ID`, `SPACE_WEBHOOK_URL`,
//! ...) optionally layered over a TOML file given with `--config`.

mod commands;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use pm_monitor::MonitorConfig;
use tracing_subscriber::EnvFilter;

/// Parts stock monitor — alert on spreadsheet changes.
#[derive(Parser)]
#[command(name = "parts-monitor", version, about)]
struct Cli {
    /// TOML config file; environment variables override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one monitoring pass.
    Run {
        /// Log the notification instead of posting it.
        #[arg(long)]
        dry_run: bool,
        /// Print the run report as JSON on stdout.
        #[arg(long)]
        json: bool,
    },
    /// Inspect or reset the persisted snapshot.
    State {
        #[command(subcommand)]
        command: commands::state::StateCommands,
    },
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        command: commands::config::ConfigCommands,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);
    let config = resolve_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Run { dry_run, json } => commands::run::execute(&config, *dry_run, *json),
        Commands::State { command } => commands::state::execute(command, &config),
        Commands::Config { command } => commands::config::execute(command, &config),
    }
}

fn init_tracing(json: bool) {
    // Logs go to stderr so `--json` output on stdout stays parseable.
    let filter = filter_from(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref());

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .init();
    }
}

/// RUST_LOG, when set and valid, replaces the defaults entirely.
fn filter_from(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| {
            EnvFilter::new(
                "parts_monitor=info,pm_monitor=info,pm_state=info,pm_snapshot=info,\
                 pm_notify=info,pm_connector_sheets=info",
            )
        })
}

fn resolve_config(path: Option<&Path>) -> anyhow::Result<MonitorConfig> {
    let config = match path {
        Some(path) => {
            MonitorConfig::load(path)?.overlay_env(|key| std::env::var(key).ok())
        }
        None => MonitorConfig::from_env(),
    };
    Ok(config)
}
