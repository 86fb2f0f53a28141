#![forbid(unsafe_code)]

mod app_menu;
mod config;
mod constants;
mod error;
mod geometry;
mod host;
mod lifecycle;
mod overview;
mod placement;
mod scenario;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{Level as TraceLevel, info, warn};
use tracing_subscriber::FmtSubscriber;

use config::{ConfigStore, SettingsKey, SettingsStore};
use placement::Diagnostic;
use scenario::Scenario;

#[derive(Parser, Debug)]
#[command(version, about = "Multi-monitor panel indicator placement", long_about = None)]
struct Args {
    /// Settings file (defaults to the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a scenario against the in-memory shell and print the layout
    Replay { scenario: PathBuf },
    /// Print the transferable indicators of a scenario's primary panel
    Available { scenario: PathBuf },
    /// Inspect or edit the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the current settings as JSON
    Show,
    /// Print the settings file location
    Path,
    /// Transfer an indicator to a monitor
    SetTransfer { indicator: String, monitor: u32 },
    /// Keep an indicator on the primary panel
    ClearTransfer { indicator: String },
    /// Set any key from a JSON value, e.g. `show-top-panel false`
    Set { key: String, value: String },
}

fn init_logging() -> Result<()> {
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to install tracing subscriber")
}

fn open_store(path: Option<PathBuf>) -> Result<SettingsStore> {
    match path {
        Some(path) => SettingsStore::load_from(path),
        None => SettingsStore::load(),
    }
}

fn parse_key(name: &str) -> Result<SettingsKey> {
    match SettingsKey::ALL.into_iter().find(|k| k.as_str() == name) {
        Some(key) => Ok(key),
        None => {
            let known: Vec<&str> = SettingsKey::ALL.iter().map(|k| k.as_str()).collect();
            bail!("Unknown settings key '{}', expected one of: {}", name, known.join(", "))
        }
    }
}

fn replay(path: PathBuf) -> Result<()> {
    let scenario = Scenario::load(&path)?;
    let replay = scenario.replay()?;
    print!("{}", replay.render());

    let report = replay.coordinator.last_report();
    if report.is_noop() {
        info!("Last pass made no moves");
    }
    for diagnostic in &report.diagnostics {
        match diagnostic {
            Diagnostic::Violation(e) => warn!(error = %e, "Last pass dropped an entry"),
            other => info!(diagnostic = ?other, "Last pass diagnostic"),
        }
    }
    Ok(())
}

fn run_config(action: ConfigAction, path: Option<PathBuf>) -> Result<()> {
    let mut store = open_store(path)?;
    match action {
        ConfigAction::Show => {
            let json =
                serde_json::to_string_pretty(store.settings()).context("Failed to serialize settings to JSON")?;
            println!("{json}");
        }
        ConfigAction::Path => {
            if let Some(path) = store.path() {
                println!("{}", path.display());
            }
        }
        ConfigAction::SetTransfer { indicator, monitor } => {
            store.set_transfer(&indicator, monitor)?;
            info!(iname = %indicator, monitor, "Transfer saved");
        }
        ConfigAction::ClearTransfer { indicator } => {
            if store.clear_transfer(&indicator)? {
                info!(iname = %indicator, "Transfer removed");
            } else {
                warn!(iname = %indicator, "No transfer configured");
            }
        }
        ConfigAction::Set { key, value } => {
            let key = parse_key(&key)?;
            let value: serde_json::Value =
                serde_json::from_str(&value).with_context(|| format!("Value for '{}' is not JSON", key))?;
            store.set_value(key, value)?;
            info!(key = %key, "Setting saved");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging()?;

    match args.command {
        Command::Replay { scenario } => replay(scenario),
        Command::Available { scenario } => {
            let scenario = Scenario::load(&scenario)?;
            for name in scenario.available() {
                println!("{name}");
            }
            Ok(())
        }
        Command::Config { action } => run_config(action, args.config),
    }
}
