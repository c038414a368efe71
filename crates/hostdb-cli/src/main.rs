//! hostdb dynamic inventory
//!
//! Inventory script for the automation engine: `--list` prints every active
//! host grouped by environment, role and region; `--host <HOSTNAME>` prints
//! one host's connection variables. Only JSON goes to stdout; diagnostics go
//! to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgGroup, Parser};
use color_eyre::Result;
use hostdb_inventory::{InventoryProvider, Outcome, PostgresHostSource};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod config;

use config::Config;

/// Dynamic inventory backed by the host database
#[derive(Parser, Debug)]
#[command(name = "hostdb-inventory", version, about, long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["list", "host"])))]
struct Cli {
    /// Print the full inventory
    #[arg(long)]
    list: bool,

    /// Print variables for a single host
    #[arg(long, value_name = "HOSTNAME")]
    host: Option<String>,

    /// Configuration file (defaults to `HOSTDB_CONFIG` or the standard paths)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,
}

/// What the automation engine asked for
#[derive(Debug, PartialEq, Eq)]
enum Mode {
    List,
    Host(String),
}

impl Cli {
    fn mode(&self) -> Mode {
        match &self.host {
            Some(hostname) => Mode::Host(hostname.clone()),
            None => Mode::List,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing();

    let config = Config::resolve(cli.config.as_deref())?;
    tracing::debug!(database = ?config.database, "configuration resolved");

    let source = PostgresHostSource::new(config.database)?;
    let provider = InventoryProvider::new(Arc::new(source));

    let output = match cli.mode() {
        Mode::List => render(&accept(provider.list().await)?, cli.pretty)?,
        Mode::Host(hostname) => render(&accept(provider.host(&hostname).await)?, cli.pretty)?,
    };
    println!("{output}");

    Ok(())
}

/// Log to stderr, filtered by `HOSTDB_LOG` (default `warn`)
///
/// `HOSTDB_LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("HOSTDB_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var("HOSTDB_LOG_FORMAT").is_ok_and(|format| format == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Take the provider's value unless the failure behind it is fatal
///
/// Recoverable failures are already logged; their fallback is valid output.
fn accept<T>(outcome: Outcome<T>) -> Result<T> {
    match outcome.error {
        Some(e) if !e.is_recoverable() => Err(e.into()),
        _ => Ok(outcome.value),
    }
}

fn render<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
