//! PortManager CLI - Inspect and reclaim listening ports
//!
//! A command-line tool for listing listening ports, killing the processes
//! that hold them and checking port availability.

mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use portmanager_core::{validate_port, ConfigStore, Platform, PlatformInventory};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "portmanager")]
#[command(author, version, about = "Inspect and reclaim listening ports")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Settings file (default: ~/.portmanager/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List all listening ports
    #[command(alias = "ls")]
    List {
        /// Filter by port number
        #[arg(short, long, value_parser = parse_port)]
        port: Option<u16>,

        /// Filter by process name, port or PID
        #[arg(short = 'n', long)]
        name: Option<String>,
    },

    /// Kill the processes listening on one or more ports
    Kill {
        /// Comma-separated ports, e.g. 3000 or 3000,8080,5432
        ports: String,
    },

    /// Kill a process by PID
    KillPid {
        pid: u32,

        /// Port the process was listening on, for reporting
        #[arg(short, long, value_parser = parse_port)]
        port: Option<u16>,
    },

    /// Count used and free ports in a range
    Scan {
        /// First port of the range (default from settings)
        #[arg(long, value_parser = parse_port)]
        from: Option<u16>,

        /// Last port of the range, inclusive (default from settings)
        #[arg(long, value_parser = parse_port)]
        to: Option<u16>,
    },

    /// Check whether a port is free right now
    Check {
        #[arg(value_parser = parse_port)]
        port: u16,
    },
}

fn parse_port(value: &str) -> Result<u16, String> {
    validate_port(value).map_err(|e| e.to_string())
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "portmanager=debug,portmanager_core=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store = match cli.config {
        Some(path) => ConfigStore::with_path(path),
        None => ConfigStore::new()?,
    };
    let settings = store
        .load()
        .await
        .with_context(|| format!("loading {}", store.path().display()))?;
    let config = settings.to_engine_config(Platform::current());
    tracing::debug!(platform = config.platform.name(), "Engine configured");

    let inventory = PlatformInventory::for_platform(config);

    match cli.command {
        Some(Commands::List { port, name }) => {
            commands::list::run(&inventory, port, name, cli.json).await?;
        }
        Some(Commands::Kill { ports }) => {
            commands::kill::run(&inventory, &ports, cli.json).await?;
        }
        Some(Commands::KillPid { pid, port }) => {
            commands::kill::run_pid(&inventory, pid, port, cli.json).await?;
        }
        Some(Commands::Scan { from, to }) => {
            commands::scan::run(&inventory, from, to, cli.json).await?;
        }
        Some(Commands::Check { port }) => {
            commands::check::run(&inventory, port, cli.json).await?;
        }
        None => {
            commands::list::run(&inventory, None, None, cli.json).await?;
        }
    }

    Ok(())
}
