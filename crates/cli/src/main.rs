//! Portal CLI - session client for the Portal web backend

mod commands;
mod config;
mod logging;
mod shell;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "Session client for the Portal web backend")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML or YAML)
    #[arg(short = 'c', long, global = true, env = "PORTAL_CONFIG")]
    config: Option<PathBuf>,

    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "info")]
    log_level: LogLevel,

    /// Data directory for the session cache and logs
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or_else(config::default_data_dir);
    logging::init_logging(cli.log_level.into(), Some(&data_dir), cli.no_file_log)?;

    info!("Starting Portal CLI");

    match cli.command.execute(cli.config.as_deref(), &data_dir).await {
        Ok(()) => {
            info!("Command completed successfully");
        }
        Err(e) => {
            error!("Command failed: {e:#}");
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
