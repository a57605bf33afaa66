use anyhow::Result;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging for the CLI.
///
/// The interactive shell owns the terminal, so with a data directory the
/// log goes to `<data_dir>/portal.log` only; otherwise to stderr.
pub fn init_logging(log_level: Level, data_dir: Option<&Path>, no_file_log: bool) -> Result<()> {
    let env_filter = default_filter(log_level);

    match data_dir {
        Some(dir) if !no_file_log => {
            let log_file_path = log_file_path(dir);
            if let Some(parent) = log_file_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_file_path)?;

            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(log_file)
                        .with_ansi(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

fn default_filter(level: Level) -> EnvFilter {
    let level_str = level.as_str().to_lowercase();
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("portal={level_str},portal_session={level_str},portal_http={level_str}").into()
    })
}

fn log_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join("portal.log")
}
