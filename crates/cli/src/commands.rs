//! CLI commands

use anyhow::{Result, bail};
use clap::Subcommand;
use portal_session::Portal;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config;
use crate::shell::{Shell, describe_session};

#[derive(Subcommand)]
pub enum Commands {
    /// Open an interactive session shell
    Shell,

    /// Confirm the session with the server, refreshing it if needed
    Check {
        /// Print the session as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a default configuration file
    Config {
        /// Output file path (prints to stdout when omitted)
        output: Option<PathBuf>,
    },
}

impl Commands {
    pub async fn execute(self, config_path: Option<&Path>, data_dir: &Path) -> Result<()> {
        match self {
            Self::Shell => {
                let portal = open_portal(config_path, data_dir)?;
                Shell::new(portal).run().await
            }
            Self::Check { json } => {
                let portal = open_portal(config_path, data_dir)?;
                let outcome = portal.store.check_auth().await;
                let session = portal.store.session();

                if json {
                    println!("{}", serde_json::to_string_pretty(&session)?);
                } else {
                    println!("{}", describe_session(&session));
                }

                match outcome {
                    Ok(user) => {
                        info!(email = %user.email, "session confirmed");
                        Ok(())
                    }
                    Err(err) => bail!("not authenticated: {err}"),
                }
            }
            Self::Config { output } => match output {
                Some(path) => {
                    config::generate_default_config(&path)?;
                    println!("Wrote default configuration to {}", path.display());
                    Ok(())
                }
                None => {
                    print!("{}", config::default_config_toml()?);
                    Ok(())
                }
            },
        }
    }
}

fn open_portal(config_path: Option<&Path>, data_dir: &Path) -> Result<Portal> {
    let config = config::load_config(config_path, data_dir)?;
    info!(base_url = %config.api.base_url, "opening session");
    Ok(Portal::from_config(&config)?)
}
