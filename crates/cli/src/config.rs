//! CLI configuration utilities

use anyhow::{Context, Result};
use directories::ProjectDirs;
use portal_session::PortalConfig;
use std::path::{Path, PathBuf};

/// Platform data directory, `./.portal` when none can be determined
pub fn default_data_dir() -> PathBuf {
    ProjectDirs::from("dev", "Portal", "portal")
        .map_or_else(|| PathBuf::from(".portal"), |dirs| dirs.data_dir().to_path_buf())
}

/// Load configuration, pointing the session cache at `data_dir` unless the
/// configuration names its own directory
pub fn load_config(path: Option<&Path>, data_dir: &Path) -> Result<PortalConfig> {
    let mut config = PortalConfig::load(path).with_context(|| match path {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration from environment".to_string(),
    })?;

    if config.storage.dir.is_none() {
        config.storage.dir = Some(data_dir.to_path_buf());
    }
    Ok(config)
}

/// Render the default configuration as TOML
pub fn default_config_toml() -> Result<String> {
    Ok(toml::to_string_pretty(&PortalConfig::default())?)
}

/// Write the default configuration file
pub fn generate_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, default_config_toml()?)
        .with_context(|| format!("Failed to write {}", path.display()))
}
