//! Configuration for a Portal session host

use portal_http::{ApiClient, ClientError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Entry points used by navigation side effects
    #[serde(default)]
    pub routes: RouteConfig,

    /// Session cache settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every API path is appended to
    pub base_url: String,

    /// Connect/response deadline in milliseconds
    pub timeout_ms: u64,

    /// Optional user agent override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Route entry points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub login_path: String,
    pub signup_path: String,
    pub home_path: String,
}

/// Session cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Store namespace, also the cache file stem
    pub namespace: String,

    /// Directory override; the platform data directory when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_ms: 5_000,
            user_agent: None,
        }
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            signup_path: "/signup".to_string(),
            home_path: "/".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            namespace: "auth".to_string(),
            dir: None,
        }
    }
}

impl ApiConfig {
    /// Build a client for this backend
    pub fn build_client(&self) -> Result<ApiClient, ClientError> {
        let mut builder = ApiClient::builder()
            .base_url(&self.base_url)
            .timeout(Duration::from_millis(self.timeout_ms));
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent);
        }
        builder.build()
    }
}

impl PortalConfig {
    /// Load configuration from an optional file layered under `PORTAL__*`
    /// environment variables (e.g. `PORTAL__API__BASE_URL`).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value has the wrong type
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("api.base_url", defaults.api.base_url)?
            .set_default("api.timeout_ms", defaults.api.timeout_ms)?
            .set_default("routes.login_path", defaults.routes.login_path)?
            .set_default("routes.signup_path", defaults.routes.signup_path)?
            .set_default("routes.home_path", defaults.routes.home_path)?
            .set_default("storage.namespace", defaults.storage.namespace)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("PORTAL")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PortalConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout_ms, 5_000);
        assert_eq!(config.routes.login_path, "/login");
        assert_eq!(config.routes.signup_path, "/signup");
        assert_eq!(config.routes.home_path, "/");
        assert_eq!(config.storage.namespace, "auth");
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("portal.toml");
        std::fs::write(
            &path,
            "[api]\nbase_url = \"https://example.com/api\"\n\n[storage]\nnamespace = \"tab-1\"\n",
        )
        .unwrap();

        let config = PortalConfig::load(Some(&path)).unwrap();
        assert_eq!(config.api.base_url, "https://example.com/api");
        assert_eq!(config.api.timeout_ms, 5_000);
        assert_eq!(config.storage.namespace, "tab-1");
        assert_eq!(config.routes.login_path, "/login");
        assert_eq!(config.routes.signup_path, "/signup");
    }

    #[test]
    fn test_api_config_builds_client() {
        let client = ApiConfig::default().build_client().unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
