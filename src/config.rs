use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::store::{NamespaceMode, StoreSettings};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    pub backend: BackendConfig,
    /// Cluster selected before the first cluster listing arrives.
    #[serde(default)]
    pub default_cluster: Option<String>,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_timeout")]
    pub fetch_timeout_secs: u64,
    #[serde(default)]
    pub namespace_mode: NamespaceMode,
    #[serde(default)]
    pub search_matches_namespace: bool,
    /// JSON snapshot served when the backend is unreachable. The built-in
    /// sample data is used when unset.
    #[serde(default)]
    pub fallback_snapshot: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_listen_port() -> u16 {
    9090
}

fn default_refresh_interval() -> u64 {
    30
}

fn default_timeout() -> u64 {
    10
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self, ConfigError> {
        let mut cfg: Config = serde_yaml::from_str(data)?;

        cfg.default_cluster = cfg.default_cluster.filter(|c| !c.trim().is_empty());

        if cfg.backend.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("backend.base_url must be set".into()));
        }
        if cfg.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "refresh_interval_secs must be greater than zero".into(),
            ));
        }
        if cfg.fetch_timeout_secs == 0 || cfg.backend.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be greater than zero".into()));
        }

        Ok(cfg)
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.listen_port)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            default_cluster: self.default_cluster.clone(),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            namespace_mode: self.namespace_mode,
            search_matches_namespace: self.search_matches_namespace,
        }
    }
}
