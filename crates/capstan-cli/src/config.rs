//! Configuration for the capstan CLI.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use capstan_core::client::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;
use tracing::info;

/// Settings shared by every command.
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Deploy endpoint to talk to; unset means the local default.
    pub endpoint: Option<String>,

    /// Manifest file used by `apply` and `delete` when `--file` is not given.
    pub manifest: Option<PathBuf>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            manifest: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CliConfig {
    /// Load configuration from the default sources.
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. `config.toml` under the user configuration directory (e.g. `~/.config/capstan/`)
    /// 3. `capstan.toml` in the current directory
    /// 4. Environment variables with `CAPSTAN_` prefix
    pub fn load() -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(dir) = dirs::config_dir() {
            figment = figment.merge(Toml::file(dir.join("capstan").join("config.toml")));
        }

        figment
            .merge(Toml::file("capstan.toml"))
            .merge(Env::prefixed("CAPSTAN_"))
            .extract()
            .map_err(|e| anyhow!("invalid configuration: {e}"))
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve the endpoint to use: flag, then configuration, then default.
    #[must_use]
    pub fn resolved_endpoint(&self, flag: Option<String>) -> String {
        if let Some(endpoint) = flag {
            return endpoint;
        }
        if let Some(endpoint) = &self.endpoint {
            return endpoint.clone();
        }
        info!("assuming endpoint {DEFAULT_ENDPOINT}");
        DEFAULT_ENDPOINT.to_owned()
    }

    /// Resolve the manifest file for `apply`/`delete`: flag, then configuration.
    pub fn resolved_manifest(&self, flag: Option<PathBuf>) -> anyhow::Result<PathBuf> {
        flag.or_else(|| self.manifest.clone()).ok_or_else(|| {
            anyhow!("no manifest file: pass --file or set `manifest` in the configuration")
        })
    }
}
