use anyhow::Context;
use serde::Deserialize;
use std::{path::Path, time::Duration};

use crate::{
    domain::settings::{ClientPlayerSettings, PlayerSettings},
    oembed::DEFAULT_ENDPOINT,
};

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub oembed: OEmbedConfig,
    pub player: PlayerSettings,
    pub client: ClientPlayerSettings,
    pub http: HttpConfig,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&contents)
    }

    /// Loads `path`, or the defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Config> {
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("no config at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    pub fn parse(contents: &str) -> anyhow::Result<Config> {
        let cfg: Config = toml::from_str(contents).context("Failed to parse config TOML")?;
        cfg.player
            .validate()
            .context("Invalid [player] settings")?;
        Ok(cfg)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OEmbedConfig {
    pub endpoint: String,
    /// Request timeout; 0 waits forever.
    pub timeout_secs: u64,
}

impl OEmbedConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn user_agent(&self) -> String {
        format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}

impl Default for OEmbedConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}
