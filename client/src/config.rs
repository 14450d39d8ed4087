use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Public endpoint of the secret manager.
pub const DEFAULT_HOST: &str = "secretmanager.api.cloud.ru:443";

/// Connection configuration, read once when a [`Client`](crate::Client) is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Address of the service, e.g. `secretmanager.api.cloud.ru:443`.
    pub host: String,

    /// Use plaintext HTTP/2 instead of TLS.
    #[serde(default)]
    pub insecure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_HOST)
    }
}

impl Config {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            insecure: false,
        }
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.host.trim().is_empty()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
