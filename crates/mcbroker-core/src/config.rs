//! broker.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub gateway: GatewayConfig,
    pub control: ControlConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 5000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the redb database holding the pool and cluster registry.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/var/lib/mcbroker/broker.redb"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub region: String,
    pub account_number: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            region: "us-west-2".to_string(),
            account_number: "000000000000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Upper bound on establishing a control-channel connection (e.g. "5s").
    pub connect_timeout: String,
    /// Upper bound on the write/half-close/read exchange (e.g. "10s").
    pub io_timeout: String,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            connect_timeout: "5s".to_string(),
            io_timeout: "10s".to_string(),
        }
    }
}

impl ControlConfig {
    pub fn connect_timeout(&self) -> anyhow::Result<Duration> {
        parse_duration(&self.connect_timeout)
            .ok_or_else(|| anyhow::anyhow!("invalid connect_timeout '{}'", self.connect_timeout))
    }

    pub fn io_timeout(&self) -> anyhow::Result<Duration> {
        parse_duration(&self.io_timeout)
            .ok_or_else(|| anyhow::anyhow!("invalid io_timeout '{}'", self.io_timeout))
    }
}

impl BrokerConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: BrokerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path` when given (defaults otherwise), then apply
    /// overrides from the process environment.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply `PORT`, `BROKERDB`, `REGION`, and `ACCOUNTNUMBER` overrides.
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid PORT '{port}': {e}"))?;
        }
        if let Some(path) = lookup("BROKERDB") {
            self.store.path = PathBuf::from(path);
        }
        if let Some(region) = lookup("REGION") {
            self.gateway.region = region;
        }
        if let Some(account) = lookup("ACCOUNTNUMBER") {
            self.gateway.account_number = account;
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Parse a duration string like "5s", "500ms", "1m", or bare seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>().ok().map(|m| Duration::from_secs(m * 60))
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
