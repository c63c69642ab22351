//! Layered client configuration.
//!
//! Values come from `flowboard.toml` (or the user config directory), then
//! environment variables, then command-line overrides, each layer
//! replacing the one before it.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! api_url = "https://tasks.example.com/api"
//! ws_url = "wss://tasks.example.com/boards"
//! token = "..."
//!
//! [board]
//! stale_after_days = 7
//!
//! [realtime]
//! reconnect_initial_ms = 500
//! reconnect_max_ms = 10000
//! ping_interval_secs = 30
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{BoardError, BoardResult};

pub const CONFIG_FILE_NAME: &str = "flowboard.toml";

pub const ENV_API_URL: &str = "FLOWBOARD_API_URL";
pub const ENV_WS_URL: &str = "FLOWBOARD_WS_URL";
pub const ENV_TOKEN: &str = "FLOWBOARD_TOKEN";

pub const MAX_PING_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Bearer token issued by the auth service.
    #[serde(default)]
    pub token: Option<String>,
}

fn default_api_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_ws_url() -> String {
    "ws://localhost:3000/boards".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            ws_url: default_ws_url(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Days without a column change before a task counts as stale
    #[serde(default = "default_stale_after_days")]
    pub stale_after_days: u32,
}

fn default_stale_after_days() -> u32 {
    7
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            stale_after_days: default_stale_after_days(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeConfig {
    #[serde(default = "default_reconnect_initial_ms")]
    pub reconnect_initial_ms: u64,
    #[serde(default = "default_reconnect_max_ms")]
    pub reconnect_max_ms: u64,
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
}

fn default_reconnect_initial_ms() -> u64 {
    500
}

fn default_reconnect_max_ms() -> u64 {
    10_000
}

fn default_ping_interval_secs() -> u64 {
    30
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            reconnect_initial_ms: default_reconnect_initial_ms(),
            reconnect_max_ms: default_reconnect_max_ms(),
            ping_interval_secs: default_ping_interval_secs(),
        }
    }
}

impl RealtimeConfig {
    pub fn reconnect_initial(&self) -> Duration {
        Duration::from_millis(self.reconnect_initial_ms)
    }

    pub fn reconnect_max(&self) -> Duration {
        Duration::from_millis(self.reconnect_max_ms)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowboardConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub realtime: RealtimeConfig,
}

/// Command-line overrides; `None` leaves the lower layer in place.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_url: Option<String>,
    pub ws_url: Option<String>,
    pub token: Option<String>,
}

impl FlowboardConfig {
    /// Parse a config file. Fails if it is missing or malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: FlowboardConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Candidate config locations, most specific first.
    pub fn search_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(path) = explicit {
            paths.push(path.to_path_buf());
            return paths;
        }
        paths.push(PathBuf::from(CONFIG_FILE_NAME));
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("flowboard").join("config.toml"));
        }
        paths
    }

    /// Resolve file → environment → CLI.
    ///
    /// An explicit path must exist; implicit locations are skipped when absent.
    pub fn resolve(explicit: Option<&Path>, cli: &CliOverrides) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => Self::search_paths(None)
                .into_iter()
                .find(|p| p.exists())
                .map(|p| Self::load(&p))
                .transpose()?
                .unwrap_or_default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.server.api_url = url;
        }
        if let Some(url) = lookup(ENV_WS_URL) {
            self.server.ws_url = url;
        }
        if let Some(token) = lookup(ENV_TOKEN).filter(|t| !t.is_empty()) {
            self.server.token = Some(token);
        }
    }

    pub fn apply_cli(&mut self, cli: &CliOverrides) {
        if let Some(url) = &cli.api_url {
            self.server.api_url = url.clone();
        }
        if let Some(url) = &cli.ws_url {
            self.server.ws_url = url.clone();
        }
        if let Some(token) = &cli.token {
            self.server.token = Some(token.clone());
        }
    }

    pub fn validate(&self) -> BoardResult<()> {
        let invalid = |msg: String| Err(BoardError::Config(msg));
        let api = &self.server.api_url;
        if !(api.starts_with("http://") || api.starts_with("https://")) {
            return invalid(format!("server.api_url must be an http(s) URL, got '{}'", api));
        }
        let ws = &self.server.ws_url;
        if !(ws.starts_with("ws://") || ws.starts_with("wss://")) {
            return invalid(format!("server.ws_url must be a ws(s) URL, got '{}'", ws));
        }
        if self.board.stale_after_days == 0 {
            return invalid("board.stale_after_days must be at least 1".into());
        }
        if self.realtime.reconnect_initial_ms == 0 || self.realtime.ping_interval_secs == 0 {
            return invalid(
                "realtime.reconnect_initial_ms and realtime.ping_interval_secs must be positive"
                    .into(),
            );
        }
        if self.realtime.ping_interval_secs > MAX_PING_INTERVAL_SECS {
            return invalid(format!(
                "realtime.ping_interval_secs must not exceed {}",
                MAX_PING_INTERVAL_SECS
            ));
        }
        if self.realtime.reconnect_initial_ms > self.realtime.reconnect_max_ms {
            return invalid("realtime.reconnect_initial_ms must not exceed reconnect_max_ms".into());
        }
        Ok(())
    }

    pub fn stale_after(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.board.stale_after_days))
    }
}
