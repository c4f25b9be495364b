//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `$CALCHUB_CONFIG` environment variable
//! 2. `~/.config/calchub/config.toml`
//! 3. Built-in defaults (everything is optional)

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub history: HistoryConfig,
    pub server: ServerConfig,
}

/// Database storage settings.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database path. Default: platform-specific data dir.
    pub path: Option<String>,
}

/// Calculation history retention.
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Days before a saved calculation expires.
    pub ttl_days: i64,
    /// Records returned when no `limit` is given.
    pub default_limit: usize,
    /// Seconds between background purges of expired records.
    pub purge_interval_secs: u64,
}

/// HTTP server settings.
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

/// Upper bound for `history.ttl_days` (about a century).
pub const MAX_TTL_DAYS: i64 = 36_500;

// --- Defaults ---

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            ttl_days: calc_core::DEFAULT_TTL_DAYS,
            default_limit: calc_api::DEFAULT_HISTORY_LIMIT,
            purge_interval_secs: 60,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".into(),
        }
    }
}

/// Load config from disk. Returns defaults if no config file exists.
pub fn load_config() -> Result<Config> {
    let path = config_path();

    if let Some(p) = &path {
        if p.exists() {
            let content =
                std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            let config: Config =
                toml::from_str(&content).with_context(|| format!("parsing {}", p.display()))?;
            config.validate()?;
            return Ok(config);
        }
    }

    Ok(Config::default())
}

impl Config {
    fn validate(&self) -> Result<()> {
        if self.history.ttl_days <= 0 {
            anyhow::bail!("history.ttl_days must be positive");
        }
        if self.history.ttl_days > MAX_TTL_DAYS {
            anyhow::bail!("history.ttl_days must be at most {MAX_TTL_DAYS}");
        }
        if self.history.default_limit == 0 {
            anyhow::bail!("history.default_limit must be positive");
        }
        Ok(())
    }
}

/// Resolve the config file path.
fn config_path() -> Option<PathBuf> {
    // 1. Environment variable
    if let Ok(p) = std::env::var("CALCHUB_CONFIG") {
        return Some(PathBuf::from(p));
    }

    // 2. ~/.config/calchub/config.toml
    if let Some(home) = dirs_home() {
        let p = home.join(".config").join("calchub").join("config.toml");
        return Some(p);
    }

    None
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

/// Show the active config path (for `calc config`).
pub fn show_config_path() -> String {
    match config_path() {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not found, using defaults)", p.display()),
        None => "no config path resolved (using defaults)".into(),
    }
}
