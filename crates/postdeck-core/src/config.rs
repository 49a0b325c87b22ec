use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{PostdeckError, Result};

pub const DEFAULT_PORT: u16 = 18790;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Top-level config (postdeck.toml + POSTDECK_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostdeckConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sweeper: SweeperConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            auth: AuthConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMode {
    /// Static bearer token on every `/api` request.
    Token,
    /// Open access, for local single-user deployments.
    #[default]
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Background due-post sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    /// When false the sweep only runs via `/api/publish-scheduled` or the
    /// `sweep` CLI command.
    #[serde(default = "bool_true")]
    pub enabled: bool,
    /// Seconds between sweeps. Must be at least 1.
    #[serde(default = "default_sweep_interval")]
    pub interval_secs: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// How many posts the recent-activity feed returns.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

fn bool_true() -> bool {
    true
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_sweep_interval() -> u64 {
    DEFAULT_SWEEP_INTERVAL_SECS
}
fn default_recent_limit() -> usize {
    DEFAULT_RECENT_LIMIT
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.postdeck/postdeck.db", home)
}

impl PostdeckConfig {
    /// Load config from a TOML file with POSTDECK_* env var overrides.
    ///
    /// Nested keys use a double underscore, e.g.
    /// `POSTDECK_SWEEPER__INTERVAL_SECS=30`. Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.postdeck/postdeck.toml
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Self::from_figment(
            Figment::new()
                .merge(Toml::file(&path))
                .merge(Env::prefixed("POSTDECK_").split("__")),
        )
    }

    /// Extract and validate from an already-assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: PostdeckConfig = figment
            .extract()
            .map_err(|e| PostdeckError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.sweeper.interval_secs == 0 {
            return Err(PostdeckError::Config(
                "sweeper.interval_secs must be at least 1".to_string(),
            ));
        }
        if self.gateway.auth.mode == AuthMode::Token && self.gateway.auth.token.is_none() {
            return Err(PostdeckError::Config(
                "gateway.auth.mode = \"token\" requires gateway.auth.token".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.postdeck/postdeck.toml", home)
}
