//! Main application configuration
//!
//! This module defines the primary configuration structures for the matchroom
//! binary, including TOML file loading, environment variable overrides and
//! validation.

use crate::config::matchmaking::MatchmakingConfig;
use crate::error::{MatchmakingError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub matchmaking: MatchmakingConfig,
    pub dispatch: DispatchSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Settings for handing matches to the external game runner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    /// Program and leading arguments; player ids are appended per match
    pub game_command: Vec<String>,
    /// Maximum games running at once
    pub max_concurrent_games: usize,
    /// Per-game timeout in seconds
    pub game_timeout_seconds: u64,
    /// Where the round report is written
    pub results_path: PathBuf,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "matchroom".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            game_command: Vec::new(),
            max_concurrent_games: 4,
            game_timeout_seconds: 600, // 10 minutes
            results_path: PathBuf::from("results.json"),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    ///
    /// Values are not validated here; callers layer their own overrides and
    /// then run [`validate_config`] on the result.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    ///
    /// Like [`AppConfig::from_env`], the result is not validated yet.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&raw).map_err(|e| {
            MatchmakingError::config(format!("{}: {}", path.display(), e))
        })?;
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from recognised environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        if let Some(size) = parse_env("LOBBY_SIZE")? {
            self.matchmaking.lobby_size = size;
        }
        if let Some(window) = parse_env("INITIAL_WINDOW")? {
            self.matchmaking.initial_window = window;
        }
        if let Some(step) = parse_env("WINDOW_STEP")? {
            self.matchmaking.window_step = step;
        }
        if let Some(max) = parse_env("MAX_WINDOW")? {
            self.matchmaking.max_window = max;
        }

        if let Ok(command) = env::var("GAME_COMMAND") {
            self.dispatch.game_command = command.split_whitespace().map(String::from).collect();
        }
        if let Some(max_games) = parse_env("MAX_CONCURRENT_GAMES")? {
            self.dispatch.max_concurrent_games = max_games;
        }
        if let Some(timeout) = parse_env("GAME_TIMEOUT_SECONDS")? {
            self.dispatch.game_timeout_seconds = timeout;
        }

        Ok(())
    }

    /// Get the per-game timeout as Duration
    pub fn game_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch.game_timeout_seconds)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| MatchmakingError::config(format!("Invalid {} value: {}", key, value)).into()),
        Err(_) => Ok(None),
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => {
            return Err(MatchmakingError::config(format!(
                "Invalid log level: {}",
                config.service.log_level
            ))
            .into())
        }
    }

    config.matchmaking.validate()?;

    if config.dispatch.max_concurrent_games == 0 {
        return Err(MatchmakingError::config("max_concurrent_games must be greater than 0").into());
    }
    if config.dispatch.game_timeout_seconds == 0 {
        return Err(MatchmakingError::config("game_timeout_seconds must be greater than 0").into());
    }

    Ok(())
}
