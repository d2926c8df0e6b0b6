//! Server configuration
//!
//! Loaded from an explicit path when one is given, else from
//! `{config_dir}/stagehand/config.json`, else defaults. A file that cannot be
//! read or parsed is replaced by defaults so the server still starts; the
//! error is handed back so it can be logged once logging is set up.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `log_filter`
pub const LOG_ENV: &str = "STAGEHAND_LOG";

/// Settings for the MCP server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// How long one tool call may run before it is answered with `TIMEOUT`
    pub operation_timeout_ms: u64,
    /// `tracing` filter directive, e.g. `info` or `stagehand_core=debug`
    pub log_filter: String,
    /// Start with the sample data table and actors
    pub seed_demo_content: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            operation_timeout_ms: 30_000,
            log_filter: "info".to_string(),
            seed_demo_content: true,
        }
    }
}

impl ServerConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    /// Log filter after applying the `STAGEHAND_LOG` override
    pub fn effective_log_filter(&self) -> String {
        std::env::var(LOG_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| self.log_filter.clone())
    }

    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load from `path`, or the default location, falling back to defaults
    ///
    /// The error is returned next to the defaults when an existing file could
    /// not be used.
    pub fn load(path: Option<&Path>) -> (Self, Option<anyhow::Error>) {
        let Some(path) = path.map(Path::to_path_buf).or_else(default_path) else {
            return (Self::default(), None);
        };
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::from_file(&path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Write to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, json).context("Failed to write config file")
    }
}

/// `{config_dir}/stagehand/config.json`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("stagehand").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Result<ServerConfig, _> = serde_json::from_str(r#"{"operation_timeout_ms": 500}"#);
        let Ok(config) = parsed else {
            panic!("partial config should parse");
        };
        assert_eq!(config.operation_timeout(), Duration::from_millis(500));
        assert_eq!(config.log_filter, "info");
        assert!(config.seed_demo_content);
    }

    #[test]
    fn test_missing_explicit_path_gives_defaults() {
        let (config, error) = ServerConfig::load(Some(Path::new("/nonexistent/stagehand/config.json")));
        assert_eq!(config, ServerConfig::default());
        assert!(error.is_none());
    }
}
