//! Worker configuration.
//!
//! [`WorkerConfig`] is the on-disk startup file. [`WorkerSettings`] is the
//! subset the worker loop itself needs, validated.

use serde::{Deserialize, Serialize};
use spindle_core::ConfigurationError;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

/// Default startup file name.
pub const DEFAULT_CONFIG_PATH: &str = "bot_config.json";

/// Errors loading the startup file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The file path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON for [`WorkerConfig`].
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// The file path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// A value is out of range.
    #[error(transparent)]
    Invalid(#[from] ConfigurationError),
}

/// The startup file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Transport endpoint, `host:port`.
    pub server: String,
    /// Identifier announced to the remote side.
    pub identifier: String,
    /// Plugin search paths. Plugins are linked in, so these are only logged.
    pub plugin_paths: Vec<PathBuf>,
    /// Prefix marking a message as a command.
    pub command_prefix: String,
    /// Spacing between timer rounds, in milliseconds.
    pub timer_interval_ms: u64,
    /// Maximum number of concurrently running offloaded commands.
    pub max_workers: usize,
    /// SQLite database for hooks that need a session.
    pub database: Option<PathBuf>,
    /// Root directory for JSON storage.
    pub storage_dir: PathBuf,
    /// How long to wait for in-flight commands on shutdown, in milliseconds.
    pub shutdown_grace_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            identifier: "spindle".to_string(),
            plugin_paths: Vec::new(),
            command_prefix: ".".to_string(),
            timer_interval_ms: 1000,
            max_workers: 16,
            database: None,
            storage_dir: PathBuf::from("storage_data"),
            shutdown_grace_ms: 5000,
        }
    }
}

impl WorkerConfig {
    /// Read and validate the startup file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value is in range.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.server.trim().is_empty() {
            return Err(invalid("server", "endpoint is empty"));
        }
        self.settings().validate()
    }

    /// The settings the worker loop needs.
    pub fn settings(&self) -> WorkerSettings {
        WorkerSettings {
            command_prefix: self.command_prefix.clone(),
            timer_interval: Duration::from_millis(self.timer_interval_ms),
            max_workers: self.max_workers,
        }
    }

    /// Grace period for in-flight commands on shutdown.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

/// Settings for [`Worker`](crate::Worker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSettings {
    /// Prefix marking a message as a command.
    pub command_prefix: String,
    /// Spacing between timer rounds.
    pub timer_interval: Duration,
    /// Maximum number of concurrently running offloaded commands.
    pub max_workers: usize,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        WorkerConfig::default().settings()
    }
}

impl WorkerSettings {
    /// Check every value is in range.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.command_prefix.is_empty() {
            return Err(invalid("command_prefix", "prefix is empty"));
        }
        if self.timer_interval.is_zero() {
            return Err(invalid("timer_interval_ms", "must be greater than zero"));
        }
        if self.max_workers == 0 {
            return Err(invalid("max_workers", "must be greater than zero"));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: &str) -> ConfigurationError {
    ConfigurationError::InvalidSetting {
        name,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: WorkerConfig =
            serde_json::from_str(r#"{"server": "127.0.0.1:7000", "identifier": "w1"}"#).unwrap();
        assert_eq!(config.identifier, "w1");
        assert_eq!(config.command_prefix, ".");
        assert_eq!(config.settings().timer_interval, Duration::from_secs(1));
        assert_eq!(config.max_workers, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let base = WorkerConfig {
            server: "x:1".into(),
            ..WorkerConfig::default()
        };

        let empty_server = WorkerConfig {
            server: " ".into(),
            ..base.clone()
        };
        let zero_interval = WorkerConfig {
            timer_interval_ms: 0,
            ..base.clone()
        };
        let zero_workers = WorkerConfig {
            max_workers: 0,
            ..base.clone()
        };
        let no_prefix = WorkerConfig {
            command_prefix: String::new(),
            ..base
        };

        for (config, field) in [
            (empty_server, "server"),
            (zero_interval, "timer_interval_ms"),
            (zero_workers, "max_workers"),
            (no_prefix, "command_prefix"),
        ] {
            match config.validate() {
                Err(ConfigurationError::InvalidSetting { name, .. }) => assert_eq!(name, field),
                other => panic!("expected {field} to be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot_config.json");
        fs::write(&path, "{ nope").unwrap();

        let err = WorkerConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bot_config.json"));
    }
}
