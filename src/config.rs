//! Configuration module for icx-netops
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - System configuration (/etc/icx-netops/config.toml)
//! - User configuration (~/.icx-netops.toml)
//! - Project configuration (./icx-netops.toml)
//! - Environment variables
//! - Command-line arguments

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default settings
    pub defaults: Defaults,

    /// SSH settings
    pub ssh: SshConfig,

    /// Colors and output settings
    pub colors: ColorsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Default remote user
    pub remote_user: Option<String>,

    /// Default ssh port
    pub port: u16,

    /// Per-command timeout in seconds
    pub timeout: u64,

    /// Prune dot1x commands already present in the running config
    pub check_running_config: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            remote_user: None,
            port: 22,
            timeout: 30,
            check_running_config: false,
        }
    }
}

/// SSH configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    /// SSH executable
    pub ssh_executable: String,

    /// Extra SSH arguments
    pub ssh_args: Vec<String>,

    /// Private key file
    pub private_key_file: Option<PathBuf>,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            ssh_executable: "ssh".to_string(),
            ssh_args: vec![],
            private_key_file: None,
        }
    }
}

/// Colors configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    /// Enable colors
    pub enabled: bool,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no -v flag or RUST_LOG is given
    pub level: String,

    /// Log format: `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "text".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources
    ///
    /// Files are layered in order and a key set in a later file wins,
    /// including keys set back to their default. An explicit path must
    /// exist; the discovered locations are skipped when absent.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut layered = Value::Object(Map::new());

        for (path, required) in Self::get_config_paths(config_path) {
            if !path.exists() {
                if required {
                    bail!("Config file not found: {}", path.display());
                }
                continue;
            }
            merge_values(&mut layered, Self::read_file(&path)?);
        }

        let mut config: Config =
            serde_json::from_value(layered).context("Invalid configuration")?;
        config.apply_env_overrides();

        Ok(config)
    }

    /// Get the configuration file paths to check, each flagged when it must exist
    fn get_config_paths(explicit_path: Option<&PathBuf>) -> Vec<(PathBuf, bool)> {
        let mut paths = Vec::new();

        // Explicit path takes priority
        if let Some(path) = explicit_path {
            paths.push((path.clone(), true));
            return paths;
        }

        if let Ok(env_config) = std::env::var("ICX_NETOPS_CONFIG") {
            paths.push((PathBuf::from(env_config), true));
        }

        // System-wide config
        paths.push((PathBuf::from("/etc/icx-netops/config.toml"), false));

        // User config
        if let Some(home) = dirs::home_dir() {
            paths.push((home.join(".icx-netops.toml"), false));
        }

        // Project config (current directory)
        paths.push((PathBuf::from("icx-netops.toml"), false));

        paths
    }

    /// Read one configuration file as an untyped tree
    fn read_file(path: &Path) -> Result<Value> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let value: Value = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            "toml" => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            _ => toml::from_str(&content)
                .or_else(|_| serde_yaml::from_str(&content))
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        // An empty document contributes nothing
        let value = if value.is_null() {
            Value::Object(Map::new())
        } else {
            value
        };

        // Reject files whose shape does not fit before they are layered
        serde_json::from_value::<Config>(value.clone())
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(value)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // ICX_NETOPS_REMOTE_USER
        if let Ok(user) = std::env::var("ICX_NETOPS_REMOTE_USER") {
            self.defaults.remote_user = Some(user);
        }

        // ICX_NETOPS_TIMEOUT
        if let Ok(timeout) = std::env::var("ICX_NETOPS_TIMEOUT") {
            if let Ok(n) = timeout.parse() {
                self.defaults.timeout = n;
            }
        }

        // ICX_NETOPS_SSH_EXECUTABLE
        if let Ok(executable) = std::env::var("ICX_NETOPS_SSH_EXECUTABLE") {
            self.ssh.ssh_executable = executable;
        }

        // ICX_CHECK_RUNNING_CONFIG
        if let Ok(value) = std::env::var("ICX_CHECK_RUNNING_CONFIG") {
            self.defaults.check_running_config =
                matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }

        // NO_COLOR
        if std::env::var("NO_COLOR").is_ok() {
            self.colors.enabled = false;
        }
    }

    /// Get the effective remote user
    pub fn remote_user(&self) -> Option<&str> {
        self.defaults.remote_user.as_deref()
    }

    /// Load from a specific file, without environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        serde_json::from_value(Self::read_file(path)?)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }
}

/// Overlay `other` onto `base`; tables merge key by key and anything else replaces
fn merge_values(base: &mut Value, other: Value) {
    match (base, other) {
        (Value::Object(base), Value::Object(other)) => {
            for (key, value) in other {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, other) => *base = other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.defaults.port, 22);
        assert_eq!(config.defaults.timeout, 30);
        assert!(!config.defaults.check_running_config);
        assert_eq!(config.ssh.ssh_executable, "ssh");
        assert!(config.colors.enabled);
    }

    #[test]
    fn test_config_merge() {
        let mut base = json!({"defaults": {"remote_user": "admin", "timeout": 60}});
        merge_values(&mut base, json!({"defaults": {"timeout": 90}}));

        let merged: Config = serde_json::from_value(base).unwrap();
        assert_eq!(merged.defaults.timeout, 90);
        assert_eq!(merged.remote_user(), Some("admin"));
    }

    #[test]
    fn test_later_file_turns_setting_back_off() {
        let mut base = json!({"defaults": {"check_running_config": true, "timeout": 90}});
        merge_values(
            &mut base,
            json!({"defaults": {"check_running_config": false, "timeout": 30}}),
        );

        let merged: Config = serde_json::from_value(base).unwrap();
        assert!(!merged.defaults.check_running_config);
        assert_eq!(merged.defaults.timeout, 30);
    }

    #[test]
    #[serial]
    fn test_explicit_file_restores_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("icx.toml");
        std::fs::write(&path, "[defaults]\ncheck_running_config = false\ntimeout = 12\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert!(!config.defaults.check_running_config);
        assert_eq!(config.defaults.timeout, 12);
        assert_eq!(config.defaults.port, 22);
    }

    #[test]
    #[serial]
    fn test_missing_explicit_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "defaults:\n  remote_user: netadmin\n  check_running_config: true\nssh:\n  ssh_args: [\"-o\", \"StrictHostKeyChecking=no\"]\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.remote_user(), Some("netadmin"));
        assert!(config.defaults.check_running_config);
        assert_eq!(config.ssh.ssh_args.len(), 2);
        assert_eq!(config.defaults.port, 22);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "defaults = [").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    #[serial]
    fn test_env_override() {
        std::env::set_var("ICX_NETOPS_TIMEOUT", "45");
        std::env::set_var("ICX_CHECK_RUNNING_CONFIG", "yes");
        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.defaults.timeout, 45);
        assert!(config.defaults.check_running_config);
        std::env::remove_var("ICX_NETOPS_TIMEOUT");
        std::env::remove_var("ICX_CHECK_RUNNING_CONFIG");
    }
}
