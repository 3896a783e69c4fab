//! Common network device utilities and types
//!
//! This module provides shared functionality for the ICX modules:
//! - Present/absent state handling and the negation token
//! - ICX command generation (config mode, session preparation)
//! - A device wrapper that issues show commands and loads configuration
//! - The bridge from the synchronous module API to async connections

use crate::connection::{Connection, ConnectionError, ConnectionResult};
use crate::modules::{ModuleError, ModuleResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::debug;

/// CLI prefix that removes a previously applied setting
pub const NEGATION_TOKEN: &str = "no ";

// ============================================================================
// Desired State
// ============================================================================

/// Whether a setting should exist on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConfigState {
    #[default]
    Present,
    Absent,
}

impl ConfigState {
    /// Render a command line for this state.
    ///
    /// Absent lines are the present line behind the negation token, with the
    /// parameter text untouched.
    pub fn render(self, line: &str) -> String {
        match self {
            ConfigState::Present => line.to_string(),
            ConfigState::Absent => format!("{}{}", NEGATION_TOKEN, line),
        }
    }
}

impl std::fmt::Display for ConfigState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigState::Present => write!(f, "present"),
            ConfigState::Absent => write!(f, "absent"),
        }
    }
}

impl std::str::FromStr for ConfigState {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "present" => Ok(ConfigState::Present),
            "absent" => Ok(ConfigState::Absent),
            _ => Err(ModuleError::InvalidParameter(format!(
                "Invalid state '{}'. Valid options: present, absent",
                s
            ))),
        }
    }
}

// ============================================================================
// Command Generation
// ============================================================================

/// Generate platform-specific session and configuration commands
pub trait ConfigCommandGenerator {
    /// Generate commands to enter configuration mode
    fn enter_config_mode(&self) -> Vec<String>;

    /// Generate commands to exit configuration mode
    fn exit_config_mode(&self) -> Vec<String>;

    /// Command that shows the running configuration
    fn show_running_config(&self) -> String;

    /// Commands sent before anything else in a session (e.g. disable paging)
    fn prepare_session(&self) -> Vec<String>;

    /// Wrap configuration lines in config mode
    fn apply_config_lines(&self, lines: &[String]) -> Vec<String> {
        let mut commands = self.enter_config_mode();
        commands.extend(lines.iter().cloned());
        commands.extend(self.exit_config_mode());
        commands
    }
}

/// Ruckus/CommScope ICX (FastIron) command generator
#[derive(Debug, Clone, Copy, Default)]
pub struct IcxCommandGenerator;

impl ConfigCommandGenerator for IcxCommandGenerator {
    fn enter_config_mode(&self) -> Vec<String> {
        vec!["configure terminal".to_string()]
    }

    fn exit_config_mode(&self) -> Vec<String> {
        vec!["end".to_string()]
    }

    fn show_running_config(&self) -> String {
        "show running-config".to_string()
    }

    fn prepare_session(&self) -> Vec<String> {
        vec!["skip-page-display".to_string()]
    }
}

// ============================================================================
// Connection Wrapper for Network Devices
// ============================================================================

/// A wrapper around Connection that provides switch-specific operations
pub struct NetworkDeviceConnection {
    connection: Arc<dyn Connection + Send + Sync>,
    generator: IcxCommandGenerator,
}

impl NetworkDeviceConnection {
    /// Create a new network device connection wrapper
    pub fn new(connection: Arc<dyn Connection + Send + Sync>) -> Self {
        Self {
            connection,
            generator: IcxCommandGenerator,
        }
    }

    /// Get the hostname/identifier
    pub fn hostname(&self) -> &str {
        self.connection.identifier()
    }

    /// Session text for one show command, with paging turned off first
    pub fn show_session(&self, command: &str) -> String {
        let mut session = self.generator.prepare_session();
        session.push(command.to_string());
        session.join("\n")
    }

    async fn execute_session(&self, session: &str) -> ConnectionResult<String> {
        let result = self.connection.execute(session).await?;
        if result.success {
            Ok(result.stdout)
        } else {
            Err(ConnectionError::ExecutionFailed(format!(
                "Command '{}' failed: {}",
                session.lines().last().unwrap_or_default(),
                result.stderr.trim()
            )))
        }
    }

    /// Execute a single show command and return the output
    pub async fn execute_command(&self, command: &str) -> ConnectionResult<String> {
        self.execute_session(&self.show_session(command)).await
    }

    /// Run show commands in order, one output per command
    pub async fn run_commands(&self, commands: &[String]) -> ConnectionResult<Vec<String>> {
        let mut outputs = Vec::with_capacity(commands.len());
        for cmd in commands {
            outputs.push(self.execute_command(cmd).await?);
        }
        Ok(outputs)
    }

    /// Get the running configuration text
    pub async fn get_running_config(&self) -> ConnectionResult<String> {
        self.execute_command(&self.generator.show_running_config())
            .await
    }

    /// Load configuration lines in a single config-mode session
    pub async fn load_config(&self, lines: &[String]) -> ConnectionResult<String> {
        let mut session = self.generator.prepare_session();
        session.extend(self.generator.apply_config_lines(lines));
        debug!(host = %self.hostname(), lines = lines.len(), "Loading configuration");
        self.execute_session(&session.join("\n")).await
    }
}

impl From<ConnectionError> for ModuleError {
    fn from(e: ConnectionError) -> Self {
        ModuleError::ExecutionFailed(e.to_string())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Drive a connection future from synchronous module code.
///
/// Inside a multi-threaded runtime the current worker is handed over with
/// `block_in_place`; otherwise a private current-thread runtime is used.
pub fn block_on<F: Future>(future: F) -> ModuleResult<F::Output> {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            Ok(tokio::task::block_in_place(|| handle.block_on(future)))
        }
        Ok(_) => Err(ModuleError::ExecutionFailed(
            "cannot block inside a current-thread runtime".to_string(),
        )),
        Err(_) => {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| {
                    ModuleError::ExecutionFailed(format!("Failed to create async runtime: {}", e))
                })?;
            Ok(rt.block_on(future))
        }
    }
}

/// Normalize a configuration line for comparison against running config.
///
/// ICX shortens `ethernet` to `ethe` in its running configuration and
/// indents sub-mode lines, so both are folded away.
pub fn normalize_config_line(line: &str) -> String {
    line.split_whitespace()
        .map(|word| if word == "ethernet" { "ethe" } else { word })
        .collect::<Vec<_>>()
        .join(" ")
}
