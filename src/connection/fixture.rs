//! Fixture connection
//!
//! Serves captured CLI output instead of talking to a switch. Responses are
//! keyed by the exact command string; a multi-line session falls back to the
//! response for its last line. Every executed command is recorded so callers
//! can inspect what would have been sent to the device.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

use super::{CommandResult, Connection, ConnectionError, ConnectionResult};

/// Connection that answers from an explicit command → response map
#[derive(Debug, Default)]
pub struct FixtureConnection {
    identifier: String,
    responses: HashMap<String, String>,
    /// Commands that succeed with empty output when no response is registered
    accept_unknown: bool,
    executed: Mutex<Vec<String>>,
}

impl FixtureConnection {
    /// Create an empty fixture connection
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    /// Register the response returned for `command`
    pub fn with_response(mut self, command: impl Into<String>, output: impl Into<String>) -> Self {
        self.responses.insert(command.into(), output.into());
        self
    }

    /// Answer unregistered commands with empty output instead of failing.
    ///
    /// Configuration sessions produce no meaningful output, so this is what
    /// a fake used for config loading usually wants.
    pub fn accepting_unknown(mut self) -> Self {
        self.accept_unknown = true;
        self
    }

    /// Load every file in `dir` as a response.
    ///
    /// File names follow the captured-output convention: the command with
    /// spaces replaced by `_` and pipes collapsed, e.g.
    /// `show running-config | include hostname` is stored as
    /// `show_running-config_include_hostname`. Any extension is ignored.
    pub fn from_dir(identifier: impl Into<String>, dir: &Path) -> ConnectionResult<Self> {
        let mut conn = Self::new(identifier);
        let entries = fs::read_dir(dir).map_err(|e| {
            ConnectionError::InvalidConfig(format!(
                "Cannot read fixture directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = fs::read_to_string(&path)?;
            trace!(fixture = %stem, bytes = content.len(), "Loaded fixture");
            conn.responses.insert(stem.to_string(), content);
        }

        debug!(
            dir = %dir.display(),
            count = conn.responses.len(),
            "Loaded fixture directory"
        );
        Ok(conn)
    }

    /// Mangle a command into its fixture file name
    pub fn fixture_name(command: &str) -> String {
        command.replace(' ', "_").replace("_|_", "_")
    }

    /// Commands executed so far, in order
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().clone()
    }

    fn lookup_one(&self, command: &str) -> Option<&String> {
        self.responses
            .get(command)
            .or_else(|| self.responses.get(&Self::fixture_name(command)))
    }

    /// A multi-line session is answered by the capture of its last command
    fn lookup(&self, command: &str) -> Option<&String> {
        self.lookup_one(command).or_else(|| {
            command
                .lines()
                .last()
                .filter(|last| *last != command)
                .and_then(|last| self.lookup_one(last.trim()))
        })
    }
}

#[async_trait]
impl Connection for FixtureConnection {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn execute(&self, command: &str) -> ConnectionResult<CommandResult> {
        self.executed.lock().push(command.to_string());

        match self.lookup(command) {
            Some(output) => Ok(CommandResult::success(output.trim().to_string(), String::new())),
            None if self.accept_unknown => Ok(CommandResult::success(String::new(), String::new())),
            None => Err(ConnectionError::FixtureMissing(command.to_string())),
        }
    }
}
