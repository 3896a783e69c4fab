//! Connection layer for switch CLI communication.
//!
//! Modules never talk to a transport directly. They issue CLI command text
//! through the [`Connection`] trait and receive the raw device output back,
//! which keeps the command synthesizer and the fact parsers independent of
//! how the switch is actually reached.
//!
//! # Supported Transports
//!
//! - **SSH CLI** ([`SshCliConnection`]): drives the system `ssh` client and
//!   feeds CLI text to the switch over stdin
//! - **Fixture** ([`FixtureConnection`]): serves canned responses keyed by the
//!   exact command string, used for tests and offline runs
//!
//! # Example
//!
//! ```rust,ignore
//! use icx_netops::connection::{Connection, SshCliConnectionBuilder};
//!
//! let conn = SshCliConnectionBuilder::new("10.10.0.2")
//!     .user("admin")
//!     .timeout(30)
//!     .build()?;
//!
//! let result = conn.execute("show version").await?;
//! println!("{}", result.stdout);
//! ```

/// Canned-response connection.
pub mod fixture;

/// System `ssh` client connection.
pub mod ssh_cli;

use async_trait::async_trait;
use thiserror::Error;

pub use fixture::FixtureConnection;
pub use ssh_cli::{SshCliConnection, SshCliConnectionBuilder};

/// Errors that can occur during connection operations.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Failed to establish initial connection to the switch.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Command execution failed (not to be confused with a CLI error message).
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    /// Connection or operation timed out.
    #[error("Connection timeout after {0} seconds")]
    Timeout(u64),

    /// No canned response is registered for the command.
    #[error("No fixture response for command: {0}")]
    FixtureMissing(String),

    /// Configuration is invalid or incomplete.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error during connection operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for connection operations.
pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// The result of executing a command on a connection.
///
/// ```rust
/// use icx_netops::connection::CommandResult;
///
/// let result = CommandResult::success("Hello".into(), String::new());
/// assert!(result.success);
/// assert_eq!(result.exit_code, 0);
///
/// let failed = CommandResult::failure(1, String::new(), "error".into());
/// assert!(!failed.success);
/// ```
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code of the command (0 typically indicates success).
    pub exit_code: i32,
    /// Content written to standard output.
    pub stdout: String,
    /// Content written to standard error.
    pub stderr: String,
    /// Convenience flag: `true` if `exit_code == 0`.
    pub success: bool,
}

impl CommandResult {
    /// Create a new successful command result
    pub fn success(stdout: String, stderr: String) -> Self {
        Self {
            exit_code: 0,
            stdout,
            stderr,
            success: true,
        }
    }

    /// Create a new failed command result
    pub fn failure(exit_code: i32, stdout: String, stderr: String) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            success: false,
        }
    }
}

/// The command executor every switch transport implements.
///
/// `command` is CLI text exactly as it would be typed at the switch prompt.
/// Multi-line text is sent as one session, line by line.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the connection identifier (usually the switch hostname)
    fn identifier(&self) -> &str;

    /// Execute CLI text on the switch
    async fn execute(&self, command: &str) -> ConnectionResult<CommandResult>;
}
