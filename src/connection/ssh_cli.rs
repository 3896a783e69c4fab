//! SSH CLI connection
//!
//! Reaches the switch through the system `ssh` client. ICX switches expose
//! an interactive CLI rather than a remote shell, so the command text is
//! written to the session's stdin and the session ends at EOF.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, trace};

use super::{CommandResult, Connection, ConnectionError, ConnectionResult};

/// Connection that runs one `ssh` session per executed command text
#[derive(Debug, Clone)]
pub struct SshCliConnection {
    host: String,
    port: u16,
    user: String,
    private_key: Option<String>,
    ssh_executable: String,
    extra_args: Vec<String>,
    timeout: Option<u64>,
}

impl SshCliConnection {
    /// Arguments passed to the ssh executable, host last
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "-T".to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-p".to_string(),
            self.port.to_string(),
            "-l".to_string(),
            self.user.clone(),
        ];
        if let Some(key) = &self.private_key {
            args.push("-i".to_string());
            args.push(key.clone());
        }
        args.extend(self.extra_args.iter().cloned());
        args.push(self.host.clone());
        args
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.ssh_executable);
        cmd.args(self.build_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Connection for SshCliConnection {
    fn identifier(&self) -> &str {
        &self.host
    }

    async fn execute(&self, command: &str) -> ConnectionResult<CommandResult> {
        debug!(host = %self.host, command = %command, "Executing switch command");

        let mut child = self.build_command().spawn().map_err(|e| {
            ConnectionError::ExecutionFailed(format!(
                "Failed to spawn {}: {}",
                self.ssh_executable, e
            ))
        })?;

        let mut script = command.to_string();
        if !script.ends_with('\n') {
            script.push('\n');
        }
        let stdin = child.stdin.take();

        let session = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(script.as_bytes()).await.map_err(|e| {
                    ConnectionError::ExecutionFailed(format!("Failed to write command: {}", e))
                })?;
                // Dropping stdin sends EOF and ends the CLI session
            }
            child.wait_with_output().await.map_err(|e| {
                ConnectionError::ExecutionFailed(format!("Failed to wait for ssh: {}", e))
            })
        };

        let output = match self.timeout {
            Some(timeout_secs) => {
                let timeout = tokio::time::Duration::from_secs(timeout_secs);
                tokio::time::timeout(timeout, session)
                    .await
                    .map_err(|_| ConnectionError::Timeout(timeout_secs))??
            }
            None => session.await?,
        };

        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        trace!(exit_code = %exit_code, stdout_len = %stdout.len(), stderr_len = %stderr.len(), "Command completed");

        // 255 is reserved by ssh for its own failures
        if exit_code == 255 {
            return Err(ConnectionError::ConnectionFailed(format!(
                "{}: {}",
                self.host,
                stderr.trim()
            )));
        }

        if output.status.success() {
            Ok(CommandResult::success(stdout, stderr))
        } else {
            Ok(CommandResult::failure(exit_code, stdout, stderr))
        }
    }
}

/// Builder for [`SshCliConnection`]
#[derive(Debug, Clone)]
pub struct SshCliConnectionBuilder {
    /// Target switch
    pub host: String,
    /// SSH port (default: 22)
    pub port: u16,
    /// Login user
    pub user: String,
    /// Path to private key file (optional)
    pub private_key: Option<String>,
    /// ssh client binary
    pub ssh_executable: String,
    /// Extra arguments inserted before the host
    pub extra_args: Vec<String>,
    /// Per-command timeout in seconds
    pub timeout: Option<u64>,
}

impl SshCliConnectionBuilder {
    /// Create a new builder for `host`
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            user: std::env::var("USER").unwrap_or_else(|_| "admin".to_string()),
            private_key: None,
            ssh_executable: "ssh".to_string(),
            extra_args: Vec::new(),
            timeout: Some(30),
        }
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set the private key path
    pub fn private_key(mut self, path: impl Into<String>) -> Self {
        self.private_key = Some(path.into());
        self
    }

    /// Use a different ssh client binary
    pub fn ssh_executable(mut self, executable: impl Into<String>) -> Self {
        self.ssh_executable = executable.into();
        self
    }

    /// Append raw ssh arguments
    pub fn extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Set the per-command timeout
    pub fn timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validate and build the connection
    pub fn build(self) -> ConnectionResult<SshCliConnection> {
        if self.host.trim().is_empty() {
            return Err(ConnectionError::InvalidConfig(
                "host must not be empty".to_string(),
            ));
        }
        if self.user.trim().is_empty() {
            return Err(ConnectionError::InvalidConfig(
                "user must not be empty".to_string(),
            ));
        }

        Ok(SshCliConnection {
            host: self.host,
            port: self.port,
            user: self.user,
            private_key: self.private_key,
            ssh_executable: self.ssh_executable,
            extra_args: self.extra_args,
            timeout: self.timeout,
        })
    }
}
