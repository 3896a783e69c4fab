//! Subcommands module for icx-netops CLI
//!
//! This module contains all the subcommand implementations.

pub mod dot1x;
pub mod facts;

use crate::cli::output::OutputFormatter;
use crate::cli::Cli;
use anyhow::{bail, Context, Result};
use icx_netops::config::Config;
use icx_netops::connection::{Connection, FixtureConnection, SshCliConnectionBuilder};
use icx_netops::modules::{ModuleContext, ModuleParams, ModuleRegistry};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Exit code reported when a module fails
pub const EXIT_MODULE_FAILED: i32 = 2;

/// Common context shared between commands
pub struct CommandContext {
    /// Configuration
    pub config: Config,
    /// Output formatter
    pub output: OutputFormatter,
    /// Target switch
    pub host: Option<String>,
    /// Remote user override
    pub user: Option<String>,
    /// Port override
    pub port: Option<u16>,
    /// Private key override
    pub private_key: Option<PathBuf>,
    /// Fixture directory used instead of a switch
    pub fixtures: Option<PathBuf>,
    /// Per-command timeout override
    pub timeout: Option<u64>,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &Cli, config: Config) -> Self {
        let use_color = !cli.no_color && config.colors.enabled;
        let output = OutputFormatter::new(use_color, cli.output, cli.verbosity());

        Self {
            config,
            output,
            host: cli.host.clone(),
            user: cli.user.clone(),
            port: cli.port,
            private_key: cli.private_key.clone(),
            fixtures: cli.fixtures.clone(),
            timeout: cli.timeout,
        }
    }

    /// Name reported for the target
    pub fn target(&self) -> String {
        self.host
            .clone()
            .unwrap_or_else(|| "fixtures".to_string())
    }

    /// Open the connection to the target.
    ///
    /// With a fixture directory, commands without a captured response
    /// succeed with empty output so configuration sessions can be replayed.
    pub fn connect(&self) -> Result<Arc<dyn Connection + Send + Sync>> {
        if let Some(dir) = &self.fixtures {
            debug!(dir = %dir.display(), "Using fixture connection");
            let conn = FixtureConnection::from_dir(self.target(), dir)
                .with_context(|| format!("Failed to load fixtures from {}", dir.display()))?
                .accepting_unknown();
            return Ok(Arc::new(conn));
        }

        let Some(host) = &self.host else {
            bail!("No target: pass --host or --fixtures");
        };

        let mut builder = SshCliConnectionBuilder::new(host.clone())
            .port(self.port.unwrap_or(self.config.defaults.port))
            .timeout(self.timeout.unwrap_or(self.config.defaults.timeout))
            .ssh_executable(self.config.ssh.ssh_executable.clone())
            .extra_args(self.config.ssh.ssh_args.clone());

        if let Some(user) = self.user.as_deref().or(self.config.remote_user()) {
            builder = builder.user(user);
        }
        if let Some(key) = self
            .private_key
            .as_ref()
            .or(self.config.ssh.private_key_file.as_ref())
        {
            builder = builder.private_key(expand_home(key));
        }

        let conn = builder
            .build()
            .with_context(|| format!("Invalid connection settings for {}", host))?;
        Ok(Arc::new(conn))
    }

    /// Run a module against the target and print its result
    pub fn run_module(&self, name: &str, params: &ModuleParams, check_mode: bool) -> Result<i32> {
        let connection = self.connect()?;
        let context = ModuleContext::new()
            .with_check_mode(check_mode)
            .with_connection(connection);

        self.output.info(&format!("Running {} on {}", name, self.target()));

        match ModuleRegistry::with_builtins().execute(name, params, &context) {
            Ok(result) => {
                self.output.module_result(&self.target(), &result)?;
                Ok(0)
            }
            Err(e) => {
                self.output.error(&format!("{}: {}", name, e));
                Ok(EXIT_MODULE_FAILED)
            }
        }
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &Path) -> String {
    let raw = path.to_string_lossy();
    match (raw.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest).to_string_lossy().to_string(),
        _ => raw.to_string(),
    }
}
