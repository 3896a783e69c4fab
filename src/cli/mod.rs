//! CLI module for icx-netops
//!
//! This module provides the command-line interface for icx-netops,
//! including argument parsing and subcommand handling.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// icx-netops - Automation for Ruckus ICX switches
///
/// Gathers facts and configures 802.1x authentication over the switch CLI.
#[derive(Parser, Debug, Clone)]
#[command(name = "icx-netops")]
#[command(author = "icx-netops Contributors")]
#[command(version)]
#[command(about = "Fact gathering and dot1x configuration for Ruckus ICX switches", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Switch to connect to
    #[arg(long, global = true, env = "ICX_NETOPS_HOST")]
    pub host: Option<String>,

    /// Remote user (overrides config)
    #[arg(short = 'u', long, global = true)]
    pub user: Option<String>,

    /// SSH port (overrides config)
    #[arg(short = 'p', long, global = true)]
    pub port: Option<u16>,

    /// Private key file (overrides config)
    #[arg(long, global = true)]
    pub private_key: Option<PathBuf>,

    /// Answer commands from captured output files in this directory instead of a switch
    #[arg(long, global = true)]
    pub fixtures: Option<PathBuf>,

    /// Per-command timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Verbosity level (-v, -vv, -vvv, -vvvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "ICX_NETOPS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output for scripting
    Json,
    /// YAML output
    Yaml,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Gather facts from a switch
    Facts(commands::facts::FactsArgs),

    /// Configure 802.1x authentication
    Dot1x(commands::dot1x::Dot1xArgs),
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-4)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(4)
    }
}
