//! icx-netops - Automation for Ruckus ICX switches
//!
//! This is the main entry point for the icx-netops CLI.

mod cli;

use anyhow::Result;
use cli::commands::CommandContext;
use cli::{Cli, Commands};
use icx_netops::config::{Config, LoggingConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application version information
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config = Config::load(cli.config.as_ref());

    // Initialize logging based on verbosity
    let logging = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    init_logging(cli.verbosity(), &logging);

    if cli.verbosity() >= 2 {
        eprintln!("icx-netops v{}", VERSION);
    }

    let config = match config {
        Ok(config) => config,
        // A file named on the command line must load
        Err(e) if cli.config.is_some() => return Err(e),
        Err(e) => {
            tracing::warn!("Failed to load config: {:#}", e);
            Config::default()
        }
    };

    // Create command context
    let mut ctx = CommandContext::new(&cli, config);

    // Execute the appropriate command
    let exit_code = match &cli.command {
        Commands::Facts(args) => args.execute(&mut ctx).await,
        Commands::Dot1x(args) => args.execute(&mut ctx).await,
    }
    .unwrap_or_else(|e| {
        ctx.output.error(&format!("{:#}", e));
        1
    });

    std::process::exit(exit_code);
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8, logging: &LoggingConfig) {
    let filter = match verbosity {
        0 => logging.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if logging.format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(verbosity >= 3)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
}
