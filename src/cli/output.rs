//! Output formatting module for icx-netops
//!
//! Prints module results in the selected format and routes diagnostics to
//! stderr.

use anyhow::Result;
use colored::Colorize;
use icx_netops::modules::ModuleOutput;
use icx_netops::output::{commands_block, facts_block, result_line};

use super::OutputFormat;

/// Output formatter for different output modes
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// Selected output format
    format: OutputFormat,
    /// Verbosity level
    verbosity: u8,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, format: OutputFormat, verbosity: u8) -> Self {
        // Respect NO_COLOR environment variable
        let use_color = use_color && std::env::var("NO_COLOR").is_err();
        if !use_color {
            colored::control::set_override(false);
        }

        Self {
            use_color,
            format,
            verbosity,
        }
    }

    fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "ERROR:".red().bold(), message);
        } else {
            eprintln!("ERROR: {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "WARNING:".yellow().bold(), message);
        } else {
            eprintln!("WARNING: {}", message);
        }
    }

    /// Print an info message (respects verbosity)
    pub fn info(&self, message: &str) {
        if self.verbosity < 1 || !self.is_human() {
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "INFO:".blue(), message);
        } else {
            eprintln!("INFO: {}", message);
        }
    }

    /// Print a module result
    pub fn module_result(&self, host: &str, output: &ModuleOutput) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&Self::document(host, output)?)?);
            }
            OutputFormat::Yaml => {
                print!("{}", serde_yaml::to_string(&Self::document(host, output)?)?);
            }
            OutputFormat::Human => {
                println!("{}", result_line(host, output, self.use_color));

                if let Some(facts) = output.data.get("ansible_facts") {
                    print!("{}", facts_block(facts)?);
                }

                let commands: Vec<String> = output
                    .data
                    .get("commands")
                    .and_then(|c| serde_json::from_value(c.clone()).ok())
                    .unwrap_or_default();
                if !commands.is_empty() {
                    println!("{}", commands_block(&commands, self.use_color));
                }
            }
        }
        Ok(())
    }

    /// Result document for machine-readable formats
    fn document(host: &str, output: &ModuleOutput) -> Result<serde_json::Value> {
        let mut doc = serde_json::to_value(output)?;
        if let Some(map) = doc.as_object_mut() {
            map.insert("host".to_string(), serde_json::json!(host));
        }
        Ok(doc)
    }
}
