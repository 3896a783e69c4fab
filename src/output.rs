//! Output and reporting for icx-netops
//!
//! Renders module results as text. Every function returns the rendered
//! string so the caller decides where it goes.

use colored::Colorize;

use crate::modules::{ModuleOutput, ModuleStatus};

/// Status word for a module result, colored when requested
pub fn status_word(status: ModuleStatus, use_color: bool) -> String {
    let word = status.to_string();
    if !use_color {
        return word;
    }
    match status {
        ModuleStatus::Ok => word.green().to_string(),
        ModuleStatus::Changed => word.yellow().to_string(),
    }
}

/// Render a result line such as `changed: [sw1] => Applied 3 dot1x command(s)`
pub fn result_line(host: &str, output: &ModuleOutput, use_color: bool) -> String {
    let host = if use_color {
        host.bright_white().bold().to_string()
    } else {
        host.to_string()
    };
    format!(
        "{}: [{}] => {}",
        status_word(output.status, use_color),
        host,
        output.msg
    )
}

/// Render a command list as `+`-prefixed lines
pub fn commands_block(commands: &[String], use_color: bool) -> String {
    commands
        .iter()
        .map(|cmd| {
            let line = format!("+ {}", cmd);
            if use_color {
                line.green().to_string()
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render gathered facts as YAML
pub fn facts_block(facts: &serde_json::Value) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(facts)
}
