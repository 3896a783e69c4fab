//! Dot1x command
//!
//! This module implements the `dot1x` subcommand, which runs
//! `icx_flex_dot1x` with parameters read from a YAML or JSON file.

use super::CommandContext;
use anyhow::{bail, Context, Result};
use clap::Parser;
use icx_netops::modules::ModuleParams;
use std::path::{Path, PathBuf};

/// Arguments for the dot1x command
#[derive(Parser, Debug, Clone)]
pub struct Dot1xArgs {
    /// File with the desired dot1x settings (YAML or JSON)
    #[arg(long, required = true)]
    pub params: PathBuf,

    /// Show the commands without applying them
    #[arg(long)]
    pub check: bool,

    /// Skip commands the running configuration already satisfies
    #[arg(long)]
    pub check_running_config: bool,
}

/// Read module parameters from a YAML or JSON mapping
pub fn load_params(path: &Path) -> Result<ModuleParams> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read params file: {}", path.display()))?;
    let value: serde_json::Value = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse params file: {}", path.display()))?;

    match value {
        serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
        _ => bail!("Params file {} must contain a mapping", path.display()),
    }
}

impl Dot1xArgs {
    /// Execute the dot1x command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let mut params = load_params(&self.params)?;

        let check_running = self.check_running_config || ctx.config.defaults.check_running_config;
        if check_running {
            params
                .entry("check_running_config".to_string())
                .or_insert(serde_json::Value::Bool(true));
        }

        if self.check {
            ctx.output
                .warning("Check mode: no changes will be made to the switch");
        }

        ctx.run_module("icx_flex_dot1x", &params, self.check)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot1x_args_parsing() {
        let args = Dot1xArgs::try_parse_from(["dot1x", "--params", "dot1x.yml", "--check"]).unwrap();
        assert_eq!(args.params, PathBuf::from("dot1x.yml"));
        assert!(args.check);
        assert!(!args.check_running_config);
    }

    #[test]
    fn test_load_params_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot1x.yml");
        std::fs::write(&path, "enable:\n  all: true\nguest_vlan:\n  vlan_id: 12\n").unwrap();

        let params = load_params(&path).unwrap();
        assert_eq!(params["enable"], serde_json::json!({"all": true}));
        assert_eq!(params["guest_vlan"]["vlan_id"], 12);
    }

    #[test]
    fn test_load_params_rejects_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot1x.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        assert!(load_params(&path).is_err());
    }
}
