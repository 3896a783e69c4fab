//! Facts command
//!
//! This module implements the `facts` subcommand, which runs `icx_facts`
//! against the target.

use super::CommandContext;
use anyhow::Result;
use clap::Parser;
use icx_netops::modules::ModuleParams;

/// Arguments for the facts command
#[derive(Parser, Debug, Clone)]
pub struct FactsArgs {
    /// Fact subsets to gather (default, hardware, interfaces, all, !name)
    #[arg(
        long,
        short = 's',
        value_delimiter = ',',
        default_value = "all",
        allow_hyphen_values = true
    )]
    pub gather_subset: Vec<String>,
}

impl FactsArgs {
    /// Module parameters for these arguments
    pub fn params(&self) -> ModuleParams {
        let mut params = ModuleParams::new();
        params.insert(
            "gather_subset".to_string(),
            serde_json::json!(self.gather_subset),
        );
        params
    }

    /// Execute the facts command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        ctx.run_module("icx_facts", &self.params(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facts_args_default_subset() {
        let args = FactsArgs::try_parse_from(["facts"]).unwrap();
        assert_eq!(args.gather_subset, vec!["all"]);
    }

    #[test]
    fn test_facts_args_subset_list() {
        let args = FactsArgs::try_parse_from(["facts", "--gather-subset", "hardware,!interfaces"])
            .unwrap();
        assert_eq!(args.gather_subset, vec!["hardware", "!interfaces"]);
        assert_eq!(
            args.params()["gather_subset"],
            serde_json::json!(["hardware", "!interfaces"])
        );
    }
}
