//! ICX facts module
//!
//! Gathers facts from an ICX switch. The `gather_subset` parameter selects
//! which groups of show commands are issued:
//!
//! - `default`: model, version, hostname, image, serial numbers, stack members
//! - `hardware`: flash filesystems and memory per stack unit
//! - `interfaces`: per-interface addressing and LLDP neighbors
//! - `all`: every subset above
//!
//! A subset prefixed with `!` is excluded. `default` is always gathered.
//!
//! # Example
//!
//! ```yaml
//! - name: Gather hardware facts
//!   icx_facts:
//!     gather_subset:
//!       - hardware
//! ```

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::common::{block_on, NetworkDeviceConnection};
use super::icx_parsers as parsers;
use crate::facts::FactSet;
use crate::modules::{
    Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleResult, ParamExt,
};

/// Prefix applied to every fact name reported to callers
pub const FACTS_PREFIX: &str = "ansible_";

/// A named group of facts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FactSubset {
    Default,
    Hardware,
    Interfaces,
}

impl FactSubset {
    /// Every gatherable subset
    pub const ALL: [FactSubset; 3] = [
        FactSubset::Default,
        FactSubset::Hardware,
        FactSubset::Interfaces,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FactSubset::Default => "default",
            FactSubset::Hardware => "hardware",
            FactSubset::Interfaces => "interfaces",
        }
    }
}

impl std::fmt::Display for FactSubset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FactSubset {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(FactSubset::Default),
            "hardware" => Ok(FactSubset::Hardware),
            "interfaces" => Ok(FactSubset::Interfaces),
            other => Err(ModuleError::InvalidParameter(format!(
                "Subset must be one of [default, hardware, interfaces], got {}",
                other
            ))),
        }
    }
}

/// Resolve requested subset names into the subsets to gather.
///
/// `all` selects every subset and `!name` (or `!all`) excludes. When only
/// exclusions are given, the starting point is every subset. `default` is
/// always part of the result.
pub fn resolve_subsets<S: AsRef<str>>(requested: &[S]) -> ModuleResult<BTreeSet<FactSubset>> {
    let mut include = BTreeSet::new();
    let mut exclude = BTreeSet::new();

    for name in requested {
        let name = name.as_ref().trim();
        if name.is_empty() {
            continue;
        }

        let (negated, name) = match name.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, name),
        };

        let selected: Vec<FactSubset> = if name == "all" {
            FactSubset::ALL.to_vec()
        } else {
            vec![name.parse()?]
        };

        if negated {
            exclude.extend(selected);
        } else {
            include.extend(selected);
        }
    }

    if include.is_empty() {
        include.extend(FactSubset::ALL);
    }

    let mut resolved: BTreeSet<FactSubset> = include.difference(&exclude).copied().collect();
    resolved.insert(FactSubset::Default);
    Ok(resolved)
}

fn to_json<T: Serialize>(value: &T) -> ModuleResult<Value> {
    serde_json::to_value(value).map_err(|e| ModuleError::ParseError(e.to_string()))
}

// ============================================================================
// Collectors
// ============================================================================

const SHOW_VERSION: &str = "show version";
const SHOW_HOSTNAME: &str = "show running-config | include hostname";
const SHOW_MEMORY: &str = "show memory";
const SHOW_FLASH: &str = "show flash";
const SHOW_INTERFACES: &str = "show interfaces";
const SHOW_IPV6_INTERFACE: &str = "show ipv6 interface";
const SHOW_LLDP: &str = "show lldp";
const SHOW_LLDP_NEIGHBORS: &str = "show lldp neighbors detail";

/// Populate the default facts from `show version` and hostname output
pub fn populate_default(version: &str, hostname: &str, facts: &mut FactSet) {
    facts.set_opt("net_model", parsers::parse_model(version));
    facts.set_opt("net_version", parsers::parse_version(version));
    facts.set_opt("net_hostname", parsers::parse_hostname(hostname));
    facts.set_opt("net_image", parsers::parse_image(version));
    facts.set_opt("net_serialnum", parsers::parse_serialnum(version));
    facts.set_opt("net_stacked_models", parsers::parse_stacked_models(version));
    facts.set_opt(
        "net_stacked_serialnums",
        parsers::parse_stacked_serialnums(version),
    );
    facts.set_opt("net_info", parsers::parse_info(version));
}

/// Populate flash and memory facts
pub fn populate_hardware(memory: &str, flash: &str, facts: &mut FactSet) -> ModuleResult<()> {
    let flash_units = parsers::parse_flash(flash);
    if !flash_units.is_empty() {
        facts.set("net_filesystems", json!("flash"));
        facts.set(
            "net_filesystems_info",
            json!({ "flash": to_json(&flash_units)? }),
        );
    }

    let memory = parsers::parse_memory(memory);
    if !memory.free.is_empty() {
        facts.set("net_memfree_kb", to_json(&memory.free)?);
    }
    if !memory.total.is_empty() {
        facts.set("net_memtotal_kb", to_json(&memory.total)?);
    }
    Ok(())
}

/// Populate interface, address and neighbor facts.
///
/// `neighbors` is `None` when LLDP is not running on the switch.
pub fn populate_interfaces(
    interfaces: &str,
    ipv6: &str,
    neighbors: Option<&str>,
    facts: &mut FactSet,
) -> ModuleResult<()> {
    let mut parsed = parsers::parse_interfaces(interfaces);
    let ipv6_addresses = parsers::parse_ipv6_interfaces(ipv6);

    let all_ipv4: Vec<String> = parsed
        .values()
        .filter_map(|facts| facts.ipv4.as_ref())
        .map(|ipv4| ipv4.address.clone())
        .collect();

    let mut all_ipv6 = Vec::new();
    for (name, addresses) in ipv6_addresses {
        all_ipv6.extend(addresses.iter().map(|a| a.address.clone()));
        if let Some(interface) = parsed.get_mut(&name) {
            interface.ipv6 = addresses;
        }
    }

    facts.set("net_all_ipv4_addresses", json!(all_ipv4));
    facts.set("net_all_ipv6_addresses", json!(all_ipv6));
    facts.set("net_interfaces", to_json(&parsed)?);

    if let Some(neighbors) = neighbors {
        facts.set(
            "net_neighbors",
            to_json(&parsers::parse_neighbors(neighbors))?,
        );
    }
    Ok(())
}

async fn collect_default(device: &NetworkDeviceConnection, facts: &mut FactSet) -> ModuleResult<()> {
    let outputs = device
        .run_commands(&[SHOW_VERSION.to_string(), SHOW_HOSTNAME.to_string()])
        .await?;
    populate_default(&outputs[0], &outputs[1], facts);
    Ok(())
}

async fn collect_hardware(
    device: &NetworkDeviceConnection,
    facts: &mut FactSet,
) -> ModuleResult<()> {
    let outputs = device
        .run_commands(&[SHOW_MEMORY.to_string(), SHOW_FLASH.to_string()])
        .await?;
    populate_hardware(&outputs[0], &outputs[1], facts)
}

async fn collect_interfaces(
    device: &NetworkDeviceConnection,
    facts: &mut FactSet,
) -> ModuleResult<()> {
    let outputs = device
        .run_commands(&[
            SHOW_INTERFACES.to_string(),
            SHOW_IPV6_INTERFACE.to_string(),
            SHOW_LLDP.to_string(),
        ])
        .await?;

    let neighbors = if parsers::lldp_running(&outputs[2]) {
        Some(device.execute_command(SHOW_LLDP_NEIGHBORS).await?)
    } else {
        debug!(host = %device.hostname(), "LLDP not running, skipping neighbors");
        None
    };

    populate_interfaces(&outputs[0], &outputs[1], neighbors.as_deref(), facts)
}

/// Gather the facts of the given subsets from a switch
pub async fn gather_facts(
    device: &NetworkDeviceConnection,
    subsets: &BTreeSet<FactSubset>,
) -> ModuleResult<FactSet> {
    let mut facts = FactSet::new();
    facts.set(
        "net_gather_subset",
        json!(subsets.iter().map(|s| s.as_str()).collect::<Vec<_>>()),
    );
    facts.set("net_api", json!("cliconf"));

    for subset in subsets {
        debug!(host = %device.hostname(), subset = %subset, "Collecting facts");
        match subset {
            FactSubset::Default => collect_default(device, &mut facts).await?,
            FactSubset::Hardware => collect_hardware(device, &mut facts).await?,
            FactSubset::Interfaces => collect_interfaces(device, &mut facts).await?,
        }
    }

    Ok(facts)
}

// ============================================================================
// Module
// ============================================================================

/// Module that gathers facts from ICX switches
pub struct IcxFactsModule;

impl IcxFactsModule {
    fn requested_subsets(params: &ModuleParams) -> ModuleResult<Vec<String>> {
        Ok(params
            .get_vec_string("gather_subset")?
            .unwrap_or_else(|| vec!["all".to_string()]))
    }
}

impl Module for IcxFactsModule {
    fn name(&self) -> &'static str {
        "icx_facts"
    }

    fn description(&self) -> &'static str {
        "Collect facts from Ruckus ICX switches"
    }

    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        resolve_subsets(&Self::requested_subsets(params)?)?;
        Ok(())
    }

    fn execute(&self, params: &ModuleParams, context: &ModuleContext) -> ModuleResult<ModuleOutput> {
        let subsets = resolve_subsets(&Self::requested_subsets(params)?)?;

        let connection = context.connection.as_ref().ok_or_else(|| {
            ModuleError::ExecutionFailed("No connection available for icx_facts".to_string())
        })?;
        let device = NetworkDeviceConnection::new(Arc::clone(connection));

        let facts = block_on(gather_facts(&device, &subsets))??;
        info!(host = %device.hostname(), facts = facts.len(), "Gathered facts");

        Ok(ModuleOutput::ok(format!(
            "Gathered {} facts from {}",
            facts.len(),
            device.hostname()
        ))
        .with_data("ansible_facts", facts.to_prefixed_json(FACTS_PREFIX)))
    }
}
