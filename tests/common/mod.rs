//! Shared test utilities and fixtures for the icx-netops test suite.
//!
//! This module provides:
//! - Captured ICX command output, mapped explicitly to the commands
//! - Fixture-backed connections for module tests
//! - Parameter and module execution helpers
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use icx_netops::connection::FixtureConnection;
use icx_netops::modules::{ModuleContext, ModuleOutput, ModuleParams, ModuleRegistry, ModuleResult};

// ============================================================================
// Captured Output
// ============================================================================

pub const SHOW_VERSION: &str = include_str!("../fixtures/icx/show_version.txt");
pub const SHOW_HOSTNAME: &str =
    include_str!("../fixtures/icx/show_running-config_include_hostname.txt");
pub const SHOW_INTERFACES: &str = include_str!("../fixtures/icx/show_interfaces.txt");
pub const SHOW_IPV6_INTERFACE: &str = include_str!("../fixtures/icx/show_ipv6_interface.txt");
pub const SHOW_LLDP: &str = include_str!("../fixtures/icx/show_lldp.txt");
pub const SHOW_LLDP_NEIGHBORS: &str =
    include_str!("../fixtures/icx/show_lldp_neighbors_detail.txt");
pub const SHOW_MEMORY: &str = include_str!("../fixtures/icx/show_memory.txt");
pub const SHOW_FLASH: &str = include_str!("../fixtures/icx/show_flash.txt");
pub const SHOW_RUNNING_CONFIG: &str = include_str!("../fixtures/icx/show_running-config.txt");

/// Directory holding the captured output files
pub fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/icx")
}

/// A connection answering every show command the ICX modules issue
pub fn icx_switch() -> FixtureConnection {
    FixtureConnection::new("ruchusRouter148")
        .with_response("show version", SHOW_VERSION)
        .with_response("show running-config | include hostname", SHOW_HOSTNAME)
        .with_response("show interfaces", SHOW_INTERFACES)
        .with_response("show ipv6 interface", SHOW_IPV6_INTERFACE)
        .with_response("show lldp", SHOW_LLDP)
        .with_response("show lldp neighbors detail", SHOW_LLDP_NEIGHBORS)
        .with_response("show memory", SHOW_MEMORY)
        .with_response("show flash", SHOW_FLASH)
        .with_response("show running-config", SHOW_RUNNING_CONFIG)
}

/// The session text sent for one show command
pub fn show_session(command: &str) -> String {
    format!("skip-page-display\n{}", command)
}

// ============================================================================
// Module Helpers
// ============================================================================

/// Build module parameters from a JSON object
pub fn params(value: serde_json::Value) -> ModuleParams {
    serde_json::from_value(value).expect("params must be a JSON object")
}

/// Execute a built-in module against a connection
pub fn run_module(
    name: &str,
    params: &ModuleParams,
    connection: Arc<FixtureConnection>,
) -> ModuleResult<ModuleOutput> {
    let context = ModuleContext::new().with_connection(connection);
    ModuleRegistry::with_builtins().execute(name, params, &context)
}

/// Execute `icx_facts` with the given subsets and return `ansible_facts`
pub fn gather(subsets: &[&str]) -> serde_json::Value {
    let output = run_module(
        "icx_facts",
        &params(serde_json::json!({ "gather_subset": subsets })),
        Arc::new(icx_switch()),
    )
    .expect("icx_facts failed");
    assert!(!output.changed);
    output.data["ansible_facts"].clone()
}

/// Execute `icx_flex_dot1x` and return the reported command list
pub fn dot1x_commands(value: serde_json::Value) -> Vec<String> {
    let connection = Arc::new(FixtureConnection::new("sw").accepting_unknown());
    let output = run_module("icx_flex_dot1x", &params(value), connection)
        .expect("icx_flex_dot1x failed");
    assert!(output.changed);
    serde_json::from_value(output.data["commands"].clone()).expect("commands must be strings")
}
