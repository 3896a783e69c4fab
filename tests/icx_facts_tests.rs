//! Tests for the icx_facts module against captured ICX output.

mod common;

use common::*;
use icx_netops::connection::FixtureConnection;
use icx_netops::modules::network::{gather_facts, resolve_subsets, NetworkDeviceConnection};
use icx_netops::modules::ModuleError;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

const HARDWARE_KEYS: [&str; 4] = [
    "ansible_net_filesystems",
    "ansible_net_filesystems_info",
    "ansible_net_memfree_kb",
    "ansible_net_memtotal_kb",
];

const INTERFACE_KEYS: [&str; 4] = [
    "ansible_net_interfaces",
    "ansible_net_all_ipv4_addresses",
    "ansible_net_all_ipv6_addresses",
    "ansible_net_neighbors",
];

fn keys(facts: &serde_json::Value) -> Vec<String> {
    let mut keys: Vec<String> = facts
        .as_object()
        .expect("facts must be an object")
        .keys()
        .cloned()
        .collect();
    keys.sort();
    keys
}

fn assert_default_facts(facts: &serde_json::Value) {
    assert_eq!(facts["ansible_net_model"], "Stackable ICX7150-C12-POE");
    assert_eq!(facts["ansible_net_info"], "Unit3:ICX7150-C12P, BSZ3242M003");
    assert_eq!(facts["ansible_net_version"], "08.0.95");
    assert_eq!(facts["ansible_net_hostname"], "ruchusRouter148");
    assert_eq!(facts["ansible_net_image"], "SPR08095_b437.bin");
    assert_eq!(
        facts["ansible_net_stacked_models"],
        json!([
            "ICX7150-24P-2X10G_2X1G",
            "ICX7150-2X1GC",
            "ICX7150-4X10GF",
            "ICX7150-48P-4X1G",
            "ICX7150-2X1GC",
            "ICX7150-4X10GF",
            "ICX7150-C12-2X1G",
            "ICX7150-2X1GC",
            "ICX7150-2X10GF"
        ])
    );
}

fn assert_hardware_facts(facts: &serde_json::Value) {
    assert_eq!(facts["ansible_net_filesystems"], "flash");
    assert_eq!(
        facts["ansible_net_filesystems_info"],
        json!({"flash": {"Stack unit 1": {"spacetotal": "2GiB", "spacefree": "1287792Kb"}}})
    );
    assert_eq!(
        facts["ansible_net_memfree_kb"]["Stack Unit1"]["Free Memory"],
        "367152.0kb"
    );
    assert_eq!(
        facts["ansible_net_memtotal_kb"]["Stack Unit1"]["Total Memory"],
        "932320.0kb"
    );
}

fn assert_interface_facts(facts: &serde_json::Value) {
    let gi = &facts["ansible_net_interfaces"]["GigabitEthernet1/1/1"];
    assert_eq!(gi["macaddress"], "609c.9fe7.d600");
    assert_eq!(gi["ipv4"]["address"], "192.168.1.1");
    assert_eq!(gi["ipv4"]["subnet"], "24");
    assert_eq!(
        facts["ansible_net_neighbors"]["1/1/1"],
        json!([{
            "Port ID": "609c.9f31.afe0",
            "System name": "ICX7450-48 Router",
            "System description": "Cisco IP Phone 9971, V1, sip9971.9-0-0-77",
            "Neighbor": "609c.9f31.afe0"
        }])
    );
}

#[test]
fn test_icx_facts_default() {
    let facts = gather(&["default"]);
    assert_default_facts(&facts);
    assert_eq!(facts["ansible_net_serialnum"], "FEC3220N00C");
    assert_eq!(
        facts["ansible_net_stacked_serialnums"],
        json!(["FEC3220N00C", "FEC3230N01D", "BSZ3242M003"])
    );
    assert_eq!(facts["ansible_net_gather_subset"], json!(["default"]));
    assert_eq!(facts["ansible_net_api"], "cliconf");

    for key in HARDWARE_KEYS.iter().chain(INTERFACE_KEYS.iter()) {
        assert!(facts.get(key).is_none(), "{} should not be gathered", key);
    }
}

#[test]
fn test_icx_facts_interfaces() {
    let facts = gather(&["interfaces"]);
    assert_interface_facts(&facts);
    assert_default_facts(&facts);
}

#[test]
fn test_icx_facts_interface_details() {
    let facts = gather(&["interfaces"]);
    let interfaces = &facts["ansible_net_interfaces"];

    let gi = &interfaces["GigabitEthernet1/1/1"];
    assert_eq!(gi["operstatus"], "up");
    assert_eq!(gi["lineprotocol"], "up");
    assert_eq!(gi["type"], "GigabitEthernet");
    assert_eq!(gi["description"], "uplink-core");
    assert_eq!(gi["mtu"], 1500);
    assert_eq!(gi["bandwidth"], "1Gbit");
    assert_eq!(gi["duplex"], "fdx");
    assert_eq!(
        gi["ipv6"],
        json!([{"address": "2001:db8:10::1", "subnet": "64"}])
    );

    let disabled = &interfaces["GigabitEthernet1/1/2"];
    assert_eq!(disabled["operstatus"], "disabled");
    assert_eq!(disabled["lineprotocol"], "down");
    assert!(disabled.get("ipv4").is_none());
    assert!(disabled.get("description").is_none());

    assert_eq!(interfaces["10GigabitEthernet1/2/1"]["mtu"], 9216);
    assert_eq!(facts["ansible_net_all_ipv4_addresses"], json!(["192.168.1.1"]));
    assert_eq!(facts["ansible_net_all_ipv6_addresses"], json!(["2001:db8:10::1"]));
}

#[test]
fn test_icx_facts_hardware() {
    let facts = gather(&["hardware"]);
    assert_hardware_facts(&facts);
    for key in INTERFACE_KEYS {
        assert!(facts.get(key).is_none(), "{} should not be gathered", key);
    }
}

#[test]
fn test_icx_facts_not_hardware() {
    let facts = gather(&["!hardware"]);
    for key in HARDWARE_KEYS {
        assert!(facts.get(key).is_none(), "{} should not be gathered", key);
    }
    assert_default_facts(&facts);
    assert_interface_facts(&facts);
}

#[test]
fn test_icx_facts_all() {
    let facts = gather(&["all"]);
    assert_hardware_facts(&facts);
    assert_interface_facts(&facts);
    assert_default_facts(&facts);
    assert_eq!(
        facts["ansible_net_gather_subset"],
        json!(["default", "hardware", "interfaces"])
    );
}

#[test]
fn test_icx_facts_all_is_union_of_subsets() {
    let all = gather(&["all"]);

    let mut union = serde_json::Map::new();
    for subset in ["default", "hardware", "interfaces"] {
        if let serde_json::Value::Object(facts) = gather(&[subset]) {
            union.extend(facts);
        }
    }
    union.remove("ansible_net_gather_subset");

    let mut all = all.as_object().cloned().unwrap();
    all.remove("ansible_net_gather_subset");

    assert_eq!(keys(&json!(all)), keys(&json!(union)));
    assert_eq!(json!(all), json!(union));
}

#[test]
fn test_icx_facts_default_subset_is_all() {
    let connection = Arc::new(icx_switch());
    let output = run_module("icx_facts", &params(json!({})), connection).unwrap();
    assert_eq!(output.data["ansible_facts"], gather(&["all"]));
}

#[test]
fn test_icx_facts_unknown_subset_fails() {
    let err = run_module(
        "icx_facts",
        &params(json!({"gather_subset": ["config"]})),
        Arc::new(icx_switch()),
    )
    .unwrap_err();
    assert!(matches!(err, ModuleError::InvalidParameter(_)));
}

#[test]
fn test_icx_facts_issues_only_selected_commands() {
    let connection = Arc::new(icx_switch());
    run_module(
        "icx_facts",
        &params(json!({"gather_subset": ["hardware"]})),
        connection.clone(),
    )
    .unwrap();

    assert_eq!(
        connection.executed(),
        [
            "show version",
            "show running-config | include hostname",
            "show memory",
            "show flash"
        ]
        .map(show_session)
        .to_vec()
    );
}

#[test]
fn test_unmatched_output_omits_facts() {
    let connection = Arc::new(
        FixtureConnection::new("odd-switch")
            .with_response("show version", "Invalid input -> show version")
            .with_response("show running-config | include hostname", ""),
    );
    let output = run_module(
        "icx_facts",
        &params(json!({"gather_subset": ["default"]})),
        connection,
    )
    .unwrap();

    let facts = &output.data["ansible_facts"];
    assert_eq!(
        keys(facts),
        vec!["ansible_net_api", "ansible_net_gather_subset"]
    );
}

#[test]
fn test_failed_command_fails_module() {
    let connection = Arc::new(
        FixtureConnection::new("sw").with_response("show version", SHOW_VERSION),
    );
    let err = run_module(
        "icx_facts",
        &params(json!({"gather_subset": ["default"]})),
        connection,
    )
    .unwrap_err();
    assert!(matches!(err, ModuleError::ExecutionFailed(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gather_facts_async() {
    let device = NetworkDeviceConnection::new(Arc::new(icx_switch()));
    let subsets = resolve_subsets(&["hardware"]).unwrap();

    let facts = gather_facts(&device, &subsets).await.unwrap();
    assert_eq!(facts.get("net_filesystems"), Some(&json!("flash")));
    assert!(facts.contains("net_model"));
}
