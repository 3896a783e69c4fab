//! ICX CLI output parsers
//!
//! Pure functions from raw `show` command output to structured values.
//! Every parser is tolerant: when a pattern does not match, the value is
//! simply absent and the caller omits the corresponding fact.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Invalid ICX output regex")
}

// `show version`
static VERSION_REGEX: Lazy<Regex> = Lazy::new(|| re(r"SW: Version (\d+\.\d+\.\d+)"));
static MODEL_REGEX: Lazy<Regex> = Lazy::new(|| re(r"(?m)HW: (.+?)\s*$"));
static IMAGE_REGEX: Lazy<Regex> = Lazy::new(|| re(r"\(\d+ bytes\) from \S+ (\S+)"));
static SERIAL_REGEX: Lazy<Regex> = Lazy::new(|| re(r"Serial\s+#:\s*(\S+)"));
static STACK_SLOT_REGEX: Lazy<Regex> = Lazy::new(|| re(r"(?m)^UNIT (\d+): SL (\d+): (\S+)"));
static INFO_REGEX: Lazy<Regex> = Lazy::new(|| re(r"(Unit\d+:[\w-]+,\s*\S+)"));

// `show running-config | include hostname`
static HOSTNAME_REGEX: Lazy<Regex> = Lazy::new(|| re(r"(?m)^\s*hostname (\S+)"));

// `show interfaces` / `show ipv6 interface`
static INTERFACE_HEADER_REGEX: Lazy<Regex> =
    Lazy::new(|| re(r"^(\S+) is ([^,]+), line protocol is (\S+)"));
static HARDWARE_REGEX: Lazy<Regex> = Lazy::new(|| re(r"Hardware is ([^,]+), address is (\S+)"));
static SPEED_DUPLEX_REGEX: Lazy<Regex> = Lazy::new(|| {
    re(r"Configured speed (\S+), actual (\S+), configured duplex (\S+), actual (\S+)")
});
static PORT_NAME_REGEX: Lazy<Regex> = Lazy::new(|| re(r"Port name is (.+?)\s*$"));
static IPV4_REGEX: Lazy<Regex> = Lazy::new(|| re(r"Internet address is ([\d.]+)/(\d+)"));
static MTU_REGEX: Lazy<Regex> = Lazy::new(|| re(r"MTU (\d+) bytes"));
static IPV6_ADDRESS_REGEX: Lazy<Regex> =
    Lazy::new(|| re(r"^\s+([0-9a-fA-F:]+) \[\w+\], subnet is \S+/(\d+)"));

// `show lldp` / `show lldp neighbors detail`
static LOCAL_PORT_REGEX: Lazy<Regex> = Lazy::new(|| re(r"^\s*Local port:\s*(\S+)"));
static NEIGHBOR_REGEX: Lazy<Regex> = Lazy::new(|| re(r"^\s*Neighbor:\s*([^,\s]+)"));
static PORT_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| re(r"^\s*\+ Port ID(?: \([^)]*\))?\s*:\s*(.+?)\s*$"));
static SYSTEM_NAME_REGEX: Lazy<Regex> = Lazy::new(|| re(r"^\s*\+ System name\s*:\s*(.+?)\s*$"));
static SYSTEM_DESCRIPTION_REGEX: Lazy<Regex> =
    Lazy::new(|| re(r"^\s*\+ System description\s*:\s*(.+?)\s*$"));

// `show memory` / `show flash`
static STACK_UNIT_REGEX: Lazy<Regex> = Lazy::new(|| re(r"^\s*Stack unit (\d+):"));
static DYNAMIC_MEMORY_REGEX: Lazy<Regex> =
    Lazy::new(|| re(r"Dynamic memory:\s*(\d+) bytes total,\s*(\d+) bytes free"));
static FLASH_SIZE_REGEX: Lazy<Regex> = Lazy::new(|| re(r"Code Flash Size\s*=\s*(\S+)"));
static FLASH_FREE_REGEX: Lazy<Regex> = Lazy::new(|| re(r"Code Flash Free Space\s*=\s*(\S+)"));

/// A header line and the lines that follow it up to the next header
struct Block<'a> {
    header: regex::Captures<'a>,
    body: Vec<&'a str>,
}

fn split_blocks<'a>(data: &'a str, header: &Regex) -> Vec<Block<'a>> {
    let mut blocks: Vec<Block<'a>> = Vec::new();
    for line in data.lines() {
        if let Some(caps) = header.captures(line) {
            blocks.push(Block {
                header: caps,
                body: Vec::new(),
            });
        } else if let Some(block) = blocks.last_mut() {
            block.body.push(line);
        }
    }
    blocks
}

fn first_capture(regex: &Regex, data: &str) -> Option<String> {
    regex
        .captures(data)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn capture_in_lines<'a>(regex: &Regex, lines: &[&'a str]) -> Option<regex::Captures<'a>> {
    lines.iter().find_map(|line| regex.captures(line))
}

fn unquote(value: &str) -> String {
    value.trim().trim_matches('"').to_string()
}

// ============================================================================
// Default facts
// ============================================================================

/// Software version without the build suffix, e.g. `08.0.95`
pub fn parse_version(data: &str) -> Option<String> {
    first_capture(&VERSION_REGEX, data)
}

/// Hardware description, e.g. `Stackable ICX7150-C12-POE`
pub fn parse_model(data: &str) -> Option<String> {
    first_capture(&MODEL_REGEX, data)
}

/// Image file the active unit booted from
pub fn parse_image(data: &str) -> Option<String> {
    first_capture(&IMAGE_REGEX, data)
}

/// Serial number of the first module listed
pub fn parse_serialnum(data: &str) -> Option<String> {
    first_capture(&SERIAL_REGEX, data)
}

/// Module model of every `UNIT n: SL m:` slot, in listing order
pub fn parse_stacked_models(data: &str) -> Option<Vec<String>> {
    let models: Vec<String> = STACK_SLOT_REGEX
        .captures_iter(data)
        .map(|caps| caps[3].to_string())
        .collect();
    (!models.is_empty()).then_some(models)
}

/// Every serial number listed
pub fn parse_stacked_serialnums(data: &str) -> Option<Vec<String>> {
    let serials: Vec<String> = SERIAL_REGEX
        .captures_iter(data)
        .map(|caps| caps[1].to_string())
        .collect();
    (!serials.is_empty()).then_some(serials)
}

/// Stack member summary such as `Unit3:ICX7150-C12P, BSZ3242M003`
pub fn parse_info(data: &str) -> Option<String> {
    first_capture(&INFO_REGEX, data)
}

pub fn parse_hostname(data: &str) -> Option<String> {
    first_capture(&HOSTNAME_REGEX, data)
}

// ============================================================================
// Interface facts
// ============================================================================

/// IPv4 address assigned to an interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Facts {
    pub address: String,
    pub subnet: String,
}

/// IPv6 global address assigned to an interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv6Facts {
    pub address: String,
    pub subnet: String,
}

/// Per-interface facts from `show interfaces`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceFacts {
    pub operstatus: String,
    pub lineprotocol: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macaddress: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<Ipv4Facts>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ipv6: Vec<Ipv6Facts>,
}

/// Parse `show interfaces` into facts keyed by interface name
pub fn parse_interfaces(data: &str) -> IndexMap<String, InterfaceFacts> {
    let mut interfaces = IndexMap::new();

    for block in split_blocks(data, &INTERFACE_HEADER_REGEX) {
        let name = block.header[1].to_string();
        let mut facts = InterfaceFacts {
            operstatus: block.header[2].trim().to_string(),
            lineprotocol: block.header[3].to_string(),
            ..InterfaceFacts::default()
        };

        if let Some(caps) = capture_in_lines(&HARDWARE_REGEX, &block.body) {
            facts.kind = Some(caps[1].trim().to_string());
            facts.macaddress = Some(caps[2].to_string());
        }
        if let Some(caps) = capture_in_lines(&SPEED_DUPLEX_REGEX, &block.body) {
            facts.bandwidth = Some(caps[2].to_string());
            facts.duplex = Some(caps[4].to_string());
        }
        if let Some(caps) = capture_in_lines(&PORT_NAME_REGEX, &block.body) {
            facts.description = Some(caps[1].to_string());
        }
        if let Some(caps) = capture_in_lines(&IPV4_REGEX, &block.body) {
            facts.ipv4 = Some(Ipv4Facts {
                address: caps[1].to_string(),
                subnet: caps[2].to_string(),
            });
        }
        if let Some(caps) = capture_in_lines(&MTU_REGEX, &block.body) {
            facts.mtu = caps[1].parse().ok();
        }

        interfaces.insert(name, facts);
    }

    interfaces
}

/// Parse `show ipv6 interface` into global addresses keyed by interface name.
///
/// Interfaces without a global address are left out.
pub fn parse_ipv6_interfaces(data: &str) -> IndexMap<String, Vec<Ipv6Facts>> {
    let mut addresses = IndexMap::new();

    for block in split_blocks(data, &INTERFACE_HEADER_REGEX) {
        let entries: Vec<Ipv6Facts> = block
            .body
            .iter()
            .filter_map(|line| IPV6_ADDRESS_REGEX.captures(line))
            .map(|caps| Ipv6Facts {
                address: caps[1].to_string(),
                subnet: caps[2].to_string(),
            })
            .collect();

        if !entries.is_empty() {
            addresses.insert(block.header[1].to_string(), entries);
        }
    }

    addresses
}

/// Whether `show lldp` reports LLDP as running
pub fn lldp_running(data: &str) -> bool {
    !data.trim().is_empty() && !data.contains("LLDP is not running")
}

/// One LLDP neighbor, keyed exactly as reported to callers
pub type Neighbor = IndexMap<String, String>;

/// Parse `show lldp neighbors detail` into neighbors keyed by local port
pub fn parse_neighbors(data: &str) -> IndexMap<String, Vec<Neighbor>> {
    let mut neighbors: IndexMap<String, Vec<Neighbor>> = IndexMap::new();

    for block in split_blocks(data, &LOCAL_PORT_REGEX) {
        let port = block.header[1].to_string();
        let mut entries: Vec<Neighbor> = Vec::new();

        for line in &block.body {
            if let Some(caps) = NEIGHBOR_REGEX.captures(line) {
                let mut entry = Neighbor::new();
                entry.insert("Neighbor".to_string(), caps[1].to_string());
                entries.push(entry);
                continue;
            }

            let Some(entry) = entries.last_mut() else {
                continue;
            };
            if let Some(caps) = PORT_ID_REGEX.captures(line) {
                entry.insert("Port ID".to_string(), unquote(&caps[1]));
            } else if let Some(caps) = SYSTEM_NAME_REGEX.captures(line) {
                entry.insert("System name".to_string(), unquote(&caps[1]));
            } else if let Some(caps) = SYSTEM_DESCRIPTION_REGEX.captures(line) {
                entry.insert("System description".to_string(), unquote(&caps[1]));
            }
        }

        if !entries.is_empty() {
            neighbors.entry(port).or_default().extend(entries);
        }
    }

    neighbors
}

// ============================================================================
// Hardware facts
// ============================================================================

/// Memory figures per stack unit, each keyed `Stack Unit<n>`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryFacts {
    pub total: IndexMap<String, IndexMap<String, String>>,
    pub free: IndexMap<String, IndexMap<String, String>>,
}

fn bytes_to_kb(bytes: u64) -> String {
    format!("{:.1}kb", bytes as f64 / 1024.0)
}

/// Parse `show memory`
pub fn parse_memory(data: &str) -> MemoryFacts {
    let mut memory = MemoryFacts::default();

    for block in split_blocks(data, &STACK_UNIT_REGEX) {
        let unit = format!("Stack Unit{}", &block.header[1]);
        let Some(caps) = capture_in_lines(&DYNAMIC_MEMORY_REGEX, &block.body) else {
            continue;
        };
        let (Ok(total), Ok(free)) = (caps[1].parse::<u64>(), caps[2].parse::<u64>()) else {
            continue;
        };

        memory.total.insert(
            unit.clone(),
            IndexMap::from([("Total Memory".to_string(), bytes_to_kb(total))]),
        );
        memory.free.insert(
            unit,
            IndexMap::from([("Free Memory".to_string(), bytes_to_kb(free))]),
        );
    }

    memory
}

/// Flash space of one stack unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashFacts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacetotal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacefree: Option<String>,
}

/// Raw byte counts become `<n>Kb`; values that carry a unit are kept
fn flash_space(value: &str) -> String {
    match value.parse::<u64>() {
        Ok(bytes) => format!("{}Kb", bytes / 1024),
        Err(_) => value.to_string(),
    }
}

/// Parse `show flash` into flash space keyed `Stack unit <n>`
pub fn parse_flash(data: &str) -> IndexMap<String, FlashFacts> {
    let mut units = IndexMap::new();

    for block in split_blocks(data, &STACK_UNIT_REGEX) {
        let facts = FlashFacts {
            spacetotal: capture_in_lines(&FLASH_SIZE_REGEX, &block.body)
                .map(|caps| flash_space(&caps[1])),
            spacefree: capture_in_lines(&FLASH_FREE_REGEX, &block.body)
                .map(|caps| flash_space(&caps[1])),
        };
        if facts.spacetotal.is_some() || facts.spacefree.is_some() {
            units.insert(format!("Stack unit {}", &block.header[1]), facts);
        }
    }

    units
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERSION: &str = "\
  Copyright (c) Ruckus Networks, Inc. All rights reserved.
    UNIT 1: compiled on Aug  8 2019 at 02:39:10 labeled as SPR08095
      (31536287 bytes) from Primary SPR08095_b437.bin
        SW: Version 08.0.95T213
  HW: Stackable ICX7150-24P
==========================================================================
UNIT 1: SL 1: ICX7150-24P-4X1G 24-port Management Module
      Serial  #:FEC3220N00C
UNIT 1: SL 2: ICX7150-2X1GC 2-port 2G Module
";

    #[test]
    fn test_parse_version_fields() {
        assert_eq!(parse_version(VERSION).as_deref(), Some("08.0.95"));
        assert_eq!(parse_model(VERSION).as_deref(), Some("Stackable ICX7150-24P"));
        assert_eq!(parse_image(VERSION).as_deref(), Some("SPR08095_b437.bin"));
        assert_eq!(parse_serialnum(VERSION).as_deref(), Some("FEC3220N00C"));
        assert_eq!(
            parse_stacked_models(VERSION),
            Some(vec![
                "ICX7150-24P-4X1G".to_string(),
                "ICX7150-2X1GC".to_string()
            ])
        );
    }

    #[test]
    fn test_unmatched_output_yields_nothing() {
        let garbage = "Invalid input -> show versoin\nType ? for a list";
        assert_eq!(parse_version(garbage), None);
        assert_eq!(parse_model(garbage), None);
        assert_eq!(parse_image(garbage), None);
        assert_eq!(parse_stacked_models(garbage), None);
        assert_eq!(parse_info(garbage), None);
        assert_eq!(parse_hostname(garbage), None);
        assert!(parse_interfaces(garbage).is_empty());
        assert!(parse_neighbors(garbage).is_empty());
        assert_eq!(parse_memory(garbage), MemoryFacts::default());
        assert!(parse_flash(garbage).is_empty());
    }

    #[test]
    fn test_parse_hostname() {
        assert_eq!(parse_hostname("hostname core-sw1\n").as_deref(), Some("core-sw1"));
        assert_eq!(parse_hostname("no hostname here"), None);
    }

    #[test]
    fn test_parse_interfaces() {
        let data = "\
GigabitEthernet1/1/2 is disabled, line protocol is down
  Hardware is GigabitEthernet, address is 609c.9fe7.d601 (bia 609c.9fe7.d601)
  Configured speed auto, actual unknown, configured duplex fdx, actual unknown
  No port name
  MTU 1500 bytes, encapsulation ethernet
Ve10 is up, line protocol is up
  Hardware is Virtual Ethernet, address is 609c.9fe7.d600 (bia 609c.9fe7.d600)
  Port name is uplink vlan
  Internet address is 10.1.1.1/30, MTU 9000 bytes, encapsulation ethernet
";
        let interfaces = parse_interfaces(data);
        assert_eq!(interfaces.len(), 2);

        let gi = &interfaces["GigabitEthernet1/1/2"];
        assert_eq!(gi.operstatus, "disabled");
        assert_eq!(gi.lineprotocol, "down");
        assert_eq!(gi.kind.as_deref(), Some("GigabitEthernet"));
        assert_eq!(gi.description, None);
        assert_eq!(gi.ipv4, None);
        assert_eq!(gi.mtu, Some(1500));

        let ve = &interfaces["Ve10"];
        assert_eq!(ve.kind.as_deref(), Some("Virtual Ethernet"));
        assert_eq!(ve.description.as_deref(), Some("uplink vlan"));
        assert_eq!(
            ve.ipv4,
            Some(Ipv4Facts {
                address: "10.1.1.1".into(),
                subnet: "30".into()
            })
        );
        assert_eq!(ve.mtu, Some(9000));
    }

    #[test]
    fn test_parse_ipv6_interfaces() {
        let data = "\
GigabitEthernet1/1/1 is up, line protocol is up
  IPv6 is enabled, link-local address is fe80::629c:9fff:fee7:d600 [Preferred]
  Global unicast address(es):
    2001:db8:10::1 [Preferred], subnet is 2001:db8:10::/64
GigabitEthernet1/1/2 is down, line protocol is down
  IPv6 is disabled
";
        let addresses = parse_ipv6_interfaces(data);
        assert_eq!(addresses.len(), 1);
        assert_eq!(
            addresses["GigabitEthernet1/1/1"],
            vec![Ipv6Facts {
                address: "2001:db8:10::1".into(),
                subnet: "64".into()
            }]
        );
    }

    #[test]
    fn test_lldp_running() {
        assert!(lldp_running("LLDP transmit interval : 30 seconds"));
        assert!(!lldp_running("LLDP is not running"));
        assert!(!lldp_running(""));
        assert!(!lldp_running("  \n"));
    }

    #[test]
    fn test_lldp_running_with_disabled_feature_line() {
        let data = "LLDP transmit interval : 30 seconds\nLLDP-MED location: disabled\n";
        assert!(lldp_running(data));
    }

    #[test]
    fn test_parse_neighbors_multiple_per_port() {
        let data = r#"
Local port: 1/1/3
  Neighbor: 0011.2233.4455, TTL 100 seconds
    + Port ID (locally assigned): "7"
    + System name         : "edge-a"
  Neighbor: 0011.2233.4466, TTL 90 seconds
    + Port ID (MAC address): 0011.2233.4466
"#;
        let neighbors = parse_neighbors(data);
        let port = &neighbors["1/1/3"];
        assert_eq!(port.len(), 2);
        assert_eq!(port[0]["Neighbor"], "0011.2233.4455");
        assert_eq!(port[0]["Port ID"], "7");
        assert_eq!(port[0]["System name"], "edge-a");
        assert!(!port[1].contains_key("System name"));
    }

    #[test]
    fn test_parse_memory() {
        let data = "\
Stack unit 2:
  Total DRAM: 536870912 bytes
    Dynamic memory: 536870912 bytes total, 268435456 bytes free, 50% used
";
        let memory = parse_memory(data);
        assert_eq!(memory.total["Stack Unit2"]["Total Memory"], "524288.0kb");
        assert_eq!(memory.free["Stack Unit2"]["Free Memory"], "262144.0kb");
    }

    #[test]
    fn test_flash_space_units() {
        assert_eq!(flash_space("1318699008"), "1287792Kb");
        assert_eq!(flash_space("2GiB"), "2GiB");
    }
}
