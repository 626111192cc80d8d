//! Structural, cross-reference, topology and routing checks.
//!
//! Every check runs; violations are accumulated rather than returned on the
//! first failure.

pub mod schema;
mod topology;

pub use topology::validate_pair;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

use crate::models::{DeviceConfig, InterfaceKind, InterfaceMode, PortSelector};
use crate::utils::{is_valid_hostname, port_in_range};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Schema,
    CrossReference,
    Topology,
    Routing,
    Pair,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::Schema => "schema",
            ViolationKind::CrossReference => "cross_reference",
            ViolationKind::Topology => "topology",
            ViolationKind::Routing => "routing",
            ViolationKind::Pair => "pair",
        }
    }
}

/// One violation, addressed by a dotted path into the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ValidationError {
    pub fn new(kind: ViolationKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind.as_str(), self.path, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " (hint: {})", hint)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.valid = false;
        self.errors.push(error);
    }

    pub fn add(&mut self, kind: ViolationKind, path: impl Into<String>, message: impl Into<String>) {
        self.push(ValidationError::new(kind, path, message));
    }

    /// Append another result, prefixing its paths (`tor1.` etc.).
    pub fn merge_prefixed(&mut self, prefix: &str, other: ValidationResult) {
        for mut error in other.errors {
            error.path = format!("{}.{}", prefix, error.path);
            self.push(error);
        }
    }

    pub fn count(&self, kind: ViolationKind) -> usize {
        self.errors.iter().filter(|e| e.kind == kind).count()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return f.write_str("Validation successful");
        }
        let lines: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        f.write_str(&lines.join("\n"))
    }
}

/// Validate one device configuration.
pub fn validate(config: &DeviceConfig) -> ValidationResult {
    let mut result = ValidationResult::new();
    check_structure(config, &mut result);
    check_references(config, &mut result);
    topology::check_topology(config, &mut result);
    topology::check_routing(config, &mut result);
    debug!(
        hostname = %config.switch.hostname,
        errors = result.errors.len(),
        "Validated device config"
    );
    result
}

fn check_structure(config: &DeviceConfig, result: &mut ValidationResult) {
    use ViolationKind::Schema;

    let switch = &config.switch;
    if !is_valid_hostname(&switch.hostname) {
        result.add(Schema, "switch.hostname", format!("Invalid hostname '{}'", switch.hostname));
    }
    if switch.vendor.trim().is_empty() {
        result.add(Schema, "switch.vendor", "Vendor is required");
    }
    if switch.model.trim().is_empty() {
        result.add(Schema, "switch.model", "Model is required");
    }

    for (idx, vlan) in config.vlans.iter().enumerate() {
        if vlan.vlan_id == 0 || vlan.vlan_id > 4094 {
            result.add(Schema, format!("vlans[{}].vlan_id", idx), format!("VLAN id {} is outside 1-4094", vlan.vlan_id));
        }
        if vlan.name.trim().is_empty() {
            result.add(Schema, format!("vlans[{}].name", idx), "VLAN name is required");
        }
        if let Some(svi) = &vlan.interface {
            if svi.cidr > 32 {
                result.add(Schema, format!("vlans[{}].interface.cidr", idx), format!("Prefix length {} is outside 0-32", svi.cidr));
            }
            if let Some(mtu) = svi.mtu {
                if !(576..=9216).contains(&mtu) {
                    result.add(Schema, format!("vlans[{}].interface.mtu", idx), format!("MTU {} is outside 576-9216", mtu));
                }
            }
        }
    }

    for (idx, intf) in config.interfaces.iter().enumerate() {
        if intf.name.trim().is_empty() {
            result.add(Schema, format!("interfaces[{}].name", idx), "Interface name is required");
        }
        let empty_port = match &intf.ports {
            PortSelector::Single { intf } => intf.trim().is_empty(),
            PortSelector::Range { start_intf, end_intf } => {
                start_intf.trim().is_empty() || end_intf.trim().is_empty()
            }
        };
        if empty_port {
            result.add(Schema, format!("interfaces[{}]", idx), "Interface needs intf or start_intf/end_intf");
        }
        if intf.mode == InterfaceMode::Access && intf.access_vlan.is_none() {
            result.add(Schema, format!("interfaces[{}].access_vlan", idx), "Access interface needs an access_vlan");
        }
        if intf.mode == InterfaceMode::L3 && intf.ipv4.is_none() {
            result.add(Schema, format!("interfaces[{}].ipv4", idx), "Layer-3 interface has no address");
        }
    }

    for (idx, pc) in config.port_channels.iter().enumerate() {
        if pc.id == 0 {
            result.add(Schema, format!("port_channels[{}].id", idx), "Port-channel id must be positive");
        }
        if pc.mode == InterfaceMode::L3 && pc.ipv4.is_none() {
            result.add(Schema, format!("port_channels[{}].ipv4", idx), "Layer-3 port-channel has no address");
        }
    }

    if let Some(mlag) = &config.mlag {
        if mlag.domain_id == 0 {
            result.add(Schema, "mlag.domain_id", "MLAG domain id must be positive");
        }
    }
    if let Some(bgp) = &config.bgp {
        if bgp.asn == 0 {
            result.add(Schema, "bgp.asn", "BGP ASN must be positive");
        }
        for (idx, neighbor) in bgp.neighbors.iter().enumerate() {
            if neighbor.remote_as == 0 {
                result.add(Schema, format!("bgp.neighbors[{}].remote_as", idx), "Remote AS must be positive");
            }
        }
    }

    for (name, entries) in &config.prefix_lists {
        for (idx, entry) in entries.iter().enumerate() {
            let path = format!("prefix_lists.{}[{}]", name, idx);
            let len = entry.prefix.prefix_len();
            if entry.ge.is_some_and(|ge| ge < len || ge > 32) {
                result.add(Schema, format!("{}.ge", path), format!("ge must be between {} and 32", len));
            }
            if entry.le.is_some_and(|le| le < len || le > 32) {
                result.add(Schema, format!("{}.le", path), format!("le must be between {} and 32", len));
            }
            if let (Some(ge), Some(le)) = (entry.ge, entry.le) {
                if ge > le {
                    result.add(Schema, path, "ge must not exceed le");
                }
            }
        }
    }
}

fn check_references(config: &DeviceConfig, result: &mut ValidationResult) {
    use ViolationKind::CrossReference;

    let vlan_ids: BTreeSet<u16> = config.vlans.iter().map(|v| v.vlan_id).collect();
    let missing = |id: u16| format!("Referenced VLAN {} does not exist", id);

    for (idx, intf) in config.interfaces.iter().enumerate() {
        for (field, id) in [("access_vlan", intf.access_vlan), ("native_vlan", intf.native_vlan)] {
            if let Some(id) = id.filter(|id| !vlan_ids.contains(id)) {
                result.add(CrossReference, format!("interfaces[{}].{}", idx, field), missing(id));
            }
        }
        for id in intf.tagged_vlans.iter().filter(|id| !vlan_ids.contains(id)) {
            result.add(CrossReference, format!("interfaces[{}].tagged_vlans", idx), missing(id));
        }
    }

    let ethernet = config
        .interfaces
        .iter()
        .filter(|i| i.kind == InterfaceKind::Ethernet)
        .map(|i| &i.ports)
        .collect::<Vec<_>>();
    let declared = |member: &str| {
        ethernet.iter().any(|ports| match ports {
            PortSelector::Single { intf } => intf == member,
            PortSelector::Range { start_intf, end_intf } => port_in_range(member, start_intf, end_intf),
        })
    };

    for (idx, pc) in config.port_channels.iter().enumerate() {
        if let Some(id) = pc.native_vlan.filter(|id| !vlan_ids.contains(id)) {
            result.add(CrossReference, format!("port_channels[{}].native_vlan", idx), missing(id));
        }
        for id in pc.tagged_vlans.iter().filter(|id| !vlan_ids.contains(id)) {
            result.add(CrossReference, format!("port_channels[{}].tagged_vlans", idx), missing(id));
        }
        if pc.members.is_empty() {
            result.add(CrossReference, format!("port_channels[{}].members", idx), "Port-channel must have at least one member");
        }
        for member in pc.members.iter().filter(|m| !declared(m.as_str())) {
            result.add(
                CrossReference,
                format!("port_channels[{}].members", idx),
                format!("Member {} is not a declared Ethernet interface", member),
            );
        }
    }

    if let Some(bgp) = &config.bgp {
        for (idx, neighbor) in bgp.neighbors.iter().enumerate() {
            for (field, name) in neighbor.prefix_list_refs() {
                if !config.prefix_lists.contains_key(name) {
                    result.add(
                        CrossReference,
                        format!("bgp.neighbors[{}].af_ipv4_unicast.{}", idx, field),
                        format!("Referenced prefix list '{}' does not exist", name),
                    );
                }
            }
        }
    }
}

/// Run the ingress gate and the typed checks on a raw device document.
///
/// Returns the parsed config when it deserializes, together with every
/// violation found. A document that fails the gate is never deserialized.
pub fn validate_document(value: &serde_json::Value) -> (Option<DeviceConfig>, ValidationResult) {
    let mut result = schema::check_device(value);
    if !result.valid {
        return (None, result);
    }
    match serde_json::from_value::<DeviceConfig>(value.clone()) {
        Ok(config) => {
            let checks = validate(&config);
            result.errors.extend(checks.errors);
            result.valid = result.errors.is_empty();
            (Some(config), result)
        }
        Err(e) => {
            result.add(ViolationKind::Schema, "root", e.to_string());
            (None, result)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{DeploymentPattern, Role};
    use crate::synthesis::{synthesize, tests::rack1_request};

    pub(crate) fn rack1_pair() -> (DeviceConfig, DeviceConfig) {
        let req = rack1_request();
        (
            synthesize(&req.shared, &req.tor1, Role::Tor1).unwrap(),
            synthesize(&req.shared, &req.tor2, Role::Tor2).unwrap(),
        )
    }

    /// A hand-written switched TOR1 document with storage_1 VLAN 711 on the peer-link.
    fn switched_tor1_with_storage_on_peer_link() -> serde_json::Value {
        serde_json::json!({
            "switch": {
                "vendor": "dellemc", "model": "s5248f-on", "firmware": "os10",
                "hostname": "rack2-tor1", "role": "TOR1", "deployment_pattern": "switched"
            },
            "vlans": [
                { "vlan_id": 7, "name": "Infra_7", "purpose": "management",
                  "interface": { "ip": "10.0.7.2", "cidr": 24,
                                 "redundancy": { "type": "vrrp", "group": 7, "priority": 150, "virtual_ip": "10.0.7.1" } } },
                { "vlan_id": 99, "name": "NATIVE_VLAN" },
                { "vlan_id": 711, "name": "Storage_711", "purpose": "storage_1" }
            ],
            "interfaces": [
                { "name": "Loopback0", "type": "L3", "intf_type": "loopback", "intf": "loopback0",
                  "ipv4": "10.255.0.1/32", "role": "loopback" },
                { "name": "MLAG_Peer_1", "type": "Trunk", "intf": "1/1/49" },
                { "name": "MLAG_Peer_2", "type": "Trunk", "intf": "1/1/50" }
            ],
            "port_channels": [
                { "id": 50, "description": "MLAG_Peer_Links", "type": "Trunk", "members": ["1/1/49", "1/1/50"],
                  "native_vlan": "99", "tagged_vlans": "7,711", "is_peer_link": true, "role": "peer_link" }
            ],
            "mlag": { "domain_id": 1, "peer_keepalive": { "source_ip": "192.168.100.1", "destination_ip": "192.168.100.2" },
                      "peer_gateway": true },
            "bgp": { "asn": 65242, "router_id": "10.255.0.1", "networks": ["10.255.0.1/32"], "neighbors": [] }
        })
    }

    #[test]
    fn test_rack1_pair_is_valid() {
        let (tor1, tor2) = rack1_pair();
        let r1 = validate(&tor1);
        assert!(r1.valid, "{}", r1);
        let r2 = validate(&tor2);
        assert!(r2.valid, "{}", r2);
    }

    #[test]
    fn test_switched_storage_on_peer_link_is_single_topology_violation() {
        let (config, result) = validate_document(&switched_tor1_with_storage_on_peer_link());
        assert!(config.is_some());
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1, "{}", result);
        let error = &result.errors[0];
        assert_eq!(error.kind, ViolationKind::Topology);
        assert_eq!(error.path, "port_channels[0].tagged_vlans");
        assert!(error.hint.is_some());
    }

    #[test]
    fn test_same_document_passes_under_fully_converged() {
        let mut doc = switched_tor1_with_storage_on_peer_link();
        doc["switch"]["deployment_pattern"] = "fully_converged".into();
        let (_, result) = validate_document(&doc);
        assert!(result.valid, "{}", result);
    }

    #[test]
    fn test_cross_reference_errors_accumulate() {
        let (mut tor1, _) = rack1_pair();
        tor1.interfaces[1].tagged_vlans.insert(300);
        tor1.port_channels[0].native_vlan = Some(301);
        tor1.port_channels[0].members.push("1/1/60".into());
        tor1.bgp.as_mut().unwrap().neighbors[0]
            .af_ipv4_unicast
            .as_mut()
            .unwrap()
            .prefix_list_out = Some("Missing".into());

        let result = validate(&tor1);
        assert_eq!(result.count(ViolationKind::CrossReference), 4, "{}", result);
        assert!(result.errors.iter().any(|e| e.path == "bgp.neighbors[0].af_ipv4_unicast.prefix_list_out"));
    }

    #[test]
    fn test_members_inside_declared_range_are_accepted() {
        let (mut tor1, _) = rack1_pair();
        tor1.port_channels[0].members = vec!["1/1/3".into()];
        let result = validate(&tor1);
        assert_eq!(result.count(ViolationKind::CrossReference), 0, "{}", result);
    }

    #[test]
    fn test_structural_errors() {
        let (mut tor1, _) = rack1_pair();
        tor1.switch.hostname = "bad host/name".into();
        tor1.vlans[2].vlan_id = 4095;
        tor1.switch.deployment_pattern = DeploymentPattern::FullyConverged;
        let result = validate(&tor1);
        assert!(result.errors.iter().any(|e| e.path == "switch.hostname"));
        assert!(result.errors.iter().any(|e| e.path == "vlans[2].vlan_id"));
    }

    #[test]
    fn test_result_display() {
        let mut result = ValidationResult::new();
        assert_eq!(result.to_string(), "Validation successful");
        result.push(ValidationError::new(ViolationKind::Topology, "vlans[0]", "bad").with_hint("fix it"));
        assert_eq!(result.to_string(), "[topology] vlans[0]: bad (hint: fix it)");
    }
}
