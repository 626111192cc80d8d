use ipnet::Ipv4Net;
use std::collections::BTreeMap;
use tracing::debug;

use super::{ValidationError, ValidationResult, ViolationKind};
use crate::models::{DeploymentPattern, DeviceConfig, VlanPurpose};
use crate::synthesis::selector;

pub(super) fn check_topology(config: &DeviceConfig, result: &mut ValidationResult) {
    use ViolationKind::Topology;

    let mut seen: BTreeMap<u16, usize> = BTreeMap::new();
    for (idx, vlan) in config.vlans.iter().enumerate() {
        if let Some(first) = seen.insert(vlan.vlan_id, idx) {
            result.add(
                Topology,
                format!("vlans[{}].vlan_id", idx),
                format!("VLAN {} is already defined at vlans[{}]", vlan.vlan_id, first),
            );
        }
        if vlan.vlan_id == 1 {
            result.push(
                ValidationError::new(Topology, format!("vlans[{}].vlan_id", idx), "VLAN 1 is reserved")
                    .with_hint("use a parking VLAN (e.g. 2) for unused ports"),
            );
        }
        if vlan.has_purpose(VlanPurpose::Parking) && !vlan.shutdown {
            result.push(
                ValidationError::new(Topology, format!("vlans[{}].shutdown", idx), "Parking VLAN must be shut down")
                    .with_hint("set \"shutdown\": true"),
            );
        }
        if let Some(svi) = &vlan.interface {
            let vip = svi.redundancy.as_ref().map(|r| r.virtual_ip);
            if let (Some(ip), Some(vip)) = (svi.ip, vip) {
                let subnet = Ipv4Net::new(ip, svi.cidr).map(|n| n.trunc());
                if subnet.is_ok_and(|n| !n.contains(&vip)) {
                    result.add(
                        Topology,
                        format!("vlans[{}].interface.redundancy.virtual_ip", idx),
                        format!("Virtual IP {} is outside {}/{}", vip, ip, svi.cidr),
                    );
                }
                if ip == vip {
                    result.add(
                        Topology,
                        format!("vlans[{}].interface.ip", idx),
                        "SVI address equals the virtual IP",
                    );
                }
            }
        }
        if !selector::carries(config.pattern(), config.role(), vlan.purpose) {
            result.push(
                ValidationError::new(
                    Topology,
                    format!("vlans[{}]", idx),
                    format!(
                        "VLAN {} is not carried by {} under the {} pattern",
                        vlan.vlan_id,
                        config.role(),
                        config.pattern()
                    ),
                )
                .with_hint("remove the VLAN or change its purpose"),
            );
        }
    }

    if config.mlag.is_some() {
        let peer_links = config.peer_links().count();
        if peer_links != 1 {
            result.push(
                ValidationError::new(
                    Topology,
                    "port_channels",
                    format!("MLAG requires exactly one peer-link port-channel, found {}", peer_links),
                )
                .with_hint("set \"is_peer_link\": true on the inter-switch port-channel"),
            );
        }
    }

    if config.pattern() == DeploymentPattern::Switched {
        for (idx, pc) in config.port_channels.iter().enumerate().filter(|(_, pc)| pc.is_peer_link) {
            let storage: Vec<String> = pc
                .tagged_vlans
                .iter()
                .filter(|id| config.vlan(*id).is_some_and(|v| v.is_storage()))
                .map(|id| id.to_string())
                .collect();
            if !storage.is_empty() {
                result.push(
                    ValidationError::new(
                        Topology,
                        format!("port_channels[{}].tagged_vlans", idx),
                        format!(
                            "Storage VLAN(s) {} must not cross the peer-link in the switched pattern",
                            storage.join(",")
                        ),
                    )
                    .with_hint("remove storage VLANs from the peer-link; each TOR carries its own storage VLAN"),
                );
            }
        }
    }
}

pub(super) fn check_routing(config: &DeviceConfig, result: &mut ValidationResult) {
    use ViolationKind::Routing;

    if let Some(bgp) = &config.bgp {
        match config.loopback_ip() {
            Some(loopback) if loopback != bgp.router_id => result.push(
                ValidationError::new(
                    Routing,
                    "bgp.router_id",
                    format!("Router-id {} does not match loopback {}", bgp.router_id, loopback),
                )
                .with_hint("the router-id is the loopback address"),
            ),
            None => result.add(Routing, "bgp.router_id", "BGP is configured but no loopback address exists"),
            _ => {}
        }
    }

    let has_bgp = config.bgp.is_some();
    let has_static = config.has_static_routes();
    if has_bgp && has_static {
        result.add(Routing, "static_routes", "BGP and static routing are mutually exclusive");
    } else if !has_bgp && !has_static && config.has_layer3() {
        result.push(
            ValidationError::new(Routing, "bgp", "Layer-3 device has neither BGP nor static routes")
                .with_hint("add a bgp section or static_routes"),
        );
    }
}

/// Cross-device checks for a TOR pair. Each device is validated on its own
/// first; its violations are reported under `tor1.` / `tor2.`.
pub fn validate_pair(a: &DeviceConfig, b: &DeviceConfig) -> ValidationResult {
    use ViolationKind::Pair;

    let mut result = ValidationResult::new();
    result.merge_prefixed(a.role().slug(), super::validate(a));
    result.merge_prefixed(b.role().slug(), super::validate(b));

    if a.role().peer() != Some(b.role()) {
        result.add(
            Pair,
            "switch.role",
            format!("A pair needs one TOR1 and one TOR2, got {} and {}", a.role(), b.role()),
        );
    }
    if a.pattern() != b.pattern() {
        result.add(
            Pair,
            "switch.deployment_pattern",
            format!("Deployment patterns differ: {} vs {}", a.pattern(), b.pattern()),
        );
    }
    if !a.switch.vendor.eq_ignore_ascii_case(&b.switch.vendor) {
        result.add(
            Pair,
            "switch.vendor",
            format!("Vendors differ: {} vs {}", a.switch.vendor, b.switch.vendor),
        );
    }
    if a.switch.hostname == b.switch.hostname {
        result.add(Pair, "switch.hostname", format!("Both switches are named {}", a.switch.hostname));
    }

    match (&a.bgp, &b.bgp) {
        (Some(x), Some(y)) if x.asn != y.asn => {
            result.add(Pair, "bgp.asn", format!("ASNs differ: {} vs {}", x.asn, y.asn));
        }
        (Some(_), None) | (None, Some(_)) => {
            result.add(Pair, "bgp", "BGP is configured on only one switch");
        }
        _ => {}
    }

    match (&a.mlag, &b.mlag) {
        (Some(x), Some(y)) => {
            if x.domain_id != y.domain_id {
                result.add(
                    Pair,
                    "mlag.domain_id",
                    format!("MLAG domains differ: {} vs {}", x.domain_id, y.domain_id),
                );
            }
            if !x.peer_keepalive.complements(&y.peer_keepalive) {
                result.push(
                    ValidationError::new(
                        Pair,
                        "mlag.peer_keepalive",
                        format!(
                            "Keepalive is not symmetric: {} -> {} vs {} -> {}",
                            x.peer_keepalive.source_ip,
                            x.peer_keepalive.destination_ip,
                            y.peer_keepalive.source_ip,
                            y.peer_keepalive.destination_ip
                        ),
                    )
                    .with_hint("the peer's source and destination are this switch's destination and source"),
                );
            }
        }
        (Some(_), None) | (None, Some(_)) => {
            result.add(Pair, "mlag", "MLAG is configured on only one switch");
        }
        _ => {}
    }

    if let (Some(x), Some(y)) = (a.loopback_ip(), b.loopback_ip()) {
        if x == y {
            result.add(Pair, "interfaces.loopback", format!("Both switches use loopback {}", x));
        }
    }

    for vlan in &a.vlans {
        let ours = vlan.interface.as_ref().and_then(|i| i.ip);
        let theirs = b.vlan(vlan.vlan_id).and_then(|v| v.interface.as_ref()).and_then(|i| i.ip);
        if let (Some(x), Some(y)) = (ours, theirs) {
            if x == y {
                result.add(
                    Pair,
                    format!("vlans.{}.interface.ip", vlan.vlan_id),
                    format!("Both switches use SVI address {} on VLAN {}", x, vlan.vlan_id),
                );
            }
        }
    }

    debug!(
        a = %a.switch.hostname,
        b = %b.switch.hostname,
        errors = result.errors.len(),
        "Validated pair"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::super::tests::rack1_pair;
    use super::*;
    use crate::models::StaticRoute;
    use std::net::Ipv4Addr;

    #[test]
    fn test_rack1_pair_passes_pair_checks() {
        let (tor1, tor2) = rack1_pair();
        let result = validate_pair(&tor1, &tor2);
        assert!(result.valid, "{}", result);
    }

    #[test]
    fn test_asymmetric_keepalive_fails() {
        let (tor1, mut tor2) = rack1_pair();
        tor2.mlag.as_mut().unwrap().peer_keepalive.destination_ip = Ipv4Addr::new(192, 168, 100, 9);
        let result = validate_pair(&tor1, &tor2);
        assert_eq!(result.count(ViolationKind::Pair), 1);
        assert_eq!(result.errors[0].path, "mlag.peer_keepalive");
    }

    #[test]
    fn test_pair_mismatches_accumulate() {
        let (tor1, mut tor2) = rack1_pair();
        tor2.switch.hostname = tor1.switch.hostname.clone();
        tor2.bgp.as_mut().unwrap().asn = 65000;
        tor2.mlag.as_mut().unwrap().domain_id = 9;
        let result = validate_pair(&tor1, &tor2);
        let paths: Vec<&str> = result.errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"switch.hostname"));
        assert!(paths.contains(&"bgp.asn"));
        assert!(paths.contains(&"mlag.domain_id"));
    }

    #[test]
    fn test_two_tor1_is_rejected() {
        let (tor1, _) = rack1_pair();
        let mut other = tor1.clone();
        other.switch.hostname = "rack1-tor1b".into();
        let result = validate_pair(&tor1, &other);
        assert!(result.errors.iter().any(|e| e.path == "switch.role"));
        assert!(result.errors.iter().any(|e| e.path.starts_with("interfaces.loopback")));
    }

    #[test]
    fn test_device_errors_are_prefixed_by_role() {
        let (mut tor1, tor2) = rack1_pair();
        tor1.vlans[0].shutdown = false;
        let result = validate_pair(&tor1, &tor2);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, "tor1.vlans[0].shutdown");
    }

    #[test]
    fn test_routing_rules() {
        let (mut tor1, _) = rack1_pair();
        tor1.bgp.as_mut().unwrap().router_id = Ipv4Addr::new(10, 255, 0, 9);
        tor1.static_routes.push(StaticRoute {
            prefix: "0.0.0.0/0".parse().unwrap(),
            next_hop: Ipv4Addr::new(10, 1, 1, 1),
            name: None,
        });
        let result = super::super::validate(&tor1);
        assert_eq!(result.count(ViolationKind::Routing), 2, "{}", result);

        tor1.bgp = None;
        tor1.static_routes.clear();
        let result = super::super::validate(&tor1);
        assert!(result.errors.iter().any(|e| e.path == "bgp" && e.kind == ViolationKind::Routing));
    }

    #[test]
    fn test_vlan_one_and_duplicates() {
        let (mut tor1, _) = rack1_pair();
        tor1.vlans[2].vlan_id = 1;
        let dup = tor1.vlans[1].clone();
        tor1.vlans.push(dup);
        let result = super::super::validate(&tor1);
        assert!(result.errors.iter().any(|e| e.message == "VLAN 1 is reserved"));
        assert!(result.errors.iter().any(|e| e.message.contains("already defined")));
    }
}
