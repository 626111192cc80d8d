//! Narrowing of the shared pair description to what a BMC switch carries.
//!
//! The BMC switch is an internal management switch: it keeps switchports
//! only, runs no MLAG or BGP, and always has the parking and native VLANs.

use ipnet::Ipv4Net;
use std::borrow::Cow;
use std::net::Ipv4Addr;

use super::selector;
use crate::models::{InterfaceKind, InterfaceMode, LinkRole, Role, SharedConfig, StaticRoute, Vlan, VlanPurpose};

/// Dead-end VLAN every unused BMC port falls back to
pub const UNUSED_VLAN: u16 = 2;
/// Untagged VLAN of the BMC trunks towards the TORs
pub const NATIVE_VLAN: u16 = 99;

fn fixed_vlans() -> [Vlan; 2] {
    [
        Vlan {
            vlan_id: UNUSED_VLAN,
            name: "UNUSED_VLAN".to_string(),
            purpose: Some(VlanPurpose::Parking),
            shutdown: true,
            interface: None,
        },
        Vlan {
            vlan_id: NATIVE_VLAN,
            name: "NATIVE_VLAN".to_string(),
            purpose: None,
            shutdown: false,
            interface: None,
        },
    ]
}

/// Gateway of the BMC management VLAN: the virtual IP of its SVI.
pub fn management_gateway(vlans: &[Vlan]) -> Option<Ipv4Addr> {
    vlans
        .iter()
        .filter(|v| v.has_purpose(VlanPurpose::Bmc))
        .find_map(|v| v.interface.as_ref()?.redundancy.as_ref().map(|r| r.virtual_ip))
}

/// The shared block as seen by `role`. Only the BMC gets a narrowed copy.
pub fn scope(shared: &SharedConfig, role: Role) -> Cow<'_, SharedConfig> {
    if role != Role::Bmc {
        return Cow::Borrowed(shared);
    }

    let mut scoped = shared.clone();
    for vlan in fixed_vlans() {
        if !scoped.vlans.iter().any(|v| v.vlan_id == vlan.vlan_id) {
            scoped.vlans.push(vlan);
        }
    }
    scoped.vlans.sort_by_key(|v| v.vlan_id);

    let carried: Vec<u16> = selector::select_vlans(shared.deployment_pattern, role, &scoped.vlans)
        .iter()
        .map(|v| v.vlan_id)
        .collect();
    let fallback = |id: Option<u16>, default: u16| id.map(|id| if carried.contains(&id) { id } else { default });

    scoped.interfaces.retain(|i| {
        i.kind == InterfaceKind::Ethernet
            && i.mode != InterfaceMode::L3
            && !matches!(i.role, Some(LinkRole::Loopback | LinkRole::Uplink1 | LinkRole::Uplink2))
    });
    for intf in &mut scoped.interfaces {
        intf.access_vlan = fallback(intf.access_vlan, UNUSED_VLAN);
        intf.native_vlan = fallback(intf.native_vlan, NATIVE_VLAN);
    }

    scoped
        .port_channels
        .retain(|pc| pc.mode != InterfaceMode::L3 && !matches!(pc.role, Some(LinkRole::PeerLink | LinkRole::Ibgp)));
    for pc in &mut scoped.port_channels {
        pc.native_vlan = fallback(pc.native_vlan, NATIVE_VLAN);
    }

    scoped.mlag = None;
    scoped.bgp = None;
    scoped.prefix_lists.clear();
    let default_route = Ipv4Net::default();
    if !scoped.static_routes.iter().any(|r| r.prefix == default_route) {
        if let Some(next_hop) = management_gateway(&scoped.vlans) {
            scoped.static_routes.push(StaticRoute {
                prefix: default_route,
                next_hop,
                name: Some("BMC_default_gateway".to_string()),
            });
        }
    }
    Cow::Owned(scoped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::tests::rack1_request;
    use serde_json::json;

    #[test]
    fn test_tors_see_the_shared_block_unchanged() {
        let shared = rack1_request().shared;
        assert!(matches!(scope(&shared, Role::Tor1), Cow::Borrowed(_)));
    }

    #[test]
    fn test_bmc_keeps_switchports_and_fixed_vlans() {
        let mut shared = rack1_request().shared;
        shared.vlans.retain(|v| v.vlan_id != UNUSED_VLAN);
        let scoped = scope(&shared, Role::Bmc);

        let ids: Vec<u16> = scoped.vlans.iter().map(|v| v.vlan_id).collect();
        assert_eq!(ids, vec![2, 7, 99, 201, 711, 712]);
        assert!(scoped.vlans[0].shutdown);

        let names: Vec<&str> = scoped.interfaces.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Host_Trunk", "MLAG_Peer_1", "MLAG_Peer_2"]);
        // Management VLAN 7 is not carried; the trunk falls back to the native VLAN
        assert_eq!(scoped.interfaces[0].native_vlan, Some(NATIVE_VLAN));
        assert!(scoped.port_channels.is_empty());
        assert!(scoped.mlag.is_none() && scoped.bgp.is_none());
        assert!(scoped.prefix_lists.is_empty());
        assert!(scoped.static_routes.is_empty());
    }

    #[test]
    fn test_default_route_via_bmc_gateway() {
        let mut shared = rack1_request().shared;
        shared.vlans.push(
            serde_json::from_value(json!({
                "vlan_id": 125, "name": "BMC_Mgmt_125", "purpose": "bmc",
                "interface": { "ip": "10.0.125.252", "cidr": 26,
                               "redundancy": { "type": "hsrp", "group": 125, "priority": 50, "virtual_ip": "10.0.125.1" } }
            }))
            .unwrap(),
        );
        let scoped = scope(&shared, Role::Bmc);
        assert_eq!(scoped.static_routes.len(), 1);
        assert_eq!(scoped.static_routes[0].prefix.to_string(), "0.0.0.0/0");
        assert_eq!(scoped.static_routes[0].next_hop, Ipv4Addr::new(10, 0, 125, 1));

        // A supplied default route is kept as is
        shared.static_routes.push(StaticRoute {
            prefix: Ipv4Net::default(),
            next_hop: Ipv4Addr::new(10, 0, 125, 62),
            name: None,
        });
        let scoped = scope(&shared, Role::Bmc);
        assert_eq!(scoped.static_routes.len(), 1);
        assert_eq!(scoped.static_routes[0].next_hop, Ipv4Addr::new(10, 0, 125, 62));
    }
}
