//! Expansion of one shared pair description into a complete per-switch
//! configuration.

pub mod addressing;
pub mod bmc;
pub mod selector;

pub use addressing::offset_host;
pub use selector::{host_trunk_default, select_vlans};

use ipnet::Ipv4Net;
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::models::{
    loopback_position, vendor, Bgp, DeviceConfig, Interface, InterfaceMode, Keepalive, LinkRole, Mlag,
    PerDeviceOverrides, PortChannel, Redundancy, Role, RoleDefaults, SharedConfig,
    SwitchIdentity, Vlan, VlanSet,
};

/// Build the full configuration of the switch in `role`.
///
/// Atomic: either every derived value resolves or nothing is returned.
/// A BMC switch is built from its narrowed view of `shared`.
pub fn synthesize(
    shared: &SharedConfig,
    overrides: &PerDeviceOverrides,
    role: Role,
) -> Result<DeviceConfig, ConfigError> {
    let scoped = bmc::scope(shared, role);
    let shared: &SharedConfig = &scoped;
    let vendor_name = shared.vendor.trim().to_lowercase();
    let firmware = vendor::firmware_for(&vendor_name);
    if let Some(given) = shared.firmware.as_deref() {
        if !given.eq_ignore_ascii_case(&firmware) {
            warn!(vendor = %vendor_name, given, derived = %firmware, "Ignoring supplied firmware");
        }
    }

    let defaults = RoleDefaults::for_role(role);
    let hostname = overrides
        .hostname
        .clone()
        .unwrap_or_else(|| format!("{}-{}", shared.base_hostname, role.slug()));

    let pattern = shared.deployment_pattern;
    let vlans = resolve_vlans(
        select_vlans(pattern, role, &shared.vlans),
        overrides,
        role,
        &vendor_name,
        &defaults,
    )?;
    let carried: VlanSet = vlans.iter().map(|v| v.vlan_id).collect();
    let host_default = host_trunk_default(pattern, role, &shared.vlans);

    let loopback_at = loopback_position(&shared.interfaces);
    let interfaces = shared
        .interfaces
        .iter()
        .enumerate()
        .map(|(at, intf)| resolve_interface(intf, overrides, role, &carried, &host_default, loopback_at == Some(at)))
        .collect::<Result<Vec<_>, _>>()?;
    let port_channels = shared
        .port_channels
        .iter()
        .map(|pc| resolve_port_channel(pc, overrides, role, &carried))
        .collect::<Result<Vec<_>, _>>()?;

    let loopback_net = loopback_at
        .and_then(|at| interfaces[at].ipv4)
        .or(overrides.loopback_ip);

    let mlag = match (&shared.mlag, role) {
        (Some(settings), Role::Tor1 | Role::Tor2) => {
            let source_ip = overrides.keepalive_source_ip.ok_or_else(|| {
                ConfigError::ambiguity(role, "keepalive_source_ip", "MLAG is configured but no keepalive source address was supplied")
            })?;
            let destination_ip = overrides.keepalive_dest_ip.ok_or_else(|| {
                ConfigError::ambiguity(role, "keepalive_dest_ip", "MLAG is configured but no keepalive destination address was supplied")
            })?;
            Some(Mlag {
                domain_id: settings.domain_id,
                peer_keepalive: Keepalive {
                    source_ip,
                    destination_ip,
                    vrf: settings.keepalive_vrf.clone(),
                },
                delay_restore: settings.delay_restore,
                peer_gateway: settings.peer_gateway,
                role_priority: defaults.mlag_role_priority,
            })
        }
        _ => None,
    };

    let bgp = match &shared.bgp {
        Some(settings) => {
            let loopback = loopback_net.ok_or_else(|| {
                ConfigError::ambiguity(role, "loopback_ip", "BGP router-id requires a loopback address")
            })?;
            let uplinks = interfaces
                .iter()
                .filter(|i| i.has_role(LinkRole::Uplink1) || i.has_role(LinkRole::Uplink2))
                .filter_map(|i| i.ipv4.as_ref());
            Some(Bgp {
                asn: settings.asn,
                router_id: loopback.addr(),
                networks: addressing::networks_of(std::iter::once(&loopback).chain(uplinks)),
                neighbors: settings.neighbors.clone(),
            })
        }
        None => None,
    };

    debug!(
        hostname = %hostname,
        role = %role,
        vlans = vlans.len(),
        interfaces = interfaces.len(),
        "Synthesized device config"
    );

    Ok(DeviceConfig {
        switch: SwitchIdentity {
            vendor: vendor_name,
            model: shared.model.trim().to_lowercase(),
            firmware,
            hostname,
            role,
            deployment_pattern: pattern,
        },
        vlans,
        interfaces,
        port_channels,
        mlag,
        bgp,
        static_routes: shared.static_routes.clone(),
        prefix_lists: shared.prefix_lists.clone(),
        computed: Some(defaults),
    })
}

fn resolve_vlans(
    mut vlans: Vec<Vlan>,
    overrides: &PerDeviceOverrides,
    role: Role,
    vendor_name: &str,
    defaults: &RoleDefaults,
) -> Result<Vec<Vlan>, ConfigError> {
    for vlan in &mut vlans {
        let Some(svi) = vlan.interface.as_mut() else {
            continue;
        };

        if let Some(ip) = overrides.svi_ips.get(&vlan.vlan_id) {
            svi.ip = Some(*ip);
        } else if let Some(vip) = svi.redundancy.as_ref().map(|r| r.virtual_ip) {
            let offset = match role {
                Role::Tor1 => Some(1),
                Role::Tor2 => Some(2),
                Role::Bmc => None,
            };
            if let Some(offset) = offset {
                let ip = offset_host(vip, offset).ok_or_else(|| {
                    ConfigError::ambiguity(
                        role,
                        &format!("svi_ips.{}", vlan.vlan_id),
                        format!("virtual IP {} leaves no room for +{} in the last octet", vip, offset),
                    )
                })?;
                svi.ip = Some(ip);
            }
        }

        svi.redundancy = match (svi.redundancy.take(), defaults.redundancy_priority) {
            (Some(shared), Some(priority)) => Some(Redundancy {
                kind: vendor::redundancy_for(vendor_name),
                priority,
                ..shared
            }),
            _ => None,
        };
    }
    Ok(vlans)
}

fn resolve_interface(
    shared: &Interface,
    overrides: &PerDeviceOverrides,
    role: Role,
    carried: &VlanSet,
    host_default: &VlanSet,
    is_loopback: bool,
) -> Result<Interface, ConfigError> {
    let mut intf = shared.clone();
    intf.tagged_vlans.retain(|id| carried.contains(id));

    match intf.role {
        _ if is_loopback => {
            intf.ipv4 = overrides.loopback_ip.or(intf.ipv4);
            if intf.ipv4.is_none() {
                return Err(ConfigError::ambiguity(
                    role,
                    "loopback_ip",
                    format!("interface '{}' is the loopback but no address was supplied", intf.name),
                ));
            }
        }
        Some(LinkRole::Uplink1) => {
            intf.ipv4 = required_l3(&intf.name, intf.mode, overrides.uplink1_ip.or(intf.ipv4), role, "uplink1_ip")?;
        }
        Some(LinkRole::Uplink2) => {
            intf.ipv4 = required_l3(&intf.name, intf.mode, overrides.uplink2_ip.or(intf.ipv4), role, "uplink2_ip")?;
        }
        Some(LinkRole::Host) if intf.tagged_vlans.is_empty() && intf.mode == InterfaceMode::Trunk => {
            intf.tagged_vlans = host_default.clone();
        }
        _ => {}
    }
    Ok(intf)
}

fn resolve_port_channel(
    shared: &PortChannel,
    overrides: &PerDeviceOverrides,
    role: Role,
    carried: &VlanSet,
) -> Result<PortChannel, ConfigError> {
    let mut pc = shared.clone();
    pc.tagged_vlans.retain(|id| carried.contains(id));

    match pc.role {
        Some(LinkRole::PeerLink) => pc.is_peer_link = true,
        Some(LinkRole::Ibgp) => {
            let name = format!("port-channel{}", pc.id);
            pc.ipv4 = required_l3(&name, pc.mode, overrides.ibgp_port_channel_ip.or(pc.ipv4), role, "ibgp_port_channel_ip")?;
        }
        _ => {}
    }
    Ok(pc)
}

/// A Layer-3 link must end up with an address; switchports may go without.
fn required_l3(
    name: &str,
    mode: InterfaceMode,
    ip: Option<Ipv4Net>,
    role: Role,
    field: &str,
) -> Result<Option<Ipv4Net>, ConfigError> {
    if ip.is_none() && mode == InterfaceMode::L3 {
        return Err(ConfigError::ambiguity(
            role,
            field,
            format!("Layer-3 link '{}' has no address", name),
        ));
    }
    Ok(ip)
}
