use serde::Serialize;

use crate::models::{DeploymentPattern, DeviceConfig, PortChannel, Role, Vlan, VlanPurpose};

/// Variables handed to the template renderer: the whole device config plus
/// precomputed flags and lists that keep template logic flat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateContext {
    #[serde(flatten)]
    pub config: DeviceConfig,

    pub has_bgp: bool,
    pub has_mlag: bool,
    pub has_static_routes: bool,
    pub has_prefix_lists: bool,
    pub has_vlans: bool,
    pub has_interfaces: bool,
    pub has_port_channels: bool,
    pub has_svis: bool,
    /// QoS policy is global, so one requesting interface enables it
    pub has_qos_interfaces: bool,

    pub is_tor1: bool,
    pub is_tor2: bool,
    pub is_bmc: bool,

    pub is_fully_converged: bool,
    pub is_switched: bool,
    pub is_switchless: bool,

    pub storage_vlans: Vec<Vlan>,
    pub management_vlans: Vec<Vlan>,
    pub compute_vlans: Vec<Vlan>,

    pub vlan_ids_string: String,
    pub storage_vlan_ids_string: String,

    pub peer_link: Option<PortChannel>,
}

fn by_purpose(vlans: &[Vlan], keep: impl Fn(&Vlan) -> bool) -> Vec<Vlan> {
    vlans.iter().filter(|v| keep(*v)).cloned().collect()
}

fn ids_string(vlans: &[Vlan]) -> String {
    vlans
        .iter()
        .map(|v| v.vlan_id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Derive the template context. Pure; never mutates `config`.
pub fn build_context(config: &DeviceConfig) -> TemplateContext {
    let role = config.role();
    let pattern = config.pattern();
    let storage_vlans = by_purpose(&config.vlans, Vlan::is_storage);

    TemplateContext {
        has_bgp: config.bgp.is_some(),
        has_mlag: config.mlag.is_some(),
        has_static_routes: config.has_static_routes(),
        has_prefix_lists: !config.prefix_lists.is_empty(),
        has_vlans: !config.vlans.is_empty(),
        has_interfaces: !config.interfaces.is_empty(),
        has_port_channels: !config.port_channels.is_empty(),
        has_svis: config.vlans.iter().any(|v| v.interface.is_some()),
        has_qos_interfaces: config.interfaces.iter().any(|i| i.qos),

        is_tor1: role == Role::Tor1,
        is_tor2: role == Role::Tor2,
        is_bmc: role == Role::Bmc,

        is_fully_converged: pattern == DeploymentPattern::FullyConverged,
        is_switched: pattern == DeploymentPattern::Switched,
        is_switchless: pattern == DeploymentPattern::Switchless,

        vlan_ids_string: ids_string(&config.vlans),
        storage_vlan_ids_string: ids_string(&storage_vlans),
        management_vlans: by_purpose(&config.vlans, |v| v.has_purpose(VlanPurpose::Management)),
        compute_vlans: by_purpose(&config.vlans, |v| v.has_purpose(VlanPurpose::Compute)),
        storage_vlans,

        peer_link: config.peer_links().next().cloned(),
        config: config.clone(),
    }
}
