use ipnet::Ipv4Net;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use super::{
    Bgp, BgpSettings, DeploymentPattern, Interface, Mlag, MlagSettings,
    PortChannel, PrefixLists, Role, StaticRoute, SwitchIdentity, Vlan,
};

/// Values fixed per role. Never taken from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RoleDefaults {
    /// HSRP/VRRP priority; the active switch gets the higher value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redundancy_priority: Option<u8>,
    /// VLT/VPC/MLAG role priority; lower wins primary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mlag_role_priority: Option<u16>,
    pub mst_priority: u32,
}

impl RoleDefaults {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Tor1 => Self {
                redundancy_priority: Some(150),
                mlag_role_priority: Some(1),
                mst_priority: 8192,
            },
            Role::Tor2 => Self {
                redundancy_priority: Some(140),
                mlag_role_priority: Some(32667),
                mst_priority: 16384,
            },
            Role::Bmc => Self {
                redundancy_priority: None,
                mlag_role_priority: None,
                mst_priority: 32768,
            },
        }
    }
}

/// Complete configuration of one switch (the `StandardConfig` document)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeviceConfig {
    pub switch: SwitchIdentity,
    #[serde(default)]
    pub vlans: Vec<Vlan>,
    #[serde(default)]
    pub interfaces: Vec<Interface>,
    #[serde(default)]
    pub port_channels: Vec<PortChannel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mlag: Option<Mlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgp: Option<Bgp>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub static_routes: Vec<StaticRoute>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prefix_lists: PrefixLists,
    #[serde(rename = "_computed", default, skip_serializing_if = "Option::is_none")]
    pub computed: Option<RoleDefaults>,
}

impl DeviceConfig {
    pub fn role(&self) -> Role {
        self.switch.role
    }

    pub fn pattern(&self) -> DeploymentPattern {
        self.switch.deployment_pattern
    }

    pub fn vlan(&self, id: u16) -> Option<&Vlan> {
        self.vlans.iter().find(|v| v.vlan_id == id)
    }

    /// The loopback interface: tagged `loopback`, or else the first interface
    /// of loopback kind.
    pub fn loopback(&self) -> Option<&Interface> {
        super::loopback_position(&self.interfaces).map(|at| &self.interfaces[at])
    }

    pub fn loopback_ip(&self) -> Option<Ipv4Addr> {
        self.loopback().and_then(|i| i.ipv4).map(|net| net.addr())
    }

    pub fn peer_links(&self) -> impl Iterator<Item = &PortChannel> {
        self.port_channels.iter().filter(|pc| pc.is_peer_link)
    }

    pub fn has_static_routes(&self) -> bool {
        !self.static_routes.is_empty()
    }

    /// True when the device routes: any SVI, any Layer-3 interface or port-channel.
    pub fn has_layer3(&self) -> bool {
        use super::InterfaceMode::L3;
        self.vlans.iter().any(|v| v.interface.is_some())
            || self.interfaces.iter().any(|i| i.mode == L3 || i.ipv4.is_some())
            || self.port_channels.iter().any(|pc| pc.mode == L3 || pc.ipv4.is_some())
    }
}

/// Everything both switches of a pair have in common
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SharedConfig {
    pub deployment_pattern: DeploymentPattern,
    #[schemars(schema_with = "super::formats::vendor_name")]
    pub vendor: String,
    #[schemars(length(min = 1))]
    pub model: String,
    /// Informational only; firmware is always derived from the vendor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware: Option<String>,
    #[schemars(length(min = 1))]
    pub base_hostname: String,
    #[serde(default)]
    pub vlans: Vec<Vlan>,
    #[serde(default)]
    pub interfaces: Vec<Interface>,
    #[serde(default)]
    pub port_channels: Vec<PortChannel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mlag: Option<MlagSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgp: Option<BgpSettings>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub static_routes: Vec<StaticRoute>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prefix_lists: PrefixLists,
}

/// Values that differ between TOR1 and TOR2. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PerDeviceOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "super::formats::ipv4_net_opt")]
    pub loopback_ip: Option<Ipv4Net>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "super::formats::ipv4_net_opt")]
    pub uplink1_ip: Option<Ipv4Net>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "super::formats::ipv4_net_opt")]
    pub uplink2_ip: Option<Ipv4Net>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "super::formats::ipv4_addr_opt")]
    pub keepalive_source_ip: Option<Ipv4Addr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "super::formats::ipv4_addr_opt")]
    pub keepalive_dest_ip: Option<Ipv4Addr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "super::formats::ipv4_net_opt")]
    pub ibgp_port_channel_ip: Option<Ipv4Net>,
    /// VLAN id → SVI address
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    #[schemars(schema_with = "super::formats::svi_ips")]
    pub svi_ips: BTreeMap<u16, Ipv4Addr>,
}

impl PerDeviceOverrides {
    pub fn has_keepalive(&self) -> bool {
        self.keepalive_source_ip.is_some() || self.keepalive_dest_ip.is_some()
    }
}

/// Input of pair generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PairRequest {
    pub shared: SharedConfig,
    #[serde(default)]
    pub tor1: PerDeviceOverrides,
    #[serde(default)]
    pub tor2: PerDeviceOverrides,
    /// Present when the rack also has a BMC switch to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmc: Option<PerDeviceOverrides>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_defaults_table() {
        let tor1 = RoleDefaults::for_role(Role::Tor1);
        let tor2 = RoleDefaults::for_role(Role::Tor2);
        assert!(tor1.redundancy_priority > tor2.redundancy_priority);
        assert_eq!(tor1.mlag_role_priority, Some(1));
        assert_eq!(tor2.mlag_role_priority, Some(32667));
        assert_eq!(RoleDefaults::for_role(Role::Bmc).redundancy_priority, None);
    }

    #[test]
    fn test_overrides_svi_keys_from_json_strings() {
        let overrides: PerDeviceOverrides = serde_json::from_value(serde_json::json!({
            "loopback_ip": "10.255.0.1/32",
            "svi_ips": { "7": "10.0.7.2" }
        }))
        .unwrap();
        assert_eq!(overrides.svi_ips.get(&7), Some(&Ipv4Addr::new(10, 0, 7, 2)));
        assert!(!overrides.has_keepalive());
    }

    #[test]
    fn test_device_document_minimal() {
        let config: DeviceConfig = serde_json::from_value(serde_json::json!({
            "switch": {
                "vendor": "dellemc",
                "model": "s5248f-on",
                "firmware": "os10",
                "hostname": "rack1-tor1",
                "role": "TOR1",
                "deployment_pattern": "switched"
            }
        }))
        .unwrap();
        assert!(config.vlans.is_empty());
        assert!(!config.has_layer3());
        assert!(config.loopback_ip().is_none());

        let out = serde_json::to_value(&config).unwrap();
        assert!(out.get("_computed").is_none());
        assert!(out.get("static_routes").is_none());
    }
}
