use ipnet::Ipv4Net;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::VlanSet;

/// Switchport mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum InterfaceMode {
    Access,
    Trunk,
    L3,
}

/// Physical kind of an interface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum InterfaceKind {
    #[default]
    Ethernet,
    #[serde(rename = "loopback")]
    Loopback,
}

/// Explicit discriminant for links the synthesizer rewrites per device.
/// Set once when the shared template is authored; never inferred from names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LinkRole {
    Loopback,
    Uplink1,
    Uplink2,
    PeerLink,
    Ibgp,
    Host,
}

/// Ports covered by an interface entry: one port or an inclusive range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PortSelector {
    Range { start_intf: String, end_intf: String },
    Single { intf: String },
}

impl PortSelector {
    /// The single port name, if this selector is not a range.
    pub fn single(&self) -> Option<&str> {
        match self {
            PortSelector::Single { intf } => Some(intf),
            PortSelector::Range { .. } => None,
        }
    }
}

/// An interface (or a range of identically configured interfaces)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Interface {
    #[schemars(length(min = 1))]
    pub name: String,
    #[serde(rename = "type")]
    pub mode: InterfaceMode,
    #[serde(rename = "intf_type", default)]
    pub kind: InterfaceKind,
    #[serde(flatten)]
    pub ports: PortSelector,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::vlan_ref::deserialize")]
    #[schemars(schema_with = "super::formats::vlan_ref")]
    pub access_vlan: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::vlan_ref::deserialize")]
    #[schemars(schema_with = "super::formats::vlan_ref")]
    pub native_vlan: Option<u16>,
    #[serde(default, skip_serializing_if = "VlanSet::is_empty")]
    pub tagged_vlans: VlanSet,
    #[serde(default, skip_serializing_if = "super::is_false")]
    pub qos: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "super::formats::ipv4_net_opt")]
    pub ipv4: Option<Ipv4Net>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<LinkRole>,
}

impl Interface {
    pub fn has_role(&self, role: LinkRole) -> bool {
        self.role == Some(role)
    }
}

/// Position of the loopback: the interface tagged `loopback`, otherwise the
/// first one of loopback kind.
pub fn loopback_position(interfaces: &[Interface]) -> Option<usize> {
    interfaces
        .iter()
        .position(|i| i.has_role(LinkRole::Loopback))
        .or_else(|| interfaces.iter().position(|i| i.kind == InterfaceKind::Loopback))
}

/// A port-channel (LAG)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PortChannel {
    #[schemars(range(min = 1, max = 4096))]
    pub id: u16,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub mode: InterfaceMode,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::vlan_ref::deserialize")]
    #[schemars(schema_with = "super::formats::vlan_ref")]
    pub native_vlan: Option<u16>,
    #[serde(default, skip_serializing_if = "VlanSet::is_empty")]
    pub tagged_vlans: VlanSet,
    #[serde(default)]
    pub is_peer_link: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "super::formats::ipv4_net_opt")]
    pub ipv4: Option<Ipv4Net>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<LinkRole>,
}

impl PortChannel {
    pub fn has_role(&self, role: LinkRole) -> bool {
        self.role == Some(role)
    }
}
