use ipnet::Ipv4Net;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// MLAG/VPC/VLT peer-keepalive endpoints as seen from one switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Keepalive {
    #[schemars(schema_with = "super::formats::ipv4_addr")]
    pub source_ip: Ipv4Addr,
    #[schemars(schema_with = "super::formats::ipv4_addr")]
    pub destination_ip: Ipv4Addr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vrf: Option<String>,
}

impl Keepalive {
    /// The same keepalive seen from the peer switch.
    pub fn swapped(&self) -> Self {
        Self {
            source_ip: self.destination_ip,
            destination_ip: self.source_ip,
            vrf: self.vrf.clone(),
        }
    }

    /// True when `other` is this keepalive seen from the peer.
    pub fn complements(&self, other: &Keepalive) -> bool {
        self.source_ip == other.destination_ip && self.destination_ip == other.source_ip
    }
}

/// Fully resolved MLAG section of one device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Mlag {
    #[schemars(range(min = 1, max = 1000))]
    pub domain_id: u16,
    pub peer_keepalive: Keepalive,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(max = 3600))]
    pub delay_restore: Option<u32>,
    #[serde(default)]
    pub peer_gateway: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_priority: Option<u16>,
}

/// MLAG settings shared by both switches of the pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MlagSettings {
    #[schemars(range(min = 1, max = 1000))]
    pub domain_id: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(max = 3600))]
    pub delay_restore: Option<u32>,
    #[serde(default)]
    pub peer_gateway: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keepalive_vrf: Option<String>,
}

/// Per-neighbor IPv4 unicast address-family policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AddressFamilyPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_list_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_list_out: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BgpNeighbor {
    #[schemars(schema_with = "super::formats::ipv4_addr")]
    pub ip: Ipv4Addr,
    #[schemars(range(min = 1))]
    pub remote_as: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1))]
    pub ebgp_multihop: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub af_ipv4_unicast: Option<AddressFamilyPolicy>,
}

impl BgpNeighbor {
    /// Prefix-list names this neighbor refers to.
    pub fn prefix_list_refs(&self) -> impl Iterator<Item = (&'static str, &str)> {
        let af = self.af_ipv4_unicast.as_ref();
        let inbound = af.and_then(|a| a.prefix_list_in.as_deref()).map(|n| ("prefix_list_in", n));
        let outbound = af.and_then(|a| a.prefix_list_out.as_deref()).map(|n| ("prefix_list_out", n));
        inbound.into_iter().chain(outbound)
    }
}

/// Fully resolved BGP process of one device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Bgp {
    #[schemars(range(min = 1))]
    pub asn: u32,
    #[schemars(schema_with = "super::formats::ipv4_addr")]
    pub router_id: Ipv4Addr,
    #[serde(default)]
    #[schemars(schema_with = "super::formats::ipv4_net_list")]
    pub networks: Vec<Ipv4Net>,
    #[serde(default)]
    pub neighbors: Vec<BgpNeighbor>,
}

/// BGP settings shared by both switches; router-id and networks are per device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BgpSettings {
    #[schemars(range(min = 1))]
    pub asn: u32,
    #[serde(default)]
    pub neighbors: Vec<BgpNeighbor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StaticRoute {
    #[schemars(schema_with = "super::formats::ipv4_net")]
    pub prefix: Ipv4Net,
    #[schemars(schema_with = "super::formats::ipv4_addr")]
    pub next_hop: Ipv4Addr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PrefixAction {
    Permit,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PrefixListEntry {
    #[schemars(range(min = 1))]
    pub seq: u32,
    pub action: PrefixAction,
    #[schemars(schema_with = "super::formats::ipv4_net")]
    pub prefix: Ipv4Net,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(max = 32))]
    pub le: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(max = 32))]
    pub ge: Option<u8>,
}

/// Named prefix lists, ordered by name for stable output
pub type PrefixLists = BTreeMap<String, Vec<PrefixListEntry>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn keepalive(src: [u8; 4], dst: [u8; 4]) -> Keepalive {
        Keepalive {
            source_ip: Ipv4Addr::from(src),
            destination_ip: Ipv4Addr::from(dst),
            vrf: Some("management".into()),
        }
    }

    #[test]
    fn test_keepalive_swap_is_complementary() {
        let tor1 = keepalive([10, 0, 0, 1], [10, 0, 0, 2]);
        let tor2 = tor1.swapped();
        assert_eq!(tor2.source_ip, Ipv4Addr::new(10, 0, 0, 2));
        assert_eq!(tor2.destination_ip, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(tor2.vrf.as_deref(), Some("management"));
        assert!(tor1.complements(&tor2));
        assert!(!tor1.complements(&tor1));
    }

    #[test]
    fn test_neighbor_prefix_list_refs() {
        let neighbor: BgpNeighbor = serde_json::from_value(serde_json::json!({
            "ip": "192.0.2.1",
            "remote_as": 64512,
            "description": "TO_Border1",
            "af_ipv4_unicast": { "prefix_list_in": "DefaultRoute" }
        }))
        .unwrap();
        let refs: Vec<_> = neighbor.prefix_list_refs().collect();
        assert_eq!(refs, vec![("prefix_list_in", "DefaultRoute")]);
    }
}
