use schemars::gen::SchemaGenerator;
use schemars::schema::{ArrayValidation, InstanceType, Schema, SchemaObject, SingleOrVec};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::net::Ipv4Addr;

/// Traffic class carried by a VLAN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VlanPurpose {
    Management,
    Compute,
    #[serde(rename = "storage_1")]
    Storage1,
    #[serde(rename = "storage_2")]
    Storage2,
    Parking,
    Bmc,
}

impl VlanPurpose {
    pub fn is_storage(self) -> bool {
        matches!(self, VlanPurpose::Storage1 | VlanPurpose::Storage2)
    }
}

/// First-hop redundancy protocol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RedundancyType {
    Hsrp,
    #[default]
    Vrrp,
}

/// HSRP/VRRP group bound to an SVI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Redundancy {
    #[serde(rename = "type", default)]
    pub kind: RedundancyType,
    #[serde(default)]
    #[schemars(range(max = 4095))]
    pub group: u16,
    #[serde(default)]
    #[schemars(range(max = 255))]
    pub priority: u8,
    #[schemars(schema_with = "super::formats::ipv4_addr")]
    pub virtual_ip: Ipv4Addr,
}

/// Layer-3 interface of a VLAN
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SviInterface {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "super::formats::ipv4_addr_opt")]
    pub ip: Option<Ipv4Addr>,
    #[schemars(range(max = 32))]
    pub cidr: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 576, max = 9216))]
    pub mtu: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redundancy: Option<Redundancy>,
}

/// A VLAN definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Vlan {
    #[schemars(range(min = 1, max = 4094))]
    pub vlan_id: u16,
    #[schemars(length(min = 1))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<VlanPurpose>,
    #[serde(default, skip_serializing_if = "super::is_false")]
    pub shutdown: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<SviInterface>,
}

impl Vlan {
    pub fn has_purpose(&self, purpose: VlanPurpose) -> bool {
        self.purpose == Some(purpose)
    }

    pub fn is_storage(&self) -> bool {
        self.purpose.is_some_and(VlanPurpose::is_storage)
    }
}

/// A set of VLAN ids.
///
/// Held as an ordered set internally; serialized as a comma-joined string
/// (`"7,201,711"`) at the JSON boundary. Deserialization also accepts a JSON
/// array and `a-b` ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VlanSet(BTreeSet<u16>);

impl VlanSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, id: u16) -> bool {
        self.0.contains(&id)
    }

    pub fn insert(&mut self, id: u16) -> bool {
        self.0.insert(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.iter().copied()
    }

    /// Keep only ids for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(u16) -> bool) {
        self.0.retain(|id| keep(*id));
    }

    /// Parse the comma-joined wire form.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut set = BTreeSet::new();
        for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('-') {
                Some((start, end)) => {
                    let start = parse_id(start)?;
                    let end = parse_id(end)?;
                    if start > end {
                        return Err(format!("invalid VLAN range '{}'", part));
                    }
                    set.extend(start..=end);
                }
                None => {
                    set.insert(parse_id(part)?);
                }
            }
        }
        Ok(Self(set))
    }
}

fn parse_id(text: &str) -> Result<u16, String> {
    text.trim()
        .parse::<u16>()
        .map_err(|_| format!("invalid VLAN id '{}'", text.trim()))
}

impl fmt::Display for VlanSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.0.iter().map(u16::to_string).collect::<Vec<_>>().join(",");
        f.write_str(&joined)
    }
}

impl FromIterator<u16> for VlanSet {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for VlanSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Same shapes the deserializer accepts: `"7,201,711-712"` or `[7, "201"]`.
impl JsonSchema for VlanSet {
    fn schema_name() -> String {
        "VlanSet".to_string()
    }

    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        use super::formats::{any_of, integer, string_matching};

        let item = any_of(vec![integer(1.0, 4094.0), string_matching(r"^\s*[0-9]{1,4}\s*$", false)]);
        let list = SchemaObject {
            instance_type: Some(InstanceType::Array.into()),
            array: Some(Box::new(ArrayValidation {
                items: Some(SingleOrVec::Single(Box::new(item))),
                ..Default::default()
            })),
            ..Default::default()
        };
        any_of(vec![string_matching(r"^[0-9,\s-]*$", false), list.into()])
    }
}

impl<'de> Deserialize<'de> for VlanSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Item {
            Number(u16),
            Text(String),
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            List(Vec<Item>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(text) => VlanSet::parse(&text).map_err(serde::de::Error::custom),
            Repr::List(items) => {
                let mut set = VlanSet::new();
                for item in items {
                    match item {
                        Item::Number(id) => {
                            set.insert(id);
                        }
                        Item::Text(text) => {
                            set.insert(parse_id(&text).map_err(serde::de::Error::custom)?);
                        }
                    }
                }
                Ok(set)
            }
        }
    }
}
