mod device;
pub(crate) mod formats;
mod interfaces;
mod routing;
mod switch;
mod vlans;

pub use device::*;
pub use interfaces::*;
pub use routing::*;
pub use switch::*;
pub use vlans::*;

/// Canonical vendor and firmware identifiers
pub mod vendor {
    use super::RedundancyType;

    pub const CISCO: &str = "cisco";
    pub const DELLEMC: &str = "dellemc";

    pub const NXOS: &str = "nxos";
    pub const OS10: &str = "os10";

    /// Fixed vendor → firmware table. Firmware is never taken from user input.
    pub const FIRMWARE: &[(&str, &str)] = &[(CISCO, NXOS), (DELLEMC, OS10)];

    /// Resolve the firmware family for a vendor. Unknown vendors map to
    /// their own name so the template lookup fails with a precise path.
    pub fn firmware_for(vendor: &str) -> String {
        let vendor = vendor.trim().to_lowercase();
        FIRMWARE
            .iter()
            .find(|(v, _)| *v == vendor)
            .map(|(_, fw)| (*fw).to_string())
            .unwrap_or(vendor)
    }

    /// First-hop redundancy protocol spoken by a vendor family.
    pub fn redundancy_for(vendor: &str) -> RedundancyType {
        if vendor.eq_ignore_ascii_case(CISCO) {
            RedundancyType::Hsrp
        } else {
            RedundancyType::Vrrp
        }
    }
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

/// Accepts VLAN ids written either as JSON numbers or as numeric strings
/// (`7` or `"7"`), which both appear in hand-written input files.
pub(crate) mod vlan_ref {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(u16),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Repr::Number(id)) => Ok(Some(id)),
            Some(Repr::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(Repr::Text(s)) => s
                .trim()
                .parse::<u16>()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("invalid VLAN id '{}'", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firmware_lookup() {
        assert_eq!(vendor::firmware_for("cisco"), "nxos");
        assert_eq!(vendor::firmware_for("DellEMC"), "os10");
        assert_eq!(vendor::firmware_for("juniper"), "juniper");
    }

    #[test]
    fn test_redundancy_by_vendor() {
        assert_eq!(vendor::redundancy_for("cisco"), RedundancyType::Hsrp);
        assert_eq!(vendor::redundancy_for("dellemc"), RedundancyType::Vrrp);
        assert_eq!(vendor::redundancy_for("arista"), RedundancyType::Vrrp);
    }
}
