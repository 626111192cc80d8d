//! Spelling fixes applied to raw input before the schema gate.
//!
//! Only identity fields are touched (vendor, firmware, role, pattern,
//! hostname). Every change is reported back as a warning; topology is never
//! corrected here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::models::vendor;

type Variations = &'static [(&'static str, &'static [&'static str])];

/// Minimum normalized similarity for a spelling to be corrected.
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

const VENDORS: Variations = &[
    (
        "dellemc",
        &[
            "dell emc", "dell-emc", "dell_emc", "dell", "delltech", "dell technologies", "dell tech",
            "emc", "dell/emc", "dell & emc", "dellmc", "dellem", "delemc", "del emc",
        ],
    ),
    (
        "cisco",
        &["cisco systems", "cisco-systems", "cisco_systems", "csco", "cisc", "ciscco", "cisoc"],
    ),
];

const FIRMWARE: Variations = &[
    (
        "nxos",
        &[
            "nx-os", "nx os", "nexus", "nexus-os", "nexus os", "cisco nxos", "cisco nx-os", "nxox",
            "nxso", "nox",
        ],
    ),
    (
        "os10",
        &[
            "os-10", "os 10", "dnos10", "dnos-10", "dn-os10", "dell os10", "dellemc os10",
            "smartfabric os10", "os1o", "o10", "os01",
        ],
    ),
];

const ROLES: Variations = &[
    ("TOR1", &["tor-1", "tor 1", "top-of-rack-1", "torofrack1", "switch1", "sw1"]),
    ("TOR2", &["tor-2", "tor 2", "top-of-rack-2", "torofrack2", "switch2", "sw2"]),
    ("BMC", &["bmc-switch", "bmc switch", "baseboard", "management", "mgmt", "oob"]),
];

const PATTERNS: Variations = &[
    (
        "fully_converged",
        &["fully-converged", "fullyconverged", "converged", "full-converged", "full_converged", "fc"],
    ),
    ("switched", &["switch", "switched-mode", "switched_mode"]),
    (
        "switchless",
        &["switch-less", "switch_less", "storage-only", "storage_only", "no-switch", "direct"],
    ),
];

/// One automatic correction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationWarning {
    pub path: String,
    pub original: String,
    pub normalized: String,
    pub message: String,
}

/// Lowercase, trim and collapse inner whitespace.
fn fold(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Canonical name for `value`, matched exactly or through the table.
fn lookup(value: &str, table: Variations) -> Option<&'static str> {
    let folded = fold(value);
    table
        .iter()
        .find(|(canonical, variations)| {
            canonical.to_lowercase() == folded || variations.iter().any(|v| *v == folded)
        })
        .map(|(canonical, _)| *canonical)
}

/// Canonical name of the most similar spelling in the table, when it clears
/// [`SIMILARITY_THRESHOLD`].
fn closest(value: &str, table: Variations) -> Option<&'static str> {
    let folded = fold(value);
    table
        .iter()
        .flat_map(|(canonical, variations)| {
            std::iter::once(*canonical)
                .chain(variations.iter().copied())
                .map(move |candidate| (*canonical, candidate))
        })
        .map(|(canonical, candidate)| (canonical, strsim::normalized_levenshtein(&folded, &candidate.to_lowercase())))
        .filter(|(_, score)| *score >= SIMILARITY_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(canonical, _)| canonical)
}

/// Exact or listed spelling first, then the closest similar one.
fn resolve(value: &str, table: Variations, known: &'static str, similar: &'static str) -> Option<(String, &'static str)> {
    lookup(value, table)
        .map(|c| (c.to_string(), known))
        .or_else(|| closest(value, table).map(|c| (c.to_string(), similar)))
}

#[derive(Default)]
struct Normalizer {
    warnings: Vec<NormalizationWarning>,
}

impl Normalizer {
    fn record(&mut self, path: String, original: &str, normalized: &str, message: &str) {
        info!(path = %path, original, normalized, "{}", message);
        self.warnings.push(NormalizationWarning {
            path,
            original: original.to_string(),
            normalized: normalized.to_string(),
            message: message.to_string(),
        });
    }

    /// Rename a legacy key when the current one is absent.
    fn rename_key(&mut self, obj: &mut Map<String, Value>, prefix: &str, legacy: &str, current: &str) {
        if obj.contains_key(current) {
            return;
        }
        if let Some(value) = obj.remove(legacy) {
            self.record(
                format!("{}{}", prefix, legacy),
                legacy,
                current,
                "Renamed legacy field",
            );
            obj.insert(current.to_string(), value);
        }
    }

    fn field(
        &mut self,
        obj: &mut Map<String, Value>,
        prefix: &str,
        key: &str,
        fix: impl Fn(&str) -> Option<(String, &'static str)>,
    ) {
        let Some(Value::String(original)) = obj.get(key) else {
            return;
        };
        if let Some((normalized, message)) = fix(original) {
            if normalized != *original {
                let original = original.clone();
                self.record(format!("{}{}", prefix, key), &original, &normalized, message);
                obj.insert(key.to_string(), Value::String(normalized));
            }
        }
    }

    /// Vendor, firmware and pattern for either a `switch` block or `shared`.
    fn identity(&mut self, obj: &mut Map<String, Value>, prefix: &str) {
        self.rename_key(obj, prefix, "make", "vendor");
        self.rename_key(obj, prefix, "os", "firmware");
        self.field(obj, prefix, "vendor", fix_vendor);
        self.field(obj, prefix, "firmware", |v| {
            resolve(v, FIRMWARE, "Matched known firmware spelling", "Matched similar firmware spelling")
        });
        self.firmware_for_vendor(obj, prefix);
        self.field(obj, prefix, "deployment_pattern", |v| {
            lookup(v, PATTERNS).map(|c| (c.to_string(), "Matched known deployment pattern spelling"))
        });
    }

    /// A known vendor always runs its own firmware family.
    fn firmware_for_vendor(&mut self, obj: &mut Map<String, Value>, prefix: &str) {
        let mismatch = match (obj.get("vendor"), obj.get("firmware")) {
            (Some(Value::String(vendor_name)), Some(Value::String(firmware)))
                if vendor::FIRMWARE.iter().any(|(v, _)| *v == vendor_name.as_str()) =>
            {
                let expected = vendor::firmware_for(vendor_name);
                (!firmware.eq_ignore_ascii_case(&expected)).then(|| (firmware.clone(), expected))
            }
            _ => None,
        };
        if let Some((original, expected)) = mismatch {
            self.record(
                format!("{}firmware", prefix),
                &original,
                &expected,
                "Firmware belongs to another vendor, replaced with the vendor's firmware",
            );
            obj.insert("firmware".to_string(), Value::String(expected));
        }
    }

    fn hostname(&mut self, obj: &mut Map<String, Value>, prefix: &str, key: &str) {
        self.field(obj, prefix, key, |v| {
            Some((v.trim().replace(' ', "-"), "Replaced spaces in hostname with dashes"))
        });
    }
}

fn fix_vendor(value: &str) -> Option<(String, &'static str)> {
    match resolve(value, VENDORS, "Matched known vendor spelling", "Matched similar vendor spelling") {
        Some(fixed) => Some(fixed),
        None => {
            let cleaned: String = fold(value).chars().filter(|c| *c != ' ' && *c != '-').collect();
            Some((cleaned, "Unknown vendor, passed through lower-cased"))
        }
    }
}

/// Normalize a device document in place.
pub fn normalize_device(doc: &mut Value) -> Vec<NormalizationWarning> {
    let mut n = Normalizer::default();
    if let Some(switch) = doc.get_mut("switch").and_then(Value::as_object_mut) {
        n.identity(switch, "switch.");
        n.field(switch, "switch.", "role", |v| {
            lookup(v, ROLES).map(|c| (c.to_string(), "Matched known role spelling"))
        });
        n.hostname(switch, "switch.", "hostname");
    }
    n.warnings
}

/// Normalize a pair request in place.
pub fn normalize_pair(doc: &mut Value) -> Vec<NormalizationWarning> {
    let mut n = Normalizer::default();
    if let Some(shared) = doc.get_mut("shared").and_then(Value::as_object_mut) {
        n.identity(shared, "shared.");
        n.hostname(shared, "shared.", "base_hostname");
    }
    for side in ["tor1", "tor2", "bmc"] {
        if let Some(overrides) = doc.get_mut(side).and_then(Value::as_object_mut) {
            n.hostname(overrides, &format!("{}.", side), "hostname");
        }
    }
    n.warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vendor_and_firmware_variations() {
        let mut doc = json!({ "switch": {
            "vendor": "Dell EMC", "firmware": "NX-OS", "role": "tor-1",
            "hostname": "rack 1 tor1", "deployment_pattern": "Fully-Converged"
        }});
        let warnings = normalize_device(&mut doc);
        assert_eq!(doc["switch"]["vendor"], "dellemc");
        assert_eq!(doc["switch"]["firmware"], "os10");
        assert_eq!(doc["switch"]["role"], "TOR1");
        assert_eq!(doc["switch"]["hostname"], "rack-1-tor1");
        assert_eq!(doc["switch"]["deployment_pattern"], "fully_converged");
        assert_eq!(warnings.len(), 6);
        let mismatch = warnings.iter().find(|w| w.original == "nxos").unwrap();
        assert_eq!(mismatch.path, "switch.firmware");
        assert_eq!(mismatch.normalized, "os10");
    }

    #[test]
    fn test_similar_spellings_are_corrected() {
        let mut doc = json!({ "switch": { "vendor": "Dell EMCC", "firmware": "os100" } });
        let warnings = normalize_device(&mut doc);
        assert_eq!(doc["switch"]["vendor"], "dellemc");
        assert_eq!(doc["switch"]["firmware"], "os10");
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.message.starts_with("Matched similar")));

        let mut doc = json!({ "switch": { "vendor": "Ciscoo" } });
        normalize_device(&mut doc);
        assert_eq!(doc["switch"]["vendor"], "cisco");
    }

    #[test]
    fn test_closest_respects_threshold() {
        assert_eq!(closest("nx-oss", FIRMWARE), Some("nxos"));
        assert_eq!(closest("juniper", VENDORS), None);
        assert_eq!(closest("eos", FIRMWARE), None);
    }

    #[test]
    fn test_firmware_mismatch_on_shared_block() {
        let mut doc = json!({ "shared": { "vendor": "cisco", "firmware": "os10" } });
        let warnings = normalize_pair(&mut doc);
        assert_eq!(doc["shared"]["firmware"], "nxos");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].path, "shared.firmware");
    }

    #[test]
    fn test_canonical_input_produces_no_warnings() {
        let mut doc = json!({ "switch": {
            "vendor": "cisco", "firmware": "nxos", "role": "TOR2",
            "hostname": "rack1-tor2", "deployment_pattern": "switched"
        }});
        let before = doc.clone();
        assert!(normalize_device(&mut doc).is_empty());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_unknown_vendor_passes_through_and_pattern_is_untouched() {
        let mut doc = json!({ "switch": { "vendor": "Arista-Networks", "deployment_pattern": "hyper" } });
        let warnings = normalize_device(&mut doc);
        assert_eq!(doc["switch"]["vendor"], "aristanetworks");
        assert_eq!(doc["switch"]["deployment_pattern"], "hyper");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].path, "switch.vendor");
    }

    #[test]
    fn test_legacy_keys() {
        let mut doc = json!({ "switch": { "make": "cisco", "os": "nexus" } });
        let warnings = normalize_device(&mut doc);
        assert_eq!(doc["switch"]["vendor"], "cisco");
        assert_eq!(doc["switch"]["firmware"], "nxos");
        assert!(doc["switch"].get("make").is_none());
        assert_eq!(warnings.iter().filter(|w| w.message == "Renamed legacy field").count(), 2);
    }

    #[test]
    fn test_pair_request() {
        let mut doc = json!({
            "shared": { "vendor": "DELL", "deployment_pattern": "switch", "base_hostname": "rack 7" },
            "tor2": { "hostname": "rack 7 b" }
        });
        let warnings = normalize_pair(&mut doc);
        assert_eq!(doc["shared"]["vendor"], "dellemc");
        assert_eq!(doc["shared"]["deployment_pattern"], "switched");
        assert_eq!(doc["shared"]["base_hostname"], "rack-7");
        assert_eq!(doc["tor2"]["hostname"], "rack-7-b");
        assert_eq!(warnings.len(), 4);
    }
}
