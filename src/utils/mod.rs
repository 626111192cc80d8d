use std::net::Ipv4Addr;

/// Validate a hostname.
/// Allows alphanumeric, hyphens, dots, and underscores. No path separators or shell metacharacters.
pub fn is_valid_hostname(hostname: &str) -> bool {
    if hostname.is_empty() || hostname.len() > 253 {
        return false;
    }
    hostname.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_')
}

/// Convert a hostname to its rendered config filename
/// e.g., "rack1-tor1" -> "rack1-tor1.cfg"
pub fn config_filename(hostname: &str) -> String {
    format!("{}.cfg", hostname)
}

/// Dotted-quad netmask for a prefix length, e.g. 24 -> "255.255.255.0".
/// Lengths above 32 are clamped.
pub fn subnet_mask(prefix_len: u8) -> Ipv4Addr {
    let len = u32::from(prefix_len.min(32));
    let mask = u32::MAX.checked_shl(32 - len).unwrap_or(0);
    Ipv4Addr::from(mask)
}

/// Split `1/1/12` into (`1/1`, 12). Ports without a numeric last component
/// (e.g. `loopback0`) yield `None`.
fn split_port(port: &str) -> Option<(&str, u32)> {
    let (prefix, last) = port.trim().rsplit_once('/').unwrap_or(("", port.trim()));
    last.parse().ok().map(|n| (prefix, n))
}

/// Whether `port` falls inside the inclusive range `start`..`end`.
/// All three must share the same slot prefix (`1/1/1`..`1/1/16` covers `1/1/3`).
pub fn port_in_range(port: &str, start: &str, end: &str) -> bool {
    match (split_port(port), split_port(start), split_port(end)) {
        (Some((p, n)), Some((sp, s)), Some((ep, e))) => p == sp && p == ep && (s..=e).contains(&n),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_filename() {
        assert_eq!(config_filename("rack1-tor1"), "rack1-tor1.cfg");
    }

    #[test]
    fn test_subnet_mask() {
        assert_eq!(subnet_mask(24).to_string(), "255.255.255.0");
        assert_eq!(subnet_mask(30).to_string(), "255.255.255.252");
        assert_eq!(subnet_mask(32).to_string(), "255.255.255.255");
        assert_eq!(subnet_mask(0).to_string(), "0.0.0.0");
        assert_eq!(subnet_mask(40).to_string(), "255.255.255.255");
    }

    #[test]
    fn test_port_in_range() {
        assert!(port_in_range("1/1/3", "1/1/1", "1/1/16"));
        assert!(port_in_range("1/1/16", "1/1/1", "1/1/16"));
        assert!(!port_in_range("1/1/17", "1/1/1", "1/1/16"));
        assert!(!port_in_range("1/2/3", "1/1/1", "1/1/16"));
        assert!(port_in_range("Ethernet1/5", "Ethernet1/1", "Ethernet1/8"));
        assert!(!port_in_range("loopback0", "1/1/1", "1/1/16"));
    }

    #[test]
    fn test_is_valid_hostname() {
        assert!(is_valid_hostname("switch-01"));
        assert!(is_valid_hostname("router.lab.local"));
        assert!(is_valid_hostname("my_host"));
        assert!(!is_valid_hostname(""));
        assert!(!is_valid_hostname("host name")); // spaces
        assert!(!is_valid_hostname("host;rm")); // semicolon
        assert!(!is_valid_hostname("../etc/passwd")); // path traversal
        assert!(!is_valid_hostname("host\nname")); // newline
    }
}
