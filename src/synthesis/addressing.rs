use ipnet::Ipv4Net;
use std::net::Ipv4Addr;

/// Highest last octet a VIP may have so that `+2` still fits in the octet.
pub const MAX_VIP_LAST_OCTET: u8 = 253;

/// Add `offset` to the last octet of `base`.
///
/// Returns `None` when the base ends above [`MAX_VIP_LAST_OCTET`] or the sum
/// overflows the octet. A VIP of `.253` yields `.254` and `.255`. Carry into
/// the third octet is never attempted.
pub fn offset_host(base: Ipv4Addr, offset: u8) -> Option<Ipv4Addr> {
    let [a, b, c, d] = base.octets();
    if d > MAX_VIP_LAST_OCTET {
        return None;
    }
    d.checked_add(offset).map(|last| Ipv4Addr::new(a, b, c, last))
}

/// Network prefixes for a list of interface addresses, deduplicated, in
/// first-seen order.
pub fn networks_of<'a>(addrs: impl IntoIterator<Item = &'a Ipv4Net>) -> Vec<Ipv4Net> {
    let mut out: Vec<Ipv4Net> = Vec::new();
    for net in addrs.into_iter().map(Ipv4Net::trunc) {
        if !out.contains(&net) {
            out.push(net);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_host_tor_pair() {
        for last in [1u8, 100, 252, 253] {
            let vip = Ipv4Addr::new(10, 0, 7, last);
            assert_eq!(offset_host(vip, 1), Some(Ipv4Addr::new(10, 0, 7, last + 1)));
            assert_eq!(offset_host(vip, 2), Some(Ipv4Addr::new(10, 0, 7, last + 2)));
        }
    }

    #[test]
    fn test_offset_host_rejects_high_octet() {
        assert_eq!(offset_host(Ipv4Addr::new(10, 0, 7, 254), 1), None);
        assert_eq!(offset_host(Ipv4Addr::new(10, 0, 7, 255), 1), None);
    }

    #[test]
    fn test_offset_host_reaches_last_octet() {
        let vip = Ipv4Addr::new(10, 0, 7, 253);
        assert_eq!(offset_host(vip, 2), Some(Ipv4Addr::new(10, 0, 7, 255)));
        assert_eq!(offset_host(Ipv4Addr::new(10, 0, 7, 253), 3), None);
    }

    #[test]
    fn test_networks_of_truncates_and_dedupes() {
        let addrs: Vec<Ipv4Net> = ["10.255.0.1/32", "10.1.1.1/30", "10.1.1.2/30"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let nets = networks_of(&addrs);
        assert_eq!(
            nets.iter().map(|n| n.to_string()).collect::<Vec<_>>(),
            vec!["10.255.0.1/32", "10.1.1.0/30"]
        );
    }
}
