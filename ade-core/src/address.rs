//! Client address resolution for login throttling.
//!
//! The same client must always map to the same key, whichever proxy header or
//! socket family it arrived through.
use std::net::{IpAddr, Ipv4Addr};

/// Key used when no address information is available at all.
pub const UNKNOWN_ADDRESS: &str = "unknown";

/// Normalize a textual address.
///
/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) collapse to their IPv4 form
/// and the IPv6 loopback `::1` becomes `127.0.0.1`.
pub fn normalize_address(raw: &str) -> String {
    let trimmed = raw.trim();

    if trimmed == "::1" {
        return Ipv4Addr::LOCALHOST.to_string();
    }

    if let (Some(prefix), Some(mapped)) = (trimmed.get(..7), trimmed.get(7..)) {
        if prefix.eq_ignore_ascii_case("::ffff:") && mapped.parse::<Ipv4Addr>().is_ok() {
            return mapped.to_string();
        }
    }

    trimmed.to_string()
}

/// Pick the address a request should be throttled under.
///
/// Preference order: first `X-Forwarded-For` entry, then `X-Real-IP`, then the
/// transport-level peer address.
pub fn resolve_client_address(
    forwarded_for: Option<&str>,
    real_ip: Option<&str>,
    remote: Option<IpAddr>,
) -> String {
    let forwarded = forwarded_for
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    if let Some(address) = forwarded {
        return normalize_address(address);
    }

    if let Some(address) = real_ip.map(str::trim).filter(|value| !value.is_empty()) {
        return normalize_address(address);
    }

    match remote {
        Some(IpAddr::V6(v6)) => match v6.to_ipv4_mapped() {
            Some(v4) => v4.to_string(),
            None => normalize_address(&v6.to_string()),
        },
        Some(IpAddr::V4(v4)) => v4.to_string(),
        None => UNKNOWN_ADDRESS.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    #[test]
    fn test_normalize_mapped_ipv4() {
        assert_eq!(normalize_address("::ffff:203.0.113.7"), "203.0.113.7");
        assert_eq!(normalize_address("::FFFF:10.0.0.1"), "10.0.0.1");
    }

    #[test]
    fn test_normalize_loopback() {
        assert_eq!(normalize_address("::1"), "127.0.0.1");
        assert_eq!(normalize_address(" 127.0.0.1 "), "127.0.0.1");
    }

    #[test]
    fn test_normalize_leaves_other_addresses_alone() {
        assert_eq!(normalize_address("2001:db8::1"), "2001:db8::1");
        assert_eq!(normalize_address("::ffff:not-an-ip"), "::ffff:not-an-ip");
    }

    #[test]
    fn test_forwarded_for_takes_precedence() {
        let address = resolve_client_address(
            Some("203.0.113.7, 10.0.0.2"),
            Some("10.0.0.3"),
            Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 4))),
        );
        assert_eq!(address, "203.0.113.7");
    }

    #[test]
    fn test_real_ip_used_when_forwarded_for_missing_or_blank() {
        let address = resolve_client_address(Some("  "), Some("::ffff:198.51.100.9"), None);
        assert_eq!(address, "198.51.100.9");
    }

    #[test]
    fn test_remote_address_fallback() {
        let v6_loopback = resolve_client_address(None, None, Some(IpAddr::V6(Ipv6Addr::LOCALHOST)));
        assert_eq!(v6_loopback, "127.0.0.1");

        let mapped = resolve_client_address(
            None,
            None,
            Some(IpAddr::V6(Ipv4Addr::new(192, 0, 2, 1).to_ipv6_mapped())),
        );
        assert_eq!(mapped, "192.0.2.1");

        assert_eq!(resolve_client_address(None, None, None), UNKNOWN_ADDRESS);
    }
}
