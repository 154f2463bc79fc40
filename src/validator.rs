//! URL validation, DNS resolution, and the SSRF IP blocklist.
//!
//! Validation runs once per request and produces a [`ValidatedTarget`] whose
//! `resolved_ip` is the exact address the browser gets pinned to. Nothing
//! downstream re-resolves the hostname, which is what closes the DNS
//! rebinding window.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use std::time::Duration;

use tokio::net::lookup_host;
use url::Url;

use crate::{BexError, Result};

pub const MAX_URL_LENGTH: usize = 2048;

const DNS_TIMEOUT: Duration = Duration::from_secs(5);

/// Hostnames rejected before any resolution is attempted.
const HOSTNAME_DENYLIST: &[&str] = &[
    "localhost",
    "metadata.google.internal",
    "metadata.goog",
    "169.254.169.254",
];

/// A request target that passed every validation gate.
///
/// Immutable; `resolved_ip` must be used as-is for the rest of the request.
#[derive(Debug, Clone)]
pub struct ValidatedTarget {
    pub url: Url,
    pub resolved_ip: IpAddr,
    pub hostname: String,
}

/// Runs the full validation sequence on a raw URL string.
///
/// Checks run in order and each violation is fatal: length, absolute-URL
/// parse, http/https scheme, hostname denylist, DNS resolution, and the IP
/// blocklist over every resolved address. IP-literal hosts (including
/// decimal and hex obfuscations) skip DNS and hit the blocklist directly.
pub async fn validate_target(raw_url: &str) -> Result<ValidatedTarget> {
    if raw_url.len() > MAX_URL_LENGTH {
        return Err(BexError::UrlTooLong);
    }

    let url = Url::parse(raw_url.trim()).map_err(|_| BexError::InvalidUrl)?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(BexError::SchemeNotAllowed),
    }

    let hostname = normalized_host(&url).ok_or(BexError::InvalidUrl)?;

    if hostname_denied(&hostname) {
        return Err(BexError::HostNotAllowed);
    }

    if let Some(ip) = parse_ip_literal(&hostname) {
        if is_blocked_ip(ip) {
            return Err(BexError::HostNotAllowed);
        }
        return Ok(ValidatedTarget {
            url,
            resolved_ip: ip,
            hostname,
        });
    }

    let port = url.port_or_known_default().unwrap_or(443);
    let resolved = tokio::time::timeout(DNS_TIMEOUT, lookup_host((hostname.as_str(), port)))
        .await
        .map_err(|_| BexError::HostnameUnresolved)?
        .map_err(|_| BexError::HostnameUnresolved)?;

    let addrs: Vec<IpAddr> = resolved.map(|sa| sa.ip()).collect();
    if addrs.is_empty() {
        return Err(BexError::HostnameUnresolved);
    }

    if addrs.iter().any(|ip| is_blocked_ip(*ip)) {
        return Err(BexError::BlockedIp);
    }

    // Prefer IPv4 when both families resolved.
    let resolved_ip = addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or(BexError::HostnameUnresolved)?;

    tracing::debug!(host = %hostname, ip = %resolved_ip, "validated target");

    Ok(ValidatedTarget {
        url,
        resolved_ip,
        hostname,
    })
}

/// Lowercased host with the trailing dot and IPv6 brackets stripped.
fn normalized_host(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let host = host
        .trim_end_matches('.')
        .trim_start_matches('[')
        .trim_end_matches(']');
    if host.is_empty() {
        return None;
    }
    Some(host.to_ascii_lowercase())
}

fn hostname_denied(hostname: &str) -> bool {
    HOSTNAME_DENYLIST.contains(&hostname) || hostname.ends_with(".localhost")
}

/// Interprets a host string as an IP literal, including the obfuscated
/// single-integer forms used to slip past naive string checks:
/// `2130706433` and `0x7f000001` both decode to 127.0.0.1.
pub fn parse_ip_literal(host: &str) -> Option<IpAddr> {
    if let Ok(v4) = Ipv4Addr::from_str(host) {
        return Some(IpAddr::V4(v4));
    }
    if let Ok(v6) = Ipv6Addr::from_str(host) {
        return Some(IpAddr::V6(v6));
    }
    decode_obfuscated_ipv4(host).map(IpAddr::V4)
}

/// Decodes pure-decimal and `0x`-hex 32-bit IPv4 representations.
pub fn decode_obfuscated_ipv4(host: &str) -> Option<Ipv4Addr> {
    let value = if let Some(hex) = host
        .strip_prefix("0x")
        .or_else(|| host.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).ok()?
    } else if !host.is_empty() && host.bytes().all(|b| b.is_ascii_digit()) {
        u32::from_str(host).ok()?
    } else {
        return None;
    };
    Some(Ipv4Addr::from(value))
}

pub fn is_blocked_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_blocked_ipv4(v4),
        IpAddr::V6(v6) => is_blocked_ipv6(v6),
    }
}

/// Loopback, RFC1918 private, link-local, and the reserved 0.0.0.0/8 block.
pub fn is_blocked_ipv4(ip: Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.octets()[0] == 0
}

/// Loopback, unspecified, link-local, unique-local, and IPv4-mapped
/// addresses whose embedded IPv4 is itself blocked.
pub fn is_blocked_ipv6(ip: Ipv6Addr) -> bool {
    if ip.is_loopback() || ip.is_unspecified() {
        return true;
    }
    let seg = ip.segments();
    // fe80::/10
    if (seg[0] & 0xffc0) == 0xfe80 {
        return true;
    }
    // fc00::/7
    if (seg[0] & 0xfe00) == 0xfc00 {
        return true;
    }
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_blocked_ipv4(v4);
    }
    false
}
