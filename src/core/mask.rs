// LogGather - core/mask.rs
//
// Public IP masking for logs that are going to be shared.
// Pure text transformation: shares no state with rule extraction and is run
// as its own pipeline (app::mask), never as part of gathering.
//
// IPv4 candidates must sit between whitespace and a ':', '|' or whitespace
// character, which keeps most version strings ("kernel 5.10.0.1-amd64")
// untouched. IPv6 candidates are any run of hex digits and colons with at
// least two colons; a candidate is only replaced when std parses it as an
// address, so timestamps like 12:30:45 survive.

use crate::util::constants;
use regex::{Captures, Regex};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;

fn ipv4_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?P<pre>\s)(?P<ip>\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?P<pos>[:|\s])")
            .expect("static IPv4 regex")
    })
}

fn ipv6_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)[0-9a-f]*:[0-9a-f]*:(?:[0-9a-f]*:)*(?:\d{1,3}(?:\.\d{1,3}){3}|[0-9a-f]*)",
        )
        .expect("static IPv6 regex")
    })
}

/// Replace every public IPv4 address with `x.x.x.x` and every public IPv6
/// address with `::x`. Everything else is returned unchanged.
pub fn mask_ips(text: &str) -> String {
    let pass_v4 = ipv4_regex().replace_all(text, |caps: &Captures| {
        let ip = &caps["ip"];
        let masked = match ip.parse::<Ipv4Addr>() {
            Ok(addr) if is_global_v4(addr) => constants::IPV4_MASK,
            _ => ip,
        };
        format!("{}{}{}", &caps["pre"], masked, &caps["pos"])
    });

    ipv6_regex()
        .replace_all(&pass_v4, |caps: &Captures| {
            let candidate = &caps[0];
            if let Some(masked) = mask_v6(candidate) {
                return masked;
            }
            // The match may start inside a preceding hex word ("src:2a00:...").
            // Retry without that leading segment and keep it as plain text.
            match candidate.split_once(':') {
                Some((prefix, rest)) if !prefix.is_empty() => match mask_v6(rest) {
                    Some(masked) => format!("{prefix}:{masked}"),
                    None => candidate.to_string(),
                },
                _ => candidate.to_string(),
            }
        })
        .into_owned()
}

/// The replacement for `candidate` if it is a public IPv6 address.
fn mask_v6(candidate: &str) -> Option<String> {
    // A trailing ':' usually belongs to the surrounding text ("addr::1: ok").
    let (addr_text, tail) = match candidate.strip_suffix(':') {
        Some(trimmed) if trimmed.parse::<Ipv6Addr>().is_ok() => (trimmed, ":"),
        _ => (candidate, ""),
    };
    match addr_text.parse::<Ipv6Addr>() {
        Ok(addr) if is_global_v6(addr) => Some(format!("{}{}", constants::IPV6_MASK, tail)),
        _ => None,
    }
}

/// True for IPv4 addresses routable on the public internet.
pub fn is_global_v4(addr: Ipv4Addr) -> bool {
    let [a, b, c, _] = addr.octets();
    let special = addr.is_private()
        || addr.is_loopback()
        || addr.is_link_local()
        || addr.is_broadcast()
        || addr.is_documentation()
        || addr.is_unspecified()
        || addr.is_multicast()
        || a == 0 // "this network"
        || (a == 100 && (64..128).contains(&b)) // shared address space
        || (a == 192 && b == 0 && c == 0) // IETF protocol assignments
        || (a == 198 && (18..20).contains(&b)) // benchmarking
        || a >= 240; // reserved
    !special
}

/// True for IPv6 addresses routable on the public internet: global unicast
/// (2000::/3) outside the documentation range, or an IPv4-mapped address
/// whose IPv4 part is itself global.
pub fn is_global_v6(addr: Ipv6Addr) -> bool {
    if let Some(v4) = addr.to_ipv4_mapped() {
        return is_global_v4(v4);
    }
    let segments = addr.segments();
    let global_unicast = (segments[0] & 0xe000) == 0x2000;
    let documentation = segments[0] == 0x2001 && segments[1] == 0x0db8;
    global_unicast && !documentation
}

// =============================================================================
// Tests
// =============================================================================
