/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! Syntactic checks for IP address literals.
//!
//! Nothing in here touches the system resolver or the network.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

fn strip_brackets(s: &str) -> Option<&str> {
    s.strip_prefix('[').and_then(|s| s.strip_suffix(']'))
}

fn parse_ipv4(s: &str) -> Option<Ipv4Addr> {
    match s.as_bytes().first() {
        Some(b'0'..=b'9') => Ipv4Addr::from_str(s).ok(),
        _ => None,
    }
}

fn parse_ipv6(s: &str) -> Option<Ipv6Addr> {
    let s = strip_brackets(s).unwrap_or(s);
    if !s.contains(':') {
        return None;
    }
    Ipv6Addr::from_str(s).ok()
}

/// Parse `s` as an IPv4 or IPv6 literal.
///
/// IPv6 literals may be wrapped in square brackets, as in URLs.
pub fn parse_ip_literal(s: &str) -> Option<IpAddr> {
    if let Some(ip4) = parse_ipv4(s) {
        return Some(IpAddr::V4(ip4));
    }
    parse_ipv6(s).map(IpAddr::V6)
}

pub fn is_ipv4_address(s: &str) -> bool {
    parse_ipv4(s).is_some()
}

pub fn is_ipv6_address(s: &str) -> bool {
    parse_ipv6(s).is_some()
}

#[inline]
pub fn is_ip_address(s: &str) -> bool {
    is_ipv4_address(s) || is_ipv6_address(s)
}
