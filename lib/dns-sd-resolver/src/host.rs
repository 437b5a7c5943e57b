/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use log::debug;

use crate::config::QueryFamilies;

const PROBE_PORT: u16 = 53;
const PROBE_IPV4: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1));
const PROBE_IPV6: IpAddr = IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1));

/// Check if the host has a route for the family of `probe`.
///
/// Connecting a datagram socket only selects a source address, nothing is
/// sent on the wire.
fn has_route(probe: IpAddr) -> bool {
    let bind_ip = match probe {
        IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
    };
    let socket = match UdpSocket::bind(SocketAddr::new(bind_ip, 0)) {
        Ok(s) => s,
        Err(e) => {
            debug!("unable to bind probe socket for {probe}: {e}");
            return false;
        }
    };
    match socket.connect(SocketAddr::new(probe, PROBE_PORT)) {
        Ok(_) => true,
        Err(e) => {
            debug!("no route to {probe}: {e}");
            false
        }
    }
}

/// The address families the host can currently reach.
///
/// Falls back to both families if neither seems routable.
pub(crate) fn supported_families() -> QueryFamilies {
    match (has_route(PROBE_IPV4), has_route(PROBE_IPV6)) {
        (true, false) => QueryFamilies::Ipv4,
        (false, true) => QueryFamilies::Ipv6,
        _ => QueryFamilies::Both,
    }
}
