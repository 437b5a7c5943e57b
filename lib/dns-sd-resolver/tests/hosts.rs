/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::sync::Arc;
use std::sync::mpsc as std_mpsc;
use std::time::Duration;

use tokio::sync::mpsc;

use dns_sd_resolver::driver::hosts::HostsDriverConfig;
use dns_sd_resolver::{
    AddrResolver, ArcDeliveryContext, ArcQueryDriver, IpVersionFilter, ResolverError,
    ResolverTimeouts, TokioQueue,
};

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn hosts_driver() -> ArcQueryDriver {
    let mut config = HostsDriverConfig::default();
    config.add_records("www.example.net", [ip("192.0.2.1"), ip("2001:db8::1")]);
    config.add_record("v4.example.net", ip("192.0.2.4"));
    config.spawn_query_driver()
}

#[tokio::test]
async fn resolve_from_table() {
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let queue: ArcDeliveryContext = Arc::new(TokioQueue::spawn());
    let resolver = AddrResolver::resolver_for(
        "www.example.net",
        ResolverTimeouts::default(),
        IpVersionFilter::Any,
        Some(queue),
        hosts_driver(),
        move |_, e, addrs| {
            let _ = sender.send((e, addrs));
        },
    );
    resolver.activate();

    let (e, addrs) = receiver.recv().await.unwrap();
    assert!(e.is_none());
    assert_eq!(addrs, Some(vec![ip("192.0.2.1"), ip("2001:db8::1")]));
    // the table has nothing more, but what was delivered stays valid
    assert!(resolver.is_active());

    resolver.cancel();
    assert!(receiver.recv().await.is_none());
}

#[tokio::test]
async fn table_misses() {
    let cases = [
        ("missing.example.net", IpVersionFilter::Any, ResolverError::NoSuchDomain),
        ("v4.example.net", IpVersionFilter::Ipv6Only, ResolverError::NoSuchAddress),
    ];

    for (target, filter, expected) in cases {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let queue: ArcDeliveryContext = Arc::new(TokioQueue::spawn());
        let resolver = AddrResolver::resolver_for(
            target,
            ResolverTimeouts::default(),
            filter,
            Some(queue),
            hosts_driver(),
            move |_, e, addrs| {
                let _ = sender.send((e, addrs));
            },
        );
        resolver.activate();

        let (e, addrs) = receiver.recv().await.unwrap();
        assert_eq!(e, Some(expected));
        assert!(addrs.is_none());
        assert!(receiver.recv().await.is_none());
        assert!(!resolver.is_active());
    }
}

#[tokio::test]
async fn literal_canceled_after_report() {
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let queue: ArcDeliveryContext = Arc::new(TokioQueue::spawn());
    let target = "[2001:db8::7]";
    let literal = AddrResolver::is_ip_address(target);
    let resolver = AddrResolver::resolver_for(
        target,
        ResolverTimeouts::default(),
        IpVersionFilter::Any,
        Some(queue),
        hosts_driver(),
        move |r, e, addrs| {
            let _ = sender.send((e, addrs));
            if literal {
                r.cancel();
            }
        },
    );
    resolver.activate();

    let (e, addrs) = receiver.recv().await.unwrap();
    assert!(e.is_none());
    assert_eq!(addrs, Some(vec![ip("2001:db8::7")]));
    // the channel closes once the callback is released
    assert!(receiver.recv().await.is_none());
    assert!(!resolver.is_active());
    assert!(resolver.cancel_reason().is_none());
}

#[test]
fn resolve_outside_runtime() {
    let (sender, receiver) = std_mpsc::channel();
    let resolver = AddrResolver::resolver_for(
        "www.example.net",
        ResolverTimeouts::new(Duration::from_millis(20), Duration::ZERO, Duration::ZERO),
        IpVersionFilter::Ipv4Only,
        None,
        hosts_driver(),
        move |r, e, addrs| {
            let _ = sender.send((e, addrs, std::thread::current().name().map(str::to_string)));
            r.cancel();
        },
    );
    resolver.activate();

    let (e, addrs, thread_name) = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(e.is_none());
    assert_eq!(addrs, Some(vec![ip("192.0.2.1")]));
    assert_eq!(thread_name.as_deref(), Some("dns-sd-callback"));

    assert_eq!(
        receiver.recv_timeout(Duration::from_secs(5)),
        Err(std_mpsc::RecvTimeoutError::Disconnected)
    );
    assert!(!resolver.is_active());
    assert!(resolver.cancel_reason().is_none());
}
