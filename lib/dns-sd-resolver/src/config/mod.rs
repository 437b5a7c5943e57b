/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::driver::AnyQueryDriverConfig;

#[cfg(feature = "yaml")]
mod yaml;

/// Which address families the caller is interested in.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum IpVersionFilter {
    /// Only families the host currently has a route for.
    /// Literal addresses are accepted as with [`IpVersionFilter::Any`].
    #[default]
    Supported,
    Any,
    Ipv4Only,
    Ipv6Only,
}

impl IpVersionFilter {
    pub(crate) fn query_families(self) -> QueryFamilies {
        match self {
            IpVersionFilter::Supported => crate::host::supported_families(),
            IpVersionFilter::Any => QueryFamilies::Both,
            IpVersionFilter::Ipv4Only => QueryFamilies::Ipv4,
            IpVersionFilter::Ipv6Only => QueryFamilies::Ipv6,
        }
    }

    pub(crate) fn literal_families(self) -> QueryFamilies {
        match self {
            IpVersionFilter::Supported | IpVersionFilter::Any => QueryFamilies::Both,
            IpVersionFilter::Ipv4Only => QueryFamilies::Ipv4,
            IpVersionFilter::Ipv6Only => QueryFamilies::Ipv6,
        }
    }
}

impl FromStr for IpVersionFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "supported" | "default" => Ok(IpVersionFilter::Supported),
            "any" | "all" => Ok(IpVersionFilter::Any),
            "ipv4only" | "ipv4_only" | "ipv4" | "v4" => Ok(IpVersionFilter::Ipv4Only),
            "ipv6only" | "ipv6_only" | "ipv6" | "v6" => Ok(IpVersionFilter::Ipv6Only),
            _ => Err(()),
        }
    }
}

/// Address families requested from a query driver.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QueryFamilies {
    Ipv4,
    Ipv6,
    Both,
}

impl QueryFamilies {
    #[inline]
    pub fn want_ipv4(self) -> bool {
        matches!(self, QueryFamilies::Ipv4 | QueryFamilies::Both)
    }

    #[inline]
    pub fn want_ipv6(self) -> bool {
        matches!(self, QueryFamilies::Ipv6 | QueryFamilies::Both)
    }

    pub fn accept(self, ip: &IpAddr) -> bool {
        match ip {
            IpAddr::V4(_) => self.want_ipv4(),
            IpAddr::V6(_) => self.want_ipv6(),
        }
    }
}

/// The three independent timeouts of a resolver.
///
/// A zero duration disables the corresponding timer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ResolverTimeouts {
    wait: Duration,
    update: Duration,
    cancel: Duration,
}

fn secs_f64_to_duration(secs: f64) -> Duration {
    if secs > 0.0 {
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

#[inline]
fn enabled(d: Duration) -> Option<Duration> {
    if d.is_zero() { None } else { Some(d) }
}

impl ResolverTimeouts {
    pub const fn new(wait: Duration, update: Duration, cancel: Duration) -> Self {
        ResolverTimeouts {
            wait,
            update,
            cancel,
        }
    }

    /// Build from fractional seconds. Zero, negative or NaN values disable the timer.
    pub fn from_secs_f64(wait: f64, update: f64, cancel: f64) -> Self {
        ResolverTimeouts {
            wait: secs_f64_to_duration(wait),
            update: secs_f64_to_duration(update),
            cancel: secs_f64_to_duration(cancel),
        }
    }

    /// Minimum time to collect results before the first delivery.
    pub fn set_wait_timeout(&mut self, timeout: Duration) {
        self.wait = timeout;
    }

    /// Maximum gap between two accepted updates once something was delivered.
    pub fn set_update_timeout(&mut self, timeout: Duration) {
        self.update = timeout;
    }

    /// Absolute deadline counted from activation.
    pub fn set_cancel_timeout(&mut self, timeout: Duration) {
        self.cancel = timeout;
    }

    #[inline]
    pub fn wait_timeout(&self) -> Option<Duration> {
        enabled(self.wait)
    }

    #[inline]
    pub fn update_timeout(&self) -> Option<Duration> {
        enabled(self.update)
    }

    #[inline]
    pub fn cancel_timeout(&self) -> Option<Duration> {
        enabled(self.cancel)
    }
}

/// Everything needed to start a resolver, except the target and the callback.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolveJobConfig {
    pub driver: AnyQueryDriverConfig,
    pub timeouts: ResolverTimeouts,
    pub version_filter: IpVersionFilter,
}
