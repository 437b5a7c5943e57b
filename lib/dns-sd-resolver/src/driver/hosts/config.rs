/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::sync::Arc;

use indexmap::IndexMap;

use super::HostsDriver;
use crate::driver::ArcQueryDriver;

#[cfg(feature = "yaml")]
mod yaml;

pub(super) fn normalize_name(name: &str) -> String {
    let name = name.strip_suffix('.').unwrap_or(name);
    name.to_ascii_lowercase()
}

/// A static name to addresses table.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct HostsDriverConfig {
    records: IndexMap<String, Vec<IpAddr>>,
}

impl HostsDriverConfig {
    pub fn add_record(&mut self, name: &str, ip: IpAddr) {
        let ips = self.records.entry(normalize_name(name)).or_default();
        if !ips.contains(&ip) {
            ips.push(ip);
        }
    }

    pub fn add_records<I>(&mut self, name: &str, ips: I)
    where
        I: IntoIterator<Item = IpAddr>,
    {
        for ip in ips {
            self.add_record(name, ip);
        }
    }

    /// Register a name that exists but has no address record.
    pub fn add_empty_name(&mut self, name: &str) {
        self.records.entry(normalize_name(name)).or_default();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn spawn_query_driver(&self) -> ArcQueryDriver {
        Arc::new(HostsDriver::new(self.records.clone()))
    }
}
