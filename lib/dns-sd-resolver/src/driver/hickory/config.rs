/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use hickory_resolver::Resolver;
use hickory_resolver::config::{NameServerConfig, ResolveHosts, ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::xfer::Protocol;

use super::HickoryDriver;
use crate::driver::ArcQueryDriver;

#[cfg(feature = "yaml")]
mod yaml;

const DEFAULT_SERVER_PORT: u16 = 53;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HickoryDriverConfig {
    servers: Vec<IpAddr>,
    server_port: Option<u16>,
    each_timeout: Duration,
    each_tries: usize,
    use_hosts_file: bool,
    cache_size: usize,
    refresh: bool,
    refresh_min_interval: Duration,
    refresh_max_interval: Duration,
}

impl Default for HickoryDriverConfig {
    fn default() -> Self {
        HickoryDriverConfig {
            servers: vec![],
            server_port: None,
            each_timeout: Duration::from_secs(5),
            each_tries: 2,
            use_hosts_file: true,
            cache_size: 32,
            refresh: true,
            refresh_min_interval: Duration::from_secs(5),
            refresh_max_interval: Duration::from_secs(300),
        }
    }
}

impl HickoryDriverConfig {
    pub fn check(&mut self) -> anyhow::Result<()> {
        if self.each_tries == 0 {
            return Err(anyhow!("each tries should be at least 1"));
        }
        if self.refresh_min_interval.is_zero() {
            return Err(anyhow!("refresh min interval should not be zero"));
        }
        if self.refresh_max_interval < self.refresh_min_interval {
            self.refresh_max_interval = self.refresh_min_interval;
        }

        Ok(())
    }

    /// Query these servers instead of the ones from the system configuration.
    pub fn add_server(&mut self, ip: IpAddr) {
        self.servers.push(ip);
    }

    #[inline]
    pub fn get_servers(&self) -> Vec<IpAddr> {
        self.servers.clone()
    }

    pub fn set_server_port(&mut self, port: u16) {
        self.server_port = Some(port);
    }

    #[inline]
    pub fn get_server_port(&self) -> Option<u16> {
        self.server_port
    }

    pub fn set_each_timeout(&mut self, timeout: Duration) {
        self.each_timeout = timeout;
    }

    pub fn set_each_tries(&mut self, attempts: usize) {
        self.each_tries = attempts;
    }

    pub fn set_use_hosts_file(&mut self, enable: bool) {
        self.use_hosts_file = enable;
    }

    pub fn set_cache_size(&mut self, size: usize) {
        self.cache_size = size;
    }

    /// Keep re-querying when the answer expires and report what changed.
    pub fn set_refresh(&mut self, enable: bool) {
        self.refresh = enable;
    }

    pub fn set_refresh_min_interval(&mut self, interval: Duration) {
        self.refresh_min_interval = interval;
    }

    pub fn set_refresh_max_interval(&mut self, interval: Duration) {
        self.refresh_max_interval = interval;
    }

    fn build_resolver_config(&self) -> anyhow::Result<(ResolverConfig, ResolverOpts)> {
        if self.servers.is_empty() {
            return hickory_resolver::system_conf::read_system_conf()
                .context("failed to read system dns config");
        }

        let port = self.server_port.unwrap_or(DEFAULT_SERVER_PORT);
        let mut resolver_config = ResolverConfig::new();
        for ip in &self.servers {
            let addr = SocketAddr::new(*ip, port);
            resolver_config.add_name_server(NameServerConfig::new(addr, Protocol::Udp));
            resolver_config.add_name_server(NameServerConfig::new(addr, Protocol::Tcp));
        }
        Ok((resolver_config, ResolverOpts::default()))
    }

    pub fn spawn_query_driver(&self) -> anyhow::Result<ArcQueryDriver> {
        let (resolver_config, mut opts) = self.build_resolver_config()?;
        opts.timeout = self.each_timeout;
        opts.attempts = self.each_tries;
        opts.cache_size = self.cache_size;
        opts.use_hosts_file = if self.use_hosts_file {
            ResolveHosts::Auto
        } else {
            ResolveHosts::Never
        };

        let resolver =
            Resolver::builder_with_config(resolver_config, TokioConnectionProvider::default())
                .with_options(opts)
                .build();

        let refresh = self
            .refresh
            .then_some((self.refresh_min_interval, self.refresh_max_interval));
        Ok(Arc::new(HickoryDriver::new(resolver, refresh)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check() {
        let mut config = HickoryDriverConfig::default();
        assert!(config.check().is_ok());

        config.set_refresh_min_interval(Duration::from_secs(60));
        config.set_refresh_max_interval(Duration::from_secs(10));
        config.check().unwrap();
        assert_eq!(config.refresh_max_interval, Duration::from_secs(60));

        config.set_each_tries(0);
        assert!(config.check().is_err());
    }

    #[test]
    fn custom_servers() {
        let mut config = HickoryDriverConfig::default();
        config.add_server(IpAddr::from([192, 0, 2, 53]));
        config.set_server_port(5353);
        let (resolver_config, _) = config.build_resolver_config().unwrap();
        let servers = resolver_config.name_servers();
        assert_eq!(servers.len(), 2);
        assert_eq!(
            servers[0].socket_addr,
            SocketAddr::new(IpAddr::from([192, 0, 2, 53]), 5353)
        );
    }
}
