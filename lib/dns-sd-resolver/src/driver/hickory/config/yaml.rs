/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use super::HickoryDriverConfig;
use crate::yaml as y;

impl HickoryDriverConfig {
    fn parse_server_str(&mut self, addrs: &str) -> anyhow::Result<()> {
        for (i, s) in addrs.split_whitespace().enumerate() {
            let ip = crate::addr::parse_ip_literal(s)
                .ok_or_else(|| anyhow!("invalid ip address {s} for server #{i}"))?;
            self.add_server(ip);
        }
        Ok(())
    }

    pub fn set_by_yaml_kv(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match y::normalize_key(k).as_str() {
            "server" | "servers" => match v {
                Yaml::String(addrs) => self.parse_server_str(addrs),
                Yaml::Array(_) => {
                    for ip in y::as_list(v, y::as_ipaddr)? {
                        self.add_server(ip);
                    }
                    Ok(())
                }
                _ => Err(anyhow!("invalid yaml value type, expect string / array")),
            },
            "server_port" => {
                let port = y::as_u16(v)?;
                self.set_server_port(port);
                Ok(())
            }
            "each_timeout" => {
                let timeout = y::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                self.set_each_timeout(timeout);
                Ok(())
            }
            "each_tries" | "retry_attempts" => {
                let tries = y::as_usize(v)?;
                self.set_each_tries(tries);
                Ok(())
            }
            "use_hosts_file" => {
                let enable = y::as_bool(v)?;
                self.set_use_hosts_file(enable);
                Ok(())
            }
            "cache_size" => {
                let size = y::as_usize(v)?;
                self.set_cache_size(size);
                Ok(())
            }
            "refresh" => {
                let enable = y::as_bool(v)?;
                self.set_refresh(enable);
                Ok(())
            }
            "refresh_min_interval" => {
                let interval = y::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                self.set_refresh_min_interval(interval);
                Ok(())
            }
            "refresh_max_interval" => {
                let interval = y::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                self.set_refresh_max_interval(interval);
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }
}
