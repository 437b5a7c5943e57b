/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

use super::HostsDriverConfig;
use crate::yaml as y;

impl HostsDriverConfig {
    fn add_records_by_yaml(&mut self, v: &Yaml) -> anyhow::Result<()> {
        let Yaml::Hash(map) = v else {
            return Err(anyhow!("yaml type for 'records' should be 'map'"));
        };
        y::foreach_kv(map, |name, v| {
            if let Yaml::Null = v {
                self.add_empty_name(name);
                return Ok(());
            }
            let ips = y::as_list(v, y::as_ipaddr)
                .context(format!("invalid ip address list for name {name}"))?;
            self.add_records(name, ips);
            Ok(())
        })
    }

    pub(crate) fn parse_yaml_map(map: &yaml::Hash) -> anyhow::Result<Self> {
        let mut config = HostsDriverConfig::default();
        y::foreach_kv(map, |k, v| match y::normalize_key(k).as_str() {
            "type" => Ok(()),
            "records" | "hosts" => config.add_records_by_yaml(v),
            _ => Err(anyhow!("invalid key {k}")),
        })?;
        Ok(config)
    }

    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        match value {
            Yaml::Hash(map) => Self::parse_yaml_map(map),
            _ => Err(anyhow!("yaml type for 'hosts driver config' should be 'map'")),
        }
    }
}
