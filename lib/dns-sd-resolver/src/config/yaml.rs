/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use super::{IpVersionFilter, ResolveJobConfig, ResolverTimeouts};
use crate::driver::AnyQueryDriverConfig;
use crate::yaml;

impl IpVersionFilter {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        let s = yaml::as_str(value)?;
        IpVersionFilter::from_str(s).map_err(|_| anyhow!("invalid ip version filter {s}"))
    }
}

impl ResolverTimeouts {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = value else {
            return Err(anyhow!("yaml type for 'resolver timeouts' should be 'map'"));
        };

        let mut timeouts = ResolverTimeouts::default();
        yaml::foreach_kv(map, |k, v| match yaml::normalize_key(k).as_str() {
            "wait" | "wait_timeout" => {
                let time = yaml::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                timeouts.set_wait_timeout(time);
                Ok(())
            }
            "update" | "update_timeout" => {
                let time = yaml::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                timeouts.set_update_timeout(time);
                Ok(())
            }
            "cancel" | "cancel_timeout" => {
                let time = yaml::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                timeouts.set_cancel_timeout(time);
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;
        Ok(timeouts)
    }
}

impl ResolveJobConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = value else {
            return Err(anyhow!("yaml type for 'resolve job config' should be 'map'"));
        };

        let mut config = ResolveJobConfig::default();
        yaml::foreach_kv(map, |k, v| match yaml::normalize_key(k).as_str() {
            "driver" => {
                config.driver = AnyQueryDriverConfig::parse_yaml(v)
                    .context(format!("invalid query driver config value for key {k}"))?;
                Ok(())
            }
            "timeouts" | "timeout" => {
                config.timeouts = ResolverTimeouts::parse_yaml(v)
                    .context(format!("invalid resolver timeouts value for key {k}"))?;
                Ok(())
            }
            "version_filter" | "ip_version" => {
                config.version_filter = IpVersionFilter::parse_yaml(v)
                    .context(format!("invalid ip version filter value for key {k}"))?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;
        Ok(config)
    }
}
