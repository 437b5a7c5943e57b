/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

use super::AnyQueryDriverConfig;
use super::hosts::HostsDriverConfig;
use crate::yaml as y;

const CONFIG_KEY_DRIVER_TYPE: &str = "type";

fn get_driver_type(map: &yaml::Hash) -> anyhow::Result<String> {
    let key = Yaml::String(CONFIG_KEY_DRIVER_TYPE.to_string());
    match map.get(&key) {
        Some(v) => Ok(y::normalize_key(y::as_str(v)?)),
        None => Err(anyhow!("no driver type set")),
    }
}

impl AnyQueryDriverConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = value else {
            return Err(anyhow!("yaml type for 'query driver config' should be 'map'"));
        };

        let driver_type = get_driver_type(map)?;
        match driver_type.as_str() {
            "hosts" | "static" => {
                let config = HostsDriverConfig::parse_yaml_map(map)
                    .context("failed to parse hosts driver config")?;
                Ok(AnyQueryDriverConfig::Hosts(config))
            }
            #[cfg(feature = "hickory")]
            "hickory" | "dns" => {
                let mut config = super::hickory::HickoryDriverConfig::default();
                y::foreach_kv(map, |k, v| match y::normalize_key(k).as_str() {
                    CONFIG_KEY_DRIVER_TYPE => Ok(()),
                    _ => config.set_by_yaml_kv(k, v),
                })
                .context("failed to parse hickory driver config")?;
                config.check()?;
                Ok(AnyQueryDriverConfig::Hickory(Box::new(config)))
            }
            _ => Err(anyhow!("unsupported driver type {driver_type}")),
        }
    }
}
