/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use humanize_rs::ParseError;
use yaml_rust::{Yaml, yaml};

pub(crate) fn normalize_key(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

pub(crate) fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in table.iter() {
        let Yaml::String(key) = k else {
            return Err(anyhow!("key in hash should be string"));
        };
        f(key, v).context(format!("failed to parse value of key {key}"))?;
    }
    Ok(())
}

pub(crate) fn as_duration(v: &Yaml) -> anyhow::Result<Duration> {
    match v {
        Yaml::String(value) => match humanize_rs::duration::parse(value) {
            Ok(v) => Ok(v),
            Err(ParseError::MissingUnit) => {
                if let Ok(u) = u64::from_str(value) {
                    Ok(Duration::from_secs(u))
                } else if let Ok(f) = f64::from_str(value) {
                    Duration::try_from_secs_f64(f).map_err(anyhow::Error::new)
                } else {
                    Err(anyhow!("invalid duration string"))
                }
            }
            Err(e) => Err(anyhow!("invalid humanize duration string: {e}")),
        },
        Yaml::Integer(value) => u64::try_from(*value)
            .map(Duration::from_secs)
            .map_err(|_| anyhow!("negative duration value")),
        Yaml::Real(s) => {
            let f = f64::from_str(s).map_err(|e| anyhow!("invalid f64 value: {e}"))?;
            Duration::try_from_secs_f64(f).map_err(anyhow::Error::new)
        }
        _ => Err(anyhow!(
            "yaml value type for humanize duration should be 'string' or 'integer' or 'real'"
        )),
    }
}

#[cfg(feature = "hickory")]
pub(crate) fn as_bool(v: &Yaml) -> anyhow::Result<bool> {
    match v {
        Yaml::String(s) => match s.to_lowercase().as_str() {
            "on" | "true" | "yes" | "1" => Ok(true),
            "off" | "false" | "no" | "0" => Ok(false),
            _ => Err(anyhow!("invalid yaml string value for 'bool': {s}")),
        },
        Yaml::Boolean(value) => Ok(*value),
        Yaml::Integer(i) => Ok(*i != 0),
        _ => Err(anyhow!(
            "yaml value type for 'bool' should be 'boolean' / 'string' / 'integer'"
        )),
    }
}

#[cfg(feature = "hickory")]
pub(crate) fn as_u16(v: &Yaml) -> anyhow::Result<u16> {
    match v {
        Yaml::String(s) => Ok(u16::from_str(s)?),
        Yaml::Integer(i) => Ok(u16::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'u16' should be 'string' or 'integer'"
        )),
    }
}

#[cfg(feature = "hickory")]
pub(crate) fn as_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(s) => Ok(usize::from_str(s)?),
        Yaml::Integer(i) => Ok(usize::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'usize' should be 'string' or 'integer'"
        )),
    }
}

pub(crate) fn as_str(v: &Yaml) -> anyhow::Result<&str> {
    match v {
        Yaml::String(s) => Ok(s),
        _ => Err(anyhow!("yaml value type should be 'string'")),
    }
}

pub(crate) fn as_ipaddr(v: &Yaml) -> anyhow::Result<IpAddr> {
    let s = as_str(v)?;
    crate::addr::parse_ip_literal(s).ok_or_else(|| anyhow!("invalid ip address {s}"))
}

pub(crate) fn as_list<T, F>(v: &Yaml, convert: F) -> anyhow::Result<Vec<T>>
where
    F: Fn(&Yaml) -> anyhow::Result<T>,
{
    match v {
        Yaml::Array(seq) => {
            let mut vec = Vec::with_capacity(seq.len());
            for (i, v) in seq.iter().enumerate() {
                let node = convert(v).context(format!("invalid value for list element #{i}"))?;
                vec.push(node);
            }
            Ok(vec)
        }
        _ => {
            let node = convert(v).context("invalid single value for the list")?;
            Ok(vec![node])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration() {
        let v = Yaml::String("1h2m".to_string());
        assert_eq!(as_duration(&v).unwrap(), Duration::from_secs(3600 + 120));

        let v = Yaml::String("200ms".to_string());
        assert_eq!(as_duration(&v).unwrap(), Duration::from_millis(200));

        let v = Yaml::String("1000".to_string());
        assert_eq!(as_duration(&v).unwrap(), Duration::from_secs(1000));

        let v = Yaml::String("1.5".to_string());
        assert!(as_duration(&v).is_err());

        let v = Yaml::Integer(3);
        assert_eq!(as_duration(&v).unwrap(), Duration::from_secs(3));

        let v = Yaml::Real("0.25".to_string());
        assert_eq!(as_duration(&v).unwrap(), Duration::from_millis(250));

        let v = Yaml::Integer(-3);
        assert!(as_duration(&v).is_err());

        let v = Yaml::String("5x".to_string());
        assert!(as_duration(&v).is_err());

        let v = Yaml::Boolean(true);
        assert!(as_duration(&v).is_err());
    }

    #[test]
    fn list() {
        let v = Yaml::Array(vec![
            Yaml::String("192.0.2.1".to_string()),
            Yaml::String("2001:db8::1".to_string()),
        ]);
        let ips = as_list(&v, as_ipaddr).unwrap();
        assert_eq!(ips.len(), 2);

        let v = Yaml::String("192.0.2.1".to_string());
        let ips = as_list(&v, as_ipaddr).unwrap();
        assert_eq!(ips, vec![IpAddr::from_str("192.0.2.1").unwrap()]);

        let v = Yaml::String("www.example.net".to_string());
        assert!(as_list(&v, as_ipaddr).is_err());
    }

    #[test]
    fn key() {
        assert_eq!(normalize_key("Update-Timeout"), "update_timeout");
        assert_eq!(normalize_key("a_b-C"), "a_b_c");
    }
}
