/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use chrono::Local;
use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command, ValueHint, value_parser};
use clap_complete::Shell;
use humanize_rs::ParseError;
use log::{debug, info};
use tokio::sync::mpsc;
use yaml_rust::YamlLoader;

use dns_sd_resolver::driver::hickory::HickoryDriverConfig;
use dns_sd_resolver::driver::hosts::HostsDriverConfig;
use dns_sd_resolver::{
    AddrResolver, AnyQueryDriverConfig, ArcDeliveryContext, IpVersionFilter, ResolveJobConfig,
    ResolverError, TokioQueue,
};

mod logger;

const ARG_COMPLETION: &str = "completion";
const ARG_VERBOSE: &str = "verbose";
const ARG_CONFIG: &str = "config";
const ARG_WAIT: &str = "wait";
const ARG_UPDATE: &str = "update";
const ARG_CANCEL: &str = "cancel";
const ARG_IPV4: &str = "ipv4";
const ARG_IPV6: &str = "ipv6";
const ARG_ANY: &str = "any";
const ARG_SERVER: &str = "server";
const ARG_PORT: &str = "port";
const ARG_ONCE: &str = "once";
const ARG_HOSTS: &str = "hosts";
const ARG_TARGET: &str = "target";

const GROUP_FAMILY: &str = "family";

fn parse_duration(s: &str) -> Result<Duration, String> {
    match humanize_rs::duration::parse(s) {
        Ok(d) => Ok(d),
        Err(ParseError::MissingUnit) => f64::from_str(s)
            .ok()
            .and_then(|f| Duration::try_from_secs_f64(f).ok())
            .ok_or_else(|| format!("invalid duration {s}")),
        Err(e) => Err(format!("invalid duration {s}: {e}")),
    }
}

fn parse_host_record(s: &str) -> Result<(String, IpAddr), String> {
    let (name, ip) = s
        .split_once('=')
        .ok_or_else(|| format!("no '=' found in host record {s}"))?;
    let ip = IpAddr::from_str(ip).map_err(|e| format!("invalid ip address {ip}: {e}"))?;
    Ok((name.to_string(), ip))
}

fn build_cli_args() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .arg(
            Arg::new(ARG_COMPLETION)
                .num_args(1)
                .value_name("SHELL")
                .long(ARG_COMPLETION)
                .value_parser(value_parser!(Shell))
                .exclusive(true),
        )
        .arg(
            Arg::new(ARG_VERBOSE)
                .help("Show verbose message")
                .num_args(0)
                .action(ArgAction::Count)
                .short('v'),
        )
        .arg(
            Arg::new(ARG_CONFIG)
                .help("Load resolve job config from this yaml file")
                .num_args(1)
                .long(ARG_CONFIG)
                .short('c')
                .value_parser(value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new(ARG_WAIT)
                .help("Collect results for this long before the first report")
                .num_args(1)
                .long(ARG_WAIT)
                .value_name("DURATION")
                .value_parser(parse_duration),
        )
        .arg(
            Arg::new(ARG_UPDATE)
                .help("Stop if no change is seen for this long after the first report")
                .num_args(1)
                .long(ARG_UPDATE)
                .value_name("DURATION")
                .value_parser(parse_duration),
        )
        .arg(
            Arg::new(ARG_CANCEL)
                .help("Stop after this long in any case")
                .num_args(1)
                .long(ARG_CANCEL)
                .value_name("DURATION")
                .value_parser(parse_duration),
        )
        .arg(
            Arg::new(ARG_IPV4)
                .help("Only accept IPv4 addresses")
                .action(ArgAction::SetTrue)
                .short('4'),
        )
        .arg(
            Arg::new(ARG_IPV6)
                .help("Only accept IPv6 addresses")
                .action(ArgAction::SetTrue)
                .short('6'),
        )
        .arg(
            Arg::new(ARG_ANY)
                .help("Accept addresses of both families")
                .action(ArgAction::SetTrue)
                .long(ARG_ANY),
        )
        .group(
            ArgGroup::new(GROUP_FAMILY)
                .args([ARG_IPV4, ARG_IPV6, ARG_ANY])
                .multiple(false),
        )
        .arg(
            Arg::new(ARG_SERVER)
                .help("DNS server to query instead of the system ones")
                .num_args(1)
                .long(ARG_SERVER)
                .short('s')
                .action(ArgAction::Append)
                .value_name("IP ADDRESS")
                .value_parser(value_parser!(IpAddr))
                .conflicts_with(ARG_HOSTS),
        )
        .arg(
            Arg::new(ARG_PORT)
                .help("Port of the DNS servers")
                .num_args(1)
                .long(ARG_PORT)
                .short('p')
                .value_parser(value_parser!(u16))
                .requires(ARG_SERVER),
        )
        .arg(
            Arg::new(ARG_ONCE)
                .help("Query only once instead of following record changes")
                .action(ArgAction::SetTrue)
                .long(ARG_ONCE)
                .conflicts_with(ARG_HOSTS),
        )
        .arg(
            Arg::new(ARG_HOSTS)
                .help("Answer from a static table instead of DNS")
                .num_args(1)
                .long(ARG_HOSTS)
                .action(ArgAction::Append)
                .value_name("NAME=IP")
                .value_parser(parse_host_record),
        )
        .arg(
            Arg::new(ARG_TARGET)
                .help("Domain name or ip address to resolve")
                .num_args(1)
                .required_unless_present(ARG_COMPLETION),
        )
}

fn load_config(path: &Path) -> anyhow::Result<ResolveJobConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
    let docs = YamlLoader::load_from_str(&content)
        .map_err(|e| anyhow!("invalid yaml file {}: {e}", path.display()))?;
    let Some(doc) = docs.first() else {
        return Ok(ResolveJobConfig::default());
    };
    ResolveJobConfig::parse_yaml(doc)
        .context(format!("failed to parse config file {}", path.display()))
}

fn hickory_config(config: &mut ResolveJobConfig) -> &mut HickoryDriverConfig {
    if !matches!(config.driver, AnyQueryDriverConfig::Hickory(_)) {
        config.driver = AnyQueryDriverConfig::Hickory(Box::default());
    }
    match &mut config.driver {
        AnyQueryDriverConfig::Hickory(c) => c,
        AnyQueryDriverConfig::Hosts(_) => unreachable!(),
    }
}

fn apply_args(config: &mut ResolveJobConfig, args: &ArgMatches) {
    if let Some(timeout) = args.get_one::<Duration>(ARG_WAIT) {
        config.timeouts.set_wait_timeout(*timeout);
    }
    if let Some(timeout) = args.get_one::<Duration>(ARG_UPDATE) {
        config.timeouts.set_update_timeout(*timeout);
    }
    if let Some(timeout) = args.get_one::<Duration>(ARG_CANCEL) {
        config.timeouts.set_cancel_timeout(*timeout);
    }

    if args.get_flag(ARG_IPV4) {
        config.version_filter = IpVersionFilter::Ipv4Only;
    } else if args.get_flag(ARG_IPV6) {
        config.version_filter = IpVersionFilter::Ipv6Only;
    } else if args.get_flag(ARG_ANY) {
        config.version_filter = IpVersionFilter::Any;
    }

    if let Some(records) = args.get_many::<(String, IpAddr)>(ARG_HOSTS) {
        let mut hosts = HostsDriverConfig::default();
        for (name, ip) in records {
            hosts.add_record(name, *ip);
        }
        config.driver = AnyQueryDriverConfig::Hosts(hosts);
        return;
    }

    if let Some(servers) = args.get_many::<IpAddr>(ARG_SERVER) {
        let hickory = hickory_config(config);
        for ip in servers {
            hickory.add_server(*ip);
        }
        if let Some(port) = args.get_one::<u16>(ARG_PORT) {
            hickory.set_server_port(*port);
        }
    }
    if args.get_flag(ARG_ONCE) {
        hickory_config(config).set_refresh(false);
    }
}

fn report(e: Option<ResolverError>, addrs: Option<Vec<IpAddr>>) -> String {
    let time = Local::now().format("%H:%M:%S%.3f");
    match (e, addrs) {
        (Some(e), _) => format!("{time} error: {e}"),
        (None, Some(addrs)) if addrs.is_empty() => format!("{time} canceled"),
        (None, Some(addrs)) => {
            let list: Vec<String> = addrs.iter().map(|ip| ip.to_string()).collect();
            format!("{time} {}", list.join(" "))
        }
        (None, None) => format!("{time} no result"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = build_cli_args().get_matches();

    if let Some(target) = args.get_one::<Shell>(ARG_COMPLETION) {
        let mut app = build_cli_args();
        let bin_name = app.get_name().to_string();
        clap_complete::generate(*target, &mut app, bin_name, &mut io::stdout());
        return Ok(());
    }

    let verbose_level = args.get_one::<u8>(ARG_VERBOSE).copied().unwrap_or_default();
    logger::SyncLogger::new(verbose_level)
        .into_global_logger()
        .map_err(|e| anyhow!("failed to setup logger: {e}"))?;

    let mut config = match args.get_one::<PathBuf>(ARG_CONFIG) {
        Some(path) => load_config(path)?,
        None => ResolveJobConfig::default(),
    };
    apply_args(&mut config, &args);
    debug!("resolve job config: {config:?}");

    let target = args
        .get_one::<String>(ARG_TARGET)
        .ok_or_else(|| anyhow!("no target set"))?;
    let driver = config
        .driver
        .spawn_query_driver()
        .context("failed to create query driver")?;

    // a literal is reported once and never changes
    let literal = AddrResolver::is_ip_address(target);
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let queue: ArcDeliveryContext = Arc::new(TokioQueue::spawn());
    let resolver = AddrResolver::resolver_for(
        target,
        config.timeouts,
        config.version_filter,
        Some(queue),
        driver,
        move |r, e, addrs| {
            let _ = sender.send(report(e, addrs));
            if literal {
                r.cancel();
            }
        },
    );
    resolver.activate();

    loop {
        tokio::select! {
            r = receiver.recv() => match r {
                Some(line) => println!("{line}"),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, cancel resolver for {target}");
                resolver.cancel();
            }
        }
    }

    match resolver.cancel_reason() {
        Some(e) => Err(anyhow!("resolve {target} failed: {e}")),
        None => Ok(()),
    }
}
