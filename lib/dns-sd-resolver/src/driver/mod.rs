/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::QueryFamilies;
use crate::handle::QuerySubscription;
use crate::message::QueryEvent;

pub mod hosts;

#[cfg(feature = "hickory")]
pub mod hickory;

#[cfg(feature = "yaml")]
mod yaml;

/// The name resolution service a resolver listens on.
pub trait QueryDriver: Send + Sync {
    /// Start querying `target` for the given families.
    ///
    /// Events go to `sender` until the returned subscription is dropped or
    /// unsubscribed, or a terminal event has been sent. This is always
    /// called from within a tokio runtime context.
    fn subscribe(
        &self,
        target: Arc<str>,
        families: QueryFamilies,
        sender: mpsc::UnboundedSender<QueryEvent>,
    ) -> QuerySubscription;
}

pub type ArcQueryDriver = Arc<dyn QueryDriver>;

#[derive(Clone, Debug, PartialEq)]
pub enum AnyQueryDriverConfig {
    Hosts(hosts::HostsDriverConfig),
    #[cfg(feature = "hickory")]
    Hickory(Box<hickory::HickoryDriverConfig>),
}

impl Default for AnyQueryDriverConfig {
    fn default() -> Self {
        #[cfg(feature = "hickory")]
        {
            AnyQueryDriverConfig::Hickory(Box::default())
        }
        #[cfg(not(feature = "hickory"))]
        {
            AnyQueryDriverConfig::Hosts(hosts::HostsDriverConfig::default())
        }
    }
}

impl AnyQueryDriverConfig {
    pub fn spawn_query_driver(&self) -> anyhow::Result<ArcQueryDriver> {
        match self {
            AnyQueryDriverConfig::Hosts(c) => Ok(c.spawn_query_driver()),
            #[cfg(feature = "hickory")]
            AnyQueryDriverConfig::Hickory(c) => c.spawn_query_driver(),
        }
    }
}
