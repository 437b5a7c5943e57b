/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::mpsc;

use super::config::normalize_name;
use crate::{
    QueryDriver, QueryError, QueryEvent, QueryFamilies, QueryServerError, QuerySubscription,
};

/// Answers from a fixed table, then reports there is nothing more to come.
pub struct HostsDriver {
    records: IndexMap<String, Vec<IpAddr>>,
}

impl HostsDriver {
    pub(super) fn new(records: IndexMap<String, Vec<IpAddr>>) -> Self {
        HostsDriver { records }
    }

    fn query(&self, target: &str, families: QueryFamilies) -> Vec<QueryEvent> {
        let Some(ips) = self.records.get(&normalize_name(target)) else {
            return vec![QueryEvent::Failed(QueryServerError::NotFound.into())];
        };

        let found: Vec<IpAddr> = ips
            .iter()
            .filter(|ip| families.accept(ip))
            .copied()
            .collect();
        if found.is_empty() {
            vec![QueryEvent::Failed(QueryError::NoRecords)]
        } else {
            vec![QueryEvent::added(found), QueryEvent::Finished]
        }
    }
}

impl QueryDriver for HostsDriver {
    fn subscribe(
        &self,
        target: Arc<str>,
        families: QueryFamilies,
        sender: mpsc::UnboundedSender<QueryEvent>,
    ) -> QuerySubscription {
        for event in self.query(&target, families) {
            if sender.send(event).is_err() {
                break;
            }
        }
        QuerySubscription::detached()
    }
}
