/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;

use super::QueryError;

/// Events sent by a query driver for one subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryEvent {
    /// Records appeared or went away.
    Update {
        added: Vec<IpAddr>,
        removed: Vec<IpAddr>,
    },
    /// The driver has nothing more to offer for this target.
    Finished,
    /// The query failed, no more events will follow.
    Failed(QueryError),
}

impl QueryEvent {
    pub fn added(addrs: Vec<IpAddr>) -> Self {
        QueryEvent::Update {
            added: addrs,
            removed: Vec::new(),
        }
    }

    pub fn removed(addrs: Vec<IpAddr>) -> Self {
        QueryEvent::Update {
            added: Vec::new(),
            removed: addrs,
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, QueryEvent::Finished | QueryEvent::Failed(_))
    }
}
