/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;

use indexmap::IndexSet;
use tokio::task::JoinHandle;

use crate::config::QueryFamilies;
use crate::error::ResolverError;
use crate::handle::QuerySubscription;
use crate::timer::ResolverTimers;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ResolverPhase {
    Inert,
    Active,
    Canceled,
}

/// What an address update did to the accumulated set.
#[derive(Debug, Eq, PartialEq)]
pub(crate) enum AddrSetChange {
    Unchanged,
    Emptied,
    Changed,
}

/// Mutable part of a resolver, always accessed under its mutex.
pub(crate) struct ResolverState {
    pub(crate) phase: ResolverPhase,
    pub(crate) cancel_reason: Option<ResolverError>,
    pub(crate) families: QueryFamilies,
    pub(crate) literal: bool,
    pub(crate) wait_elapsed: bool,
    pub(crate) delivered_any: bool,
    addrs: IndexSet<IpAddr>,
    pub(crate) timers: ResolverTimers,
    pub(crate) subscription: Option<QuerySubscription>,
    pub(crate) event_pump: Option<JoinHandle<()>>,
}

impl ResolverState {
    pub(crate) fn new() -> Self {
        ResolverState {
            phase: ResolverPhase::Inert,
            cancel_reason: None,
            families: QueryFamilies::Both,
            literal: false,
            wait_elapsed: false,
            delivered_any: false,
            addrs: IndexSet::new(),
            timers: ResolverTimers::default(),
            subscription: None,
            event_pump: None,
        }
    }

    #[inline]
    pub(crate) fn is_active(&self) -> bool {
        self.phase == ResolverPhase::Active
    }

    /// Apply filtered removals and additions to the address set.
    pub(crate) fn apply_update(&mut self, added: &[IpAddr], removed: &[IpAddr]) -> AddrSetChange {
        let families = self.families;
        let mut changed = false;
        for ip in removed {
            if self.addrs.shift_remove(ip) {
                changed = true;
            }
        }
        for ip in added.iter().filter(|ip| families.accept(ip)) {
            if self.addrs.insert(*ip) {
                changed = true;
            }
        }

        if !changed {
            AddrSetChange::Unchanged
        } else if self.addrs.is_empty() {
            AddrSetChange::Emptied
        } else {
            AddrSetChange::Changed
        }
    }

    /// Whether the next accepted change may be delivered right away.
    #[inline]
    pub(crate) fn may_deliver(&self) -> bool {
        self.delivered_any || self.wait_elapsed
    }

    /// Addresses accepted before the first delivery and not yet delivered.
    #[inline]
    pub(crate) fn has_pending(&self) -> bool {
        !self.delivered_any && !self.addrs.is_empty()
    }

    pub(crate) fn addr_list(&self) -> Vec<IpAddr> {
        self.addrs.iter().copied().collect()
    }

    /// Stop everything running on behalf of this resolver.
    pub(crate) fn release(&mut self) {
        self.timers.abort_all();
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        if let Some(pump) = self.event_pump.take() {
            pump.abort();
        }
    }
}
