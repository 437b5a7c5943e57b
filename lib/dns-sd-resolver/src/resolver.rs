/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use log::{debug, warn};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::config::{IpVersionFilter, ResolverTimeouts};
use crate::delivery::{self, ArcDeliveryContext};
use crate::driver::ArcQueryDriver;
use crate::error::{QueryDriverError, QueryError, ResolverError};
use crate::message::QueryEvent;
use crate::state::{AddrSetChange, ResolverPhase, ResolverState};
use crate::timer::TimerKind;

/// Called with the resolver, the terminal error if any, and the current
/// address list if any.
///
/// A call with an error is always the last one. A call with neither an
/// error nor any address is the last one as well and means the resolver
/// was canceled by its owner before anything was found.
pub type ResolverCallback =
    Box<dyn FnMut(&Arc<AddrResolver>, Option<ResolverError>, Option<Vec<IpAddr>>) + Send>;

/// Resolves one target into a live set of addresses.
///
/// Created inert by [`AddrResolver::resolver_for`], started with
/// [`AddrResolver::activate`], and stopped for good by [`AddrResolver::cancel`]
/// or by one of its timers or a terminal driver event.
pub struct AddrResolver {
    target: Arc<str>,
    timeouts: ResolverTimeouts,
    version_filter: IpVersionFilter,
    queue: ArcDeliveryContext,
    driver: ArcQueryDriver,
    runtime: Option<Handle>,
    callback: Mutex<Option<ResolverCallback>>,
    state: Mutex<ResolverState>,
}

impl AddrResolver {
    /// Create an inert resolver. Nothing is started until [`AddrResolver::activate`].
    ///
    /// Callbacks run on `queue`, or on a process wide serial queue if none is given.
    /// The queue must not run jobs inline from `submit`.
    pub fn resolver_for<F>(
        target: &str,
        timeouts: ResolverTimeouts,
        version_filter: IpVersionFilter,
        queue: Option<ArcDeliveryContext>,
        driver: ArcQueryDriver,
        callback: F,
    ) -> Arc<Self>
    where
        F: FnMut(&Arc<AddrResolver>, Option<ResolverError>, Option<Vec<IpAddr>>) + Send + 'static,
    {
        Arc::new(AddrResolver {
            target: Arc::from(target),
            timeouts,
            version_filter,
            queue: queue.unwrap_or_else(delivery::default_queue),
            driver,
            runtime: crate::runtime::runtime_handle(),
            callback: Mutex::new(Some(Box::new(callback))),
            state: Mutex::new(ResolverState::new()),
        })
    }

    #[inline]
    pub fn is_ip_address(s: &str) -> bool {
        crate::addr::is_ip_address(s)
    }

    #[inline]
    pub fn is_ipv4_address(s: &str) -> bool {
        crate::addr::is_ipv4_address(s)
    }

    #[inline]
    pub fn is_ipv6_address(s: &str) -> bool {
        crate::addr::is_ipv6_address(s)
    }

    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[inline]
    pub fn timeouts(&self) -> &ResolverTimeouts {
        &self.timeouts
    }

    #[inline]
    pub fn version_filter(&self) -> IpVersionFilter {
        self.version_filter
    }

    #[inline]
    pub fn delivery_queue(&self) -> &ArcDeliveryContext {
        &self.queue
    }

    fn lock_state(&self) -> MutexGuard<'_, ResolverState> {
        self.state.lock().unwrap()
    }

    pub fn is_active(&self) -> bool {
        self.lock_state().is_active()
    }

    /// Why the resolver stopped. `None` while running or after [`AddrResolver::cancel`].
    pub fn cancel_reason(&self) -> Option<ResolverError> {
        self.lock_state().cancel_reason.clone()
    }

    pub fn activate(self: &Arc<Self>) {
        let literal = crate::addr::parse_ip_literal(&self.target);
        let families = match literal {
            Some(_) => self.version_filter.literal_families(),
            None => self.version_filter.query_families(),
        };

        let mut state = self.lock_state();
        if state.phase != ResolverPhase::Inert {
            warn!("resolver for {} activated more than once", self.target);
            return;
        }
        state.phase = ResolverPhase::Active;
        state.families = families;
        debug!(
            "activate resolver for {} with {:?} {:?}",
            self.target, families, self.timeouts
        );

        let Some(rt) = self.runtime.clone() else {
            let e = QueryError::from(QueryDriverError::Internal(
                "no async runtime available".to_string(),
            ));
            self.cancel_locked(&mut state, Some(ResolverError::System(e)));
            return;
        };
        let _rt_guard = rt.enter();

        if let Some(timeout) = self.timeouts.cancel_timeout() {
            self.arm_timer(&mut state, &rt, TimerKind::Cancel, timeout);
        }
        match self.timeouts.wait_timeout() {
            Some(timeout) => self.arm_timer(&mut state, &rt, TimerKind::Wait, timeout),
            None => state.wait_elapsed = true,
        }

        if let Some(ip) = literal {
            state.literal = true;
            if !families.accept(&ip) {
                self.cancel_locked(&mut state, Some(ResolverError::NoSuchAddress));
                return;
            }
            self.handle_update(&mut state, &rt, &[ip], &[]);
            return;
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        let subscription = self
            .driver
            .subscribe(Arc::clone(&self.target), families, sender);
        state.subscription = Some(subscription);
        let resolver = Arc::downgrade(self);
        state.event_pump = Some(rt.spawn(pump_events(resolver, receiver)));
    }

    /// Stop the resolver. Safe to call at any time, any number of times,
    /// including from inside the callback.
    pub fn cancel(self: &Arc<Self>) {
        let mut state = self.lock_state();
        match state.phase {
            ResolverPhase::Active => self.cancel_locked(&mut state, None),
            ResolverPhase::Inert => debug!("cancel on inert resolver for {}", self.target),
            ResolverPhase::Canceled => {}
        }
    }

    fn arm_timer(
        self: &Arc<Self>,
        state: &mut ResolverState,
        rt: &Handle,
        kind: TimerKind,
        delay: Duration,
    ) {
        let resolver = Arc::downgrade(self);
        state.timers.arm(kind, rt, delay, move |generation| {
            if let Some(resolver) = resolver.upgrade() {
                resolver.on_timer(kind, generation);
            }
        });
    }

    fn on_timer(self: &Arc<Self>, kind: TimerKind, generation: u64) {
        let mut state = self.lock_state();
        if !state.is_active() || !state.timers.fire(kind, generation) {
            return;
        }
        let Some(rt) = self.runtime.clone() else {
            return;
        };
        debug!("{kind} timer fired for {}", self.target);

        match kind {
            TimerKind::Wait => {
                state.wait_elapsed = true;
                if state.has_pending() {
                    self.deliver_addrs(&mut state, &rt);
                }
            }
            TimerKind::Update => {
                self.cancel_locked(&mut state, Some(ResolverError::UpdateTimeoutHit))
            }
            TimerKind::Cancel => {
                self.cancel_locked(&mut state, Some(ResolverError::CancelTimeoutHit))
            }
        }
    }

    fn on_query_event(self: &Arc<Self>, event: QueryEvent) {
        let mut state = self.lock_state();
        if !state.is_active() {
            return;
        }
        let Some(rt) = self.runtime.clone() else {
            return;
        };

        match event {
            QueryEvent::Update { added, removed } => {
                self.handle_update(&mut state, &rt, &added, &removed);
            }
            QueryEvent::Finished => {
                if !state.delivered_any && !state.has_pending() {
                    self.cancel_locked(&mut state, Some(ResolverError::NoMoreResults));
                } else {
                    debug!("no more results for {}", self.target);
                }
            }
            QueryEvent::Failed(e) => {
                debug!("query for {} failed: {e}", self.target);
                self.cancel_locked(&mut state, Some(ResolverError::from(e)));
            }
        }
    }

    fn handle_update(
        self: &Arc<Self>,
        state: &mut ResolverState,
        rt: &Handle,
        added: &[IpAddr],
        removed: &[IpAddr],
    ) {
        match state.apply_update(added, removed) {
            AddrSetChange::Unchanged => {}
            AddrSetChange::Emptied => {
                if state.delivered_any {
                    self.rearm_update_timer(state, rt);
                }
            }
            AddrSetChange::Changed => {
                if state.may_deliver() {
                    self.deliver_addrs(state, rt);
                }
            }
        }
    }

    fn rearm_update_timer(self: &Arc<Self>, state: &mut ResolverState, rt: &Handle) {
        if state.literal {
            // a delivered literal is final
            state.timers.abort(TimerKind::Cancel);
            return;
        }
        if let Some(timeout) = self.timeouts.update_timeout() {
            self.arm_timer(state, rt, TimerKind::Update, timeout);
        }
    }

    fn deliver_addrs(self: &Arc<Self>, state: &mut ResolverState, rt: &Handle) {
        let addrs = state.addr_list();
        state.delivered_any = true;
        self.submit(Some((None, Some(addrs))), false);
        self.rearm_update_timer(state, rt);
    }

    /// Move to the canceled state and queue the final callbacks.
    fn cancel_locked(self: &Arc<Self>, state: &mut ResolverState, reason: Option<ResolverError>) {
        if state.phase == ResolverPhase::Canceled {
            return;
        }
        state.phase = ResolverPhase::Canceled;
        state.cancel_reason = reason.clone();
        state.release();

        let flushed = state.has_pending().then(|| state.addr_list());
        match reason {
            Some(e) => {
                debug!("resolver for {} canceled: {e}", self.target);
                if let Some(addrs) = flushed {
                    self.submit(Some((None, Some(addrs))), false);
                }
                self.submit(Some((Some(e), None)), true);
            }
            None => {
                debug!("resolver for {} canceled by its owner", self.target);
                if let Some(addrs) = flushed {
                    self.submit(Some((None, Some(addrs))), true);
                } else if !state.delivered_any {
                    self.submit(Some((None, Some(Vec::new()))), true);
                } else {
                    self.submit(None, true);
                }
            }
        }
    }

    /// Queue one callback invocation. With `terminal` set, the callback is
    /// dropped after it ran, or without running it if `args` is `None`.
    fn submit(
        self: &Arc<Self>,
        args: Option<(Option<ResolverError>, Option<Vec<IpAddr>>)>,
        terminal: bool,
    ) {
        let resolver = Arc::clone(self);
        self.queue.submit(Box::new(move || {
            resolver.run_callback(args, terminal);
        }));
    }

    fn run_callback(
        self: &Arc<Self>,
        args: Option<(Option<ResolverError>, Option<Vec<IpAddr>>)>,
        terminal: bool,
    ) {
        // a panicking callback poisons the lock, later jobs still need it
        let mut guard = self.callback.lock().unwrap_or_else(|e| e.into_inner());
        if terminal {
            let callback = guard.take();
            drop(guard);
            if let (Some((error, addrs)), Some(mut callback)) = (args, callback) {
                callback(self, error, addrs);
            }
            return;
        }
        if let (Some((error, addrs)), Some(callback)) = (args, guard.as_mut()) {
            callback(self, error, addrs);
        }
    }
}

async fn pump_events(
    resolver: Weak<AddrResolver>,
    mut receiver: mpsc::UnboundedReceiver<QueryEvent>,
) {
    while let Some(event) = receiver.recv().await {
        let Some(resolver) = resolver.upgrade() else {
            break;
        };
        let terminal = event.is_terminal();
        resolver.on_query_event(event);
        if terminal {
            break;
        }
    }
}

impl Drop for AddrResolver {
    fn drop(&mut self) {
        let state = match self.state.get_mut() {
            Ok(state) => state,
            Err(e) => e.into_inner(),
        };
        state.release();
    }
}
