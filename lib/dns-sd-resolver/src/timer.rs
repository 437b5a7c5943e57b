/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum TimerKind {
    Wait,
    Update,
    Cancel,
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerKind::Wait => f.write_str("wait"),
            TimerKind::Update => f.write_str("update"),
            TimerKind::Cancel => f.write_str("cancel"),
        }
    }
}

#[derive(Default)]
struct TimerSlot {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl TimerSlot {
    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// The three timers of one resolver.
///
/// Each arm bumps a generation number which is handed to the fire
/// callback. A firing is only honored if it carries the generation of the
/// latest arm, so a sleep that completes while being re-armed or aborted
/// has no effect.
#[derive(Default)]
pub(crate) struct ResolverTimers {
    next_generation: u64,
    wait: TimerSlot,
    update: TimerSlot,
    cancel: TimerSlot,
}

impl ResolverTimers {
    fn slot_mut(&mut self, kind: TimerKind) -> &mut TimerSlot {
        match kind {
            TimerKind::Wait => &mut self.wait,
            TimerKind::Update => &mut self.update,
            TimerKind::Cancel => &mut self.cancel,
        }
    }

    pub(crate) fn arm<F>(&mut self, kind: TimerKind, rt: &Handle, delay: Duration, on_fire: F)
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.next_generation += 1;
        let generation = self.next_generation;

        let slot = self.slot_mut(kind);
        slot.abort();
        slot.generation = generation;
        slot.task = Some(rt.spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire(generation);
        }));
    }

    /// Claim a firing. Returns false if the timer was re-armed or aborted since.
    pub(crate) fn fire(&mut self, kind: TimerKind, generation: u64) -> bool {
        let slot = self.slot_mut(kind);
        if slot.task.is_none() || slot.generation != generation {
            return false;
        }
        slot.task = None;
        true
    }

    pub(crate) fn abort(&mut self, kind: TimerKind) {
        self.slot_mut(kind).abort();
    }

    pub(crate) fn abort_all(&mut self) {
        self.wait.abort();
        self.update.abort();
        self.cancel.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn rearm_drops_stale_firing() {
        let rt = Handle::current();
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut timers = ResolverTimers::default();

        let s = sender.clone();
        timers.arm(TimerKind::Update, &rt, Duration::from_millis(100), move |g| {
            let _ = s.send(g);
        });
        let s = sender.clone();
        timers.arm(TimerKind::Update, &rt, Duration::from_millis(200), move |g| {
            let _ = s.send(g);
        });
        assert!(timers.update.task.is_some());

        let g = receiver.recv().await.unwrap();
        assert_eq!(g, 2);
        assert!(!timers.fire(TimerKind::Update, 1));
        assert!(timers.fire(TimerKind::Update, g));
        assert!(!timers.fire(TimerKind::Update, g));
        assert!(timers.update.task.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn abort() {
        let rt = Handle::current();
        let (sender, mut receiver) = mpsc::unbounded_channel::<u64>();
        let mut timers = ResolverTimers::default();
        timers.arm(TimerKind::Cancel, &rt, Duration::from_millis(50), move |g| {
            let _ = sender.send(g);
        });
        timers.abort(TimerKind::Cancel);
        assert!(timers.cancel.task.is_none());
        assert!(!timers.fire(TimerKind::Cancel, 1));
        timers.abort_all();
        assert_eq!(receiver.recv().await, None);
    }
}
