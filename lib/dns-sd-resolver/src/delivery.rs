/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! Execution contexts the resolver callbacks are delivered on.
//!
//! A context runs submitted jobs one at a time, in submission order.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, LazyLock};

use log::{error, warn};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

pub type DeliveryJob = Box<dyn FnOnce() + Send + 'static>;

pub trait DeliveryContext: Send + Sync {
    fn submit(&self, job: DeliveryJob);
}

pub type ArcDeliveryContext = Arc<dyn DeliveryContext>;

const DEFAULT_QUEUE_THREAD_NAME: &str = "dns-sd-callback";

static DEFAULT_QUEUE: LazyLock<ArcDeliveryContext> =
    LazyLock::new(|| Arc::new(SerialQueue::new(DEFAULT_QUEUE_THREAD_NAME)));

/// The process wide queue used when no context is given to a resolver.
pub fn default_queue() -> ArcDeliveryContext {
    Arc::clone(&DEFAULT_QUEUE)
}

fn run_job(job: DeliveryJob) {
    if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
        error!("panic in resolver callback");
    }
}

/// Runs jobs on a dedicated thread.
pub struct SerialQueue {
    sender: kanal::Sender<DeliveryJob>,
}

impl SerialQueue {
    pub fn new(thread_name: &str) -> Self {
        let (sender, receiver) = kanal::unbounded::<DeliveryJob>();
        let spawn_result = std::thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || {
                while let Ok(job) = receiver.recv() {
                    run_job(job);
                }
            });
        if let Err(e) = spawn_result {
            error!("failed to spawn delivery thread {thread_name}: {e}");
        }
        SerialQueue { sender }
    }
}

impl DeliveryContext for SerialQueue {
    fn submit(&self, job: DeliveryJob) {
        if self.sender.send(job).is_err() {
            warn!("delivery thread is gone, callback dropped");
        }
    }
}

/// Runs jobs in a single task on a tokio runtime.
pub struct TokioQueue {
    sender: mpsc::UnboundedSender<DeliveryJob>,
}

impl TokioQueue {
    /// Spawn the queue task on the current runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn spawn() -> Self {
        TokioQueue::spawn_on(&Handle::current())
    }

    pub fn spawn_on(handle: &Handle) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<DeliveryJob>();
        handle.spawn(async move {
            while let Some(job) = receiver.recv().await {
                run_job(job);
            }
        });
        TokioQueue { sender }
    }
}

impl DeliveryContext for TokioQueue {
    fn submit(&self, job: DeliveryJob) {
        if self.sender.send(job).is_err() {
            warn!("delivery task is gone, callback dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn serial_order() {
        let queue = SerialQueue::new("test-serial-queue");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (done_sender, done_receiver) = std::sync::mpsc::channel();
        for i in 0..100 {
            let seen = Arc::clone(&seen);
            queue.submit(Box::new(move || seen.lock().unwrap().push(i)));
        }
        queue.submit(Box::new(move || done_sender.send(()).unwrap()));
        done_receiver.recv().unwrap();
        assert_eq!(*seen.lock().unwrap(), (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn serial_survives_panic() {
        let queue = SerialQueue::new("test-serial-panic");
        let (done_sender, done_receiver) = std::sync::mpsc::channel();
        queue.submit(Box::new(|| panic!("callback failure")));
        queue.submit(Box::new(move || done_sender.send(()).unwrap()));
        done_receiver.recv().unwrap();
    }

    #[tokio::test]
    async fn tokio_order() {
        let queue = TokioQueue::spawn();
        let (sender, mut receiver) = mpsc::unbounded_channel();
        for i in 0..10 {
            let sender = sender.clone();
            queue.submit(Box::new(move || sender.send(i).unwrap()));
        }
        for i in 0..10 {
            assert_eq!(receiver.recv().await, Some(i));
        }
    }
}
