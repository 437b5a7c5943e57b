/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use tokio::task::JoinHandle;

/// Keeps a driver query alive. Unsubscribes when dropped.
#[derive(Debug, Default)]
pub struct QuerySubscription {
    task: Option<JoinHandle<()>>,
}

impl QuerySubscription {
    pub fn new(task: JoinHandle<()>) -> Self {
        QuerySubscription { task: Some(task) }
    }

    /// A subscription with nothing running behind it.
    pub fn detached() -> Self {
        QuerySubscription::default()
    }

    pub fn unsubscribe(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for QuerySubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
