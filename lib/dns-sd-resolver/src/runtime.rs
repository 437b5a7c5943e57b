/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::LazyLock;

use log::{debug, error};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

const BACKGROUND_THREAD_NAME: &str = "dns-sd-runtime";

static BACKGROUND_RUNTIME: LazyLock<Option<Handle>> = LazyLock::new(spawn_background_runtime);

fn spawn_background_runtime() -> Option<Handle> {
    let (rt_handle_sender, rt_handle_receiver) = oneshot::channel();
    let spawn_result = std::thread::Builder::new()
        .name(BACKGROUND_THREAD_NAME.to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!("failed to build background runtime: {e}");
                    return;
                }
            };

            if rt_handle_sender.send(rt.handle().clone()).is_ok() {
                rt.block_on(std::future::pending::<()>());
            }
        });
    if let Err(e) = spawn_result {
        error!("failed to spawn background runtime thread: {e}");
        return None;
    }

    let handle = rt_handle_receiver.blocking_recv().ok()?;
    debug!("background runtime started");
    Some(handle)
}

/// The runtime resolver tasks are spawned on.
///
/// This is the current runtime if there is one, or a process wide runtime
/// running on its own thread otherwise.
pub(crate) fn runtime_handle() -> Option<Handle> {
    match Handle::try_current() {
        Ok(handle) => Some(handle),
        Err(_) => BACKGROUND_RUNTIME.clone(),
    }
}
