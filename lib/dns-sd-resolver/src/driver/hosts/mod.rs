/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod config;
pub use config::HostsDriverConfig;

mod driver;
pub use driver::HostsDriver;
