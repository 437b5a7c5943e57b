/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

pub mod addr;

mod error;
pub use error::{QueryDriverError, QueryError, QueryServerError, ResolverError};

mod config;
pub use config::{IpVersionFilter, QueryFamilies, ResolveJobConfig, ResolverTimeouts};

mod message;
pub use message::QueryEvent;

mod handle;
pub use handle::QuerySubscription;

pub mod delivery;
pub use delivery::{ArcDeliveryContext, DeliveryContext, DeliveryJob, SerialQueue, TokioQueue};

pub mod driver;
pub use driver::{AnyQueryDriverConfig, ArcQueryDriver, QueryDriver};

mod host;
mod runtime;
mod state;
mod timer;

mod resolver;
pub use resolver::{AddrResolver, ResolverCallback};

#[cfg(feature = "yaml")]
mod yaml;
