/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryServerError {
    #[error("server claims query was malformed")]
    FormErr,
    #[error("server returned general failure")]
    ServFail,
    #[error("server claims domain name not found")]
    NotFound,
    #[error("server does not implement requested operation")]
    NotImp,
    #[error("server refused query")]
    Refused,
}

impl QueryServerError {
    pub fn get_type(&self) -> &str {
        match self {
            QueryServerError::FormErr => "FORMERR",
            QueryServerError::ServFail => "SERVFAIL",
            QueryServerError::NotFound => "NOTFOUND",
            QueryServerError::NotImp => "NOTIMP",
            QueryServerError::Refused => "REFUSED",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryDriverError {
    #[error("malformed domain name")]
    BadName,
    #[error("malformed DNS reply")]
    BadResp,
    #[error("connection refused by server")]
    ConnRefused,
    #[error("timeout while contacting server")]
    Timeout,
    #[error("internal error: {0}")]
    Internal(String),
}

impl QueryDriverError {
    pub fn get_type(&self) -> &str {
        match self {
            QueryDriverError::BadName => "BadName",
            QueryDriverError::BadResp => "BadResp",
            QueryDriverError::ConnRefused => "ConnRefused",
            QueryDriverError::Timeout => "Timeout",
            QueryDriverError::Internal(_) => "InternalError",
        }
    }
}

/// Terminal error reported by a query driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("server error: {0}")]
    FromServer(#[from] QueryServerError),
    #[error("driver error: {0}")]
    FromDriver(#[from] QueryDriverError),
    #[error("no record found for the requested address family")]
    NoRecords,
}

impl QueryError {
    pub fn get_type(&self) -> &str {
        match self {
            QueryError::FromServer(_) => "ServerError",
            QueryError::FromDriver(_) => "DriverError",
            QueryError::NoRecords => "NoRecords",
        }
    }

    pub fn get_subtype(&self) -> &str {
        match self {
            QueryError::FromServer(e) => e.get_type(),
            QueryError::FromDriver(e) => e.get_type(),
            QueryError::NoRecords => "",
        }
    }
}

/// The reason an [`AddrResolver`](crate::AddrResolver) stopped on its own.
///
/// Every variant is terminal. It is only ever handed to the callback, along
/// with the final invocation, and kept as the resolver's cancel reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    #[error("system error: {0}")]
    System(#[source] QueryError),
    #[error("update timeout hit")]
    UpdateTimeoutHit,
    #[error("cancel timeout hit")]
    CancelTimeoutHit,
    #[error("no more results can be expected")]
    NoMoreResults,
    #[error("system query timed out")]
    SystemTimeout,
    #[error("no such domain")]
    NoSuchDomain,
    #[error("no address record of the requested family")]
    NoSuchAddress,
}

impl ResolverError {
    pub fn get_type(&self) -> &str {
        match self {
            ResolverError::System(_) => "System",
            ResolverError::UpdateTimeoutHit => "UpdateTimeoutHit",
            ResolverError::CancelTimeoutHit => "CancelTimeoutHit",
            ResolverError::NoMoreResults => "NoMoreResults",
            ResolverError::SystemTimeout => "SystemTimeout",
            ResolverError::NoSuchDomain => "NoSuchDomain",
            ResolverError::NoSuchAddress => "NoSuchAddress",
        }
    }
}

impl From<QueryError> for ResolverError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::FromServer(QueryServerError::NotFound) => ResolverError::NoSuchDomain,
            QueryError::FromDriver(QueryDriverError::Timeout) => ResolverError::SystemTimeout,
            QueryError::NoRecords => ResolverError::NoSuchAddress,
            e => ResolverError::System(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn map_query_error() {
        assert_eq!(
            ResolverError::from(QueryError::from(QueryServerError::NotFound)),
            ResolverError::NoSuchDomain
        );
        assert_eq!(
            ResolverError::from(QueryError::from(QueryDriverError::Timeout)),
            ResolverError::SystemTimeout
        );
        assert_eq!(
            ResolverError::from(QueryError::NoRecords),
            ResolverError::NoSuchAddress
        );

        let e = ResolverError::from(QueryError::from(QueryServerError::Refused));
        assert_eq!(e.get_type(), "System");
        let ResolverError::System(cause) = &e else {
            panic!("unexpected error {e:?}");
        };
        assert_eq!(cause.get_type(), "ServerError");
        assert_eq!(cause.get_subtype(), "REFUSED");
        assert!(e.source().is_some());
    }
}
