/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use hickory_resolver::ResolveError;
use hickory_resolver::proto::ProtoErrorKind;
use hickory_resolver::proto::op::ResponseCode;

use crate::error::{QueryDriverError, QueryError, QueryServerError};

fn from_response_code(code: ResponseCode) -> QueryError {
    match code {
        ResponseCode::NoError => QueryError::NoRecords,
        ResponseCode::FormErr => QueryServerError::FormErr.into(),
        ResponseCode::ServFail => QueryServerError::ServFail.into(),
        ResponseCode::NXDomain => QueryServerError::NotFound.into(),
        ResponseCode::NotImp => QueryServerError::NotImp.into(),
        ResponseCode::Refused => QueryServerError::Refused.into(),
        ResponseCode::BADNAME => QueryDriverError::BadName.into(),
        _ => QueryDriverError::BadResp.into(),
    }
}

impl From<ResolveError> for QueryError {
    fn from(e: ResolveError) -> Self {
        let Some(proto) = e.proto() else {
            return QueryDriverError::Internal(e.to_string()).into();
        };
        match proto.kind() {
            ProtoErrorKind::NoRecordsFound { response_code, .. } => {
                from_response_code(*response_code)
            }
            ProtoErrorKind::Timeout => QueryDriverError::Timeout.into(),
            ProtoErrorKind::DomainNameTooLong(_) => QueryDriverError::BadName.into(),
            _ => QueryDriverError::Internal(e.to_string()).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_code() {
        assert_eq!(
            from_response_code(ResponseCode::NoError),
            QueryError::NoRecords
        );
        assert_eq!(
            from_response_code(ResponseCode::NXDomain),
            QueryError::FromServer(QueryServerError::NotFound)
        );
        assert_eq!(
            from_response_code(ResponseCode::Refused),
            QueryError::FromServer(QueryServerError::Refused)
        );
        assert_eq!(
            from_response_code(ResponseCode::BADNAME),
            QueryError::FromDriver(QueryDriverError::BadName)
        );
    }
}
