//! Conversion of pipeline failures into wire-level error descriptors

use std::{collections::HashSet, sync::Arc};

use crate::config::Environment;
use crate::errors::{ErrorCode, RpcError};
use crate::logging::ErrorSink;

const REDACTED_MESSAGE: &str = "Internal error";

#[derive(Debug)]
pub struct ErrorDescriptor {
    pub code: i64,
    pub message: String,
    /// Kept for diagnostics only; never serialized.
    pub cause: Option<RpcError>,
}

pub struct ErrorMapper {
    environment: Environment,
    access_violation_kinds: HashSet<String>,
    sink: Arc<dyn ErrorSink>,
}

impl ErrorMapper {
    pub fn new(
        environment: Environment,
        access_violation_kinds: HashSet<String>,
        sink: Arc<dyn ErrorSink>,
    ) -> Self {
        Self {
            environment,
            access_violation_kinds,
            sink,
        }
    }

    pub fn map(&self, err: RpcError) -> ErrorDescriptor {
        self.sink.record(&err);

        let err = if self.is_access_violation(&err) {
            err.into_forbidden()
        } else {
            err
        };

        let code = match &err {
            RpcError::Protocol { code, .. } => code.code(),
            RpcError::Transport { status, .. } => i64::from(status.as_u16()),
            RpcError::Application { .. } | RpcError::Internal { .. } => {
                ErrorCode::InternalError.code()
            }
        };

        if err.protocol_code().is_some() {
            return ErrorDescriptor {
                code,
                message: err.to_string(),
                cause: None,
            };
        }

        ErrorDescriptor {
            code,
            message: self.exposed_message(&err),
            cause: Some(err),
        }
    }

    fn is_access_violation(&self, err: &RpcError) -> bool {
        err.kind()
            .is_some_and(|kind| self.access_violation_kinds.contains(kind))
    }

    fn exposed_message(&self, err: &RpcError) -> String {
        if self.environment.is_production() {
            REDACTED_MESSAGE.to_string()
        } else {
            err.to_string()
        }
    }
}

impl std::fmt::Debug for ErrorMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorMapper")
            .field("environment", &self.environment)
            .field("access_violation_kinds", &self.access_violation_kinds)
            .finish_non_exhaustive()
    }
}
