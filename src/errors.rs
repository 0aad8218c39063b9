use std::{borrow::Cow, error::Error as StdError};

use axum::http::StatusCode;
use thiserror::Error;

pub type RpcResult<T> = Result<T, RpcError>;

/// The five error kinds fixed by JSON-RPC 2.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
}

impl ErrorCode {
    pub const fn code(self) -> i64 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }

    pub const fn default_message(self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
        }
    }
}

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("{message}")]
    Protocol { code: ErrorCode, message: String },
    #[error("{message}")]
    Transport {
        status: StatusCode,
        message: String,
        #[source]
        source: Option<Box<RpcError>>,
    },
    #[error("{message}")]
    Application {
        kind: Cow<'static, str>,
        message: String,
    },
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

impl RpcError {
    fn protocol(code: ErrorCode) -> Self {
        Self::Protocol {
            code,
            message: code.default_message().to_string(),
        }
    }

    pub fn parse_error() -> Self {
        Self::protocol(ErrorCode::ParseError)
    }

    pub fn invalid_request() -> Self {
        Self::protocol(ErrorCode::InvalidRequest)
    }

    pub fn method_not_found() -> Self {
        Self::protocol(ErrorCode::MethodNotFound)
    }

    pub fn invalid_params() -> Self {
        Self::protocol(ErrorCode::InvalidParams)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    pub fn internal_from(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Internal {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub fn transport(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
            source: None,
        }
    }

    /// Re-wraps `self` as an HTTP 403 failure, keeping the original as source.
    pub fn into_forbidden(self) -> Self {
        Self::Transport {
            status: StatusCode::FORBIDDEN,
            message: "Access denied".to_string(),
            source: Some(Box::new(self)),
        }
    }

    pub fn application(kind: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self::Application {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Replaces the default message of a canonical protocol error.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        match self {
            Self::Protocol { code, .. } => Self::Protocol {
                code,
                message: message.into(),
            },
            other => other,
        }
    }

    pub fn protocol_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Protocol { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Application { kind, .. } => Some(kind.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal_from(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_codes_match_protocol_table() {
        assert_eq!(ErrorCode::ParseError.code(), -32700);
        assert_eq!(ErrorCode::InvalidRequest.code(), -32600);
        assert_eq!(ErrorCode::MethodNotFound.code(), -32601);
        assert_eq!(ErrorCode::InvalidParams.code(), -32602);
        assert_eq!(ErrorCode::InternalError.code(), -32603);
    }

    #[test]
    fn protocol_error_displays_default_or_override() {
        assert_eq!(RpcError::invalid_params().to_string(), "Invalid params");
        assert_eq!(
            RpcError::invalid_params()
                .with_message("missing b")
                .to_string(),
            "missing b"
        );
    }

    #[test]
    fn forbidden_wraps_original_error() {
        let err = RpcError::application("auth", "token expired").into_forbidden();

        match &err {
            RpcError::Transport { status, source, .. } => {
                assert_eq!(*status, StatusCode::FORBIDDEN);
                assert_eq!(
                    source.as_ref().and_then(|inner| inner.kind()),
                    Some("auth")
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), "Access denied");
    }
}
