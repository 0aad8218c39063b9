use std::{error::Error as StdError, time::Instant};

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::errors::RpcError;

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started_at = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started_at.elapsed().as_millis();

    info!(
        method = %method,
        path = %path,
        status = status.as_u16(),
        duration_ms = elapsed_ms,
        "request summary"
    );

    response
}

/// Fire-and-forget recorder for every error the server maps into a response.
pub trait ErrorSink: Send + Sync {
    fn record(&self, error: &RpcError);
}

#[derive(Debug, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn record(&self, err: &RpcError) {
        let chain = cause_chain(err);
        match err {
            RpcError::Protocol { code, .. } => {
                warn!(code = code.code(), error = %err, "rpc call rejected")
            }
            RpcError::Transport { status, .. } => {
                warn!(
                    status = status.as_u16(),
                    error = %err,
                    causes = %chain,
                    "rpc call failed with transport status"
                )
            }
            RpcError::Application { kind, .. } => {
                error!(kind = %kind, error = %err, "rpc call failed")
            }
            RpcError::Internal { .. } => {
                error!(error = %err, causes = %chain, "rpc call failed with internal error")
            }
        }
    }
}

fn cause_chain(err: &RpcError) -> String {
    let mut causes = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        causes.push(cause.to_string());
        current = cause.source();
    }
    causes.join(": ")
}
