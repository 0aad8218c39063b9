use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::errors::{RpcError, RpcResult};
use crate::rpc::binder;
use crate::rpc::envelope::Envelope;
use crate::rpc::error_map::{ErrorDescriptor, ErrorMapper};
use crate::rpc::registry::{ProxyResolver, Reply};

/// Terminal result of dispatching one envelope.
#[derive(Debug)]
pub enum Outcome {
    Success {
        payload: Value,
        last_modified: DateTime<Utc>,
    },
    Failure(ErrorDescriptor),
}

impl Outcome {
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Success { last_modified, .. } => Some(*last_modified),
            Self::Failure(_) => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

pub struct Dispatcher {
    resolver: Arc<dyn ProxyResolver>,
    mapper: Arc<ErrorMapper>,
}

impl Dispatcher {
    pub fn new(resolver: Arc<dyn ProxyResolver>, mapper: Arc<ErrorMapper>) -> Self {
        Self { resolver, mapper }
    }

    /// Runs one call to completion; failures never escape as errors.
    pub async fn dispatch(&self, envelope: &Envelope) -> Outcome {
        let outcome = match self.invoke(envelope).await {
            Ok(reply) => Outcome::Success {
                payload: reply.payload,
                last_modified: reply.last_modified.unwrap_or_else(Utc::now),
            },
            Err(err) => Outcome::Failure(self.mapper.map(err)),
        };

        debug!(
            namespace = %envelope.namespace,
            method = %envelope.method,
            notification = envelope.is_notification(),
            outcome = if outcome.is_failure() { "failure" } else { "success" },
            "rpc call dispatched"
        );

        outcome
    }

    async fn invoke(&self, envelope: &Envelope) -> RpcResult<Reply> {
        let target = self.resolver.resolve(&envelope.namespace)?;
        let signature = target.signature(&envelope.method)?;
        let args = binder::bind(signature, envelope.params.as_ref())?;

        let required = signature.required_arity();
        if args.len() < required {
            return Err(RpcError::internal(format!(
                "{}.{} expects at least {required} arguments, got {}",
                envelope.namespace,
                envelope.method,
                args.len()
            )));
        }

        target.invoke(&envelope.method, args).await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("mapper", &self.mapper)
            .finish_non_exhaustive()
    }
}
