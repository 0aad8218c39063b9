//! Request orchestration: parse, dispatch, aggregate, emit
//!
//! [`Server`] owns the read-only configuration shared by every call and
//! always hands a body to its [`Transport`], whatever went wrong.

use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::{Config, Environment};
use crate::errors::{RpcError, RpcResult};
use crate::logging::{ErrorSink, TracingErrorSink};
use crate::rpc::dispatcher::Dispatcher;
use crate::rpc::envelope::{self, Request};
use crate::rpc::error_map::ErrorMapper;
use crate::rpc::registry::{ProxyResolver, RegistryResolver};
use crate::rpc::response;

pub const CONTENT_TYPE: &str = "application/json";

/// Transport metadata attached to every emitted body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHeaders {
    pub content_type: &'static str,
    pub last_modified: String,
}

impl ResponseHeaders {
    pub fn new(last_modified: DateTime<Utc>) -> Self {
        Self {
            content_type: CONTENT_TYPE,
            last_modified: format_http_date(last_modified),
        }
    }
}

/// Receives the final body; implemented by the transport binding.
pub trait Transport {
    fn send(&mut self, body: String, headers: ResponseHeaders);
}

/// Formats a timestamp per RFC 1123, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn format_http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

pub struct ServerBuilder {
    resolver: Arc<dyn ProxyResolver>,
    environment: Environment,
    access_violation_kinds: HashSet<String>,
    sink: Arc<dyn ErrorSink>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self {
            resolver: Arc::new(RegistryResolver::new()),
            environment: Environment::default(),
            access_violation_kinds: HashSet::new(),
            sink: Arc::new(TracingErrorSink),
        }
    }
}

impl ServerBuilder {
    pub fn from_config(config: &Config) -> Self {
        let mut builder = Self::default().environment(config.environment);
        for kind in &config.access_violation_kinds {
            builder = builder.add_access_violation_kind(kind.clone());
        }
        builder
    }

    pub fn with_resolver(mut self, resolver: impl ProxyResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn add_access_violation_kind(mut self, kind: impl Into<String>) -> Self {
        self.access_violation_kinds.insert(kind.into());
        self
    }

    pub fn error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn build(self) -> Server {
        let mapper = Arc::new(ErrorMapper::new(
            self.environment,
            self.access_violation_kinds,
            self.sink,
        ));
        Server {
            dispatcher: Dispatcher::new(self.resolver, Arc::clone(&mapper)),
            mapper,
        }
    }
}

#[derive(Debug)]
pub struct Server {
    dispatcher: Dispatcher,
    mapper: Arc<ErrorMapper>,
}

/// A finished response waiting to be handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub body: String,
    pub last_modified: DateTime<Utc>,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Processes one raw request body and emits the result through `transport`.
    pub async fn process<T: Transport>(&self, raw: &[u8], transport: &mut T) {
        let emission = self.handle(raw).await;
        transport.send(emission.body, ResponseHeaders::new(emission.last_modified));
    }

    pub async fn handle(&self, raw: &[u8]) -> Emission {
        match self.try_handle(raw).await {
            Ok(emission) => emission,
            Err(err) => self.failure_emission(err),
        }
    }

    async fn try_handle(&self, raw: &[u8]) -> RpcResult<Emission> {
        match envelope::parse(raw)? {
            Request::Single(envelope) => {
                let outcome = self.dispatcher.dispatch(&envelope).await;
                Ok(Emission {
                    body: response::build(&outcome, envelope.id)?,
                    last_modified: outcome.last_modified().unwrap_or_else(Utc::now),
                })
            }
            Request::Batch(envelopes) => {
                debug!(size = envelopes.len(), "processing batch request");

                let mut bodies = Vec::with_capacity(envelopes.len());
                let mut last_modified = None;
                for envelope in &envelopes {
                    let outcome = self.dispatcher.dispatch(envelope).await;
                    last_modified = last_modified.max(outcome.last_modified());
                    // Batch members without an id never get an entry, even on
                    // failure; the mapper has already recorded it.
                    if !envelope.is_notification() {
                        bodies.push(response::build(&outcome, envelope.id)?);
                    }
                }

                Ok(Emission {
                    body: format!("[{}]", bodies.join(",")),
                    last_modified: last_modified.unwrap_or_else(Utc::now),
                })
            }
        }
    }

    fn failure_emission(&self, err: RpcError) -> Emission {
        let descriptor = self.mapper.map(err);
        let body = response::build_error(&descriptor, None).unwrap_or_else(|_| {
            format!(
                r#"{{"jsonrpc":"2.0","id":null,"error":{{"code":{},"message":"Internal error"}}}}"#,
                descriptor.code
            )
        });
        Emission {
            body,
            last_modified: Utc::now(),
        }
    }
}
