//! Invocable targets and namespace resolution
//!
//! A [`Namespace`] is an explicit table of methods, each pairing a declared
//! [`MethodSignature`] with a [`Handler`]. A [`ProxyResolver`] turns the
//! namespace half of `Namespace.method` into one of those tables.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::errors::{RpcError, RpcResult};

/// Value returned by a handler, optionally stamped with the time the
/// underlying data last changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub payload: Value,
    pub last_modified: Option<DateTime<Utc>>,
}

impl Reply {
    pub fn new(payload: impl Into<Value>) -> Self {
        Self {
            payload: payload.into(),
            last_modified: None,
        }
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }
}

impl From<Value> for Reply {
    fn from(payload: Value) -> Self {
        Self::new(payload)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub default: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodSignature {
    pub params: Vec<ParamSpec>,
}

impl MethodSignature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            default: None,
        });
        self
    }

    pub fn optional(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            default: Some(default.into()),
        });
        self
    }

    /// Number of leading parameters a positional call must supply; trailing
    /// parameters with defaults may be omitted.
    pub fn required_arity(&self) -> usize {
        self.params
            .iter()
            .rposition(|param| param.default.is_none())
            .map_or(0, |index| index + 1)
    }
}

#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, args: Vec<Value>) -> RpcResult<Reply>;
}

#[async_trait]
impl<F> Handler for F
where
    F: Fn(Vec<Value>) -> RpcResult<Reply> + Send + Sync,
{
    async fn call(&self, args: Vec<Value>) -> RpcResult<Reply> {
        (self)(args)
    }
}

struct MethodEntry {
    signature: MethodSignature,
    handler: Arc<dyn Handler>,
}

pub struct Namespace {
    name: String,
    methods: HashMap<String, MethodEntry>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: HashMap::new(),
        }
    }

    pub fn method(
        mut self,
        name: impl Into<String>,
        signature: MethodSignature,
        handler: impl Handler + 'static,
    ) -> Self {
        self.methods.insert(
            name.into(),
            MethodEntry {
                signature,
                handler: Arc::new(handler),
            },
        );
        self
    }

    /// Registers a synchronous closure as a method.
    pub fn function<F>(
        self,
        name: impl Into<String>,
        signature: MethodSignature,
        function: F,
    ) -> Self
    where
        F: Fn(Vec<Value>) -> RpcResult<Reply> + Send + Sync + 'static,
    {
        self.method(name, signature, function)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self, method: &str) -> RpcResult<&MethodSignature> {
        self.entry(method).map(|entry| &entry.signature)
    }

    pub async fn invoke(&self, method: &str, args: Vec<Value>) -> RpcResult<Reply> {
        self.entry(method)?.handler.call(args).await
    }

    fn entry(&self, method: &str) -> RpcResult<&MethodEntry> {
        self.methods
            .get(method)
            .ok_or_else(RpcError::method_not_found)
    }
}

impl std::fmt::Debug for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut methods: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        methods.sort_unstable();
        f.debug_struct("Namespace")
            .field("name", &self.name)
            .field("methods", &methods)
            .finish()
    }
}

/// Maps the namespace part of a method name to an invocable target.
pub trait ProxyResolver: Send + Sync {
    fn resolve(&self, namespace: &str) -> RpcResult<Arc<Namespace>>;
}

impl<F> ProxyResolver for F
where
    F: Fn(&str) -> RpcResult<Arc<Namespace>> + Send + Sync,
{
    fn resolve(&self, namespace: &str) -> RpcResult<Arc<Namespace>> {
        (self)(namespace)
    }
}

#[derive(Debug, Default)]
pub struct RegistryResolver {
    namespaces: HashMap<String, Arc<Namespace>>,
}

impl RegistryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, namespace: Namespace) -> Self {
        self.namespaces
            .insert(namespace.name().to_string(), Arc::new(namespace));
        self
    }
}

impl ProxyResolver for RegistryResolver {
    fn resolve(&self, namespace: &str) -> RpcResult<Arc<Namespace>> {
        self.namespaces
            .get(namespace)
            .cloned()
            .ok_or_else(RpcError::method_not_found)
    }
}
