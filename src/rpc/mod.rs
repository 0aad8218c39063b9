//! JSON-RPC 2.0 server pipeline
//!
//! Raw bodies flow through [`envelope`] parsing, [`dispatcher`] resolution and
//! invocation, and [`response`] serialization, orchestrated by [`server`].

pub mod binder;
pub mod dispatcher;
pub mod envelope;
pub mod error_map;
pub mod registry;
pub mod response;
pub mod server;
