//! HTTP transport binding for the JSON-RPC server
//!
//! Provides the `/rpc` endpoint and a liveness probe.

pub mod handlers;
