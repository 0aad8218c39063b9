use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub mod config;
pub mod errors;
pub mod http;
pub mod logging;
pub mod rpc;

pub use errors::{ErrorCode, RpcError, RpcResult};
pub use rpc::registry::{MethodSignature, Namespace, ProxyResolver, RegistryResolver, Reply};
pub use rpc::server::{Server, ServerBuilder};

#[derive(Clone)]
pub struct AppState {
    pub server: Arc<Server>,
}

impl AppState {
    pub fn new(server: Server) -> Self {
        Self {
            server: Arc::new(server),
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(http::handlers::health))
        .route("/rpc", post(http::handlers::rpc_endpoint))
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
