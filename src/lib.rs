use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, middleware, routing::post, Router};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer};

pub mod client;
pub mod config;
pub mod errors;
pub mod filter;
pub mod http;
pub mod logging;
pub mod rpc;
pub mod server;

pub use client::{ClientError, RpcClient};
pub use config::{ConfigError, ServerConfig};
pub use errors::RpcError;
pub use filter::AccessFilter;
pub use rpc::envelope::{RpcRequest, RpcResponse, PROTOCOL_VERSION};
pub use rpc::registry::{HandlerError, HandlerResult, MethodRegistry, RequestContext};
pub use server::{RpcServer, ServerError};

/// Shared per-server state, read by every in-flight request.
#[derive(Clone)]
pub struct ServerState {
    pub registry: Arc<MethodRegistry>,
    pub filter: AccessFilter,
}

/// Assemble the axum application: the single POST endpoint, enveloped
/// routing fallbacks, and the transport policy layers (body cap, access
/// filter, request logging, lifetime timeout, concurrency ceiling, and
/// optional response compression).
pub fn build_app(state: ServerState, config: &ServerConfig) -> Router {
    let mut app = Router::new()
        .route(
            "/",
            post(http::handlers::rpc_endpoint).fallback(http::handlers::method_not_allowed),
        )
        .fallback(http::handlers::not_found)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            filter::enforce_source_allowlist,
        ))
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(GlobalConcurrencyLimitLayer::new(config.concurrency_limit));

    if config.compression {
        app = app.layer(CompressionLayer::new());
    }

    app.with_state(state)
}
