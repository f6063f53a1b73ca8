use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::errors::RpcError;
use crate::rpc::registry::RequestContext;
use crate::ServerState;

/// Exact-match allow-list over caller source addresses.
///
/// The list is mandatory server input: an empty list denies every caller.
/// There is no wildcard, CIDR, or range matching.
#[derive(Debug, Clone)]
pub struct AccessFilter {
    allowed: Arc<[String]>,
}

impl AccessFilter {
    pub fn new(allowed: Vec<String>) -> Self {
        Self {
            allowed: Arc::from(allowed),
        }
    }

    /// Pure membership test against the configured allow-list.
    pub fn is_allowed(&self, source: &str) -> bool {
        self.allowed.iter().any(|entry| entry == source)
    }
}

/// Rejects callers outside the allow-list before any body parsing happens,
/// and hands admitted requests their `RequestContext`. A request without a
/// resolvable peer address is denied.
pub async fn enforce_source_allowlist(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, RpcError> {
    let source = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string());

    let Some(source) = source else {
        warn!("rejecting caller without a resolvable source address");
        return Err(RpcError::Forbidden);
    };

    if !state.filter.is_allowed(&source) {
        warn!(source = %source, "rejecting caller outside the allow-list");
        return Err(RpcError::Forbidden);
    }

    request
        .extensions_mut()
        .insert(RequestContext { remote_addr: source });
    Ok(next.run(request).await)
}
