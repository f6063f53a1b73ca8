//! Axum HTTP handlers for the RPC endpoint
//!
//! The endpoint takes the raw body bytes and defers everything else to the
//! dispatcher, so every outcome — success or failure — leaves as a response
//! envelope.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};

use crate::errors::{envelope_response, RpcError};
use crate::rpc::dispatch;
use crate::rpc::envelope::RpcResponse;
use crate::rpc::registry::RequestContext;
use crate::ServerState;

/// The single RPC endpoint: `POST /` with a request envelope body.
pub async fn rpc_endpoint(
    State(state): State<ServerState>,
    Extension(ctx): Extension<RequestContext>,
    body: Bytes,
) -> Response {
    match dispatch::dispatch(&state, &ctx, &body) {
        Ok(result) => envelope_response(StatusCode::OK, &RpcResponse::success(result)),
        Err(err) => err.into_response(),
    }
}

/// Fallback for paths other than the RPC endpoint.
pub async fn not_found() -> RpcError {
    RpcError::RouteNotFound
}

/// Fallback for non-POST calls on the RPC endpoint.
pub async fn method_not_allowed() -> RpcError {
    RpcError::MethodNotAllowed
}
