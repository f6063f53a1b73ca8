//! The request dispatch state machine
//!
//! Validates a raw request body into an envelope, finds the registered
//! handler, invokes it behind a panic boundary, and reports the outcome as
//! either the handler's result value or an `RpcError`.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::Value;
use tracing::debug;

use crate::errors::RpcError;
use crate::rpc::envelope::{self, PROTOCOL_VERSION};
use crate::rpc::registry::{Handler, RequestContext};
use crate::ServerState;

/// Run one raw request body through validation, lookup, and invocation.
/// Each check short-circuits; the HTTP layer turns the error into the
/// matching response envelope.
pub fn dispatch(state: &ServerState, ctx: &RequestContext, body: &[u8]) -> Result<Value, RpcError> {
    let request =
        envelope::decode_request(body).map_err(|err| RpcError::Internal(err.to_string()))?;

    if request.jsonrpc != PROTOCOL_VERSION {
        return Err(RpcError::InvalidVersion);
    }

    let method = request.method.trim();
    if method.is_empty() {
        return Err(RpcError::EmptyMethod);
    }

    let Some(handler) = state.registry.lookup(method) else {
        return Err(RpcError::UnknownMethod);
    };

    debug!(method = %method, source = %ctx.remote_addr, "dispatch rpc call");

    invoke(&handler, ctx, request.params)
}

/// Invocation boundary: a panicking handler must never unwind past the
/// dispatcher or take the listening process down with it.
fn invoke(handler: &Handler, ctx: &RequestContext, params: Value) -> Result<Value, RpcError> {
    match catch_unwind(AssertUnwindSafe(|| handler(ctx, params))) {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(failure)) => Err(RpcError::Handler(failure.to_string())),
        Err(payload) => Err(RpcError::HandlerPanic {
            detail: panic_detail(payload),
        }),
    }
}

fn panic_detail(payload: Box<dyn Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
