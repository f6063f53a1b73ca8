use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::rpc::envelope::{encode_response, RpcResponse};

pub(crate) const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// Every way a dispatched call can fail. Each variant becomes a response
/// envelope with the variant's message in `error`; the server never drops a
/// connection without a body on a handled error path.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid protocol version")]
    InvalidVersion,
    #[error("empty method")]
    EmptyMethod,
    #[error("invalid method")]
    UnknownMethod,
    #[error("not found")]
    RouteNotFound,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("forbidden")]
    Forbidden,
    /// Business failure returned by a handler, passed through verbatim.
    #[error("{0}")]
    Handler(String),
    /// Decode or encode fault; the message derives from the underlying
    /// failure, with no further context leaked.
    #[error("{0}")]
    Internal(String),
    /// Panic caught at the dispatch boundary. The detail stays in the server
    /// log; callers only see the generic message.
    #[error("internal server error")]
    HandlerPanic { detail: String },
}

impl RpcError {
    /// Validation and dispatch failures keep the reference behavior of
    /// HTTP 500; only the routing and access-filter rejections carry their
    /// conventional statuses.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Serialize an envelope with the fixed JSON content type. Falls back to a
/// literal internal-error envelope if serialization itself fails.
pub(crate) fn envelope_response(status: StatusCode, envelope: &RpcResponse) -> Response {
    let body = encode_response(envelope).unwrap_or_else(|err| {
        error!(error = %err, "response envelope serialization failed");
        br#"{"jsonrpc":"2.0","result":null,"error":"internal server error","id":0}"#.to_vec()
    });

    (status, [(header::CONTENT_TYPE, CONTENT_TYPE_JSON)], body).into_response()
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        match &self {
            Self::HandlerPanic { detail } => {
                error!(panic = %detail, "handler panicked during dispatch");
            }
            Self::Internal(message) => {
                error!(error = %message, "request failed with internal fault");
            }
            Self::Handler(message) => {
                warn!(error = %message, "handler returned a failure");
            }
            other => {
                warn!(error = %other, "request rejected");
            }
        }

        envelope_response(self.status(), &RpcResponse::failure(self.to_string()))
    }
}
