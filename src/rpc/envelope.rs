//! JSON-RPC 2.0 envelope types and codec
//!
//! Request and response envelopes are standalone serde types so they can be
//! shared between the server dispatch path and the client caller.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Protocol version stamped on every encoded envelope.
pub const PROTOCOL_VERSION: &str = "2.0";

/// Malformed payload syntax. Carries the underlying parse failure; codec
/// errors propagate to the caller, they never abort the process.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CodecError(#[from] serde_json::Error);

/// JSON-RPC 2.0 request object.
///
/// Every field decodes to its zero value when absent, so only broken JSON
/// syntax is a decode error. Semantic checks (version, method) belong to the
/// dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Must be "2.0" on the server side.
    #[serde(default)]
    pub jsonrpc: String,
    /// Method name, non-empty after trimming.
    #[serde(default)]
    pub method: String,
    /// At most one params value of any JSON shape; `Null` when absent.
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: u64,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: PROTOCOL_VERSION.to_string(),
            method: method.into(),
            params: params.unwrap_or(Value::Null),
            id: 0,
        }
    }
}

/// JSON-RPC 2.0 response object.
///
/// All four keys are always serialized, with `null` standing in for absent
/// values. The server fixes `id` to 0 for every response instead of echoing
/// the request id; clients relying on this wire format expect it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    /// Handler result on success, `Null` on error.
    #[serde(default)]
    pub result: Value,
    /// Failure message on error, `Null` on success.
    #[serde(default)]
    pub error: Value,
    #[serde(default)]
    pub id: u64,
}

impl RpcResponse {
    pub fn success(result: Value) -> Self {
        Self {
            jsonrpc: PROTOCOL_VERSION.to_string(),
            result,
            error: Value::Null,
            id: 0,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            jsonrpc: PROTOCOL_VERSION.to_string(),
            result: Value::Null,
            error: Value::String(message.into()),
            id: 0,
        }
    }

    /// Typed view of `result` for callers that know the expected shape.
    pub fn decode_result<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        serde_json::from_value(self.result.clone()).map_err(CodecError::from)
    }
}

pub fn encode_request(method: &str, params: Option<Value>) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(&RpcRequest::new(method, params)).map_err(CodecError::from)
}

pub fn decode_request(bytes: &[u8]) -> Result<RpcRequest, CodecError> {
    serde_json::from_slice(bytes).map_err(CodecError::from)
}

pub fn encode_response(response: &RpcResponse) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(response).map_err(CodecError::from)
}

pub fn decode_response(bytes: &[u8]) -> Result<RpcResponse, CodecError> {
    serde_json::from_slice(bytes).map_err(CodecError::from)
}
