//! Client caller: single JSON-RPC calls over HTTP POST.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::rpc::envelope::{self, CodecError, RpcRequest, RpcResponse};

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally before any request is sent.
    #[error("empty method")]
    EmptyMethod,
    /// No complete response arrived within the per-call timeout.
    #[error("call timed out")]
    Timeout(#[source] reqwest::Error),
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("malformed response envelope: {0}")]
    Decode(#[from] CodecError),
}

/// Issues single RPC calls against one endpoint URL.
///
/// The caller never interprets the envelope's `error` field: a decoded
/// response with `error` populated is still `Ok`, and deciding what a
/// populated `error` means is the invoking code's job.
#[derive(Debug, Clone)]
pub struct RpcClient {
    endpoint: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl RpcClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_CALL_TIMEOUT,
            http: reqwest::Client::new(),
        }
    }

    /// Builder-style override of the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Issue one call with zero or one params value and decode the response
    /// envelope, whatever HTTP status it arrived under.
    pub async fn call(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<RpcResponse, ClientError> {
        if method.trim().is_empty() {
            return Err(ClientError::EmptyMethod);
        }

        let request = RpcRequest::new(method, params);
        let response = self
            .http
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(classify_transport)?;

        let body = response.bytes().await.map_err(classify_transport)?;
        Ok(envelope::decode_response(&body)?)
    }
}

fn classify_transport(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout(err)
    } else {
        ClientError::Transport(err)
    }
}
