//! Server lifecycle: registration, background listening, graceful shutdown.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::filter::AccessFilter;
use crate::rpc::registry::{HandlerResult, MethodRegistry, RequestContext};
use crate::{build_app, ServerState};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind listener: {0}")]
    Bind(#[source] io::Error),
    #[error("server is already running")]
    AlreadyRunning,
    #[error("server is not running")]
    NotRunning,
    #[error("serve task failed: {0}")]
    Serve(#[source] io::Error),
    #[error("serve task aborted before confirming shutdown")]
    Join,
}

struct Running {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<Result<(), io::Error>>,
    local_addr: SocketAddr,
}

/// A JSON-RPC server: one method registry, one access filter, and the
/// lifecycle around a single listener.
///
/// `listen` returns as soon as the listener is bound; the accept loop runs
/// as a background task until `shutdown` drains it. One lifecycle lock
/// serializes start and shutdown so neither can race the other.
pub struct RpcServer {
    state: ServerState,
    config: ServerConfig,
    lifecycle: Mutex<Option<Running>>,
}

impl RpcServer {
    /// Server with default configuration and the given source-address
    /// allow-list.
    pub fn new(allowlist: Vec<String>) -> Self {
        let config = ServerConfig {
            allowlist,
            ..ServerConfig::default()
        };
        Self::with_config(config)
    }

    pub fn with_config(config: ServerConfig) -> Self {
        let state = ServerState {
            registry: Arc::new(MethodRegistry::new()),
            filter: AccessFilter::new(config.allowlist.clone()),
        };

        debug!("new rpc server");
        Self {
            state,
            config,
            lifecycle: Mutex::new(None),
        }
    }

    /// Bind `handler` to `method`. Registration normally happens before
    /// `listen`; later registrations take effect immediately.
    pub fn add_handler<F>(&self, method: impl Into<String>, handler: F)
    where
        F: Fn(&RequestContext, Value) -> HandlerResult + Send + Sync + 'static,
    {
        self.state.registry.register(method, handler);
    }

    /// Start accepting connections on `port` in the background and return
    /// the bound address. Port 0 binds an ephemeral port.
    pub async fn listen(&self, port: u16) -> Result<SocketAddr, ServerError> {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.is_some() {
            return Err(ServerError::AlreadyRunning);
        }

        let listener = TcpListener::bind((self.config.bind_addr.as_str(), port))
            .await
            .map_err(ServerError::Bind)?;
        let local_addr = listener.local_addr().map_err(ServerError::Bind)?;

        let app = build_app(self.state.clone(), &self.config);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
        });

        info!(addr = %local_addr, "rpc server listening");
        *lifecycle = Some(Running {
            shutdown: shutdown_tx,
            task,
            local_addr,
        });
        Ok(local_addr)
    }

    /// Address the server is currently bound to, if it is running.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.lifecycle
            .lock()
            .await
            .as_ref()
            .map(|running| running.local_addr)
    }

    /// Stop accepting connections, let in-flight requests drain, and return
    /// once the listener has confirmed closure.
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        let mut lifecycle = self.lifecycle.lock().await;
        let Some(running) = lifecycle.take() else {
            return Err(ServerError::NotRunning);
        };

        debug!(addr = %running.local_addr, "rpc server shutting down");
        let _ = running.shutdown.send(());
        match running.task.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(ServerError::Serve(err)),
            Err(_) => Err(ServerError::Join),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_without_listen_reports_not_running() {
        let server = RpcServer::new(vec!["127.0.0.1".to_string()]);
        let err = server.shutdown().await.expect_err("never started");
        assert!(matches!(err, ServerError::NotRunning));
    }

    #[tokio::test]
    async fn listen_twice_is_rejected() {
        let server = RpcServer::new(vec!["127.0.0.1".to_string()]);
        server.listen(0).await.expect("first listen");

        let err = server.listen(0).await.expect_err("second listen");
        assert!(matches!(err, ServerError::AlreadyRunning));

        server.shutdown().await.expect("shutdown");
    }

    #[tokio::test]
    async fn lifecycle_reports_bound_address() {
        let server = RpcServer::new(vec!["127.0.0.1".to_string()]);
        assert!(server.local_addr().await.is_none());

        let addr = server.listen(0).await.expect("listen");
        assert_eq!(server.local_addr().await, Some(addr));
        assert_ne!(addr.port(), 0);

        server.shutdown().await.expect("shutdown");
        assert!(server.local_addr().await.is_none());
    }
}
