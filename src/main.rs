use jsonrpc_http::{logging, HandlerError, RpcServer, ServerConfig};
use serde_json::json;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = ServerConfig::from_env()?;
    let port = config.bind_port;
    let server = RpcServer::with_config(config);

    server.add_handler("test", |_ctx, params| {
        Ok(json!({
            "test": ["ok", "slice", "string"],
            "input_params": params,
        }))
    });
    server.add_handler("test.error", |_ctx, _params| {
        Err(HandlerError::new("test error message"))
    });

    let addr = server.listen(port).await?;
    info!(addr = %addr, "rpc server ready");

    tokio::signal::ctrl_c().await?;
    server.shutdown().await?;
    Ok(())
}
