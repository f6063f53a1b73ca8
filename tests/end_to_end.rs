//! Client against a really-listening server, over a real TCP socket.

use jsonrpc_http::{ClientError, HandlerError, RpcClient, RpcServer};
use serde_json::{json, Value};

fn demo_server() -> RpcServer {
    let server = RpcServer::new(vec!["127.0.0.1".to_string()]);
    server.add_handler("test", |_ctx, params| {
        Ok(json!({
            "test": ["ok", "slice", "string"],
            "input_params": params,
        }))
    });
    server.add_handler("test.error", |_ctx, _params| {
        Err(HandlerError::new("test error message"))
    });
    server
}

#[tokio::test(flavor = "multi_thread")]
async fn call_round_trips_over_a_real_listener() {
    let server = demo_server();
    let addr = server.listen(0).await.expect("listen");

    let client = RpcClient::new(format!("http://{addr}/"));
    let response = client
        .call("test", Some(json!([1, 2, 3, 8, 9])))
        .await
        .expect("call");

    assert_eq!(response.jsonrpc, "2.0");
    assert_eq!(response.id, 0);
    assert_eq!(response.error, Value::Null);
    assert_eq!(response.result["test"], json!(["ok", "slice", "string"]));
    assert_eq!(response.result["input_params"], json!([1, 2, 3, 8, 9]));

    server.shutdown().await.expect("shutdown");
}

#[tokio::test(flavor = "multi_thread")]
async fn handler_failure_reaches_the_client_as_an_envelope() {
    let server = demo_server();
    let addr = server.listen(0).await.expect("listen");

    let client = RpcClient::new(format!("http://{addr}/"));
    let response = client.call("test.error", None).await.expect("call");

    assert_eq!(response.error, json!("test error message"));
    assert_eq!(response.result, Value::Null);
    assert_eq!(response.id, 0);

    server.shutdown().await.expect("shutdown");
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_method_reaches_the_client_as_an_envelope() {
    let server = demo_server();
    let addr = server.listen(0).await.expect("listen");

    let client = RpcClient::new(format!("http://{addr}/"));
    let response = client.call("missing", None).await.expect("call");

    let message = response.error.as_str().expect("error message");
    assert!(!message.is_empty());
    assert_eq!(response.result, Value::Null);

    server.shutdown().await.expect("shutdown");
}

#[tokio::test(flavor = "multi_thread")]
async fn result_decodes_into_a_typed_value() {
    #[derive(Debug, serde::Deserialize)]
    struct TestResult {
        test: Vec<String>,
        input_params: Value,
    }

    let server = demo_server();
    let addr = server.listen(0).await.expect("listen");

    let client = RpcClient::new(format!("http://{addr}/"));
    let response = client
        .call("test", Some(json!({"key": "value"})))
        .await
        .expect("call");

    let typed: TestResult = response.decode_result().expect("typed decode");
    assert_eq!(typed.test, vec!["ok", "slice", "string"]);
    assert_eq!(typed.input_params, json!({"key": "value"}));

    server.shutdown().await.expect("shutdown");
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_stops_accepting_calls() {
    let server = demo_server();
    let addr = server.listen(0).await.expect("listen");

    let client = RpcClient::new(format!("http://{addr}/"));
    client.call("test", None).await.expect("call before shutdown");

    server.shutdown().await.expect("shutdown");

    let err = client.call("test", None).await.expect_err("server is gone");
    assert!(matches!(
        err,
        ClientError::Transport(_) | ClientError::Timeout(_)
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn non_allowlisted_caller_gets_a_forbidden_envelope() {
    let server = RpcServer::new(vec!["10.9.9.9".to_string()]);
    server.add_handler("test", |_ctx, params| Ok(params));
    let addr = server.listen(0).await.expect("listen");

    let client = RpcClient::new(format!("http://{addr}/"));
    let response = client.call("test", Some(json!(1))).await.expect("call");

    assert_eq!(response.error, json!("forbidden"));
    assert_eq!(response.result, Value::Null);

    server.shutdown().await.expect("shutdown");
}
