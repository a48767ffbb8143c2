mod common;

use role_rpc::{ComponentConfig, LocalTransport, References, RpcError, TransportEndpoint};
use role_rpc_sample::clients::DummyClient;
use role_rpc_sample::container;
use role_rpc_sample::error::DummyError;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_plugin_serves_dummies() {
    let transport = Arc::new(LocalTransport::new());
    let mut plugin = container::new(json!({ "connection": { "protocol": "none" } }))
        .unwrap()
        .with_transport(transport.clone());
    plugin.init("123").await.unwrap();
    assert_eq!(plugin.name(), container::PLUGIN_NAME);
    assert_eq!(transport.action_count(), 5);

    let mut client = DummyClient::new();
    client.configure(ComponentConfig::from_value(json!({ "connection": { "protocol": "none" } })).unwrap());
    client
        .set_references(&References::new().with_endpoint(TransportEndpoint::with_instance(transport.clone())))
        .unwrap();
    client.open("123").await.unwrap();

    common::test_crud_operations(&client).await;

    transport.close().await;
}

#[tokio::test]
async fn test_plugin_with_bad_connection_fails_fatally() {
    let mut plugin = container::new(json!({ "connection": { "protocol": "http", "port": 3001, "host": "" } })).unwrap();

    let err = plugin.init("123").await.unwrap_err();

    match err {
        RpcError::Fatal { source, .. } => assert_eq!(source.code(), Some("NO_HOST")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_malformed_options_are_rejected() {
    let result = container::new(json!({ "connection": { "port": "not a port" } }));

    match result {
        Err(DummyError::Rpc(err @ RpcError::Configuration { .. })) => {
            assert_eq!(err.code(), Some("INVALID_CONFIG"))
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("malformed options were accepted"),
    }
}
