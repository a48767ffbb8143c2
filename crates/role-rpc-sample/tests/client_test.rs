mod common;

use role_rpc::{ComponentConfig, References, RpcService, TransportEndpoint};
use role_rpc_sample::clients::{DummyClient, DummyClientApi};
use role_rpc_sample::controller::DummyController;
use role_rpc_sample::services::{dummy_service, DummyActions};
use serde_json::json;
use std::sync::Arc;

fn local() -> ComponentConfig {
    ComponentConfig::from_value(json!({ "connection": { "protocol": "none" } })).unwrap()
}

async fn setup() -> (RpcService<DummyActions>, DummyClient) {
    let references = References::new()
        .with_endpoint(TransportEndpoint::new())
        .with_controller("controller", Arc::new(DummyController::new()));

    let mut service = dummy_service::new();
    service.configure(local());
    service.set_references(&references).unwrap();
    service.open("123").await.unwrap();

    let mut client = DummyClient::new();
    client.configure(local());
    client.set_references(&references).unwrap();
    client.open("123").await.unwrap();

    (service, client)
}

#[tokio::test]
async fn test_crud_operations() {
    let (mut service, mut client) = setup().await;

    common::test_crud_operations(&client).await;

    client.close("123").await.unwrap();
    service.close("123").await.unwrap();
}

#[tokio::test]
async fn test_filter_by_key() {
    let (_service, client) = setup().await;
    client.create_dummy("1", &common::dummy1()).await.unwrap();
    client.create_dummy("1", &common::dummy2()).await.unwrap();

    let page = client.get_dummies("1", Some("Key 2")).await.unwrap();

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].content, "Content 2");
}
