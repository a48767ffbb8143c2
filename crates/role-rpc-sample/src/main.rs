//! # Role RPC Demo
//!
//! Loads the dummy plugin on an in-process transport and drives it through a client:
//! 1.  Initializing the plugin (controller + service).
//! 2.  Creating, listing, updating and deleting dummies.
//! 3.  Shutting the transport down, which closes the plugin.

use role_rpc::tracing::setup_tracing;
use role_rpc::{ComponentConfig, LocalTransport, References, TransportEndpoint};
use role_rpc_sample::clients::{DummyClient, DummyClientApi};
use role_rpc_sample::container;
use role_rpc_sample::error::DummyError;
use role_rpc_sample::model::Dummy;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), DummyError> {
    // Setup tracing once for the entire application
    setup_tracing();

    info!("Starting dummy plugin demo");

    let transport = Arc::new(LocalTransport::new());
    let mut plugin = container::new(json!({ "connection": { "protocol": "none" } }))?.with_transport(transport.clone());
    plugin.init("startup").await?;

    let mut client = DummyClient::new();
    client.configure(ComponentConfig::from_value(json!({ "connection": { "protocol": "none" } }))?);
    client.set_references(&References::new().with_endpoint(TransportEndpoint::with_instance(transport.clone())))?;
    client.open("startup").await?;

    let span = tracing::info_span!("dummy_crud");
    let result = async {
        let created = client.create_dummy("demo", &Dummy::new("Key 1", "Content 1")).await?;
        info!(id = ?created.id, "Dummy created");

        let mut updated = created.clone();
        updated.content = "Updated Content 1".to_string();
        client.update_dummy("demo", &updated).await?;

        let page = client.get_dummies("demo", None).await?;
        info!(count = page.data.len(), "Dummies listed");

        if let Some(id) = &created.id {
            client.delete_dummy("demo", id).await?;
        }
        Ok::<(), DummyError>(())
    }
    .instrument(span)
    .await;

    if let Err(e) = &result {
        error!(error = %e, "Dummy workflow failed");
    }

    client.close("shutdown").await?;
    transport.close().await;

    info!("Demo completed");
    result
}
