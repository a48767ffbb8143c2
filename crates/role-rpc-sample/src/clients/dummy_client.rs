//! # Dummy Client
//!
//! Typed client for the hand-written [`DummyService`](crate::services::DummyService).
//! It wraps an [`RpcClient`] and decodes every result into domain types.

use super::{request, DummyClientApi};
use crate::error::DummyError;
use crate::model::{DataPage, Dummy};
use crate::services::DUMMY_ROLE;
use async_trait::async_trait;
use role_rpc::{ComponentConfig, References, RpcClient};
use tracing::{debug, instrument};

/// Client for the `dummy` role.
#[derive(Clone, Default)]
pub struct DummyClient {
    inner: RpcClient,
}

impl DummyClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(&mut self, config: ComponentConfig) {
        self.inner.configure(config);
    }

    pub fn set_references(&mut self, references: &References) -> Result<(), DummyError> {
        Ok(self.inner.set_references(references)?)
    }

    pub async fn open(&mut self, correlation_id: &str) -> Result<(), DummyError> {
        Ok(self.inner.open(correlation_id).await?)
    }

    pub async fn close(&mut self, correlation_id: &str) -> Result<(), DummyError> {
        Ok(self.inner.close(correlation_id).await?)
    }
}

#[async_trait]
impl DummyClientApi for DummyClient {
    #[instrument(skip(self))]
    async fn get_dummies(&self, correlation_id: &str, key: Option<&str>) -> Result<DataPage<Dummy>, DummyError> {
        debug!("Sending request");
        let params = request::filter(key);
        let value = self
            .inner
            .call(DUMMY_ROLE, "get_dummies", Some(correlation_id), Some(&params))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    #[instrument(skip(self))]
    async fn get_dummy_by_id(&self, correlation_id: &str, dummy_id: &str) -> Result<Option<Dummy>, DummyError> {
        debug!("Sending request");
        let params = request::dummy_id(dummy_id);
        let value = self
            .inner
            .call(DUMMY_ROLE, "get_dummy_by_id", Some(correlation_id), Some(&params))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    #[instrument(skip(self))]
    async fn create_dummy(&self, correlation_id: &str, dummy: &Dummy) -> Result<Dummy, DummyError> {
        debug!("Sending request");
        let params = request::dummy(dummy)?;
        let value = self
            .inner
            .call(DUMMY_ROLE, "create_dummy", Some(correlation_id), Some(&params))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    #[instrument(skip(self))]
    async fn update_dummy(&self, correlation_id: &str, dummy: &Dummy) -> Result<Option<Dummy>, DummyError> {
        debug!("Sending request");
        let params = request::dummy(dummy)?;
        let value = self
            .inner
            .call(DUMMY_ROLE, "update_dummy", Some(correlation_id), Some(&params))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    #[instrument(skip(self))]
    async fn delete_dummy(&self, correlation_id: &str, dummy_id: &str) -> Result<Option<Dummy>, DummyError> {
        debug!("Sending request");
        let params = request::dummy_id(dummy_id);
        let value = self
            .inner
            .call(DUMMY_ROLE, "delete_dummy", Some(correlation_id), Some(&params))
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use role_rpc::mock::MockTransport;
    use role_rpc::TransportEndpoint;
    use serde_json::json;
    use std::sync::Arc;

    fn client_on(transport: Arc<MockTransport>) -> DummyClient {
        let mut client = DummyClient::new();
        client.configure(ComponentConfig::from_value(json!({ "connection": { "protocol": "none" } })).unwrap());
        client
            .set_references(&References::new().with_endpoint(TransportEndpoint::with_instance(transport)))
            .unwrap();
        client
    }

    #[tokio::test]
    async fn test_get_dummy_by_id_decodes_null_as_none() {
        let transport = Arc::new(MockTransport::new());
        transport.expect_act("dummy", "get_dummy_by_id").return_ok(json!(null));
        let client = client_on(transport.clone());

        let dummy = client.get_dummy_by_id("123", "dummy_9").await.unwrap();

        assert!(dummy.is_none());
        assert_eq!(transport.acted()[0]["dummy_id"], "dummy_9");
        transport.verify();
    }

    #[tokio::test]
    async fn test_create_dummy_sends_the_dummy() {
        let transport = Arc::new(MockTransport::new());
        transport
            .expect_act("dummy", "create_dummy")
            .return_ok(json!({ "id": "dummy_1", "key": "k", "content": "c" }));
        let client = client_on(transport.clone());

        let created = client.create_dummy("123", &Dummy::new("k", "c")).await.unwrap();

        assert_eq!(created.id.as_deref(), Some("dummy_1"));
        assert_eq!(transport.acted()[0]["dummy"]["key"], "k");
    }

    #[tokio::test]
    async fn test_malformed_result_is_reported() {
        let transport = Arc::new(MockTransport::new());
        transport.expect_act("dummy", "create_dummy").return_ok(json!({ "unexpected": true }));
        let client = client_on(transport);

        let err = client.create_dummy("123", &Dummy::new("k", "c")).await.unwrap_err();

        assert!(matches!(err, DummyError::Malformed(_)));
    }
}
