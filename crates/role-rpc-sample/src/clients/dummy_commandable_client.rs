//! Typed client for the commandable dummy service.

use super::{request, DummyClientApi};
use crate::error::DummyError;
use crate::model::{DataPage, Dummy};
use crate::services::DUMMY_ROLE;
use async_trait::async_trait;
use role_rpc::{CommandableClient, ComponentConfig, References};
use tracing::instrument;

#[derive(Clone)]
pub struct DummyCommandableClient {
    inner: CommandableClient,
}

impl Default for DummyCommandableClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyCommandableClient {
    pub fn new() -> Self {
        Self {
            inner: CommandableClient::new(DUMMY_ROLE),
        }
    }

    pub fn configure(&mut self, config: ComponentConfig) {
        self.inner.inner_mut().configure(config);
    }

    pub fn set_references(&mut self, references: &References) -> Result<(), DummyError> {
        Ok(self.inner.inner_mut().set_references(references)?)
    }

    pub async fn open(&mut self, correlation_id: &str) -> Result<(), DummyError> {
        Ok(self.inner.inner_mut().open(correlation_id).await?)
    }

    pub async fn close(&mut self, correlation_id: &str) -> Result<(), DummyError> {
        Ok(self.inner.inner_mut().close(correlation_id).await?)
    }
}

#[async_trait]
impl DummyClientApi for DummyCommandableClient {
    #[instrument(skip(self))]
    async fn get_dummies(&self, correlation_id: &str, key: Option<&str>) -> Result<DataPage<Dummy>, DummyError> {
        let params = request::filter(key);
        let value = self
            .inner
            .call_command("get_dummies", Some(correlation_id), Some(&params))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    #[instrument(skip(self))]
    async fn get_dummy_by_id(&self, correlation_id: &str, dummy_id: &str) -> Result<Option<Dummy>, DummyError> {
        let params = request::dummy_id(dummy_id);
        let value = self
            .inner
            .call_command("get_dummy_by_id", Some(correlation_id), Some(&params))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    #[instrument(skip(self))]
    async fn create_dummy(&self, correlation_id: &str, dummy: &Dummy) -> Result<Dummy, DummyError> {
        let params = request::dummy(dummy)?;
        let value = self
            .inner
            .call_command("create_dummy", Some(correlation_id), Some(&params))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    #[instrument(skip(self))]
    async fn update_dummy(&self, correlation_id: &str, dummy: &Dummy) -> Result<Option<Dummy>, DummyError> {
        let params = request::dummy(dummy)?;
        let value = self
            .inner
            .call_command("update_dummy", Some(correlation_id), Some(&params))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    #[instrument(skip(self))]
    async fn delete_dummy(&self, correlation_id: &str, dummy_id: &str) -> Result<Option<Dummy>, DummyError> {
        let params = request::dummy_id(dummy_id);
        let value = self
            .inner
            .call_command("delete_dummy", Some(correlation_id), Some(&params))
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}
