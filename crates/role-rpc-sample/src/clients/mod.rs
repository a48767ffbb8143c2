//! # Dummy Clients
//!
//! [`DummyClient`] calls the hand-written service, [`DummyCommandableClient`] the
//! commandable one. Both implement [`DummyClientApi`], so the same test fixture drives
//! either of them.

pub mod dummy_client;
pub mod dummy_commandable_client;

pub use dummy_client::DummyClient;
pub use dummy_commandable_client::DummyCommandableClient;

use crate::error::DummyError;
use crate::model::{DataPage, Dummy};
use async_trait::async_trait;

/// Typed operations on the dummy role.
#[async_trait]
pub trait DummyClientApi: Send + Sync {
    async fn get_dummies(&self, correlation_id: &str, key: Option<&str>) -> Result<DataPage<Dummy>, DummyError>;

    async fn get_dummy_by_id(&self, correlation_id: &str, dummy_id: &str) -> Result<Option<Dummy>, DummyError>;

    async fn create_dummy(&self, correlation_id: &str, dummy: &Dummy) -> Result<Dummy, DummyError>;

    async fn update_dummy(&self, correlation_id: &str, dummy: &Dummy) -> Result<Option<Dummy>, DummyError>;

    async fn delete_dummy(&self, correlation_id: &str, dummy_id: &str) -> Result<Option<Dummy>, DummyError>;
}

pub(crate) mod request {
    use crate::error::DummyError;
    use crate::model::params::{DUMMY_FIELD, DUMMY_ID_FIELD, FILTER_FIELD};
    use crate::model::Dummy;
    use role_rpc::Params;
    use serde_json::{json, Value};

    pub fn filter(key: Option<&str>) -> Params {
        let mut params = Params::new();
        if let Some(key) = key {
            params.insert(FILTER_FIELD.into(), json!({ "key": key }));
        }
        params
    }

    pub fn dummy_id(id: &str) -> Params {
        let mut params = Params::new();
        params.insert(DUMMY_ID_FIELD.into(), Value::from(id));
        params
    }

    pub fn dummy(dummy: &Dummy) -> Result<Params, DummyError> {
        let mut params = Params::new();
        params.insert(DUMMY_FIELD.into(), serde_json::to_value(dummy)?);
        Ok(params)
    }
}
