//! # Dummy Controller
//!
//! In-memory business logic for [`Dummy`] resources. The hand-written
//! [`DummyService`](crate::services::DummyService) calls it directly; through its
//! [`Commandable`] implementation it can also be served without any service code.
//!
//! ## Commands
//!
//! | Command | Arguments | Result |
//! |---------|-----------|--------|
//! | `get_dummies` | `filter.key` (optional) | `DataPage<Dummy>` |
//! | `get_dummy_by_id` | `dummy_id` | `Dummy` or `null` |
//! | `create_dummy` | `dummy` | created `Dummy` |
//! | `update_dummy` | `dummy` (with `id`) | updated `Dummy` or `null` |
//! | `delete_dummy` | `dummy_id` | deleted `Dummy` or `null` |

use crate::error::DummyError;
use crate::model::params::{self, dummy_body_schema, dummy_id_schema, get_dummies_schema};
use crate::model::{DataPage, Dummy};
use role_rpc::{CommandSet, Commandable, FnCommand, RpcResult};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Stores dummies in memory. Clones share the same store.
#[derive(Clone, Default)]
pub struct DummyController {
    entities: Arc<RwLock<Vec<Dummy>>>,
    next_id: Arc<AtomicU64>,
}

impl DummyController {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip(self))]
    pub async fn get_page_by_filter(&self, correlation_id: &str, key: Option<&str>) -> DataPage<Dummy> {
        let entities = self.entities.read().await;
        let data: Vec<Dummy> = entities
            .iter()
            .filter(|d| key.map_or(true, |key| d.key == key))
            .cloned()
            .collect();
        debug!(count = data.len(), "Dummies listed");
        DataPage { data, total: None }
    }

    #[instrument(skip(self))]
    pub async fn get_one_by_id(&self, correlation_id: &str, id: &str) -> Option<Dummy> {
        let entities = self.entities.read().await;
        entities.iter().find(|d| d.id.as_deref() == Some(id)).cloned()
    }

    #[instrument(skip(self))]
    pub async fn create(&self, correlation_id: &str, mut dummy: Dummy) -> Result<Dummy, DummyError> {
        if dummy.key.is_empty() {
            return Err(DummyError::ValidationError("dummy.key must not be empty".into()));
        }
        if dummy.id.is_none() {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            dummy.id = Some(format!("dummy_{}", id));
        }

        self.entities.write().await.push(dummy.clone());
        info!(id = ?dummy.id, "Dummy created");
        Ok(dummy)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, correlation_id: &str, dummy: Dummy) -> Result<Option<Dummy>, DummyError> {
        let Some(id) = dummy.id.clone() else {
            return Err(DummyError::ValidationError("dummy.id is required to update".into()));
        };

        let mut entities = self.entities.write().await;
        match entities.iter_mut().find(|d| d.id.as_deref() == Some(id.as_str())) {
            Some(stored) => {
                *stored = dummy.clone();
                info!(id = %id, "Dummy updated");
                Ok(Some(dummy))
            }
            None => {
                debug!(id = %id, "Dummy to update not found");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, correlation_id: &str, id: &str) -> Option<Dummy> {
        let mut entities = self.entities.write().await;
        let index = entities.iter().position(|d| d.id.as_deref() == Some(id))?;
        info!(id, "Dummy deleted");
        Some(entities.remove(index))
    }
}

impl Commandable for DummyController {
    fn command_set(&self) -> CommandSet {
        let mut commands = CommandSet::new();

        let controller = self.clone();
        commands.add_command(
            FnCommand::new("get_dummies", move |correlation_id, args| {
                let controller = controller.clone();
                async move {
                    let key = params::key_filter_arg(&args);
                    let page = controller.get_page_by_filter(&correlation_id, key.as_deref()).await;
                    to_value(page)
                }
            })
            .with_schema(get_dummies_schema()),
        );

        let controller = self.clone();
        commands.add_command(
            FnCommand::new("get_dummy_by_id", move |correlation_id, args| {
                let controller = controller.clone();
                async move {
                    let id = params::dummy_id_arg(&args)?;
                    to_value(controller.get_one_by_id(&correlation_id, &id).await)
                }
            })
            .with_schema(dummy_id_schema()),
        );

        let controller = self.clone();
        commands.add_command(
            FnCommand::new("create_dummy", move |correlation_id, args| {
                let controller = controller.clone();
                async move {
                    let dummy = params::dummy_arg(&args)?;
                    to_value(controller.create(&correlation_id, dummy).await?)
                }
            })
            .with_schema(dummy_body_schema()),
        );

        let controller = self.clone();
        commands.add_command(
            FnCommand::new("update_dummy", move |correlation_id, args| {
                let controller = controller.clone();
                async move {
                    let dummy = params::dummy_arg(&args)?;
                    to_value(controller.update(&correlation_id, dummy).await?)
                }
            })
            .with_schema(dummy_body_schema()),
        );

        let controller = self.clone();
        commands.add_command(
            FnCommand::new("delete_dummy", move |correlation_id, args| {
                let controller = controller.clone();
                async move {
                    let id = params::dummy_id_arg(&args)?;
                    to_value(controller.delete_by_id(&correlation_id, &id).await)
                }
            })
            .with_schema(dummy_id_schema()),
        );

        commands
    }
}

pub(crate) fn to_value<T: serde::Serialize>(value: T) -> RpcResult<Value> {
    Ok(serde_json::to_value(value)?)
}
