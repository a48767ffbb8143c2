//! Hand-written service exposing [`DummyController`] under the `dummy` role.

use crate::controller::{to_value, DummyController};
use crate::model::params::{self, dummy_body_schema, dummy_id_schema, get_dummies_schema};
use role_rpc::config::{ComponentConfig, DEFAULT_CONTROLLER};
use role_rpc::{
    ActionRegistry, Instrumentation, References, RpcResult, RpcService, ServiceActions, Shape,
};
use std::sync::Arc;

pub const DUMMY_ROLE: &str = "dummy";

/// Service with one explicitly registered, validated action per controller operation.
pub type DummyService = RpcService<DummyActions>;

/// The actions of [`DummyService`].
pub struct DummyActions {
    controller_name: String,
    controller: Option<Arc<DummyController>>,
}

impl DummyActions {
    pub fn new() -> Self {
        Self {
            controller_name: DEFAULT_CONTROLLER.to_string(),
            controller: None,
        }
    }
}

impl Default for DummyActions {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates an unconfigured dummy service.
pub fn new() -> DummyService {
    RpcService::new(DummyActions::new())
}

impl ServiceActions for DummyActions {
    fn configure(&mut self, config: &ComponentConfig) {
        if let Some(name) = &config.dependencies.controller {
            self.controller_name = name.clone();
        }
    }

    fn set_references(&mut self, references: &References) -> RpcResult<()> {
        self.controller = Some(references.required_typed_controller(&self.controller_name)?);
        Ok(())
    }

    fn register(&self, registry: &mut ActionRegistry, instrumentation: &Instrumentation) -> RpcResult<()> {
        let Some(controller) = self.controller.clone() else {
            return Ok(());
        };

        let ctrl = controller.clone();
        registry.register(
            DUMMY_ROLE,
            "get_dummies",
            Some(Shape::validator(get_dummies_schema())),
            instrumentation.timed("dummy.get_dummies", move |correlation_id, args| {
                let ctrl = ctrl.clone();
                async move {
                    let key = params::key_filter_arg(&args);
                    to_value(ctrl.get_page_by_filter(&correlation_id, key.as_deref()).await)
                }
            }),
        )?;

        let ctrl = controller.clone();
        registry.register(
            DUMMY_ROLE,
            "get_dummy_by_id",
            Some(Shape::validator(dummy_id_schema())),
            instrumentation.timed("dummy.get_dummy_by_id", move |correlation_id, args| {
                let ctrl = ctrl.clone();
                async move {
                    let id = params::dummy_id_arg(&args)?;
                    to_value(ctrl.get_one_by_id(&correlation_id, &id).await)
                }
            }),
        )?;

        let ctrl = controller.clone();
        registry.register(
            DUMMY_ROLE,
            "create_dummy",
            Some(Shape::validator(dummy_body_schema())),
            instrumentation.timed("dummy.create_dummy", move |correlation_id, args| {
                let ctrl = ctrl.clone();
                async move {
                    let dummy = params::dummy_arg(&args)?;
                    to_value(ctrl.create(&correlation_id, dummy).await?)
                }
            }),
        )?;

        let ctrl = controller.clone();
        registry.register(
            DUMMY_ROLE,
            "update_dummy",
            Some(Shape::validator(dummy_body_schema())),
            instrumentation.timed("dummy.update_dummy", move |correlation_id, args| {
                let ctrl = ctrl.clone();
                async move {
                    let dummy = params::dummy_arg(&args)?;
                    to_value(ctrl.update(&correlation_id, dummy).await?)
                }
            }),
        )?;

        let ctrl = controller;
        registry.register(
            DUMMY_ROLE,
            "delete_dummy",
            Some(Shape::validator(dummy_id_schema())),
            instrumentation.timed("dummy.delete_dummy", move |correlation_id, args| {
                let ctrl = ctrl.clone();
                async move {
                    let id = params::dummy_id_arg(&args)?;
                    to_value(ctrl.delete_by_id(&correlation_id, &id).await)
                }
            }),
        )
    }
}
