//! # Dummy Plugin
//!
//! Packages the dummy controller and the hand-written service as one [`Plugin`], the way
//! a host loads a module from its options:
//!
//! ```rust,ignore
//! let mut plugin = container::new(json!({ "connection": { "protocol": "none" } }))?;
//! plugin.init("startup").await?;
//! ```

use crate::controller::DummyController;
use crate::error::DummyError;
use crate::services::dummy_service;
use role_rpc::config::DEFAULT_CONTROLLER;
use role_rpc::{Component, ComponentConfig, Plugin, References};
use serde_json::Value;
use std::sync::Arc;

pub const PLUGIN_NAME: &str = "role-rpc-dummies";

/// Creates the dummy plugin, configuring its service from `options`.
pub fn new(options: Value) -> Result<Plugin, DummyError> {
    let controller = Arc::new(DummyController::new());
    let mut service = dummy_service::new();
    service.configure(ComponentConfig::from_value(options)?);

    let references = References::new().with_controller(DEFAULT_CONTROLLER, controller);
    let components: Vec<Box<dyn Component>> = vec![Box::new(service)];
    Ok(Plugin::new(PLUGIN_NAME, references, components)?)
}
