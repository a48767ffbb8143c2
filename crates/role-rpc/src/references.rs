//! Named collaborators handed to components by `set_references`.

use crate::commandable::Commandable;
use crate::connection::Discovery;
use crate::error::{RpcError, RpcResult};
use crate::instrument::{Counters, Instrumentation};
use crate::transport::TransportEndpoint;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The references a host wires into its components.
///
/// Cloning is cheap; every entry is shared.
#[derive(Clone, Default)]
pub struct References {
    endpoint: Option<TransportEndpoint>,
    controllers: HashMap<String, Arc<dyn Commandable>>,
    typed_controllers: HashMap<String, Arc<dyn Any + Send + Sync>>,
    counters: Option<Arc<dyn Counters>>,
    discovery: Option<Arc<dyn Discovery>>,
}

impl References {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: TransportEndpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Registers a controller, reachable both as a [`Commandable`] and as `C`.
    pub fn with_controller<C: Commandable + 'static>(mut self, name: &str, controller: Arc<C>) -> Self {
        self.controllers.insert(name.to_string(), controller.clone());
        self.typed_controllers.insert(name.to_string(), controller);
        self
    }

    pub fn with_counters(mut self, counters: Arc<dyn Counters>) -> Self {
        self.counters = Some(counters);
        self
    }

    pub fn with_discovery(mut self, discovery: Arc<dyn Discovery>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    /// Installs or replaces the transport endpoint.
    pub fn put_endpoint(&mut self, endpoint: TransportEndpoint) {
        self.endpoint = Some(endpoint);
    }

    pub fn endpoint(&self) -> Option<&TransportEndpoint> {
        self.endpoint.as_ref()
    }

    pub fn controller(&self, name: &str) -> Option<Arc<dyn Commandable>> {
        self.controllers.get(name).cloned()
    }

    /// The controller registered under `name`, if it is a `C`.
    pub fn typed_controller<C: Commandable + 'static>(&self, name: &str) -> Option<Arc<C>> {
        self.typed_controllers
            .get(name)
            .cloned()
            .and_then(|controller| controller.downcast::<C>().ok())
    }

    pub fn discovery(&self) -> Option<Arc<dyn Discovery>> {
        self.discovery.clone()
    }

    /// Instrumentation over the registered counters, or the `metrics` sink.
    pub fn instrumentation(&self) -> Instrumentation {
        match &self.counters {
            Some(counters) => Instrumentation::new(counters.clone()),
            None => Instrumentation::default(),
        }
    }

    pub fn required_endpoint(&self) -> RpcResult<TransportEndpoint> {
        self.endpoint
            .clone()
            .ok_or_else(|| RpcError::MissingDependency("endpoint".into()))
    }

    pub fn required_controller(&self, name: &str) -> RpcResult<Arc<dyn Commandable>> {
        self.controller(name)
            .ok_or_else(|| RpcError::MissingDependency(format!("controller '{name}'")))
    }

    pub fn required_typed_controller<C: Commandable + 'static>(&self, name: &str) -> RpcResult<Arc<C>> {
        self.typed_controller(name)
            .ok_or_else(|| RpcError::MissingDependency(format!("controller '{name}'")))
    }
}

impl fmt::Debug for References {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut controllers: Vec<&String> = self.controllers.keys().collect();
        controllers.sort();
        f.debug_struct("References")
            .field("endpoint", &self.endpoint.is_some())
            .field("controllers", &controllers)
            .field("counters", &self.counters.is_some())
            .field("discovery", &self.discovery.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entries_are_reported_by_name() {
        let references = References::new();

        let err = references.required_endpoint().err().expect("expected error");
        assert!(matches!(err, RpcError::MissingDependency(name) if name == "endpoint"));

        let err = references.required_controller("controller").err().expect("expected error");
        assert!(matches!(err, RpcError::MissingDependency(name) if name.contains("controller")));
    }

    struct NoCommands;

    impl Commandable for NoCommands {
        fn command_set(&self) -> crate::commandable::CommandSet {
            crate::commandable::CommandSet::new()
        }
    }

    struct OtherCommands;

    impl Commandable for OtherCommands {
        fn command_set(&self) -> crate::commandable::CommandSet {
            crate::commandable::CommandSet::new()
        }
    }

    #[test]
    fn controllers_are_reachable_by_type() {
        let references = References::new().with_controller("controller", Arc::new(NoCommands));

        assert!(references.controller("controller").is_some());
        assert!(references.typed_controller::<NoCommands>("controller").is_some());
        assert!(references.typed_controller::<OtherCommands>("controller").is_none());
        assert!(references.required_typed_controller::<OtherCommands>("controller").is_err());
    }

    #[test]
    fn put_endpoint_replaces_the_previous_one() {
        let first = TransportEndpoint::new();
        let second = TransportEndpoint::new();
        let mut references = References::new().with_endpoint(first);
        references.put_endpoint(second.clone());

        assert!(Arc::ptr_eq(
            &references.endpoint().unwrap().instance(),
            &second.instance()
        ));
    }
}
