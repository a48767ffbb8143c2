//! # Dispatch Facade
//!
//! [`RpcService`] exposes an [`ActionRegistry`] to the transport and runs it through the
//! component lifecycle. What the service actually does is supplied by a
//! [`ServiceActions`] implementation:
//!
//! ```rust
//! use role_rpc::{ActionRegistry, Instrumentation, RpcResult, RpcService, ServiceActions};
//! use serde_json::Value;
//!
//! struct PingActions;
//!
//! impl ServiceActions for PingActions {
//!     fn register(&self, registry: &mut ActionRegistry, instrumentation: &Instrumentation) -> RpcResult<()> {
//!         registry.register(
//!             "ping",
//!             "ping",
//!             None,
//!             instrumentation.timed("ping.ping", |_, _| async { Ok(Value::from("pong")) }),
//!         )
//!     }
//! }
//!
//! let service = RpcService::new(PingActions);
//! assert!(!service.is_open());
//! ```
//!
//! Actions are registered and handed to the transport on the first `set_references`
//! and never again for the lifetime of the service.

use crate::config::ComponentConfig;
use crate::connection::ConnectionResolver;
use crate::error::{RpcError, RpcResult};
use crate::instrument::{Instrumentation, Timing};
use crate::lifecycle::{Component, LifecycleState};
use crate::references::References;
use crate::registry::ActionRegistry;
use crate::transport::Transport;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// The actions a service exposes.
pub trait ServiceActions: Send {
    /// Receives the merged configuration.
    fn configure(&mut self, _config: &ComponentConfig) {}

    /// Looks up the collaborators the actions need.
    fn set_references(&mut self, _references: &References) -> RpcResult<()> {
        Ok(())
    }

    /// Fills the registry. Called once per service lifetime.
    fn register(&self, registry: &mut ActionRegistry, instrumentation: &Instrumentation) -> RpcResult<()>;
}

/// Lifecycle-gated wrapper exposing registered actions through the transport.
pub struct RpcService<A> {
    actions: A,
    config: ComponentConfig,
    resolver: ConnectionResolver,
    transport: Option<Arc<dyn Transport>>,
    registry: ActionRegistry,
    instrumentation: Instrumentation,
    state: LifecycleState,
    registered: bool,
}

impl<A: ServiceActions> RpcService<A> {
    pub fn new(actions: A) -> Self {
        let config = ComponentConfig::service_defaults();
        let mut resolver = ConnectionResolver::default();
        resolver.configure(&config);
        Self {
            actions,
            config,
            resolver,
            transport: None,
            registry: ActionRegistry::new(),
            instrumentation: Instrumentation::default(),
            state: LifecycleState::Created,
            registered: false,
        }
    }

    /// Merges `config` over the service defaults.
    pub fn configure(&mut self, config: ComponentConfig) {
        let config = config.with_defaults(&ComponentConfig::service_defaults());
        config.flag_unenforced_options("service");
        self.resolver.configure(&config);
        self.actions.configure(&config);
        self.config = config;
        self.state = self.state.configured();
    }

    /// Binds the transport endpoint and, the first time, registers every action.
    ///
    /// Actions are handed to the transport at most once. If the transport refuses one
    /// of them the error is returned and later calls don't add them again.
    pub fn set_references(&mut self, references: &References) -> RpcResult<()> {
        let endpoint = references.required_endpoint()?;
        self.instrumentation = references.instrumentation();
        self.resolver.set_discovery(references.discovery());
        self.actions.set_references(references)?;

        let transport = endpoint.instance();
        if !self.registered {
            let mut registry = ActionRegistry::new();
            self.actions.register(&mut registry, &self.instrumentation)?;
            self.registered = true;
            let bound = registry.bind(transport.as_ref());
            self.registry = registry;
            bound?;
            debug!(actions = self.registry.len(), "Service actions registered");
        }

        self.transport = Some(transport);
        self.state = self.state.bound();
        Ok(())
    }

    /// Resolves the endpoint and starts serving.
    ///
    /// Does nothing if the service is already open. In local mode the service is open
    /// as soon as the transport is ready; otherwise it is open once `listen` succeeds.
    #[instrument(skip(self))]
    pub async fn open(&mut self, correlation_id: &str) -> RpcResult<()> {
        if self.is_open() {
            return Ok(());
        }

        let transport = self
            .transport
            .clone()
            .ok_or_else(|| RpcError::MissingDependency("endpoint".into()))?;
        let endpoint = self.resolver.resolve_endpoint(correlation_id).await?;
        transport.ready().await?;

        if !endpoint.is_local() {
            transport.listen(&endpoint.descriptor())?;
        }

        self.state = LifecycleState::Open;
        info!(correlation_id, %endpoint, "Service opened");
        Ok(())
    }

    pub async fn close(&mut self, correlation_id: &str) -> RpcResult<()> {
        if self.is_open() {
            self.state = LifecycleState::Closed;
            info!(correlation_id, "Service closed");
        }
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.state == LifecycleState::Open
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn config(&self) -> &ComponentConfig {
        &self.config
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn actions(&self) -> &A {
        &self.actions
    }

    /// Starts a timing against the service's counters.
    pub fn instrument(&self, correlation_id: &str, name: &str) -> Timing {
        self.instrumentation.instrument(correlation_id, name)
    }
}

#[async_trait]
impl<A: ServiceActions> Component for RpcService<A> {
    fn set_references(&mut self, references: &References) -> RpcResult<()> {
        RpcService::set_references(self, references)
    }

    async fn open(&mut self, correlation_id: &str) -> RpcResult<()> {
        RpcService::open(self, correlation_id).await
    }

    async fn close(&mut self, correlation_id: &str) -> RpcResult<()> {
        RpcService::close(self, correlation_id).await
    }

    fn is_open(&self) -> bool {
        RpcService::is_open(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use crate::transport::TransportEndpoint;
    use serde_json::{json, Value};

    struct EchoActions;

    impl ServiceActions for EchoActions {
        fn register(&self, registry: &mut ActionRegistry, _: &Instrumentation) -> RpcResult<()> {
            registry.register("dummy", "echo", None, |_, payload| async move {
                Ok(Value::Object(payload))
            })
        }
    }

    fn service_on(transport: Arc<MockTransport>, config: Value) -> RpcService<EchoActions> {
        let mut service = RpcService::new(EchoActions);
        service.configure(ComponentConfig::from_value(config).unwrap());
        service
            .set_references(&References::new().with_endpoint(TransportEndpoint::with_instance(transport)))
            .unwrap();
        service
    }

    #[test]
    fn set_references_without_endpoint_fails() {
        let mut service = RpcService::new(EchoActions);
        let err = service.set_references(&References::new()).unwrap_err();
        assert!(matches!(err, RpcError::MissingDependency(_)));
        assert_eq!(service.state(), LifecycleState::Created);
    }

    #[test]
    fn actions_are_registered_once() {
        let transport = Arc::new(MockTransport::new());
        let mut service = service_on(transport.clone(), json!({}));
        service
            .set_references(&References::new().with_endpoint(TransportEndpoint::with_instance(transport.clone())))
            .unwrap();

        assert_eq!(service.registry().len(), 1);
        assert_eq!(transport.added().len(), 1);
        assert_eq!(service.state(), LifecycleState::ReferencesBound);
    }

    struct PairActions;

    impl ServiceActions for PairActions {
        fn register(&self, registry: &mut ActionRegistry, _: &Instrumentation) -> RpcResult<()> {
            registry.register("dummy", "first", None, |_, _| async { Ok(Value::Null) })?;
            registry.register("dummy", "second", None, |_, _| async { Ok(Value::Null) })
        }
    }

    #[test]
    fn failed_bind_is_not_repeated() {
        let transport = Arc::new(MockTransport::new());
        transport.fail_adds_after(1);
        let references = References::new().with_endpoint(TransportEndpoint::with_instance(transport.clone()));
        let mut service = RpcService::new(PairActions);

        let err = service.set_references(&references).unwrap_err();
        assert!(matches!(err, RpcError::Transport(_)));
        assert_eq!(service.state(), LifecycleState::Created);

        service.set_references(&references).unwrap();

        assert_eq!(transport.add_calls(), 2);
        assert_eq!(transport.added().len(), 1);
        assert_eq!(service.state(), LifecycleState::ReferencesBound);
    }

    #[tokio::test]
    async fn bound_actions_answer_through_the_transport() {
        let transport = Arc::new(MockTransport::new());
        let _service = service_on(transport.clone(), json!({}));

        let payload = json!({ "role": "dummy", "cmd": "echo", "x": 1 });
        let reply = transport
            .dispatch(payload.as_object().cloned().unwrap())
            .await
            .unwrap();

        assert_eq!(reply["x"], 1);
        assert!(reply["correlation_id"].is_string());
    }

    #[tokio::test]
    async fn second_open_does_not_listen_again() {
        let transport = Arc::new(MockTransport::new());
        let mut service = service_on(
            transport.clone(),
            json!({ "connection": { "protocol": "http", "host": "localhost", "port": 3001 } }),
        );

        service.open("123").await.unwrap();
        service.open("123").await.unwrap();

        assert!(service.is_open());
        assert_eq!(transport.listening().len(), 1);
        assert_eq!(transport.listening()[0].port, 3001);
    }

    #[tokio::test]
    async fn local_mode_opens_without_listening() {
        let transport = Arc::new(MockTransport::new());
        let mut service = service_on(transport.clone(), json!({ "connection": { "protocol": "none" } }));

        service.open("123").await.unwrap();

        assert!(service.is_open());
        assert_eq!(transport.ready_calls(), 1);
        assert!(transport.listening().is_empty());
    }

    #[tokio::test]
    async fn failed_listen_leaves_service_closed() {
        let transport = Arc::new(MockTransport::new());
        transport.fail_binds_with("address in use");
        let mut service = service_on(
            transport,
            json!({ "connection": { "protocol": "http", "host": "localhost", "port": 3001 } }),
        );

        assert!(matches!(service.open("123").await, Err(RpcError::Transport(_))));
        assert!(!service.is_open());
        assert_eq!(service.state(), LifecycleState::ReferencesBound);
    }

    #[tokio::test]
    async fn close_marks_not_open() {
        let transport = Arc::new(MockTransport::new());
        let mut service = service_on(transport, json!({}));
        service.open("123").await.unwrap();

        service.close("123").await.unwrap();

        assert!(!service.is_open());
        assert_eq!(service.state(), LifecycleState::Closed);
    }
}
