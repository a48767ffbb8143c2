//! # Invocation Facade
//!
//! [`RpcClient`] builds outbound requests and forwards them through the transport.
//! Every call is logged and timed as `"<role>.<cmd>"`, on the success and the failure
//! path alike. Domain clients wrap it and expose typed methods:
//!
//! ```rust,ignore
//! pub async fn get_dummy_by_id(&self, correlation_id: &str, id: &str) -> Result<Option<Dummy>, DummyError> {
//!     let mut params = Params::new();
//!     params.insert("dummy_id".into(), id.into());
//!     let value = self.inner.call("dummy", "get_dummy_by_id", Some(correlation_id), Some(&params)).await?;
//!     Ok(serde_json::from_value(value)?)
//! }
//! ```
//!
//! The client never retries and never applies a timeout of its own.

use crate::config::ComponentConfig;
use crate::connection::ConnectionResolver;
use crate::correlation;
use crate::error::{RpcError, RpcResult};
use crate::instrument::Instrumentation;
use crate::lifecycle::{Component, LifecycleState};
use crate::message::{self, Params};
use crate::references::References;
use crate::registry::ActionKey;
use crate::transport::Transport;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, error, info, instrument, warn};

/// Sends `role`/`cmd` requests through the transport.
#[derive(Clone)]
pub struct RpcClient {
    config: ComponentConfig,
    resolver: ConnectionResolver,
    transport: Option<Arc<dyn Transport>>,
    instrumentation: Instrumentation,
    state: LifecycleState,
}

impl Default for RpcClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcClient {
    pub fn new() -> Self {
        let config = ComponentConfig::client_defaults();
        let mut resolver = ConnectionResolver::default();
        resolver.configure(&config);
        Self {
            config,
            resolver,
            transport: None,
            instrumentation: Instrumentation::default(),
            state: LifecycleState::Created,
        }
    }

    /// Merges `config` over the client defaults.
    pub fn configure(&mut self, config: ComponentConfig) {
        let config = config.with_defaults(&ComponentConfig::client_defaults());
        config.flag_unenforced_options("client");
        self.resolver.configure(&config);
        self.config = config;
        self.state = self.state.configured();
    }

    pub fn set_references(&mut self, references: &References) -> RpcResult<()> {
        let endpoint = references.required_endpoint()?;
        self.instrumentation = references.instrumentation();
        self.resolver.set_discovery(references.discovery());
        self.transport = Some(endpoint.instance());
        self.state = self.state.bound();
        Ok(())
    }

    /// Resolves the endpoint and connects.
    ///
    /// Does nothing if the client is already open. In local mode the client is open as
    /// soon as the transport is ready; otherwise it is open once `client` succeeds.
    #[instrument(skip(self))]
    pub async fn open(&mut self, correlation_id: &str) -> RpcResult<()> {
        if self.is_open() {
            return Ok(());
        }

        let transport = self.transport()?;
        let endpoint = self.resolver.resolve_endpoint(correlation_id).await?;
        transport.ready().await?;

        if !endpoint.is_local() {
            transport.client(&endpoint.descriptor())?;
        }

        self.state = LifecycleState::Open;
        info!(correlation_id, %endpoint, "Client opened");
        Ok(())
    }

    pub async fn close(&mut self, correlation_id: &str) -> RpcResult<()> {
        if self.is_open() {
            self.state = LifecycleState::Closed;
            info!(correlation_id, "Client closed");
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

    /// Calls `role`/`cmd` and waits for the result.
    ///
    /// `params` is copied; the copy carries `role`, `cmd` and the correlation id
    /// (generated when `correlation_id` is absent or empty).
    #[instrument(skip(self, params))]
    pub async fn call(
        &self,
        role: &str,
        cmd: &str,
        correlation_id: Option<&str>,
        params: Option<&Params>,
    ) -> RpcResult<Value> {
        let key = ActionKey::checked(role, cmd)?;
        let transport = self.transport()?;
        let correlation_id = correlation::or_generate(correlation_id);
        let payload = message::envelope(&key, &correlation_id, params);

        let timing = self
            .instrumentation
            .instrument(&correlation_id, &format!("{role}.{cmd}"));
        debug!(correlation_id = %correlation_id, ?payload, "Sending request");
        let result = transport.act(payload).await;
        timing.end_timing();

        if let Err(e) = &result {
            warn!(correlation_id = %correlation_id, error = %e, "Call failed");
        }
        result
    }

    /// Calls `role`/`cmd` without waiting. Failures are logged, not returned.
    ///
    /// Outside a tokio runtime the call is dropped with an error event.
    pub fn call_detached(&self, role: &str, cmd: &str, correlation_id: Option<&str>, params: Option<Params>) {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(role, cmd, error = %e, "Detached call dropped, no async runtime");
                return;
            }
        };
        let client = self.clone();
        let role = role.to_string();
        let cmd = cmd.to_string();
        let correlation_id = correlation::or_generate(correlation_id);
        runtime.spawn(async move {
            if let Err(e) = client
                .call(&role, &cmd, Some(&correlation_id), params.as_ref())
                .await
            {
                error!(role = %role, cmd = %cmd, correlation_id = %correlation_id, error = %e, "Detached call failed");
            }
        });
    }

    fn transport(&self) -> RpcResult<Arc<dyn Transport>> {
        self.transport
            .clone()
            .ok_or_else(|| RpcError::MissingDependency("endpoint".into()))
    }
}

#[async_trait]
impl Component for RpcClient {
    fn set_references(&mut self, references: &References) -> RpcResult<()> {
        RpcClient::set_references(self, references)
    }

    async fn open(&mut self, correlation_id: &str) -> RpcResult<()> {
        RpcClient::open(self, correlation_id).await
    }

    async fn close(&mut self, correlation_id: &str) -> RpcResult<()> {
        RpcClient::close(self, correlation_id).await
    }

    fn is_open(&self) -> bool {
        RpcClient::is_open(self)
    }
}
