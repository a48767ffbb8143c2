//! # Transport Seam
//!
//! The RPC engine that actually moves requests is an external collaborator. This module
//! pins down the narrow capability the rest of the crate needs from it, the
//! [`Transport`] trait, and the [`TransportEndpoint`] reference through which services
//! and clients obtain the shared engine instance.
//!
//! [`LocalTransport`] is an in-process engine: actions added to it are dispatched
//! directly, without a network. It backs `"none"` protocol deployments and the tests.

mod local;

pub use local::LocalTransport;

use crate::connection::TransportDescriptor;
use crate::error::RpcResult;
use crate::message::{Params, Pattern};
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

/// Boxed `Send` future.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Handler the transport calls with a matching payload.
pub type ActionHandler = Arc<dyn Fn(Params) -> BoxFuture<RpcResult<Value>> + Send + Sync>;

/// Hook run once when the transport shuts down.
pub type CloseHook = Box<dyn FnOnce() -> BoxFuture<()> + Send>;

/// Capability of the underlying RPC engine.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Resolves once the engine has finished starting.
    async fn ready(&self) -> RpcResult<()>;

    /// Routes payloads matching `pattern` to `handler`.
    fn add(&self, pattern: Pattern, handler: ActionHandler) -> RpcResult<()>;

    /// Sends a request and waits for its result.
    async fn act(&self, payload: Params) -> RpcResult<Value>;

    /// Connects outbound requests to a remote listener.
    fn client(&self, descriptor: &TransportDescriptor) -> RpcResult<()>;

    /// Starts accepting remote requests.
    fn listen(&self, descriptor: &TransportDescriptor) -> RpcResult<()>;

    /// Registers a hook to run when the engine closes.
    fn on_close(&self, hook: CloseHook);
}

/// Shared reference to the engine instance.
///
/// Cloning shares the slot. The first [`instance`](Self::instance) call on an empty
/// endpoint installs a [`LocalTransport`].
#[derive(Clone, Default)]
pub struct TransportEndpoint {
    instance: Arc<Mutex<Option<Arc<dyn Transport>>>>,
}

impl TransportEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instance(transport: Arc<dyn Transport>) -> Self {
        let endpoint = Self::new();
        endpoint.set_instance(transport);
        endpoint
    }

    pub fn instance(&self) -> Arc<dyn Transport> {
        let mut slot = self.instance.lock().unwrap_or_else(PoisonError::into_inner);
        slot.get_or_insert_with(|| Arc::new(LocalTransport::new()) as Arc<dyn Transport>)
            .clone()
    }

    pub fn set_instance(&self, transport: Arc<dyn Transport>) {
        let mut slot = self.instance.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(transport);
    }

    pub fn has_instance(&self) -> bool {
        self.instance
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
