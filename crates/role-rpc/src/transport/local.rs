//! In-process transport.

use super::{ActionHandler, CloseHook, Transport};
use crate::connection::TransportDescriptor;
use crate::error::{RpcError, RpcResult};
use crate::message::{self, Params, Pattern};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Dispatches requests to actions added in the same process.
///
/// When several patterns match a payload the most specific one wins; among equally
/// specific patterns the one added last wins. `listen` and `client` only record the
/// descriptors they were given.
#[derive(Default)]
pub struct LocalTransport {
    actions: RwLock<Vec<(Pattern, ActionHandler)>>,
    listening: Mutex<Vec<TransportDescriptor>>,
    clients: Mutex<Vec<TransportDescriptor>>,
    close_hooks: Mutex<Vec<CloseHook>>,
    closed: AtomicBool,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of patterns added so far.
    pub fn action_count(&self) -> usize {
        self.actions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn listening(&self) -> Vec<TransportDescriptor> {
        self.listening
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clients(&self) -> Vec<TransportDescriptor> {
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Shuts the engine down and runs the close hooks, in registration order.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let hooks: Vec<CloseHook> = self
            .close_hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        info!(hooks = hooks.len(), "Transport closing");
        for hook in hooks {
            hook().await;
        }
    }

    fn find(&self, payload: &Params) -> Option<ActionHandler> {
        let actions = self.actions.read().unwrap_or_else(PoisonError::into_inner);
        actions
            .iter()
            .filter(|(pattern, _)| pattern.matches(payload))
            .max_by_key(|(pattern, _)| pattern.specificity())
            .map(|(_, handler)| handler.clone())
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn ready(&self) -> RpcResult<()> {
        if self.is_closed() {
            return Err(RpcError::Transport("transport is closed".into()));
        }
        Ok(())
    }

    fn add(&self, pattern: Pattern, handler: ActionHandler) -> RpcResult<()> {
        debug!(action = %pattern.key, constraints = pattern.constraints.len(), "Pattern added");
        self.actions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((pattern, handler));
        Ok(())
    }

    async fn act(&self, payload: Params) -> RpcResult<Value> {
        if self.is_closed() {
            return Err(RpcError::Transport("transport is closed".into()));
        }
        let key = message::required_key(&payload)?;

        // The lock is released before the handler runs.
        let Some(handler) = self.find(&payload) else {
            warn!(action = %key, "No action matches request");
            return Err(RpcError::NoMatchingAction {
                role: key.role,
                cmd: key.cmd,
            });
        };
        handler(payload).await
    }

    fn client(&self, descriptor: &TransportDescriptor) -> RpcResult<()> {
        debug!(kind = %descriptor.kind, host = %descriptor.host, port = descriptor.port, "Client connected");
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(descriptor.clone());
        Ok(())
    }

    fn listen(&self, descriptor: &TransportDescriptor) -> RpcResult<()> {
        debug!(kind = %descriptor.kind, host = %descriptor.host, port = descriptor.port, "Listening");
        self.listening
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(descriptor.clone());
        Ok(())
    }

    fn on_close(&self, hook: CloseHook) {
        self.close_hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(hook);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ActionKey;
    use crate::transport::BoxFuture;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    fn constant(value: &'static str) -> ActionHandler {
        Arc::new(move |_: Params| -> BoxFuture<RpcResult<Value>> {
            Box::pin(async move { Ok(Value::from(value)) })
        })
    }

    #[tokio::test]
    async fn most_specific_pattern_wins() {
        let transport = LocalTransport::new();
        let key = ActionKey::new("dummy", "get_dummies");
        transport.add(Pattern::new(key.clone()), constant("plain")).unwrap();
        transport
            .add(
                Pattern::new(key).with_constraints(&params(json!({ "scope": "admin" }))),
                constant("admin"),
            )
            .unwrap();

        let plain = transport
            .act(params(json!({ "role": "dummy", "cmd": "get_dummies" })))
            .await
            .unwrap();
        let admin = transport
            .act(params(json!({ "role": "dummy", "cmd": "get_dummies", "scope": "admin" })))
            .await
            .unwrap();

        assert_eq!(plain, "plain");
        assert_eq!(admin, "admin");
    }

    #[tokio::test]
    async fn unmatched_request_is_an_error() {
        let transport = LocalTransport::new();
        let err = transport
            .act(params(json!({ "role": "dummy", "cmd": "missing" })))
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::NoMatchingAction { .. }));
    }

    #[tokio::test]
    async fn request_without_cmd_is_rejected_as_such() {
        let transport = LocalTransport::new();
        let err = transport
            .act(params(json!({ "role": "dummy" })))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("NO_COMMAND"));
    }

    #[tokio::test]
    async fn close_runs_hooks_once_and_rejects_requests() {
        let transport = LocalTransport::new();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        transport.on_close(Box::new(move || -> BoxFuture<()> {
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        }));

        transport.close().await;
        transport.close().await;

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(transport.ready().await.is_err());
        assert!(transport
            .act(params(json!({ "role": "dummy", "cmd": "get_dummies" })))
            .await
            .is_err());
    }
}
