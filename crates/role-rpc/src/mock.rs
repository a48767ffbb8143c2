//! # Mock Transport & Testing Guide
//!
//! [`MockTransport`] implements [`Transport`] entirely in memory. It records everything
//! the facades hand to it (added patterns, acted payloads, listen/client descriptors)
//! and answers `act` from a queue of expectations, so client logic can be tested without
//! any service behind it.
//!
//! ## When to use the mock vs the local transport
//!
//! | Feature | MockTransport | LocalTransport |
//! |---------|---------------|----------------|
//! | **Responses** | Scripted (`return_ok` / `return_err`) | Produced by real registered actions |
//! | **Inspection** | Every payload and bind is recorded | Bind descriptors only |
//! | **Use Case** | Client envelopes, open/close paths, bind failures | Service + client round trips |
//! | **Error Injection** | Easy (`return_err`, `fail_binds_with`, `fail_adds_after`) | Only through handler errors |
//!
//! ## Example
//!
//! ```rust
//! use role_rpc::mock::MockTransport;
//! use role_rpc::{ComponentConfig, References, RpcClient, TransportEndpoint};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     // 1. Script the transport
//!     let transport = Arc::new(MockTransport::new());
//!     transport.expect_act("dummy", "get_dummies").return_ok(json!({ "data": [] }));
//!
//!     // 2. Wire a client to it
//!     let mut client = RpcClient::new();
//!     client.configure(ComponentConfig::from_value(json!({ "connection": { "protocol": "none" } })).unwrap());
//!     client
//!         .set_references(&References::new().with_endpoint(TransportEndpoint::with_instance(transport.clone())))
//!         .unwrap();
//!     client.open("123").await.unwrap();
//!
//!     // 3. Exercise and inspect
//!     let page = client.call("dummy", "get_dummies", Some("123"), None).await.unwrap();
//!     assert_eq!(page, json!({ "data": [] }));
//!     assert_eq!(transport.acted()[0]["correlation_id"], "123");
//!     transport.verify();
//! }
//! ```

use crate::connection::TransportDescriptor;
use crate::error::{RpcError, RpcResult};
use crate::instrument::Counters;
use crate::message::{self, Params, Pattern};
use crate::registry::ActionKey;
use crate::transport::{ActionHandler, CloseHook, Transport};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

struct Expectation {
    key: ActionKey,
    response: RpcResult<Value>,
}

/// A scripted transport.
#[derive(Default)]
pub struct MockTransport {
    expectations: Mutex<VecDeque<Expectation>>,
    acted: Mutex<Vec<Params>>,
    added: Mutex<Vec<(Pattern, ActionHandler)>>,
    listening: Mutex<Vec<TransportDescriptor>>,
    clients: Mutex<Vec<TransportDescriptor>>,
    close_hooks: Mutex<Vec<CloseHook>>,
    bind_error: Mutex<Option<String>>,
    add_limit: Mutex<Option<usize>>,
    add_calls: AtomicUsize,
    ready_calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects an `act` addressed to `role:cmd`.
    pub fn expect_act(&self, role: &str, cmd: &str) -> ActExpectationBuilder<'_> {
        ActExpectationBuilder {
            key: ActionKey::new(role, cmd),
            expectations: &self.expectations,
        }
    }

    /// Makes every following `listen` and `client` call fail.
    pub fn fail_binds_with(&self, message: &str) {
        *self.bind_error.lock().unwrap() = Some(message.to_string());
    }

    /// Accepts the first `limit` calls to `add` and fails every later one.
    pub fn fail_adds_after(&self, limit: usize) {
        *self.add_limit.lock().unwrap() = Some(limit);
    }

    /// Calls made to `add`, accepted or not.
    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }

    /// Payloads received by `act`, in order.
    pub fn acted(&self) -> Vec<Params> {
        self.acted.lock().unwrap().clone()
    }

    /// Patterns received by `add`, in order.
    pub fn added(&self) -> Vec<Pattern> {
        self.added
            .lock()
            .unwrap()
            .iter()
            .map(|(pattern, _)| pattern.clone())
            .collect()
    }

    /// Runs the handler added for `role:cmd` directly.
    pub async fn dispatch(&self, payload: Params) -> RpcResult<Value> {
        let handler = self
            .added
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(pattern, _)| pattern.matches(&payload))
            .map(|(_, handler)| handler.clone());
        match handler {
            Some(handler) => handler(payload).await,
            None => Err(RpcError::Transport("no handler added for request".into())),
        }
    }

    pub fn listening(&self) -> Vec<TransportDescriptor> {
        self.listening.lock().unwrap().clone()
    }

    pub fn clients(&self) -> Vec<TransportDescriptor> {
        self.clients.lock().unwrap().clone()
    }

    pub fn ready_calls(&self) -> usize {
        self.ready_calls.load(Ordering::SeqCst)
    }

    /// Runs the registered close hooks.
    pub async fn close(&self) {
        let hooks: Vec<CloseHook> = self.close_hooks.lock().unwrap().drain(..).collect();
        for hook in hooks {
            hook().await;
        }
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }

    fn bind(&self, descriptor: &TransportDescriptor, log: &Mutex<Vec<TransportDescriptor>>) -> RpcResult<()> {
        if let Some(message) = self.bind_error.lock().unwrap().clone() {
            return Err(RpcError::Transport(message));
        }
        log.lock().unwrap().push(descriptor.clone());
        Ok(())
    }
}

/// Builder for `act` expectations.
pub struct ActExpectationBuilder<'a> {
    key: ActionKey,
    expectations: &'a Mutex<VecDeque<Expectation>>,
}

impl ActExpectationBuilder<'_> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: Value) {
        self.push(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: RpcError) {
        self.push(Err(error));
    }

    fn push(self, response: RpcResult<Value>) {
        self.expectations.lock().unwrap().push_back(Expectation {
            key: self.key,
            response,
        });
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn ready(&self) -> RpcResult<()> {
        self.ready_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn add(&self, pattern: Pattern, handler: ActionHandler) -> RpcResult<()> {
        let call = self.add_calls.fetch_add(1, Ordering::SeqCst);
        if matches!(*self.add_limit.lock().unwrap(), Some(limit) if call >= limit) {
            return Err(RpcError::Transport("add failed".into()));
        }
        self.added.lock().unwrap().push((pattern, handler));
        Ok(())
    }

    async fn act(&self, payload: Params) -> RpcResult<Value> {
        self.acted.lock().unwrap().push(payload.clone());
        let expectation = self.expectations.lock().unwrap().pop_front();
        match expectation {
            Some(expectation) if message::key_of(&payload).as_ref() == Some(&expectation.key) => {
                expectation.response
            }
            Some(expectation) => Err(RpcError::Transport(format!(
                "expected a call to {}, got {:?}",
                expectation.key,
                message::key_of(&payload)
            ))),
            None => Err(RpcError::Transport("unexpected act".into())),
        }
    }

    fn client(&self, descriptor: &TransportDescriptor) -> RpcResult<()> {
        self.bind(descriptor, &self.clients)
    }

    fn listen(&self, descriptor: &TransportDescriptor) -> RpcResult<()> {
        self.bind(descriptor, &self.listening)
    }

    fn on_close(&self, hook: CloseHook) {
        self.close_hooks.lock().unwrap().push(hook);
    }
}

// =============================================================================
// COUNTERS
// =============================================================================

/// Counters sink that remembers the names of ended timings.
#[derive(Default)]
pub struct MockCounters {
    timings: Mutex<Vec<String>>,
}

impl MockCounters {
    pub fn timings(&self) -> Vec<String> {
        self.timings.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.timings
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.as_str() == name)
            .count()
    }
}

impl Counters for MockCounters {
    fn record_timing(&self, name: &str, _elapsed: Duration) {
        self.timings.lock().unwrap().push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Endpoint;
    use serde_json::json;

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_mock_transport_with_expectations() {
        let transport = MockTransport::new();
        transport.expect_act("dummy", "create_dummy").return_ok(json!({ "id": "1" }));
        transport
            .expect_act("dummy", "get_dummy_by_id")
            .return_err(RpcError::Application("not found".into()));

        let created = transport
            .act(params(json!({ "role": "dummy", "cmd": "create_dummy" })))
            .await
            .unwrap();
        assert_eq!(created["id"], "1");

        let missing = transport
            .act(params(json!({ "role": "dummy", "cmd": "get_dummy_by_id" })))
            .await;
        assert!(matches!(missing, Err(RpcError::Application(_))));

        assert_eq!(transport.acted().len(), 2);
        transport.verify();
    }

    #[tokio::test]
    async fn test_mock_transport_rejects_unexpected_calls() {
        let transport = MockTransport::new();
        transport.expect_act("dummy", "create_dummy").return_ok(Value::Null);

        let result = transport
            .act(params(json!({ "role": "dummy", "cmd": "delete_dummy" })))
            .await;
        assert!(matches!(result, Err(RpcError::Transport(_))));

        let result = transport
            .act(params(json!({ "role": "dummy", "cmd": "delete_dummy" })))
            .await;
        assert!(matches!(result, Err(RpcError::Transport(_))));
    }

    #[test]
    fn test_failing_binds() {
        let transport = MockTransport::new();
        let descriptor = Endpoint::local().descriptor();
        assert!(transport.listen(&descriptor).is_ok());

        transport.fail_binds_with("address in use");
        assert!(transport.listen(&descriptor).is_err());
        assert!(transport.client(&descriptor).is_err());
        assert_eq!(transport.listening().len(), 1);
        assert!(transport.clients().is_empty());
    }
}
