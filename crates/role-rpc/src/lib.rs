//! # Role RPC
//!
//! This crate binds a component lifecycle (configure, set references, open, close) to an
//! actor-pattern RPC engine that routes requests by a **role** and a **cmd**. Services
//! register handlers under `(role, cmd)` keys; clients send `role`/`cmd` requests. The
//! engine that moves requests between them sits behind the [`Transport`] trait and is not
//! part of this crate, apart from [`LocalTransport`], which dispatches inside the process.
//!
//! ## Architecture Overview
//!
//! ```text
//!  RpcClient::call ──envelope──▶ Transport::act ──pattern match──▶ RegisteredAction::invoke
//!        ▲                                                            │ validate
//!        └────────────────────── Result<Value> ◀───────────────────── handler(correlation_id, payload)
//! ```
//!
//! The crate separates concerns into four layers:
//!
//! 1. **Endpoint resolution** ([`connection`]) - Configured connections become a validated
//!    [`Endpoint`], optionally through a [`Discovery`] collaborator
//! 2. **Action registry** ([`registry`]) - `(role, cmd)` keys, optional request shapes,
//!    correlation id propagation
//! 3. **Facades** ([`RpcService`], [`RpcClient`], [`commandable`]) - Lifecycle-gated
//!    dispatch and invocation
//! 4. **Hosting** ([`Plugin`]) - Wires a group of components to one shared transport
//!
//! ## Quick Start
//!
//! ```rust
//! use role_rpc::{
//!     ActionRegistry, ComponentConfig, Instrumentation, References, RpcClient, RpcResult,
//!     RpcService, ServiceActions, TransportEndpoint,
//! };
//! use serde_json::{json, Value};
//!
//! struct EchoActions;
//!
//! impl ServiceActions for EchoActions {
//!     fn register(&self, registry: &mut ActionRegistry, instrumentation: &Instrumentation) -> RpcResult<()> {
//!         registry.register(
//!             "dummy",
//!             "create_dummy",
//!             None,
//!             instrumentation.timed("dummy.create_dummy", |_, payload| async move {
//!                 Ok(Value::Object(payload))
//!             }),
//!         )
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> RpcResult<()> {
//!     // 1. One endpoint shared by both sides (lazily a LocalTransport)
//!     let references = References::new().with_endpoint(TransportEndpoint::new());
//!     let local = ComponentConfig::from_value(json!({ "connection": { "protocol": "none" } }))?;
//!
//!     // 2. Service: register on set_references, serve on open
//!     let mut service = RpcService::new(EchoActions);
//!     service.configure(local.clone());
//!     service.set_references(&references)?;
//!     service.open("123").await?;
//!
//!     // 3. Client: call through the same engine
//!     let mut client = RpcClient::new();
//!     client.configure(local);
//!     client.set_references(&references)?;
//!     client.open("123").await?;
//!
//!     let params = json!({ "name": "x" }).as_object().cloned().unwrap_or_default();
//!     let echoed = client.call("dummy", "create_dummy", None, Some(&params)).await?;
//!     assert_eq!(echoed["name"], "x");
//!     assert_eq!(echoed["role"], "dummy");
//!     Ok(())
//! }
//! ```
//!
//! ## Request Shapes
//!
//! A registration may carry a [`Shape`]. [`Shape::Validator`] is a strict check run before
//! the handler; [`Shape::Pattern`] is a routing constraint merged into the match pattern.
//! See the [`registry`] module.
//!
//! ## Lifecycle
//!
//! Both facades follow [`LifecycleState`]: `Created → Configured → ReferencesBound → Open
//! → Closed`. `open` resolves the endpoint every time it actually opens, so it always
//! sees the current configuration. A resolution failure is returned and the state is
//! left unchanged.
//!
//! ## Concurrency Model
//!
//! - Registration finishes before a service opens; the registry is read-only afterwards
//! - [`LocalTransport`] clones the matched handler out of its table before awaiting it,
//!   so concurrent requests never contend on a lock while a handler runs
//! - No timeouts, retries or backpressure: those belong to the transport
//!
//! ## Testing
//!
//! The [`mock`] module provides [`MockTransport`](mock::MockTransport), a scripted
//! transport that records every payload and bind, and
//! [`MockCounters`](mock::MockCounters) for asserting on timings.

pub mod client;
pub mod commandable;
pub mod config;
pub mod connection;
pub mod container;
pub mod correlation;
pub mod error;
pub mod instrument;
pub mod lifecycle;
pub mod message;
pub mod mock;
pub mod references;
pub mod registry;
pub mod service;
pub mod tracing;
pub mod transport;
pub mod validation;

// Re-export core types for convenience
pub use client::RpcClient;
pub use commandable::{Command, CommandSet, Commandable, CommandableActions, CommandableClient, CommandableService, FnCommand};
pub use config::ComponentConfig;
pub use connection::{ConnectionResolver, Discovery, Endpoint, TransportDescriptor};
pub use container::Plugin;
pub use error::{RpcError, RpcResult};
pub use instrument::{Counters, Instrumentation, MetricsCounters, Timing};
pub use lifecycle::{Component, LifecycleState};
pub use message::{Params, Pattern};
pub use references::References;
pub use registry::{ActionKey, ActionRegistry, RegisteredAction, Shape};
pub use service::{RpcService, ServiceActions};
pub use transport::{LocalTransport, Transport, TransportEndpoint};
