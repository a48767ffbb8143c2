//! # Action Registry
//!
//! Maps `(role, cmd)` keys to handlers. A service fills its registry once, when its
//! references are bound, and then hands every entry to the transport with
//! [`ActionRegistry::bind`]. After that the registry is only read, so dispatch needs no
//! locking.
//!
//! Each entry may carry a [`Shape`]:
//!
//! - [`Shape::Validator`] is checked against every inbound payload before the handler
//!   runs; a violation is answered with [`RpcError::Validation`] and the handler is
//!   never called.
//! - [`Shape::Pattern`] is merged into the match pattern instead. Payloads that don't
//!   carry the listed values are simply not routed to this action.
//!
//! The two are deliberately separate variants: the caller decides per registration
//! whether a shape is a strict check or a routing constraint.

use crate::correlation;
use crate::error::{ArgumentErrorCode, RpcError, RpcResult};
use crate::message::{self, Params, Pattern, CORRELATION_ID_FIELD};
use crate::transport::{ActionHandler, BoxFuture, Transport};
use crate::validation::Schema;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Identifies an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionKey {
    pub role: String,
    pub cmd: String,
}

impl ActionKey {
    pub fn new(role: impl Into<String>, cmd: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            cmd: cmd.into(),
        }
    }

    /// Builds a key, rejecting an empty role or command.
    pub fn checked(role: &str, cmd: &str) -> RpcResult<Self> {
        if role.is_empty() {
            return Err(RpcError::argument(ArgumentErrorCode::NoRole, "Missing pattern role"));
        }
        if cmd.is_empty() {
            return Err(RpcError::argument(ArgumentErrorCode::NoCommand, "Missing pattern cmd"));
        }
        Ok(Self::new(role, cmd))
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role, self.cmd)
    }
}

/// Optional request shape of a registration.
#[derive(Clone)]
pub enum Shape {
    /// Strict check run before the handler.
    Validator(Arc<dyn Schema>),
    /// Loose constraint merged into the match pattern.
    Pattern(Params),
}

impl Shape {
    pub fn validator(schema: impl Schema + 'static) -> Self {
        Shape::Validator(Arc::new(schema))
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Validator(_) => f.write_str("Validator"),
            Shape::Pattern(fields) => f.debug_tuple("Pattern").field(fields).finish(),
        }
    }
}

/// User handler: `(correlation_id, payload) -> result`.
pub type ActionFn = Arc<dyn Fn(String, Params) -> BoxFuture<RpcResult<Value>> + Send + Sync>;

/// One registry entry.
#[derive(Clone)]
pub struct RegisteredAction {
    key: ActionKey,
    shape: Option<Shape>,
    handler: ActionFn,
}

impl RegisteredAction {
    pub fn key(&self) -> &ActionKey {
        &self.key
    }

    pub fn shape(&self) -> Option<&Shape> {
        self.shape.as_ref()
    }

    /// The pattern this action is added to the transport with.
    pub fn pattern(&self) -> Pattern {
        let pattern = Pattern::new(self.key.clone());
        match &self.shape {
            Some(Shape::Pattern(constraints)) => pattern.with_constraints(constraints),
            _ => pattern,
        }
    }

    /// Validates the payload and runs the handler.
    ///
    /// A payload without a correlation id gets a generated one, so handlers always
    /// have an id to pass down the call chain.
    pub async fn invoke(&self, mut payload: Params) -> RpcResult<Value> {
        let correlation_id = correlation::or_generate(message::str_field(&payload, CORRELATION_ID_FIELD));
        payload.insert(
            CORRELATION_ID_FIELD.to_string(),
            Value::String(correlation_id.clone()),
        );

        if let Some(Shape::Validator(schema)) = &self.shape {
            if let Err(e) = schema.validate_and_return_error(&payload) {
                warn!(action = %self.key, correlation_id = %correlation_id, error = %e, "Rejected payload");
                return Err(e);
            }
        }

        debug!(action = %self.key, correlation_id = %correlation_id, "Invoking action");
        (self.handler)(correlation_id, payload).await
    }

    fn into_transport_handler(self) -> ActionHandler {
        Arc::new(move |payload: Params| -> BoxFuture<RpcResult<Value>> {
            let action = self.clone();
            Box::pin(async move { action.invoke(payload).await })
        })
    }
}

impl fmt::Debug for RegisteredAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredAction")
            .field("key", &self.key)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

/// The set of actions a service exposes.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    actions: Vec<RegisteredAction>,
    keys: HashSet<ActionKey>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action.
    ///
    /// Fails with `InvalidArgument` on an empty role or command and with
    /// `DuplicateAction` if the key is taken.
    pub fn register<F, Fut>(
        &mut self,
        role: &str,
        cmd: &str,
        shape: Option<Shape>,
        handler: F,
    ) -> RpcResult<()>
    where
        F: Fn(String, Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RpcResult<Value>> + Send + 'static,
    {
        let key = ActionKey::checked(role, cmd)?;
        if self.keys.contains(&key) {
            return Err(RpcError::DuplicateAction {
                role: key.role,
                cmd: key.cmd,
            });
        }

        debug!(action = %key, ?shape, "Registered action");
        let handler: ActionFn = Arc::new(
            move |correlation_id: String, payload: Params| -> BoxFuture<RpcResult<Value>> {
                Box::pin(handler(correlation_id, payload))
            },
        );
        self.keys.insert(key.clone());
        self.actions.push(RegisteredAction {
            key,
            shape,
            handler,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn contains(&self, role: &str, cmd: &str) -> bool {
        self.keys.contains(&ActionKey::new(role, cmd))
    }

    pub fn get(&self, role: &str, cmd: &str) -> Option<&RegisteredAction> {
        self.actions
            .iter()
            .find(|a| a.key.role == role && a.key.cmd == cmd)
    }

    /// Keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &ActionKey> {
        self.actions.iter().map(|a| &a.key)
    }

    /// Adds every action to the transport.
    pub fn bind(&self, transport: &dyn Transport) -> RpcResult<()> {
        for action in &self.actions {
            transport.add(action.pattern(), action.clone().into_transport_handler())?;
        }
        debug!(count = self.actions.len(), "Bound actions to transport");
        Ok(())
    }

    /// Dispatches a payload without going through a transport.
    pub async fn dispatch(&self, payload: Params) -> RpcResult<Value> {
        let key = message::required_key(&payload)?;
        let action = self
            .actions
            .iter()
            .find(|a| a.key == key && a.pattern().matches(&payload))
            .ok_or(RpcError::NoMatchingAction {
                role: key.role,
                cmd: key.cmd,
            })?;
        action.invoke(payload).await
    }
}
