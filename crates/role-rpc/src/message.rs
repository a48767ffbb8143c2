//! # Request Envelopes and Patterns
//!
//! A request on the wire is a flat JSON object: the caller's fields plus `role`, `cmd`
//! and `correlation_id`. Actions are selected by [`Pattern`]s: the `(role, cmd)` key plus
//! any extra field values the payload must carry.

use crate::error::RpcResult;
use crate::registry::ActionKey;
use serde_json::{Map, Value};

/// Field holding the role of a request.
pub const ROLE_FIELD: &str = "role";
/// Field holding the command of a request.
pub const CMD_FIELD: &str = "cmd";
/// Field holding the correlation id of a request.
pub const CORRELATION_ID_FIELD: &str = "correlation_id";

/// Request payload: field name to JSON value.
pub type Params = Map<String, Value>;

/// Returns true for the envelope fields stamped by the client.
pub fn is_envelope_field(name: &str) -> bool {
    matches!(name, ROLE_FIELD | CMD_FIELD | CORRELATION_ID_FIELD)
}

/// Builds the envelope for an outbound call from a copy of the caller's params.
pub fn envelope(key: &ActionKey, correlation_id: &str, params: Option<&Params>) -> Params {
    let mut payload = params.cloned().unwrap_or_default();
    payload.insert(ROLE_FIELD.to_string(), Value::String(key.role.clone()));
    payload.insert(CMD_FIELD.to_string(), Value::String(key.cmd.clone()));
    payload.insert(
        CORRELATION_ID_FIELD.to_string(),
        Value::String(correlation_id.to_string()),
    );
    payload
}

/// Reads a string field of a payload.
pub fn str_field<'a>(payload: &'a Params, name: &str) -> Option<&'a str> {
    payload.get(name).and_then(Value::as_str)
}

/// The key a payload is addressed to, if it carries both fields.
pub fn key_of(payload: &Params) -> Option<ActionKey> {
    Some(ActionKey {
        role: str_field(payload, ROLE_FIELD)?.to_string(),
        cmd: str_field(payload, CMD_FIELD)?.to_string(),
    })
}

/// The key a payload is addressed to, or `NO_ROLE` / `NO_COMMAND` for the missing field.
pub fn required_key(payload: &Params) -> RpcResult<ActionKey> {
    ActionKey::checked(
        str_field(payload, ROLE_FIELD).unwrap_or_default(),
        str_field(payload, CMD_FIELD).unwrap_or_default(),
    )
}

/// A match pattern handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub key: ActionKey,
    /// Extra fields the payload must carry with exactly these values.
    pub constraints: Params,
}

impl Pattern {
    pub fn new(key: ActionKey) -> Self {
        Self {
            key,
            constraints: Params::new(),
        }
    }

    /// Merges loose constraints into the pattern. Envelope fields are never overridden.
    pub fn with_constraints(mut self, constraints: &Params) -> Self {
        for (name, value) in constraints {
            if !is_envelope_field(name) {
                self.constraints.insert(name.clone(), value.clone());
            }
        }
        self
    }

    pub fn matches(&self, payload: &Params) -> bool {
        str_field(payload, ROLE_FIELD) == Some(self.key.role.as_str())
            && str_field(payload, CMD_FIELD) == Some(self.key.cmd.as_str())
            && self
                .constraints
                .iter()
                .all(|(name, value)| payload.get(name) == Some(value))
    }

    /// Number of fields the pattern pins down; more specific patterns win.
    pub fn specificity(&self) -> usize {
        2 + self.constraints.len()
    }
}
