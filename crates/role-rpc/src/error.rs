//! # Framework Errors
//!
//! This module defines the error type shared by the resolver, the registry and the
//! service/client facades. Configuration and argument errors carry the same string
//! codes the wire peers already understand (`NO_HOST`, `NO_ROLE`, ...), so they can be
//! matched on the receiving side without knowing the Rust types.

use std::fmt;

/// Codes for connection configuration failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorCode {
    NoConnection,
    NoHost,
    NoPort,
    CannotResolve,
    InvalidConfig,
}

impl ConfigErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigErrorCode::NoConnection => "NO_CONNECTION",
            ConfigErrorCode::NoHost => "NO_HOST",
            ConfigErrorCode::NoPort => "NO_PORT",
            ConfigErrorCode::CannotResolve => "CANNOT_RESOLVE",
            ConfigErrorCode::InvalidConfig => "INVALID_CONFIG",
        }
    }
}

impl fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Codes for rejected role/command arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentErrorCode {
    NoRole,
    NoCommand,
    NoName,
}

impl ArgumentErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgumentErrorCode::NoRole => "NO_ROLE",
            ArgumentErrorCode::NoCommand => "NO_COMMAND",
            ArgumentErrorCode::NoName => "NO_NAME",
        }
    }
}

impl fmt::Display for ArgumentErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by this crate.
///
/// Handler errors travel back to the caller untouched, so `Application` and
/// `Validation` are as much part of the call protocol as the setup-time variants.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("[{code}] {message}")]
    Configuration {
        code: ConfigErrorCode,
        message: String,
    },
    #[error("[{code}] {message}")]
    InvalidArgument {
        code: ArgumentErrorCode,
        message: String,
    },
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("Missing dependency: {0}")]
    MissingDependency(String),
    #[error("Action {role}:{cmd} is already registered")]
    DuplicateAction { role: String, cmd: String },
    #[error("No action matches {role}:{cmd}")]
    NoMatchingAction { role: String, cmd: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("{0}")]
    Application(String),
    #[error("Plugin {plugin} failed to start: {source}")]
    Fatal {
        plugin: String,
        #[source]
        source: Box<RpcError>,
    },
}

impl RpcError {
    pub(crate) fn config(code: ConfigErrorCode, message: impl Into<String>) -> Self {
        RpcError::Configuration {
            code,
            message: message.into(),
        }
    }

    pub(crate) fn argument(code: ArgumentErrorCode, message: impl Into<String>) -> Self {
        RpcError::InvalidArgument {
            code,
            message: message.into(),
        }
    }

    /// The wire code of configuration and argument errors, if any.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            RpcError::Configuration { code, .. } => Some(code.as_str()),
            RpcError::InvalidArgument { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(e: serde_json::Error) -> Self {
        RpcError::Application(format!("Malformed payload: {e}"))
    }
}

/// Result alias used across the crate.
pub type RpcResult<T> = Result<T, RpcError>;
