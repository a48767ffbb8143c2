//! # Component Configuration
//!
//! Services and clients are configured from a JSON document shaped like:
//!
//! ```json
//! {
//!   "dependencies": { "controller": "controller" },
//!   "connection": { "protocol": "http", "host": "localhost", "port": 8080 },
//!   "options": { "connect_timeout": 30000 }
//! }
//! ```
//!
//! `connections` (a list) may be given instead of `connection`. Every field is optional;
//! [`ComponentConfig::with_defaults`] fills the gaps field by field from the component's
//! defaults, so `{"connection": {"protocol": "none"}}` keeps the default host and port.

use crate::error::{ConfigErrorCode, RpcError, RpcResult};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Protocol value that means "no network, dispatch inside this process".
pub const LOCAL_PROTOCOL: &str = "none";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_CONTROLLER: &str = "controller";

/// One connection entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Key handed to the discovery service instead of a literal address.
    pub discovery_key: Option<String>,
    pub protocol: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub uri: Option<String>,
}

impl ConnectionConfig {
    fn with_defaults(self, defaults: &ConnectionConfig) -> Self {
        Self {
            discovery_key: self.discovery_key.or_else(|| defaults.discovery_key.clone()),
            protocol: self.protocol.or_else(|| defaults.protocol.clone()),
            host: self.host.or_else(|| defaults.host.clone()),
            port: self.port.or(defaults.port),
            uri: self.uri.or_else(|| defaults.uri.clone()),
        }
    }
}

/// Names of the references a component looks up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DependenciesConfig {
    pub controller: Option<String>,
}

/// Call options.
///
/// `timeout` and `retries` are accepted for compatibility with existing
/// configuration files but nothing in this crate enforces them; transports own
/// delivery guarantees. [`ComponentConfig::flag_unenforced_options`] warns when
/// they are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    pub connect_timeout: Option<u64>,
    pub timeout: Option<u64>,
    pub retries: Option<u32>,
}

/// Full configuration of a service or client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ComponentConfig {
    pub dependencies: DependenciesConfig,
    pub connection: Option<ConnectionConfig>,
    pub connections: Vec<ConnectionConfig>,
    pub options: OptionsConfig,
}

impl ComponentConfig {
    /// Parses a JSON configuration document. Fails with `INVALID_CONFIG`.
    pub fn from_value(value: Value) -> RpcResult<Self> {
        serde_json::from_value(value).map_err(|e| {
            RpcError::config(ConfigErrorCode::InvalidConfig, format!("Invalid component configuration: {e}"))
        })
    }

    /// Defaults for services: local dispatch unless told otherwise.
    pub fn service_defaults() -> Self {
        Self::defaults_with_protocol(LOCAL_PROTOCOL)
    }

    /// Defaults for clients: they talk http unless told otherwise.
    pub fn client_defaults() -> Self {
        Self::defaults_with_protocol("http")
    }

    fn defaults_with_protocol(protocol: &str) -> Self {
        Self {
            dependencies: DependenciesConfig {
                controller: Some(DEFAULT_CONTROLLER.to_string()),
            },
            connection: Some(ConnectionConfig {
                discovery_key: None,
                protocol: Some(protocol.to_string()),
                host: Some(DEFAULT_HOST.to_string()),
                port: Some(DEFAULT_PORT),
                uri: None,
            }),
            connections: Vec::new(),
            options: OptionsConfig {
                connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT_MS),
                timeout: None,
                retries: None,
            },
        }
    }

    /// All connection entries, `connection` first.
    pub fn connection_list(&self) -> Vec<ConnectionConfig> {
        self.connection
            .iter()
            .chain(self.connections.iter())
            .cloned()
            .collect()
    }

    /// Merges this configuration over `defaults`, field by field.
    ///
    /// When no connection is given at all the default connection is used; otherwise
    /// every given connection is completed from the default one.
    pub fn with_defaults(self, defaults: &ComponentConfig) -> Self {
        let default_connection = defaults.connection_list().into_iter().next().unwrap_or_default();
        let mut connections: Vec<ConnectionConfig> = self
            .connection_list()
            .into_iter()
            .map(|c| c.with_defaults(&default_connection))
            .collect();
        if connections.is_empty() {
            connections = defaults.connection_list();
        }

        let mut connections = connections.into_iter();
        Self {
            dependencies: DependenciesConfig {
                controller: self
                    .dependencies
                    .controller
                    .or_else(|| defaults.dependencies.controller.clone()),
            },
            connection: connections.next(),
            connections: connections.collect(),
            options: OptionsConfig {
                connect_timeout: self.options.connect_timeout.or(defaults.options.connect_timeout),
                timeout: self.options.timeout.or(defaults.options.timeout),
                retries: self.options.retries.or(defaults.options.retries),
            },
        }
    }

    /// Logs a warning for options that are parsed but have no effect.
    pub fn flag_unenforced_options(&self, component: &str) {
        if let Some(retries) = self.options.retries {
            warn!(component, retries, "options.retries is not enforced; calls are attempted once");
        }
        if let Some(timeout) = self.options.timeout {
            warn!(component, timeout, "options.timeout is not enforced; calls wait on the transport");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn caller_fields_override_defaults_field_by_field() {
        let config = ComponentConfig::from_value(json!({
            "connection": { "protocol": "http", "port": 3001 }
        }))
        .unwrap()
        .with_defaults(&ComponentConfig::service_defaults());

        let connection = config.connection.unwrap();
        assert_eq!(connection.protocol.as_deref(), Some("http"));
        assert_eq!(connection.host.as_deref(), Some(DEFAULT_HOST));
        assert_eq!(connection.port, Some(3001));
        assert_eq!(config.options.connect_timeout, Some(DEFAULT_CONNECT_TIMEOUT_MS));
        assert_eq!(config.dependencies.controller.as_deref(), Some(DEFAULT_CONTROLLER));
    }

    #[test]
    fn empty_config_takes_component_defaults() {
        let service = ComponentConfig::default().with_defaults(&ComponentConfig::service_defaults());
        let client = ComponentConfig::default().with_defaults(&ComponentConfig::client_defaults());

        assert_eq!(service.connection.unwrap().protocol.as_deref(), Some(LOCAL_PROTOCOL));
        assert_eq!(client.connection.unwrap().protocol.as_deref(), Some("http"));
    }

    #[test]
    fn connections_list_is_completed_from_defaults() {
        let config = ComponentConfig::from_value(json!({
            "connections": [ { "discovery_key": "primary" }, { "host": "backup" } ]
        }))
        .unwrap()
        .with_defaults(&ComponentConfig::client_defaults());

        let list = config.connection_list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].discovery_key.as_deref(), Some("primary"));
        assert_eq!(list[1].host.as_deref(), Some("backup"));
        assert_eq!(list[1].port, Some(DEFAULT_PORT));
    }

    #[test]
    fn malformed_connection_is_a_configuration_error() {
        let err = ComponentConfig::from_value(json!({ "connection": { "port": "x" } })).unwrap_err();

        assert!(matches!(
            err,
            RpcError::Configuration { code: ConfigErrorCode::InvalidConfig, .. }
        ));
        assert_eq!(err.code(), Some("INVALID_CONFIG"));
    }

    #[test]
    fn unenforced_options_are_still_parsed() {
        let config = ComponentConfig::from_value(json!({
            "options": { "retries": 3, "timeout": 10000 }
        }))
        .unwrap();
        assert_eq!(config.options.retries, Some(3));
        assert_eq!(config.options.timeout, Some(10000));
    }
}
