//! # Endpoint Resolution
//!
//! Turns configured connections into a validated [`Endpoint`]. Services and clients call
//! [`ConnectionResolver::resolve_endpoint`] on every `open`, so a configuration change or
//! a discovery update is picked up by the next open rather than cached.

use crate::config::{ComponentConfig, ConnectionConfig, LOCAL_PROTOCOL};
use crate::error::{ConfigErrorCode, RpcError, RpcResult};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A resolved network endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub protocol: String,
    pub host: Option<String>,
    pub port: u16,
    pub uri: Option<String>,
    pub discovery_key: Option<String>,
}

impl Endpoint {
    /// An endpoint that dispatches inside the current process.
    pub fn local() -> Self {
        Self {
            protocol: LOCAL_PROTOCOL.to_string(),
            host: None,
            port: 0,
            uri: None,
            discovery_key: None,
        }
    }

    pub fn is_local(&self) -> bool {
        self.protocol == LOCAL_PROTOCOL
    }

    /// The configured uri, or one composed from protocol, host and port.
    pub fn uri_or_default(&self) -> String {
        match &self.uri {
            Some(uri) => uri.clone(),
            None => format!(
                "{}://{}:{}/",
                self.protocol,
                self.host.as_deref().unwrap_or_default(),
                self.port
            ),
        }
    }

    /// What the transport needs to listen or connect.
    pub fn descriptor(&self) -> TransportDescriptor {
        TransportDescriptor {
            kind: self.protocol.clone(),
            host: self.host.clone().unwrap_or_default(),
            port: self.port,
        }
    }
}

impl From<&ConnectionConfig> for Endpoint {
    fn from(config: &ConnectionConfig) -> Self {
        Self {
            protocol: config
                .protocol
                .clone()
                .unwrap_or_else(|| LOCAL_PROTOCOL.to_string()),
            host: config.host.clone(),
            port: config.port.unwrap_or(0),
            uri: config.uri.clone(),
            discovery_key: config.discovery_key.clone(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_local() {
            f.write_str("local")
        } else {
            f.write_str(&self.uri_or_default())
        }
    }
}

/// Argument of `Transport::listen` and `Transport::client`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportDescriptor {
    pub kind: String,
    pub host: String,
    pub port: u16,
}

/// Looks up connections registered under a discovery key.
#[async_trait]
pub trait Discovery: Send + Sync {
    async fn resolve_one(&self, correlation_id: &str, key: &str) -> RpcResult<Option<Endpoint>>;
}

/// Resolves the configured connections of one component.
#[derive(Clone, Default)]
pub struct ConnectionResolver {
    connections: Vec<ConnectionConfig>,
    discovery: Option<Arc<dyn Discovery>>,
}

impl ConnectionResolver {
    pub fn configure(&mut self, config: &ComponentConfig) {
        self.connections = config.connection_list();
    }

    pub fn set_discovery(&mut self, discovery: Option<Arc<dyn Discovery>>) {
        self.discovery = discovery;
    }

    /// Returns the first connection that resolves, without validating it.
    pub async fn resolve(&self, correlation_id: &str) -> RpcResult<Option<Endpoint>> {
        for connection in &self.connections {
            let Some(key) = &connection.discovery_key else {
                return Ok(Some(Endpoint::from(connection)));
            };

            let discovery = self.discovery.as_ref().ok_or_else(|| {
                RpcError::config(
                    ConfigErrorCode::CannotResolve,
                    format!("Discovery wasn't found to resolve connection {key}"),
                )
            })?;

            match discovery.resolve_one(correlation_id, key).await? {
                Some(endpoint) => {
                    debug!(correlation_id, key = %key, %endpoint, "Resolved connection through discovery");
                    return Ok(Some(endpoint));
                }
                None => debug!(correlation_id, key = %key, "Discovery has no connection"),
            }
        }
        Ok(None)
    }

    /// Resolves and validates the endpoint.
    pub async fn resolve_endpoint(&self, correlation_id: &str) -> RpcResult<Endpoint> {
        let endpoint = self.resolve(correlation_id).await?;
        validate_endpoint(correlation_id, endpoint)
    }
}

/// Checks a resolved endpoint. The first failing check wins:
/// missing endpoint, then (unless local) missing host, then zero port.
pub fn validate_endpoint(correlation_id: &str, endpoint: Option<Endpoint>) -> RpcResult<Endpoint> {
    let result = match endpoint {
        None => Err(RpcError::config(
            ConfigErrorCode::NoConnection,
            "Connection for the service is not defined",
        )),
        Some(endpoint) if endpoint.is_local() => Ok(endpoint),
        Some(endpoint) if endpoint.host.as_deref().map_or(true, str::is_empty) => Err(
            RpcError::config(ConfigErrorCode::NoHost, "No host is configured in connection"),
        ),
        Some(endpoint) if endpoint.port == 0 => Err(RpcError::config(
            ConfigErrorCode::NoPort,
            "No port is configured in connection",
        )),
        Some(endpoint) => Ok(endpoint),
    };

    if let Err(e) = &result {
        warn!(correlation_id, error = %e, "Connection rejected");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RpcError;

    fn http(host: Option<&str>, port: u16) -> Endpoint {
        Endpoint {
            protocol: "http".into(),
            host: host.map(String::from),
            port,
            uri: None,
            discovery_key: None,
        }
    }

    fn code(result: RpcResult<Endpoint>) -> Option<&'static str> {
        result.err().and_then(|e| e.code())
    }

    #[test]
    fn local_protocol_skips_host_and_port_checks() {
        let endpoint = validate_endpoint("1", Some(Endpoint::local())).unwrap();
        assert!(endpoint.is_local());
    }

    #[test]
    fn missing_endpoint_host_and_port_are_rejected_in_order() {
        assert_eq!(code(validate_endpoint("1", None)), Some("NO_CONNECTION"));
        assert_eq!(code(validate_endpoint("1", Some(http(None, 0)))), Some("NO_HOST"));
        assert_eq!(code(validate_endpoint("1", Some(http(Some("localhost"), 0)))), Some("NO_PORT"));
        assert!(validate_endpoint("1", Some(http(Some("localhost"), 3001))).is_ok());
    }

    #[test]
    fn default_uri_is_composed() {
        assert_eq!(http(Some("localhost"), 3001).uri_or_default(), "http://localhost:3001/");
    }

    struct StaticDiscovery(Option<Endpoint>);

    #[async_trait]
    impl Discovery for StaticDiscovery {
        async fn resolve_one(&self, _: &str, _: &str) -> RpcResult<Option<Endpoint>> {
            Ok(self.0.clone())
        }
    }

    fn keyed_resolver() -> ConnectionResolver {
        let mut resolver = ConnectionResolver::default();
        resolver.configure(&ComponentConfig {
            connection: Some(ConnectionConfig {
                discovery_key: Some("dummies".into()),
                ..Default::default()
            }),
            ..Default::default()
        });
        resolver
    }

    #[tokio::test]
    async fn discovery_key_without_discovery_cannot_resolve() {
        let err = keyed_resolver().resolve("1").await.unwrap_err();
        assert!(matches!(
            err,
            RpcError::Configuration { code: ConfigErrorCode::CannotResolve, .. }
        ));
    }

    #[tokio::test]
    async fn discovery_key_resolves_through_discovery() {
        let mut resolver = keyed_resolver();
        resolver.set_discovery(Some(Arc::new(StaticDiscovery(Some(http(Some("10.0.0.1"), 8080))))));
        let endpoint = resolver.resolve_endpoint("1").await.unwrap();
        assert_eq!(endpoint.host.as_deref(), Some("10.0.0.1"));

        resolver.set_discovery(Some(Arc::new(StaticDiscovery(None))));
        let err = resolver.resolve_endpoint("1").await.unwrap_err();
        assert_eq!(err.code(), Some("NO_CONNECTION"));
    }
}
