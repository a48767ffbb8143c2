//! # Plugin Container
//!
//! A [`Plugin`] hosts a group of components (services, clients) that share one transport
//! endpoint. `init` installs the endpoint in the references, binds every component to
//! them and opens them in order. The components are closed again by [`Plugin::close`]
//! or when the transport itself shuts down.
//!
//! A failed `init` is returned as [`RpcError::Fatal`]; the host decides whether that
//! ends the process.

use crate::correlation;
use crate::error::{ArgumentErrorCode, RpcError, RpcResult};
use crate::lifecycle::Component;
use crate::references::References;
use crate::transport::{BoxFuture, Transport};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

type Components = Arc<Mutex<Vec<Box<dyn Component>>>>;

pub struct Plugin {
    name: String,
    transport: Option<Arc<dyn Transport>>,
    references: References,
    components: Components,
    initialized: bool,
    close_hooked: bool,
}

impl Plugin {
    /// Creates a plugin. Fails with `NO_NAME` if `name` is empty.
    pub fn new(name: &str, references: References, components: Vec<Box<dyn Component>>) -> RpcResult<Self> {
        if name.is_empty() {
            return Err(RpcError::argument(ArgumentErrorCode::NoName, "Plugin name is not set"));
        }
        Ok(Self {
            name: name.to_string(),
            transport: None,
            references,
            components: Arc::new(Mutex::new(components)),
            initialized: false,
            close_hooked: false,
        })
    }

    /// Overrides the engine instance of the shared endpoint.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn references(&self) -> &References {
        &self.references
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Wires and opens the hosted components. Runs once.
    pub async fn init(&mut self, correlation_id: &str) -> RpcResult<()> {
        if self.initialized {
            return Ok(());
        }

        match self.try_init(correlation_id).await {
            Ok(()) => {
                self.initialized = true;
                info!(plugin = %self.name, correlation_id, "Plugin initialized");
                Ok(())
            }
            Err(e) => {
                error!(plugin = %self.name, correlation_id, error = %e, "Plugin initialization failed");
                Err(RpcError::Fatal {
                    plugin: self.name.clone(),
                    source: Box::new(e),
                })
            }
        }
    }

    async fn try_init(&mut self, correlation_id: &str) -> RpcResult<()> {
        let endpoint = self.references.endpoint().cloned().unwrap_or_default();
        if let Some(transport) = &self.transport {
            endpoint.set_instance(transport.clone());
        }
        self.references.put_endpoint(endpoint.clone());

        // The hook holds the components weakly; they own the transport that owns the hook.
        if !self.close_hooked {
            let components = Arc::downgrade(&self.components);
            let plugin = self.name.clone();
            endpoint.instance().on_close(Box::new(move || -> BoxFuture<()> {
                Box::pin(async move {
                    let Some(components) = components.upgrade() else {
                        return;
                    };
                    info!(plugin = %plugin, "Transport closed, closing plugin components");
                    let _ = close_components(&components, &correlation::next_short()).await;
                })
            }));
            self.close_hooked = true;
        }

        let mut components = self.components.lock().await;
        for component in components.iter_mut() {
            component.set_references(&self.references)?;
        }
        for component in components.iter_mut() {
            component.open(correlation_id).await?;
        }
        Ok(())
    }

    /// Closes every hosted component.
    pub async fn close(&mut self, correlation_id: &str) -> RpcResult<()> {
        self.initialized = false;
        close_components(&self.components, correlation_id).await
    }
}

/// Closes all components, returning the first failure.
async fn close_components(components: &Mutex<Vec<Box<dyn Component>>>, correlation_id: &str) -> RpcResult<()> {
    let mut first_error = None;
    for component in components.lock().await.iter_mut() {
        if let Err(e) = component.close(correlation_id).await {
            warn!(correlation_id, error = %e, "Component failed to close");
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}
