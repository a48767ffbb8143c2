//! # Commandable Adapters
//!
//! A [`Commandable`] controller publishes its operations as a [`CommandSet`].
//! [`CommandableActions`] turns that set into one registry entry per command under a
//! single role, so a controller can be served without writing any service code.
//! [`CommandableClient`] is the calling side.
//!
//! | Side | Registered / sent as | Timing name |
//! |------|----------------------|-------------|
//! | Service | `role` + command name | `"<role>.<name>"` |
//! | Client | `role` + command name | `"<role>.<name>"` |
//!
//! Commandable registrations carry no structural validator. A command that wants its
//! arguments checked carries its own schema (see [`FnCommand::with_schema`]).

use crate::client::RpcClient;
use crate::config::{ComponentConfig, DEFAULT_CONTROLLER};
use crate::error::RpcResult;
use crate::instrument::Instrumentation;
use crate::message::Params;
use crate::references::References;
use crate::registry::ActionRegistry;
use crate::service::{RpcService, ServiceActions};
use crate::transport::BoxFuture;
use crate::validation::Schema;
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// One externally callable operation.
#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, correlation_id: &str, args: Params) -> RpcResult<Value>;
}

/// A component that publishes its operations as commands.
pub trait Commandable: Send + Sync {
    fn command_set(&self) -> CommandSet;
}

/// Ordered collection of commands.
#[derive(Clone, Default)]
pub struct CommandSet {
    commands: Vec<Arc<dyn Command>>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_command(&mut self, command: impl Command + 'static) {
        self.commands.push(Arc::new(command));
    }

    pub fn commands(&self) -> &[Arc<dyn Command>] {
        &self.commands
    }

    pub fn find(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.iter().find(|c| c.name() == name).cloned()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

type CommandFn = Arc<dyn Fn(String, Params) -> BoxFuture<RpcResult<Value>> + Send + Sync>;

/// A command backed by an async closure.
pub struct FnCommand {
    name: String,
    schema: Option<Arc<dyn Schema>>,
    function: CommandFn,
}

impl FnCommand {
    pub fn new<F, Fut>(name: &str, function: F) -> Self
    where
        F: Fn(String, Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RpcResult<Value>> + Send + 'static,
    {
        Self {
            name: name.to_string(),
            schema: None,
            function: Arc::new(move |correlation_id: String, args: Params| -> BoxFuture<RpcResult<Value>> {
                Box::pin(function(correlation_id, args))
            }),
        }
    }

    /// Validates arguments before the closure runs.
    pub fn with_schema(mut self, schema: impl Schema + 'static) -> Self {
        self.schema = Some(Arc::new(schema));
        self
    }
}

#[async_trait]
impl Command for FnCommand {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, correlation_id: &str, args: Params) -> RpcResult<Value> {
        if let Some(schema) = &self.schema {
            schema.validate_and_return_error(&args)?;
        }
        (self.function)(correlation_id.to_string(), args).await
    }
}

/// Serves every command of a controller under one role.
pub struct CommandableActions {
    role: String,
    controller_name: String,
    controller: Option<Arc<dyn Commandable>>,
}

impl CommandableActions {
    pub fn new(role: &str) -> Self {
        Self {
            role: role.to_string(),
            controller_name: DEFAULT_CONTROLLER.to_string(),
            controller: None,
        }
    }

    /// Uses `controller` directly instead of looking it up in the references.
    pub fn with_controller(mut self, controller: Arc<dyn Commandable>) -> Self {
        self.controller = Some(controller);
        self
    }

    pub fn role(&self) -> &str {
        &self.role
    }
}

impl ServiceActions for CommandableActions {
    fn configure(&mut self, config: &ComponentConfig) {
        if let Some(name) = &config.dependencies.controller {
            self.controller_name = name.clone();
        }
    }

    fn set_references(&mut self, references: &References) -> RpcResult<()> {
        if self.controller.is_none() {
            self.controller = Some(references.required_controller(&self.controller_name)?);
        }
        Ok(())
    }

    fn register(&self, registry: &mut ActionRegistry, instrumentation: &Instrumentation) -> RpcResult<()> {
        let Some(controller) = &self.controller else {
            return Ok(());
        };

        for command in controller.command_set().commands() {
            let name = format!("{}.{}", self.role, command.name());
            registry.register(
                &self.role,
                command.name(),
                None,
                instrumentation.timed(&name, {
                    let command = command.clone();
                    move |correlation_id: String, args: Params| {
                        let command = command.clone();
                        async move { command.execute(&correlation_id, args).await }
                    }
                }),
            )?;
        }
        debug!(role = %self.role, actions = registry.len(), "Registered controller commands");
        Ok(())
    }
}

/// Service that exposes a controller's commands.
pub type CommandableService = RpcService<CommandableActions>;

impl RpcService<CommandableActions> {
    pub fn commandable(role: &str) -> Self {
        RpcService::new(CommandableActions::new(role))
    }
}

/// Client that invokes commands under one role.
#[derive(Clone)]
pub struct CommandableClient {
    client: RpcClient,
    role: String,
}

impl CommandableClient {
    pub fn new(role: &str) -> Self {
        Self {
            client: RpcClient::new(),
            role: role.to_string(),
        }
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn inner(&self) -> &RpcClient {
        &self.client
    }

    pub fn inner_mut(&mut self) -> &mut RpcClient {
        &mut self.client
    }

    /// Calls the command `name`, timed as `"<role>.<name>"`.
    pub async fn call_command(
        &self,
        name: &str,
        correlation_id: Option<&str>,
        params: Option<&Params>,
    ) -> RpcResult<Value> {
        self.client.call(&self.role, name, correlation_id, params).await
    }
}
