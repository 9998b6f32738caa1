use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::context::{Arguments, ExecutionCtxt};
use crate::converter::ConverterRegistry;
use crate::errors::{ConversionError, ResolveError};
use crate::event::{IncomingEvent, InvocationEvent};
use crate::pipeline::convert_arguments;
use crate::registrar::CommandRegistrar;
use crate::resolver::resolve;

/// Runs a resolved and converted command. Lives outside of this crate.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, ctxt: ExecutionCtxt) -> anyhow::Result<()>;
}

/// Published when a converter fails. Carries whatever could be converted before the failure.
pub struct CommandErrored {
    pub context: ExecutionCtxt,
    /// Name of the argument whose converter failed.
    pub argument: String,
    pub index: usize,
    pub error: ConversionError,
}

#[async_trait]
pub trait CommandErroredHandler: Send + Sync {
    async fn handle(&self, event: &CommandErrored) -> anyhow::Result<()>;
}

/// Handlers for [`CommandErrored`], invoked one after another in subscription order.
#[derive(Clone, Default)]
pub struct ErrorSubscribers(Vec<Arc<dyn CommandErroredHandler>>);
impl ErrorSubscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: Arc<dyn CommandErroredHandler>) {
        self.0.push(handler);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A failing handler is logged and does not stop later handlers from running.
    pub async fn publish(&self, event: &CommandErrored) {
        if self.0.is_empty() {
            error!(
                "Command {} failed to convert argument {} with no error subscribers: {}",
                event.context.qualified_name, event.argument, event.error
            );
            return;
        }

        for handler in &self.0 {
            if let Err(e) = handler.handle(event).await {
                error!(
                    "Error handler for command {} failed: {e:?}",
                    event.context.qualified_name
                );
            }
        }
    }
}

/// What became of an event passed to [`InteractionDispatcher::handle`].
#[derive(Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handed to the executor.
    Executed,
    /// A converter failed and the error subscribers were notified.
    ConversionFailed,
    /// The command tree was re-registered.
    Refreshed,
    /// Ignored: not an event we handle, or a command we don't know about.
    Dropped,
}

/// Entry point for gateway events.
pub struct InteractionDispatcher {
    converters: Arc<ConverterRegistry>,
    registrar: Arc<CommandRegistrar>,
    executor: Arc<dyn CommandExecutor>,
    errors: ErrorSubscribers,
}
impl InteractionDispatcher {
    pub fn new(
        converters: Arc<ConverterRegistry>,
        registrar: Arc<CommandRegistrar>,
        executor: Arc<dyn CommandExecutor>,
        errors: ErrorSubscribers,
    ) -> Self {
        Self {
            converters,
            registrar,
            executor,
            errors,
        }
    }

    pub fn registrar(&self) -> &Arc<CommandRegistrar> {
        &self.registrar
    }

    /// Checks the kind of the event and calls the appropriate handler. Nothing here returns an
    /// error: failures are either logged or sent to the error subscribers.
    pub async fn handle(&self, event: IncomingEvent) -> DispatchOutcome {
        match event {
            IncomingEvent::CommandInvocation(invocation) => self.handle_invocation(*invocation).await,
            IncomingEvent::RefreshCommands => self.handle_refresh().await,
            IncomingEvent::Other(kind) => {
                debug!("Ignoring event of kind {kind}");
                DispatchOutcome::Dropped
            },
        }
    }

    async fn handle_refresh(&self) -> DispatchOutcome {
        match self.registrar.synchronize().await {
            Ok(count) => {
                info!("Command map refreshed ({count} commands)");
                DispatchOutcome::Refreshed
            },
            Err(e) => {
                error!("Failed to refresh commands: {e}");
                DispatchOutcome::Dropped
            },
        }
    }

    async fn handle_invocation(&self, event: InvocationEvent) -> DispatchOutcome {
        // the snapshot is held for this event only, a concurrent refresh swaps in a new map
        let commands = self.registrar.commands().snapshot().await;

        let resolved = match resolve(&commands, event.command_id, &event.options) {
            Ok(resolved) => resolved,
            Err(e @ ResolveError::UnknownCommandIdentifier(_)) => {
                warn!("Received interaction for command {}: {e}, ignoring", event.command_name);
                return DispatchOutcome::Dropped;
            },
            Err(e) => {
                warn!("Received interaction for command {}: {e} (registration out of date?)", event.command_name);
                return DispatchOutcome::Dropped;
            },
        };

        let command = resolved.command.clone();
        let qualified_name = resolved.qualified_name.clone();

        match convert_arguments(&self.converters, &event, &command, resolved.options).await {
            Ok(values) => {
                let arguments = Arguments::from_converted(&command, values);
                let ctxt = ExecutionCtxt::new(&event, command, qualified_name, arguments);

                debug!(
                    "Executing {} with {} converted arguments",
                    ctxt.qualified_name,
                    ctxt.arguments.converted_count()
                );
                if let Err(e) = self.executor.execute(ctxt).await {
                    error!("Command {} failed: {e:?}", resolved.qualified_name);
                }

                DispatchOutcome::Executed
            },
            Err(failure) => {
                warn!("Command {qualified_name}: {failure}");

                let arguments = Arguments::from_converted(&command, failure.converted);
                let errored = CommandErrored {
                    context: ExecutionCtxt::new(&event, command, qualified_name, arguments),
                    argument: failure.argument,
                    index: failure.index,
                    error: failure.error,
                };

                self.errors.publish(&errored).await;

                DispatchOutcome::ConversionFailed
            },
        }
    }
}
