//! Commands, handlers, and the command builder.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::component::{Argument, CommandComponent, DefaultValue, Literal};
use crate::context::CommandContext;
use crate::error::BoxError;
use crate::execution::Executor;
use crate::flag::{CommandFlag, FlagGroup};
use crate::parser::{ArgumentParser, ComponentPreprocessor, SharedSuggestionProvider};
use crate::permission::{Permission, SenderFilter};

/// User-supplied execution handler.
#[async_trait]
pub trait CommandHandler<C>: Send + Sync {
    /// Runs the command against the fully-bound context.
    async fn execute(&self, context: &mut CommandContext<C>) -> Result<(), BoxError>;
}

/// Handler that does nothing.
///
/// The default for commands that exist only to route or to be suggested.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

#[async_trait]
impl<C: Send + Sync> CommandHandler<C> for NoopHandler {
    async fn execute(&self, _context: &mut CommandContext<C>) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Handler backed by a synchronous closure.
pub struct FnHandler<F> {
    run: F,
}

impl<F> FnHandler<F> {
    /// Creates a handler from a closure.
    pub fn new(run: F) -> Self {
        Self { run }
    }
}

#[async_trait]
impl<C, F> CommandHandler<C> for FnHandler<F>
where
    C: Send + Sync,
    F: Fn(&mut CommandContext<C>) -> Result<(), BoxError> + Send + Sync,
{
    async fn execute(&self, context: &mut CommandContext<C>) -> Result<(), BoxError> {
        (self.run)(context)
    }
}

/// An immutable registered command: component chain, handler, and the
/// constraints enforced at dispatch time.
pub struct Command<C> {
    components: Vec<Arc<CommandComponent<C>>>,
    handler: Arc<dyn CommandHandler<C>>,
    permission: Permission,
    sender_filter: SenderFilter<C>,
    executor: Option<Arc<dyn Executor>>,
    meta: HashMap<String, String>,
}

impl<C: Send + Sync + 'static> Command<C> {
    /// Starts building a command rooted at `name`.
    pub fn builder(name: impl Into<String>) -> CommandBuilder<C> {
        CommandBuilder::new(Literal::new(name))
    }

    /// Starts building a command whose root literal has aliases.
    pub fn builder_aliased(
        name: impl Into<String>,
        aliases: impl IntoIterator<Item = impl Into<String>>,
    ) -> CommandBuilder<C> {
        CommandBuilder::new(Literal::aliased(name, aliases))
    }
}

impl<C> Command<C> {
    /// Builds a proxy of `target` rooted at `name`.
    ///
    /// The proxy chain is the target's non-literal components grafted under
    /// the proxy literal; parsers, handler and constraints are shared.
    pub fn proxy(
        name: impl Into<String>,
        aliases: impl IntoIterator<Item = impl Into<String>>,
        target: &Command<C>,
    ) -> Command<C> {
        let mut components: Vec<Arc<CommandComponent<C>>> =
            vec![Arc::new(CommandComponent::Literal(Literal::aliased(name, aliases)))];
        components.extend(
            target
                .components
                .iter()
                .filter(|c| c.as_literal().is_none())
                .cloned(),
        );
        Command {
            components,
            handler: Arc::clone(&target.handler),
            permission: target.permission.clone(),
            sender_filter: target.sender_filter.clone(),
            executor: target.executor.clone(),
            meta: target.meta.clone(),
        }
    }

    /// Returns the component chain.
    pub fn components(&self) -> &[Arc<CommandComponent<C>>] {
        &self.components
    }

    /// Returns the root component.
    pub fn root_component(&self) -> &CommandComponent<C> {
        &self.components[0]
    }

    /// Returns the handler.
    pub fn handler(&self) -> &Arc<dyn CommandHandler<C>> {
        &self.handler
    }

    /// Returns the dispatch-time permission.
    pub fn permission(&self) -> &Permission {
        &self.permission
    }

    /// Returns the dispatch-time sender filter.
    pub fn sender_filter(&self) -> &SenderFilter<C> {
        &self.sender_filter
    }

    /// Returns the per-command execution executor override.
    pub fn executor(&self) -> Option<&Arc<dyn Executor>> {
        self.executor.as_ref()
    }

    /// Returns a metadata value.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    /// Returns the space-joined component names, e.g. `test opt num`.
    pub fn display_name(&self) -> String {
        self.components
            .iter()
            .map(|c| c.name().to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<C> fmt::Debug for Command<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("chain", &self.display_name())
            .field("permission", &self.permission)
            .finish_non_exhaustive()
    }
}

/// Chained builder assembling a [`Command`].
pub struct CommandBuilder<C> {
    components: Vec<Arc<CommandComponent<C>>>,
    flags: Vec<Arc<CommandFlag<C>>>,
    permission: Permission,
    sender_filter: SenderFilter<C>,
    handler: Arc<dyn CommandHandler<C>>,
    executor: Option<Arc<dyn Executor>>,
    meta: HashMap<String, String>,
}

impl<C: Send + Sync + 'static> CommandBuilder<C> {
    fn new(root: Literal) -> Self {
        Self {
            components: vec![Arc::new(CommandComponent::Literal(root))],
            flags: Vec::new(),
            permission: Permission::None,
            sender_filter: SenderFilter::any(),
            handler: Arc::new(NoopHandler),
            executor: None,
            meta: HashMap::new(),
        }
    }

    /// Appends a literal component.
    pub fn literal(mut self, name: impl Into<String>) -> Self {
        self.components
            .push(Arc::new(CommandComponent::Literal(Literal::new(name))));
        self
    }

    /// Appends a literal component with aliases.
    pub fn literal_aliased(
        mut self,
        name: impl Into<String>,
        aliases: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.components
            .push(Arc::new(CommandComponent::Literal(Literal::aliased(name, aliases))));
        self
    }

    /// Appends a prebuilt argument component.
    pub fn argument(mut self, argument: Argument<C>) -> Self {
        self.components
            .push(Arc::new(CommandComponent::Argument(argument)));
        self
    }

    /// Appends a required argument.
    pub fn required<P>(self, name: impl Into<String>, parser: P) -> Self
    where
        P: ArgumentParser<C> + 'static,
    {
        self.argument(Argument::required(name, Arc::new(parser)))
    }

    /// Appends a required argument with a suggestion provider override.
    pub fn required_with<P>(
        self,
        name: impl Into<String>,
        parser: P,
        provider: SharedSuggestionProvider<C>,
    ) -> Self
    where
        P: ArgumentParser<C> + 'static,
    {
        self.argument(Argument::required(name, Arc::new(parser)).with_provider(provider))
    }

    /// Appends an optional argument without a default.
    pub fn optional<P>(self, name: impl Into<String>, parser: P) -> Self
    where
        P: ArgumentParser<C> + 'static,
    {
        self.argument(Argument::optional(name, Arc::new(parser)))
    }

    /// Appends an optional argument with a default value.
    pub fn optional_or<P>(
        self,
        name: impl Into<String>,
        parser: P,
        default: DefaultValue<C>,
    ) -> Self
    where
        P: ArgumentParser<C> + 'static,
    {
        self.argument(Argument::optional(name, Arc::new(parser)).with_default(default))
    }

    /// Attaches a preprocessor to the most recently added argument.
    pub fn preprocessor(mut self, preprocessor: impl ComponentPreprocessor<C> + 'static) -> Self {
        if let Some(last) = self.components.pop() {
            let replaced = match Arc::try_unwrap(last) {
                Ok(CommandComponent::Argument(argument)) => CommandComponent::Argument(
                    argument.with_preprocessor(Arc::new(preprocessor)),
                ),
                Ok(other) => other,
                Err(shared) => {
                    self.components.push(shared);
                    return self;
                }
            };
            self.components.push(Arc::new(replaced));
        }
        self
    }

    /// Declares a flag; all flags merge into one trailing flag group.
    pub fn flag(mut self, flag: CommandFlag<C>) -> Self {
        self.flags.push(Arc::new(flag));
        self
    }

    /// Sets the dispatch-time permission.
    pub fn permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }

    /// Sets the dispatch-time sender filter.
    pub fn sender_filter(mut self, filter: SenderFilter<C>) -> Self {
        self.sender_filter = filter;
        self
    }

    /// Sets the execution handler.
    pub fn handler(mut self, handler: impl CommandHandler<C> + 'static) -> Self {
        self.handler = Arc::new(handler);
        self
    }

    /// Sets a synchronous closure as the execution handler.
    pub fn handler_fn(
        self,
        run: impl Fn(&mut CommandContext<C>) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.handler(FnHandler::new(run))
    }

    /// Sets a shared execution handler.
    pub fn handler_arc(mut self, handler: Arc<dyn CommandHandler<C>>) -> Self {
        self.handler = handler;
        self
    }

    /// Overrides the executor the handler runs on.
    pub fn executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Attaches a metadata entry.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Finishes the command.
    pub fn build(mut self) -> Command<C> {
        if !self.flags.is_empty() {
            self.components
                .push(Arc::new(CommandComponent::Flags(FlagGroup::new(self.flags))));
        }
        Command {
            components: self.components,
            handler: self.handler,
            permission: self.permission,
            sender_filter: self.sender_filter,
            executor: self.executor,
            meta: self.meta,
        }
    }
}
