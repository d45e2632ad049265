//! The command manager: tree snapshots, settings, hooks, and the request
//! entrypoints.

use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::command::Command;
use crate::context::CommandContext;
use crate::error::{CommandError, RegistrationError};
use crate::execution::{
    CommandResult, ExecutionCoordinator, RequestPostprocessor, RequestPreprocessor,
};
use crate::input::CommandInput;
use crate::permission::PermissionChecker;
use crate::setting::Settings;
use crate::suggestion::{FilteringSuggestionProcessor, SuggestionProcessor, Suggestions};
use crate::tree::CommandTree;

/// Host-facing entrypoint tying the tree, settings, hooks, coordinator and
/// permission model together.
///
/// Registration swaps a copy-on-write tree snapshot, so requests already in
/// flight keep parsing against the tree they started with.
pub struct CommandManager<C> {
    tree: RwLock<Arc<CommandTree<C>>>,
    settings: RwLock<Settings>,
    coordinator: ExecutionCoordinator,
    processor: Arc<dyn SuggestionProcessor>,
    preprocessors: Vec<Arc<dyn RequestPreprocessor<C>>>,
    postprocessors: Vec<Arc<dyn RequestPostprocessor<C>>>,
}

impl<C: Send + Sync + 'static> CommandManager<C> {
    /// Creates a manager with inline executors and a deny-all permission
    /// checker.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts configuring a manager.
    pub fn builder() -> ManagerBuilder<C> {
        ManagerBuilder {
            coordinator: ExecutionCoordinator::simple(),
            checker: PermissionChecker::deny_all(),
            processor: Arc::new(FilteringSuggestionProcessor::default()),
            settings: Settings::default(),
            preprocessors: Vec::new(),
            postprocessors: Vec::new(),
        }
    }

    /// Registers a command, atomically swapping the tree snapshot.
    pub fn register(&self, command: Command<C>) -> Result<(), RegistrationError> {
        let mut guard = self.tree.write().expect("tree lock poisoned");
        let mut tree = (**guard).clone();
        tree.register(command)?;
        *guard = Arc::new(tree);
        Ok(())
    }

    /// Registers a proxy of `target` rooted at `name`.
    pub fn register_proxy(
        &self,
        name: impl Into<String>,
        aliases: impl IntoIterator<Item = impl Into<String>>,
        target: &Command<C>,
    ) -> Result<(), RegistrationError> {
        self.register(Command::proxy(name, aliases, target))
    }

    /// Returns the current tree snapshot.
    pub fn tree(&self) -> Arc<CommandTree<C>> {
        Arc::clone(&self.tree.read().expect("tree lock poisoned"))
    }

    /// Returns a copy of the current settings.
    pub fn settings(&self) -> Settings {
        *self.settings.read().expect("settings lock poisoned")
    }

    /// Replaces the settings for future requests.
    pub fn set_settings(&self, settings: Settings) {
        *self.settings.write().expect("settings lock poisoned") = settings;
    }

    /// Parses and executes `input` for `sender`.
    pub async fn execute(
        &self,
        sender: C,
        input: impl AsRef<str>,
    ) -> Result<CommandResult<C>, CommandError> {
        let context = CommandContext::new(sender);
        let input = CommandInput::new(input);
        debug!(input = input.full_input(), "executing command request");
        self.coordinator
            .coordinate_execution(
                self.tree(),
                self.settings(),
                &self.preprocessors,
                &self.postprocessors,
                context,
                input,
            )
            .await
    }

    /// Produces completions for `input` as typed so far by `sender`.
    pub async fn suggest(
        &self,
        sender: C,
        input: impl AsRef<str>,
    ) -> Result<Suggestions, CommandError> {
        let context = CommandContext::for_suggestions(sender);
        let input = CommandInput::new(input);
        let (_context, suggestions) = self
            .coordinator
            .coordinate_suggestions(
                self.tree(),
                self.settings(),
                &self.preprocessors,
                Arc::clone(&self.processor),
                context,
                input,
            )
            .await?;
        Ok(suggestions)
    }
}

impl<C: Send + Sync + 'static> Default for CommandManager<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`CommandManager`].
pub struct ManagerBuilder<C> {
    coordinator: ExecutionCoordinator,
    checker: PermissionChecker<C>,
    processor: Arc<dyn SuggestionProcessor>,
    settings: Settings,
    preprocessors: Vec<Arc<dyn RequestPreprocessor<C>>>,
    postprocessors: Vec<Arc<dyn RequestPostprocessor<C>>>,
}

impl<C: Send + Sync + 'static> ManagerBuilder<C> {
    /// Sets the execution coordinator.
    pub fn coordinator(mut self, coordinator: ExecutionCoordinator) -> Self {
        self.coordinator = coordinator;
        self
    }

    /// Sets the permission checker consulted for named permissions.
    pub fn permission_checker(mut self, checker: PermissionChecker<C>) -> Self {
        self.checker = checker;
        self
    }

    /// Sets the suggestion post-processor.
    pub fn suggestion_processor(mut self, processor: Arc<dyn SuggestionProcessor>) -> Self {
        self.processor = processor;
        self
    }

    /// Sets the initial settings.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Appends a request preprocessor.
    pub fn preprocessor(mut self, hook: impl RequestPreprocessor<C> + 'static) -> Self {
        self.preprocessors.push(Arc::new(hook));
        self
    }

    /// Appends a request postprocessor.
    pub fn postprocessor(mut self, hook: impl RequestPostprocessor<C> + 'static) -> Self {
        self.postprocessors.push(Arc::new(hook));
        self
    }

    /// Finishes the manager.
    pub fn build(self) -> CommandManager<C> {
        CommandManager {
            tree: RwLock::new(Arc::new(CommandTree::new(self.checker))),
            settings: RwLock::new(self.settings),
            coordinator: self.coordinator,
            processor: self.processor,
            preprocessors: self.preprocessors,
            postprocessors: self.postprocessors,
        }
    }
}
