//! Executors, pipeline hooks, and the execution coordinator.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::{oneshot, Mutex};
use tracing::debug;

use crate::command::Command;
use crate::context::CommandContext;
use crate::error::CommandError;
use crate::input::CommandInput;
use crate::setting::Settings;
use crate::suggestion::{Suggestion, SuggestionProcessor, Suggestions};
use crate::tree::CommandTree;

/// Submission target for pipeline continuations.
///
/// Executors must be thread-safe; they are shared across requests. The
/// framework never blocks inside the engine, so an executor is free to run
/// tasks wherever it likes as long as each submitted task eventually runs
/// to completion.
pub trait Executor: Send + Sync {
    /// Runs `task` to completion.
    fn execute(&self, task: BoxFuture<'static, ()>);

    /// Returns `true` when submitted tasks run on the calling thread.
    ///
    /// Inline stages are awaited in place instead of being boxed and
    /// round-tripped through a channel.
    fn runs_inline(&self) -> bool {
        false
    }
}

/// Shared handle to an executor.
pub type SharedExecutor = Arc<dyn Executor>;

/// Degenerate executor running each task on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, task: BoxFuture<'static, ()>) {
        futures::executor::block_on(task);
    }

    fn runs_inline(&self) -> bool {
        true
    }
}

/// Executor submitting tasks to a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: tokio::runtime::Handle,
}

impl TokioExecutor {
    /// Creates an executor over an explicit runtime handle.
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Creates an executor over the current runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, mirroring
    /// [`tokio::runtime::Handle::current`].
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }
}

impl Executor for TokioExecutor {
    fn execute(&self, task: BoxFuture<'static, ()>) {
        self.handle.spawn(task);
    }
}

/// Runs `future` on `executor` and awaits its result.
pub async fn run_on<T: Send + 'static>(
    executor: &SharedExecutor,
    future: impl Future<Output = T> + Send + 'static,
) -> Result<T, CommandError> {
    if executor.runs_inline() {
        return Ok(future.await);
    }

    let (tx, rx) = oneshot::channel();
    executor.execute(Box::pin(async move {
        let _ = tx.send(future.await);
    }));
    rx.await.map_err(|_| CommandError::ExecutorShutDown)
}

/// Verdict of a pipeline hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookResult {
    /// Continue the pipeline.
    Accepted,
    /// Stop the pipeline without executing; the result carries the context.
    Rejected,
}

/// Hook inspecting the context and raw input before parsing.
pub trait RequestPreprocessor<C>: Send + Sync {
    /// Runs before the tree walk.
    fn preprocess(&self, context: &mut CommandContext<C>, input: &CommandInput) -> HookResult;
}

impl<C, F> RequestPreprocessor<C> for F
where
    F: Fn(&mut CommandContext<C>, &CommandInput) -> HookResult + Send + Sync,
{
    fn preprocess(&self, context: &mut CommandContext<C>, input: &CommandInput) -> HookResult {
        self(context, input)
    }
}

/// Hook inspecting the context and resolved command before execution.
pub trait RequestPostprocessor<C>: Send + Sync {
    /// Runs after parsing, before the handler.
    fn postprocess(&self, context: &mut CommandContext<C>, command: &Arc<Command<C>>)
        -> HookResult;
}

impl<C, F> RequestPostprocessor<C> for F
where
    F: Fn(&mut CommandContext<C>, &Arc<Command<C>>) -> HookResult + Send + Sync,
{
    fn postprocess(
        &self,
        context: &mut CommandContext<C>,
        command: &Arc<Command<C>>,
    ) -> HookResult {
        self(context, command)
    }
}

/// Outcome of one execution request.
///
/// A result without a command means a hook rejected the request; the
/// context still carries whatever the pipeline bound before stopping.
pub struct CommandResult<C> {
    context: CommandContext<C>,
    command: Option<Arc<Command<C>>>,
}

impl<C> CommandResult<C> {
    /// Returns the request context.
    pub fn context(&self) -> &CommandContext<C> {
        &self.context
    }

    /// Consumes the result, returning the context.
    pub fn into_context(self) -> CommandContext<C> {
        self.context
    }

    /// Returns the executed command, or `None` when a hook rejected the
    /// request.
    pub fn command(&self) -> Option<&Arc<Command<C>>> {
        self.command.as_ref()
    }
}

impl<C: fmt::Debug> fmt::Debug for CommandResult<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandResult")
            .field("executed", &self.command.is_some())
            .field("context", &self.context)
            .finish()
    }
}

/// Sequences parse, hooks, and handler across the configured executors.
#[derive(Clone)]
pub struct ExecutionCoordinator {
    parsing: SharedExecutor,
    suggestions: SharedExecutor,
    execution: SharedExecutor,
    lock: Option<Arc<Mutex<()>>>,
}

impl ExecutionCoordinator {
    /// Creates a coordinator running every stage inline.
    pub fn simple() -> Self {
        Self::builder().build()
    }

    /// Starts configuring a coordinator.
    pub fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder {
            parsing: None,
            suggestions: None,
            execution: None,
            synchronized: false,
        }
    }

    /// Returns the parsing executor.
    pub fn parsing_executor(&self) -> &SharedExecutor {
        &self.parsing
    }

    /// Returns the suggestions executor.
    pub fn suggestions_executor(&self) -> &SharedExecutor {
        &self.suggestions
    }

    /// Returns the default execution executor.
    pub fn execution_executor(&self) -> &SharedExecutor {
        &self.execution
    }

    /// Runs the execution pipeline for one request.
    pub async fn coordinate_execution<C>(
        &self,
        tree: Arc<CommandTree<C>>,
        settings: Settings,
        preprocessors: &[Arc<dyn RequestPreprocessor<C>>],
        postprocessors: &[Arc<dyn RequestPostprocessor<C>>],
        mut context: CommandContext<C>,
        input: CommandInput,
    ) -> Result<CommandResult<C>, CommandError>
    where
        C: Send + Sync + 'static,
    {
        for hook in preprocessors {
            if hook.preprocess(&mut context, &input) == HookResult::Rejected {
                return Ok(CommandResult {
                    context,
                    command: None,
                });
            }
        }

        let parse_tree = Arc::clone(&tree);
        let (mut context, parsed) = run_on(&self.parsing, async move {
            let mut context = context;
            let mut input = input;
            let parsed = parse_tree
                .parse_walk(&mut context, &mut input, settings)
                .await;
            (context, parsed)
        })
        .await?;
        let command = parsed?;

        for hook in postprocessors {
            if hook.postprocess(&mut context, &command) == HookResult::Rejected {
                return Ok(CommandResult {
                    context,
                    command: None,
                });
            }
        }

        let _guard = match &self.lock {
            Some(lock) => Some(lock.clone().lock_owned().await),
            None => None,
        };

        let executor = command.executor().unwrap_or(&self.execution).clone();
        let run_command = Arc::clone(&command);
        let (context, outcome) = run_on(&executor, async move {
            let mut context = context;
            let outcome = run_command.handler().execute(&mut context).await;
            (context, outcome)
        })
        .await?;

        match outcome {
            Ok(()) => Ok(CommandResult {
                context,
                command: Some(command),
            }),
            Err(error) => {
                debug!(command = %command.display_name(), "command handler failed");
                Err(CommandError::from_handler(error))
            }
        }
    }

    /// Runs the suggestion pipeline for one request.
    pub async fn coordinate_suggestions<C>(
        &self,
        tree: Arc<CommandTree<C>>,
        settings: Settings,
        preprocessors: &[Arc<dyn RequestPreprocessor<C>>],
        processor: Arc<dyn SuggestionProcessor>,
        mut context: CommandContext<C>,
        input: CommandInput,
    ) -> Result<(CommandContext<C>, Suggestions), CommandError>
    where
        C: Send + Sync + 'static,
    {
        let force = settings.force_suggestion;
        for hook in preprocessors {
            if hook.preprocess(&mut context, &input) == HookResult::Rejected {
                return Ok((context, apply_force_policy(Suggestions::empty(), force)));
            }
        }

        let (context, suggestions) = run_on(&self.suggestions, async move {
            let mut context = context;
            let mut input = input;
            let suggestions = tree
                .suggest_walk(&mut context, &mut input, settings, processor.as_ref())
                .await;
            (context, suggestions)
        })
        .await?;

        Ok((context, apply_force_policy(suggestions, force)))
    }
}

fn apply_force_policy(suggestions: Suggestions, force: bool) -> Suggestions {
    if force && suggestions.is_empty() {
        Suggestions::new(vec![Suggestion::new("")])
    } else {
        suggestions
    }
}

/// Builder for [`ExecutionCoordinator`].
pub struct CoordinatorBuilder {
    parsing: Option<SharedExecutor>,
    suggestions: Option<SharedExecutor>,
    execution: Option<SharedExecutor>,
    synchronized: bool,
}

impl CoordinatorBuilder {
    /// Sets the executor parse walks run on.
    pub fn parsing_executor(mut self, executor: SharedExecutor) -> Self {
        self.parsing = Some(executor);
        self
    }

    /// Sets the executor suggestion walks run on.
    pub fn suggestions_executor(mut self, executor: SharedExecutor) -> Self {
        self.suggestions = Some(executor);
        self
    }

    /// Sets the fallback executor handlers run on.
    pub fn execution_executor(mut self, executor: SharedExecutor) -> Self {
        self.execution = Some(executor);
        self
    }

    /// Sets one executor for every stage.
    pub fn common_executor(self, executor: SharedExecutor) -> Self {
        self.parsing_executor(Arc::clone(&executor))
            .suggestions_executor(Arc::clone(&executor))
            .execution_executor(executor)
    }

    /// Serializes handler bodies behind a single-flight mutex.
    pub fn synchronized(mut self) -> Self {
        self.synchronized = true;
        self
    }

    /// Finishes the coordinator; unset executors run inline.
    pub fn build(self) -> ExecutionCoordinator {
        let inline: SharedExecutor = Arc::new(InlineExecutor);
        ExecutionCoordinator {
            parsing: self.parsing.unwrap_or_else(|| Arc::clone(&inline)),
            suggestions: self.suggestions.unwrap_or_else(|| Arc::clone(&inline)),
            execution: self.execution.unwrap_or(inline),
            lock: self
                .synchronized
                .then(|| Arc::new(Mutex::new(()))),
        }
    }
}
