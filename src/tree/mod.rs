//! The command tree: registration, merging, and the walk entrypoints.

mod node;
mod parse;
mod suggest;

pub use node::CommandNode;

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::command::Command;
use crate::component::CommandComponent;
use crate::context::CommandContext;
use crate::error::{CommandError, RegistrationError};
use crate::execution::{run_on, SharedExecutor};
use crate::input::CommandInput;
use crate::permission::PermissionChecker;
use crate::setting::Settings;
use crate::suggestion::{SuggestionProcessor, Suggestions};

use node::AccessRequirement;

/// Prefix trie of every registered command.
///
/// Conceptually immutable once registrations finish; the manager swaps
/// whole-tree snapshots so in-flight requests never observe a partial
/// registration.
pub struct CommandTree<C> {
    root: CommandNode<C>,
    checker: PermissionChecker<C>,
}

impl<C> Clone for CommandTree<C> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            checker: self.checker.clone(),
        }
    }
}

impl<C> CommandTree<C> {
    /// Creates an empty tree using `checker` for named permissions.
    pub fn new(checker: PermissionChecker<C>) -> Self {
        Self {
            root: CommandNode::root(),
            checker,
        }
    }

    /// Returns the synthetic root node.
    pub fn root(&self) -> &CommandNode<C> {
        &self.root
    }

    /// Visits every node depth-first.
    pub fn walk(&self, visit: &mut impl FnMut(&CommandNode<C>)) {
        self.root.walk(visit);
    }

    /// Returns the permission checker.
    pub(crate) fn checker(&self) -> &PermissionChecker<C> {
        &self.checker
    }

    /// Merges `command`'s component chain into the tree.
    ///
    /// On error the tree may hold partially inserted nodes; callers that
    /// need atomicity register against a copy and swap on success.
    pub fn register(&mut self, command: Command<C>) -> Result<(), RegistrationError> {
        let command = Arc::new(command);
        let requirement = AccessRequirement {
            permission: command.permission().clone(),
            sender: command.sender_filter().clone(),
            command_name: command.display_name(),
        };

        let mut node = &mut self.root;
        let mut path: Vec<String> = Vec::new();

        for component in command.components() {
            path.push(component.name().to_string());

            let index = match &**component {
                CommandComponent::Literal(literal) => {
                    let existing = node.position(|child| {
                        child
                            .component()
                            .and_then(CommandComponent::as_literal)
                            .is_some_and(|l| l.equivalent(literal))
                    });
                    match existing {
                        Some(index) => index,
                        None => {
                            let collision = node.children().iter().any(|child| {
                                child
                                    .component()
                                    .and_then(CommandComponent::as_literal)
                                    .is_some_and(|l| l.collides_with(literal))
                            });
                            if collision {
                                return Err(RegistrationError::duplicate_chain(
                                    path,
                                    literal.name(),
                                ));
                            }
                            node.insert_child(CommandNode::with_component(
                                CommandComponent::Literal(literal.clone()),
                            ))
                        }
                    }
                }
                CommandComponent::Argument(argument) => {
                    let existing = node.position(|child| child.argument().is_some());
                    match existing {
                        Some(index) => {
                            let sibling = node.children()[index]
                                .argument()
                                .expect("argument child owns an argument component");
                            if !sibling.equivalent(argument) {
                                return Err(RegistrationError::ambiguous_node(
                                    path,
                                    sibling.name(),
                                    argument.name(),
                                ));
                            }
                            if !sibling.same_parser(argument) {
                                warn!(
                                    argument = argument.name(),
                                    chain = path.join(" "),
                                    "merging same-named argument with a different parser",
                                );
                            }
                            index
                        }
                        None => node.insert_child(CommandNode::with_component(
                            CommandComponent::Argument(argument.clone()),
                        )),
                    }
                }
                CommandComponent::Flags(group) => {
                    let existing = node.position(|child| child.flags().is_some());
                    match existing {
                        Some(index) => {
                            if let Some(CommandComponent::Flags(current)) =
                                node.child_mut(index).component_mut()
                            {
                                current.absorb(group);
                            }
                            index
                        }
                        None => node.insert_child(CommandNode::with_component(
                            CommandComponent::Flags(group.clone()),
                        )),
                    }
                }
            };

            node = node.child_mut(index);
            node.push_access(requirement.clone());
        }

        if node.command().is_some() {
            return Err(RegistrationError::duplicate_command(path));
        }
        node.set_command(Arc::clone(&command));
        debug!(command = %command.display_name(), "registered command");
        Ok(())
    }
}

impl<C: Send + Sync + 'static> CommandTree<C> {
    /// Resolves `input` to a command on `executor`, binding arguments into
    /// `context` along the way.
    pub fn parse(
        self: &Arc<Self>,
        context: CommandContext<C>,
        input: CommandInput,
        executor: &SharedExecutor,
        settings: Settings,
    ) -> impl Future<Output = Result<(CommandContext<C>, Arc<Command<C>>), CommandError>> + Send + 'static
    {
        let tree = Arc::clone(self);
        let executor = Arc::clone(executor);
        async move {
            let (context, parsed) = run_on(&executor, async move {
                let mut context = context;
                let mut input = input;
                let parsed = tree.parse_walk(&mut context, &mut input, settings).await;
                (context, parsed)
            })
            .await?;
            parsed.map(|command| (context, command))
        }
    }

    /// Enumerates completions for `input` on `executor`.
    pub fn suggest(
        self: &Arc<Self>,
        context: CommandContext<C>,
        input: CommandInput,
        executor: &SharedExecutor,
        settings: Settings,
        processor: Arc<dyn SuggestionProcessor>,
    ) -> impl Future<Output = Result<(CommandContext<C>, Suggestions), CommandError>> + Send + 'static
    {
        let tree = Arc::clone(self);
        let executor = Arc::clone(executor);
        async move {
            run_on(&executor, async move {
                let mut context = context;
                let mut input = input;
                let suggestions = tree
                    .suggest_walk(&mut context, &mut input, settings, processor.as_ref())
                    .await;
                (context, suggestions)
            })
            .await
        }
    }
}
