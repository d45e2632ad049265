//! Command tree nodes.

use std::fmt;
use std::sync::Arc;

use crate::command::Command;
use crate::component::{Argument, CommandComponent};
use crate::flag::FlagGroup;
use crate::permission::{Permission, PermissionChecker, SenderFilter};

/// Dispatch constraints of one terminal reachable through a node.
///
/// Aggregated requirements prune branches no sender could complete; the
/// exact check still runs against the resolved command at dispatch time.
pub(crate) struct AccessRequirement<C> {
    pub(crate) permission: Permission,
    pub(crate) sender: SenderFilter<C>,
    pub(crate) command_name: String,
}

impl<C> Clone for AccessRequirement<C> {
    fn clone(&self) -> Self {
        Self {
            permission: self.permission.clone(),
            sender: self.sender.clone(),
            command_name: self.command_name.clone(),
        }
    }
}

/// Whether a sender can possibly reach any terminal below a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Accessibility {
    /// Some reachable terminal accepts the sender.
    Allowed,
    /// The sender type is accepted somewhere, but every candidate's
    /// permission fails; carries the first blocked command name.
    NoPermission(String),
    /// No reachable terminal accepts this sender value.
    WrongSender(String),
}

/// One node of the command tree.
///
/// The synthetic root owns no component. Children are kept ordered by
/// parsing priority: literals (sorted by name), then the single argument
/// child, then the flag child.
pub struct CommandNode<C> {
    component: Option<CommandComponent<C>>,
    children: Vec<CommandNode<C>>,
    command: Option<Arc<Command<C>>>,
    access: Vec<AccessRequirement<C>>,
}

impl<C> CommandNode<C> {
    /// Creates the synthetic root.
    pub(crate) fn root() -> Self {
        Self {
            component: None,
            children: Vec::new(),
            command: None,
            access: Vec::new(),
        }
    }

    /// Creates a node owning `component`.
    pub(crate) fn with_component(component: CommandComponent<C>) -> Self {
        Self {
            component: Some(component),
            ..Self::root()
        }
    }

    /// Returns the owned component (`None` for the root).
    pub fn component(&self) -> Option<&CommandComponent<C>> {
        self.component.as_ref()
    }

    /// Returns the mutable component (`None` for the root).
    pub(crate) fn component_mut(&mut self) -> Option<&mut CommandComponent<C>> {
        self.component.as_mut()
    }

    /// Returns the component name, or `""` for the root.
    pub fn name(&self) -> &str {
        self.component.as_ref().map(CommandComponent::name).unwrap_or("")
    }

    /// Returns the terminal command, if this node completes one.
    pub fn command(&self) -> Option<&Arc<Command<C>>> {
        self.command.as_ref()
    }

    /// Returns the children in parsing priority order.
    pub fn children(&self) -> &[CommandNode<C>] {
        &self.children
    }

    /// Returns `true` when no commands are registered below this node.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Visits this node and every descendant depth-first.
    pub fn walk(&self, visit: &mut impl FnMut(&CommandNode<C>)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Returns the literal child matching `token` by name or alias.
    pub(crate) fn matching_literal_child(&self, token: &str) -> Option<&CommandNode<C>> {
        self.children.iter().find(|child| {
            child
                .component()
                .and_then(CommandComponent::as_literal)
                .is_some_and(|literal| literal.matches(token))
        })
    }

    /// Returns the single argument child, if present.
    pub(crate) fn argument_child(&self) -> Option<&CommandNode<C>> {
        self.children
            .iter()
            .find(|child| child.argument().is_some())
    }

    /// Returns the flag child, if present.
    pub(crate) fn flag_child(&self) -> Option<&CommandNode<C>> {
        self.children.iter().find(|child| child.flags().is_some())
    }

    /// Returns this node's argument component, if it owns one.
    pub(crate) fn argument(&self) -> Option<&Argument<C>> {
        self.component().and_then(CommandComponent::as_argument)
    }

    /// Returns this node's flag group, if it owns one.
    pub(crate) fn flags(&self) -> Option<&FlagGroup<C>> {
        self.component().and_then(CommandComponent::as_flags)
    }

    /// Display labels of the children, for syntax errors.
    pub(crate) fn child_labels(&self) -> Vec<String> {
        self.children
            .iter()
            .filter_map(|child| child.component().map(CommandComponent::label))
            .collect()
    }

    /// Records a reachable terminal's constraints on this node.
    pub(crate) fn push_access(&mut self, requirement: AccessRequirement<C>) {
        self.access.push(requirement);
    }

    /// Marks this node terminal for `command`.
    pub(crate) fn set_command(&mut self, command: Arc<Command<C>>) {
        self.command = Some(command);
    }

    /// Inserts `child` keeping priority order, returning its index.
    ///
    /// Literals sort among themselves by primary name; the argument child
    /// and the flag child follow.
    pub(crate) fn insert_child(&mut self, child: CommandNode<C>) -> usize {
        let key = Self::order_key_of(&child);
        let index = self
            .children
            .partition_point(|existing| Self::order_key_of(existing) <= key);
        self.children.insert(index, child);
        index
    }

    /// Returns a mutable child reference by index.
    pub(crate) fn child_mut(&mut self, index: usize) -> &mut CommandNode<C> {
        &mut self.children[index]
    }

    /// Returns the index of the child matching `predicate`.
    pub(crate) fn position(
        &self,
        predicate: impl Fn(&CommandNode<C>) -> bool,
    ) -> Option<usize> {
        self.children.iter().position(predicate)
    }

    fn order_key_of(node: &CommandNode<C>) -> (u8, String) {
        match node.component() {
            Some(component) => (component.priority(), component.name().to_string()),
            None => (0, String::new()),
        }
    }

    /// Evaluates whether `sender` could reach any terminal below here.
    pub(crate) fn accessibility(
        &self,
        sender: &C,
        checker: &PermissionChecker<C>,
    ) -> Accessibility {
        if self.access.is_empty() {
            return Accessibility::Allowed;
        }

        let mut sender_matched: Option<&AccessRequirement<C>> = None;
        for requirement in &self.access {
            if !requirement.sender.accepts(sender) {
                continue;
            }
            sender_matched.get_or_insert(requirement);
            if requirement.permission.test(sender, checker) {
                return Accessibility::Allowed;
            }
        }

        match sender_matched {
            Some(requirement) => Accessibility::NoPermission(requirement.command_name.clone()),
            None => {
                let first = &self.access[0];
                Accessibility::WrongSender(first.command_name.clone())
            }
        }
    }
}

impl<C> Clone for CommandNode<C> {
    fn clone(&self) -> Self {
        Self {
            component: self.component.clone(),
            children: self.children.clone(),
            command: self.command.clone(),
            access: self.access.clone(),
        }
    }
}

impl<C> fmt::Debug for CommandNode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("component", &self.component)
            .field("terminal", &self.command.is_some())
            .field("children", &self.children)
            .finish()
    }
}
