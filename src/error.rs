//! Registration and runtime error contracts.

use std::sync::Arc;

use thiserror::Error;

/// Source error type surfaced by leaf parsers and handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Stable registration error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationErrorKind {
    /// The chain terminates at a node already owned by another command.
    DuplicateCommand,
    /// Inserting would create a second argument child at one level.
    AmbiguousNode,
    /// Two literal siblings share a name or alias.
    DuplicateCommandChain,
}

/// Failure raised while merging a command chain into the tree.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RegistrationError {
    /// Error category.
    pub kind: RegistrationErrorKind,
    /// The component names along the offending chain.
    pub chain: Vec<String>,
    message: String,
}

impl RegistrationError {
    /// Creates a `DuplicateCommand` error.
    pub fn duplicate_command(chain: Vec<String>) -> Self {
        let message = format!("duplicate command registration for `{}`", chain.join(" "));
        Self {
            kind: RegistrationErrorKind::DuplicateCommand,
            chain,
            message,
        }
    }

    /// Creates an `AmbiguousNode` error.
    pub fn ambiguous_node(chain: Vec<String>, existing: &str, inserted: &str) -> Self {
        let message = format!(
            "ambiguous node at `{}`: argument `{inserted}` conflicts with sibling argument `{existing}`",
            chain.join(" "),
        );
        Self {
            kind: RegistrationErrorKind::AmbiguousNode,
            chain,
            message,
        }
    }

    /// Creates a `DuplicateCommandChain` error.
    pub fn duplicate_chain(chain: Vec<String>, name: &str) -> Self {
        let message = format!(
            "duplicate literal `{name}` while registering `{}`",
            chain.join(" "),
        );
        Self {
            kind: RegistrationErrorKind::DuplicateCommandChain,
            chain,
            message,
        }
    }
}

/// Failure returned by a leaf parser.
///
/// Parsers describe what they rejected; the engine wraps the failure with the
/// argument name and input position before surfacing it.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ParserFailure {
    message: String,
}

impl ParserFailure {
    /// Creates a parser failure with a human-readable reason.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Creates the failure used when a parser ran out of input.
    pub fn missing_input() -> Self {
        Self::new("no input was provided")
    }
}

/// Runtime command pipeline errors surfaced at the boundary.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The input could not be matched against any command at the current
    /// node. Carries the path walked so far, the tokens that would have been
    /// accepted, and the unmatched remainder.
    #[error("invalid command syntax at `{path}`: expected one of [{}], found `{found}`", .expected.join(", "))]
    InvalidSyntax {
        /// Space-joined names of the nodes walked before failing.
        path: String,
        /// Accepted continuations at the failure point.
        expected: Vec<String>,
        /// Remaining unmatched input.
        found: String,
    },

    /// The sender is not authorized for the resolved or required command.
    #[error("missing permission for command `{command}`")]
    NoPermission {
        /// Name of the command whose permission failed.
        command: String,
    },

    /// The sender value does not satisfy the command's sender filter.
    #[error("sender is not accepted by command `{command}`")]
    SenderType {
        /// Name of the command whose sender filter failed.
        command: String,
    },

    /// A leaf parser rejected its input.
    #[error("failed to parse argument `{argument}` from `{input}`")]
    ArgumentParse {
        /// Binding name of the failing argument.
        argument: String,
        /// The token(s) the parser saw.
        input: String,
        /// The parser's own failure.
        #[source]
        source: ParserFailure,
    },

    /// A flag token named no known flag.
    #[error("unknown flag `{flag}`")]
    UnknownFlag {
        /// The flag name as entered, without dashes.
        flag: String,
    },

    /// A non-repeatable flag appeared more than once.
    #[error("duplicate flag `{flag}`")]
    DuplicateFlag {
        /// Primary name of the repeated flag.
        flag: String,
    },

    /// A value flag was named but no value token followed.
    #[error("flag `{flag}` requires a value")]
    FlagMissingValue {
        /// Primary name of the value flag.
        flag: String,
    },

    /// A short-form cluster referenced a flag that takes a value.
    #[error("flag `{flag}` takes a value and cannot appear in a cluster")]
    ClusteredValueFlag {
        /// Primary name of the value flag.
        flag: String,
    },

    /// The user handler failed with a non-framework error.
    #[error("command execution failed")]
    Execution {
        /// The handler's error.
        #[source]
        source: BoxError,
    },

    /// A pipeline stage executor was dropped before completing its task.
    #[error("executor dropped a scheduled pipeline stage")]
    ExecutorShutDown,
}

impl CommandError {
    /// Wraps a handler error, passing framework errors through intact.
    pub fn from_handler(error: BoxError) -> Self {
        match error.downcast::<CommandError>() {
            Ok(framework) => *framework,
            Err(other) => Self::Execution { source: other },
        }
    }
}

/// Shared handle to a command error.
///
/// Suggestion and parse results may be inspected by several pipeline stages;
/// the error is reference-counted so stages can keep the original.
pub type SharedCommandError = Arc<CommandError>;
