//! Library entrypoint for `cmdtree`.
//!
//! An embeddable command framework: declarative command chains merge into a
//! shared prefix tree, textual input resolves to one executable command with
//! typed argument bindings, any cursor position yields completion
//! suggestions, and a coordinator sequences the asynchronous
//! parse/postprocess/execute pipeline over caller-supplied executors.
//!
//! The host plugs in the sender type, the permission model, and the
//! executors; the framework never spawns threads or blocks on its own.

pub mod command;
pub mod component;
pub mod context;
pub mod error;
pub mod execution;
pub mod flag;
pub mod input;
pub mod manager;
pub mod parser;
pub mod permission;
pub mod setting;
pub mod suggestion;
pub mod tree;

pub use command::{Command, CommandBuilder, CommandHandler, FnHandler, NoopHandler};
pub use component::{Argument, CommandComponent, DefaultValue, Literal};
pub use context::{CommandContext, FlagStore};
pub use error::{
    BoxError, CommandError, ParserFailure, RegistrationError, RegistrationErrorKind,
};
pub use execution::{
    CommandResult, ExecutionCoordinator, Executor, HookResult, InlineExecutor,
    RequestPostprocessor, RequestPreprocessor, SharedExecutor, TokioExecutor,
};
pub use flag::{CommandFlag, FlagBuilder, FlagGroup};
pub use input::CommandInput;
pub use manager::{CommandManager, ManagerBuilder};
pub use parser::{
    ArgumentParseResult, ArgumentParser, ComponentPreprocessor, FnSuggestionProvider,
    StaticSuggestionProvider, SuggestionProvider,
};
pub use permission::{Permission, PermissionChecker, SenderFilter};
pub use setting::Settings;
pub use suggestion::{
    FilteringSuggestionProcessor, Suggestion, SuggestionProcessor, Suggestions,
};
pub use tree::{CommandNode, CommandTree};
