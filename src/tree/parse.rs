//! The parse engine: walks the tree against the cursor and resolves one
//! executable command.

use std::sync::Arc;

use tracing::debug;

use crate::command::Command;
use crate::component::{Argument, DefaultValue};
use crate::context::CommandContext;
use crate::error::{CommandError, ParserFailure};
use crate::flag::{is_flag_shaped, FlagParseOutcome};
use crate::input::CommandInput;
use crate::parser::{BoxedValue, SharedParser, YIELD_DISABLED_KEY};
use crate::setting::Settings;
use crate::tree::node::{Accessibility, CommandNode};
use crate::tree::CommandTree;

/// The most recent flag-yielding argument, kept so liberal flag parsing can
/// hand control back to it.
struct YieldPoint<C> {
    resume_from: CommandInput,
    parser: SharedParser<C>,
    name: String,
}

impl<C> Clone for YieldPoint<C> {
    fn clone(&self) -> Self {
        Self {
            resume_from: self.resume_from.clone(),
            parser: Arc::clone(&self.parser),
            name: self.name.clone(),
        }
    }
}

impl<C: Send + Sync + 'static> CommandTree<C> {
    /// Walks the tree from the root, consuming `input` and binding argument
    /// values into `context`, until a terminal command is resolved or the
    /// walk fails.
    pub(crate) async fn parse_walk(
        &self,
        context: &mut CommandContext<C>,
        input: &mut CommandInput,
        settings: Settings,
    ) -> Result<Arc<Command<C>>, CommandError> {
        let mut node: &CommandNode<C> = self.root();
        let mut path: Vec<String> = Vec::new();
        let mut yield_point: Option<YieldPoint<C>> = None;

        loop {
            input.skip_whitespace();

            if input.is_consumed() {
                if let Some(command) = node.command() {
                    return self.check_terminal(command, context);
                }
                if let Some(child) = node.argument_child() {
                    let argument = child
                        .argument()
                        .expect("argument child owns an argument component");
                    if !argument.is_required() {
                        if let Some(default) = argument.default_value() {
                            let value = self.produce_default(argument, default, context).await?;
                            context.bind_boxed(argument.name(), value);
                        }
                        path.push(argument.name().to_string());
                        node = child;
                        continue;
                    }
                }
                if let Some(child) = node.flag_child() {
                    path.push("flags".to_string());
                    node = child;
                    continue;
                }
                return Err(CommandError::InvalidSyntax {
                    path: path.join(" "),
                    expected: node.child_labels(),
                    found: String::new(),
                });
            }

            let token = input.peek_string().to_string();

            if let Some(child) = node.matching_literal_child(&token) {
                self.ensure_accessible(child, context)?;
                input.read_string();
                path.push(child.name().to_string());
                node = child;
                continue;
            }

            let mut argument_failure: Option<CommandError> = None;
            if let Some(child) = node.argument_child() {
                self.ensure_accessible(child, context)?;
                let argument = child
                    .argument()
                    .expect("argument child owns an argument component");
                let checkpoint = input.clone();
                match run_argument(argument, context, input).await {
                    Ok(value) => {
                        if argument.parser().yields_to_flags() {
                            yield_point = Some(YieldPoint {
                                resume_from: checkpoint,
                                parser: Arc::clone(argument.parser()),
                                name: argument.name().to_string(),
                            });
                        }
                        context.bind_boxed(argument.name(), value);
                        path.push(argument.name().to_string());
                        node = child;
                        continue;
                    }
                    Err(failure) => {
                        *input = checkpoint;
                        argument_failure = Some(CommandError::ArgumentParse {
                            argument: argument.name().to_string(),
                            input: token.clone(),
                            source: failure,
                        });
                    }
                }
            }

            if is_flag_shaped(&token) {
                if let Some(child) = node.flag_child() {
                    self.ensure_accessible(child, context)?;
                    let group = child.flags().expect("flag child owns a flag group");
                    let checkpoint = input.clone();
                    match group.parse(context, input, settings, self.checker()).await {
                        Ok(FlagParseOutcome::Done) => {
                            path.push("flags".to_string());
                            node = child;
                            continue;
                        }
                        Ok(FlagParseOutcome::LiberalYield) => {
                            *input = checkpoint;
                            match yield_point.clone() {
                                Some(point) => {
                                    debug!(
                                        argument = point.name.as_str(),
                                        "liberal flag parsing yields to preceding argument",
                                    );
                                    *input = point.resume_from.clone();
                                    let value =
                                        reparse_without_yield(&point, context, input).await?;
                                    context.bind_boxed(&point.name, value);
                                    continue;
                                }
                                None => {
                                    return Err(CommandError::UnknownFlag {
                                        flag: token.trim_start_matches('-').to_string(),
                                    });
                                }
                            }
                        }
                        Err(error) => return Err(error),
                    }
                }
            }

            if let Some(error) = argument_failure {
                return Err(error);
            }
            return Err(CommandError::InvalidSyntax {
                path: path.join(" "),
                expected: if node.command().is_some() {
                    Vec::new()
                } else {
                    node.child_labels()
                },
                found: input.remaining().trim().to_string(),
            });
        }
    }

    /// Enforces a resolved command's own sender and permission constraints.
    fn check_terminal(
        &self,
        command: &Arc<Command<C>>,
        context: &CommandContext<C>,
    ) -> Result<Arc<Command<C>>, CommandError> {
        if !command.sender_filter().accepts(context.sender()) {
            return Err(CommandError::SenderType {
                command: command.display_name(),
            });
        }
        if !command.permission().test(context.sender(), self.checker()) {
            return Err(CommandError::NoPermission {
                command: command.display_name(),
            });
        }
        Ok(Arc::clone(command))
    }

    /// Rejects descent into nodes no reachable terminal would allow.
    fn ensure_accessible(
        &self,
        node: &CommandNode<C>,
        context: &CommandContext<C>,
    ) -> Result<(), CommandError> {
        match node.accessibility(context.sender(), self.checker()) {
            Accessibility::Allowed => Ok(()),
            Accessibility::NoPermission(command) => Err(CommandError::NoPermission { command }),
            Accessibility::WrongSender(command) => Err(CommandError::SenderType { command }),
        }
    }

    /// Produces the value of an absent optional argument.
    async fn produce_default(
        &self,
        argument: &Argument<C>,
        default: &DefaultValue<C>,
        context: &mut CommandContext<C>,
    ) -> Result<BoxedValue, CommandError> {
        match default {
            DefaultValue::Constant(produce) => Ok(produce()),
            DefaultValue::Dynamic(produce) => Ok(produce(context)),
            DefaultValue::Parsed(raw) => {
                let mut default_input = CommandInput::new(raw);
                argument
                    .parser()
                    .parse_boxed(context, &mut default_input)
                    .await
                    .map_err(|failure| CommandError::ArgumentParse {
                        argument: argument.name().to_string(),
                        input: raw.clone(),
                        source: failure,
                    })
            }
        }
    }
}

/// Runs an argument's preprocessors and parser.
async fn run_argument<C: Send + Sync>(
    argument: &Argument<C>,
    context: &mut CommandContext<C>,
    input: &mut CommandInput,
) -> Result<BoxedValue, ParserFailure> {
    for preprocessor in argument.preprocessors() {
        preprocessor.preprocess(context, input)?;
    }
    argument.parser().parse_boxed(context, input).await
}

/// Re-parses a flag-yielding argument with yielding disabled, so flag-like
/// tokens become argument content.
async fn reparse_without_yield<C: Send + Sync>(
    point: &YieldPoint<C>,
    context: &mut CommandContext<C>,
    input: &mut CommandInput,
) -> Result<BoxedValue, CommandError> {
    context.set_scratch(YIELD_DISABLED_KEY, true);
    let raw = input.peek_string().to_string();
    let reparsed = point.parser.parse_boxed(context, input).await;
    context.clear_scratch(YIELD_DISABLED_KEY);
    reparsed.map_err(|failure| CommandError::ArgumentParse {
        argument: point.name.clone(),
        input: raw,
        source: failure,
    })
}
