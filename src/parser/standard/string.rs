//! String parsers: single token, greedy, and flag-yielding variants.

use async_trait::async_trait;

use crate::context::CommandContext;
use crate::error::ParserFailure;
use crate::flag::is_flag_shaped;
use crate::input::CommandInput;
use crate::parser::{ArgumentParseResult, ArgumentParser, YIELD_DISABLED_KEY};

/// Token consumption mode for [`StringParser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringMode {
    /// One whitespace-delimited token.
    Single,
    /// Every remaining token.
    Greedy,
    /// Every remaining token up to the first flag-shaped token.
    GreedyFlagYielding,
}

/// Parses one or more tokens into a `String`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringParser {
    mode: StringMode,
}

impl StringParser {
    /// Creates a single-token parser.
    pub fn single() -> Self {
        Self {
            mode: StringMode::Single,
        }
    }

    /// Creates a parser consuming the rest of the input.
    pub fn greedy() -> Self {
        Self {
            mode: StringMode::Greedy,
        }
    }

    /// Creates a greedy parser that stops at flag-shaped tokens.
    pub fn greedy_flag_yielding() -> Self {
        Self {
            mode: StringMode::GreedyFlagYielding,
        }
    }

    /// Returns the consumption mode.
    pub fn mode(&self) -> StringMode {
        self.mode
    }
}

fn read_tokens<C>(
    context: &CommandContext<C>,
    input: &mut CommandInput,
    yielding: bool,
) -> Vec<String> {
    let yield_disabled = context.scratch::<bool>(YIELD_DISABLED_KEY).copied() == Some(true);
    let mut tokens = Vec::new();
    loop {
        input.skip_whitespace();
        let token = input.peek_string();
        if token.is_empty() {
            break;
        }
        if yielding && !yield_disabled && is_flag_shaped(token) {
            break;
        }
        tokens.push(input.read_string());
    }
    tokens
}

#[async_trait]
impl<C: Send + Sync> ArgumentParser<C> for StringParser {
    type Value = String;

    async fn parse(
        &self,
        context: &mut CommandContext<C>,
        input: &mut CommandInput,
    ) -> ArgumentParseResult<String> {
        let checkpoint = input.clone();
        match self.mode {
            StringMode::Single => {
                let token = input.read_string();
                if token.is_empty() {
                    *input = checkpoint;
                    return Err(ParserFailure::missing_input());
                }
                Ok(token)
            }
            StringMode::Greedy | StringMode::GreedyFlagYielding => {
                let yielding = self.mode == StringMode::GreedyFlagYielding;
                let tokens = read_tokens(context, input, yielding);
                if tokens.is_empty() {
                    *input = checkpoint;
                    return Err(ParserFailure::missing_input());
                }
                Ok(tokens.join(" "))
            }
        }
    }

    fn context_free(&self) -> bool {
        self.mode == StringMode::Single
    }

    fn yields_to_flags(&self) -> bool {
        self.mode == StringMode::GreedyFlagYielding
    }
}

/// Parses the remaining tokens into a `Vec<String>`.
///
/// The flag-yielding variant stops at the first flag-shaped token and
/// accepts an empty array, so a command can combine a trailing token list
/// with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringArrayParser {
    flag_yielding: bool,
}

impl StringArrayParser {
    /// Creates an array parser consuming every remaining token.
    pub fn new() -> Self {
        Self {
            flag_yielding: false,
        }
    }

    /// Creates an array parser that stops at flag-shaped tokens.
    pub fn flag_yielding() -> Self {
        Self {
            flag_yielding: true,
        }
    }
}

impl Default for StringArrayParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<C: Send + Sync> ArgumentParser<C> for StringArrayParser {
    type Value = Vec<String>;

    async fn parse(
        &self,
        context: &mut CommandContext<C>,
        input: &mut CommandInput,
    ) -> ArgumentParseResult<Vec<String>> {
        Ok(read_tokens(context, input, self.flag_yielding))
    }

    fn yields_to_flags(&self) -> bool {
        self.flag_yielding
    }
}
