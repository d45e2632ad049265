//! Boolean parser.

use async_trait::async_trait;

use crate::context::CommandContext;
use crate::error::ParserFailure;
use crate::input::CommandInput;
use crate::parser::{ArgumentParseResult, ArgumentParser};
use crate::suggestion::Suggestion;

/// Parses `true`/`false`, optionally with the common yes/no spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BooleanParser {
    liberal: bool,
}

impl BooleanParser {
    /// Creates a strict `true`/`false` parser.
    pub fn new() -> Self {
        Self { liberal: false }
    }

    /// Creates a parser that also accepts `yes`/`no` and `on`/`off`.
    pub fn liberal() -> Self {
        Self { liberal: true }
    }
}

impl Default for BooleanParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<C: Send + Sync> ArgumentParser<C> for BooleanParser {
    type Value = bool;

    async fn parse(
        &self,
        _context: &mut CommandContext<C>,
        input: &mut CommandInput,
    ) -> ArgumentParseResult<bool> {
        let checkpoint = input.clone();
        let token = input.read_string();
        let value = match token.to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            "yes" | "on" if self.liberal => Some(true),
            "no" | "off" if self.liberal => Some(false),
            _ => None,
        };

        match value {
            Some(value) => Ok(value),
            None => {
                *input = checkpoint;
                Err(ParserFailure::new(format!("`{token}` is not a boolean")))
            }
        }
    }

    fn suggestions(&self, _context: &CommandContext<C>, _partial: &str) -> Vec<Suggestion> {
        vec![Suggestion::new("true"), Suggestion::new("false")]
    }

    fn context_free(&self) -> bool {
        true
    }
}
