//! Keyed enumeration parser.

use async_trait::async_trait;

use crate::context::CommandContext;
use crate::error::ParserFailure;
use crate::input::CommandInput;
use crate::parser::{ArgumentParseResult, ArgumentParser};
use crate::suggestion::Suggestion;

/// Parses one of a fixed set of named values, matching case-insensitively.
///
/// Rust has no enum reflection, so the variant table is supplied at
/// construction; suggestions list the lowercase names in declaration order.
#[derive(Debug, Clone)]
pub struct EnumParser<T> {
    variants: Vec<(String, T)>,
}

impl<T: Clone + Send + Sync + 'static> EnumParser<T> {
    /// Creates a parser over `(name, value)` pairs.
    pub fn new(variants: impl IntoIterator<Item = (impl Into<String>, T)>) -> Self {
        Self {
            variants: variants
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }

    fn acceptable_values(&self) -> String {
        self.variants
            .iter()
            .map(|(name, _)| name.to_lowercase())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[async_trait]
impl<C, T> ArgumentParser<C> for EnumParser<T>
where
    C: Send + Sync,
    T: Clone + Send + Sync + 'static,
{
    type Value = T;

    async fn parse(
        &self,
        _context: &mut CommandContext<C>,
        input: &mut CommandInput,
    ) -> ArgumentParseResult<T> {
        let checkpoint = input.clone();
        let token = input.read_string();

        for (name, value) in &self.variants {
            if name.eq_ignore_ascii_case(&token) {
                return Ok(value.clone());
            }
        }

        *input = checkpoint;
        Err(ParserFailure::new(format!(
            "`{token}` is not one of: {}",
            self.acceptable_values()
        )))
    }

    fn suggestions(&self, _context: &CommandContext<C>, _partial: &str) -> Vec<Suggestion> {
        self.variants
            .iter()
            .map(|(name, _)| Suggestion::new(name.to_lowercase()))
            .collect()
    }

    fn context_free(&self) -> bool {
        true
    }
}
