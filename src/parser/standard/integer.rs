//! Bounded integer parser.

use async_trait::async_trait;

use crate::context::CommandContext;
use crate::input::CommandInput;
use crate::parser::{ArgumentParseResult, ArgumentParser};
use crate::suggestion::Suggestion;

use crate::error::ParserFailure;

/// How many digit extensions an in-progress number offers.
const SUGGESTION_INCREMENTS: i64 = 10;

/// Parses a whitespace-delimited integer within an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerParser {
    min: i64,
    max: i64,
}

impl IntegerParser {
    /// Creates an unbounded integer parser.
    pub fn new() -> Self {
        Self {
            min: i64::MIN,
            max: i64::MAX,
        }
    }

    /// Creates a parser accepting `min..=max`.
    pub fn bounded(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Returns the minimum accepted value.
    pub fn min(&self) -> i64 {
        self.min
    }

    /// Returns the maximum accepted value.
    pub fn max(&self) -> i64 {
        self.max
    }

    fn in_range(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }

    fn range_failure(&self, input: &str) -> ParserFailure {
        ParserFailure::new(format!(
            "`{input}` is not an integer in [{}, {}]",
            self.min, self.max
        ))
    }

    /// Digit-extension completions for a numeric partial token.
    ///
    /// An empty partial offers the in-range single digits; a lone `-`
    /// offers the in-range negative digits; a valid number offers itself
    /// plus the in-range results of appending one more digit.
    fn numeric_suggestions(&self, partial: &str) -> Vec<String> {
        if partial.is_empty() {
            let lo = self.min.max(0);
            let hi = self.max.min(9);
            return (lo..=hi).map(|d| d.to_string()).collect();
        }

        if partial == "-" {
            return (1..=9)
                .map(|d| -d)
                .filter(|v| self.in_range(*v))
                .map(|v| v.to_string())
                .collect();
        }

        let Ok(number) = partial.parse::<i64>() else {
            return Vec::new();
        };

        let mut suggestions = Vec::new();
        if self.in_range(number) {
            suggestions.push(partial.to_string());
        }

        let sign = if number < 0 { -1 } else { 1 };
        for increment in 0..SUGGESTION_INCREMENTS {
            let Some(shifted) = number.checked_mul(10) else {
                break;
            };
            let Some(candidate) = shifted.checked_add(increment * sign) else {
                break;
            };
            if self.in_range(candidate) {
                suggestions.push(candidate.to_string());
            }
        }
        suggestions
    }
}

impl Default for IntegerParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<C: Send + Sync> ArgumentParser<C> for IntegerParser {
    type Value = i64;

    async fn parse(
        &self,
        _context: &mut CommandContext<C>,
        input: &mut CommandInput,
    ) -> ArgumentParseResult<i64> {
        let checkpoint = input.clone();
        let token = input.read_string();
        if token.is_empty() {
            *input = checkpoint;
            return Err(ParserFailure::missing_input());
        }

        match token.parse::<i64>() {
            Ok(value) if self.in_range(value) => Ok(value),
            _ => {
                *input = checkpoint;
                Err(self.range_failure(&token))
            }
        }
    }

    fn suggestions(&self, _context: &CommandContext<C>, partial: &str) -> Vec<Suggestion> {
        self.numeric_suggestions(partial)
            .into_iter()
            .map(Suggestion::new)
            .collect()
    }

    fn context_free(&self) -> bool {
        true
    }
}
