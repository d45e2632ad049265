//! Unit-suffixed duration parser.

use std::time::Duration;

use async_trait::async_trait;

use crate::context::CommandContext;
use crate::error::ParserFailure;
use crate::input::CommandInput;
use crate::parser::{ArgumentParseResult, ArgumentParser};
use crate::suggestion::Suggestion;

/// Unit characters in suggestion order with their second multipliers.
const UNITS: [(char, u64); 4] = [('d', 86_400), ('h', 3_600), ('m', 60), ('s', 1)];

/// Parses durations written as concatenated `<number><unit>` segments,
/// e.g. `1d2h30m`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationParser;

impl DurationParser {
    /// Creates a duration parser.
    pub fn new() -> Self {
        Self
    }

    fn unit_seconds(unit: char) -> Option<u64> {
        UNITS
            .iter()
            .find(|(candidate, _)| *candidate == unit)
            .map(|(_, seconds)| *seconds)
    }

    fn parse_token(token: &str) -> Result<Duration, ParserFailure> {
        let mut total: u64 = 0;
        let mut number = String::new();
        let mut saw_segment = false;

        for c in token.chars() {
            if c.is_ascii_digit() {
                number.push(c);
                continue;
            }
            let seconds = Self::unit_seconds(c)
                .ok_or_else(|| ParserFailure::new(format!("`{c}` is not a duration unit")))?;
            if number.is_empty() {
                return Err(ParserFailure::new(format!(
                    "duration unit `{c}` is missing a number"
                )));
            }
            let amount: u64 = number
                .parse()
                .map_err(|_| ParserFailure::new(format!("`{number}` is not a number")))?;
            total = total.saturating_add(amount.saturating_mul(seconds));
            number.clear();
            saw_segment = true;
        }

        if !number.is_empty() || !saw_segment {
            return Err(ParserFailure::new(format!(
                "`{token}` is not a duration like 1d2h3m4s"
            )));
        }
        Ok(Duration::from_secs(total))
    }

    fn completions(partial: &str) -> Vec<String> {
        if partial.is_empty() {
            return (1..=9).map(|d| d.to_string()).collect();
        }

        // Unit completions apply while the token ends in an open number.
        let Some(last) = partial.chars().last() else {
            return Vec::new();
        };
        if !last.is_ascii_digit() {
            return Vec::new();
        }

        let used: Vec<char> = partial.chars().filter(|c| c.is_ascii_alphabetic()).collect();
        UNITS
            .iter()
            .filter(|(unit, _)| !used.contains(unit))
            .map(|(unit, _)| format!("{partial}{unit}"))
            .collect()
    }
}

#[async_trait]
impl<C: Send + Sync> ArgumentParser<C> for DurationParser {
    type Value = Duration;

    async fn parse(
        &self,
        _context: &mut CommandContext<C>,
        input: &mut CommandInput,
    ) -> ArgumentParseResult<Duration> {
        let checkpoint = input.clone();
        let token = input.read_string();
        if token.is_empty() {
            *input = checkpoint;
            return Err(ParserFailure::missing_input());
        }
        match Self::parse_token(&token) {
            Ok(duration) => Ok(duration),
            Err(failure) => {
                *input = checkpoint;
                Err(failure)
            }
        }
    }

    fn suggestions(&self, _context: &CommandContext<C>, partial: &str) -> Vec<Suggestion> {
        Self::completions(partial)
            .into_iter()
            .map(Suggestion::new)
            .collect()
    }

    fn context_free(&self) -> bool {
        true
    }
}
