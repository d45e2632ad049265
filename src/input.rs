//! Restartable cursor over a command input string.

use std::sync::Arc;

/// Byte-position cursor over an immutable input string.
///
/// The backing string is shared and never mutated, so snapshots are cheap
/// value copies: clone the cursor to checkpoint, assign it back to restore.
/// Token reads are whitespace-delimited and never consume the whitespace
/// that follows a token; the suggestion engine relies on that to tell an
/// in-progress token from a completed one.
#[derive(Debug, Clone)]
pub struct CommandInput {
    input: Arc<str>,
    offset: usize,
}

impl CommandInput {
    /// Creates a cursor at the start of `input`.
    pub fn new(input: impl AsRef<str>) -> Self {
        Self {
            input: Arc::from(input.as_ref()),
            offset: 0,
        }
    }

    /// Returns the full backing string.
    pub fn full_input(&self) -> &str {
        &self.input
    }

    /// Returns the current byte offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the unconsumed remainder of the input.
    pub fn remaining(&self) -> &str {
        &self.input[self.offset..]
    }

    /// Returns `true` when every byte has been consumed.
    pub fn is_consumed(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// Returns `true` when only whitespace (possibly none) remains.
    pub fn is_blank(&self) -> bool {
        self.remaining().chars().all(char::is_whitespace)
    }

    /// Returns the next whitespace-delimited token without consuming it.
    ///
    /// Leading whitespace is skipped for the peek only. Returns an empty
    /// string at end of input.
    pub fn peek_string(&self) -> &str {
        let rest = self.remaining().trim_start();
        match rest.find(char::is_whitespace) {
            Some(end) => &rest[..end],
            None => rest,
        }
    }

    /// Consumes and returns the next whitespace-delimited token.
    ///
    /// Skips leading whitespace, then reads up to (but not including) the
    /// next whitespace byte.
    pub fn read_string(&mut self) -> String {
        self.skip_whitespace();
        let token = self.peek_string().to_string();
        self.offset += token.len();
        token
    }

    /// Consumes characters while `pred` accepts them and returns the span.
    pub fn read_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let rest = self.remaining();
        let end = rest
            .char_indices()
            .find(|(_, c)| !pred(*c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let span = rest[..end].to_string();
        self.offset += end;
        span
    }

    /// Consumes and returns everything that remains, including whitespace.
    pub fn read_remaining(&mut self) -> String {
        let rest = self.remaining().to_string();
        self.offset = self.input.len();
        rest
    }

    /// Consumes leading whitespace.
    pub fn skip_whitespace(&mut self) {
        let rest = self.remaining();
        let skipped = rest.len() - rest.trim_start().len();
        self.offset += skipped;
    }

    /// Returns `true` when the remainder holds at most one token with no
    /// whitespace after it.
    ///
    /// This identifies the in-progress token under the cursor: `"tes"` and
    /// `""` are final, `"test "` is not (a completed token precedes the
    /// cursor position).
    pub fn is_final_token(&self) -> bool {
        !self
            .remaining()
            .trim_start()
            .contains(char::is_whitespace)
    }

    /// Returns the in-progress token (empty when the cursor sits after
    /// trailing whitespace).
    pub fn final_token(&self) -> &str {
        self.remaining().trim_start()
    }

    /// Counts the whitespace-delimited tokens left in the input.
    pub fn remaining_tokens(&self) -> usize {
        self.remaining().split_whitespace().count()
    }
}
