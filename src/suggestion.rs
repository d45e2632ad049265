//! Completion suggestion values and post-processing.

use std::sync::Arc;

/// One completion candidate.
///
/// Equality and hashing consider only the completion text; the description
/// is display metadata.
#[derive(Debug, Clone)]
pub struct Suggestion {
    text: String,
    description: Option<String>,
}

impl Suggestion {
    /// Creates a plain suggestion.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            description: None,
        }
    }

    /// Attaches display metadata.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the completion text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the display metadata, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Replaces the completion text, keeping the metadata.
    pub fn map_text(mut self, f: impl FnOnce(&str) -> String) -> Self {
        self.text = f(&self.text);
        self
    }
}

impl PartialEq for Suggestion {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Suggestion {}

impl std::hash::Hash for Suggestion {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

/// Ordered suggestion set produced for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suggestions {
    suggestions: Vec<Suggestion>,
}

impl Suggestions {
    /// Creates a suggestion set.
    pub fn new(suggestions: Vec<Suggestion>) -> Self {
        Self { suggestions }
    }

    /// Creates the empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the suggestions in production order.
    pub fn list(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// Returns `true` when no suggestions were produced.
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }

    /// Consumes the set, returning the bare completion strings.
    pub fn into_strings(self) -> Vec<String> {
        self.suggestions.into_iter().map(|s| s.text).collect()
    }
}

/// Post-filter applied to each suggestion source's output.
///
/// The engine invokes the processor once per contributing source with that
/// source's effective partial token (which spans multiple tokens for greedy
/// arguments, and is empty for flag-group output that already accounts for
/// the typed prefix).
pub trait SuggestionProcessor: Send + Sync {
    /// Filters or rewrites `suggestions` for the given partial input.
    fn process(&self, partial: &str, suggestions: Vec<Suggestion>) -> Vec<Suggestion>;
}

/// Shared handle to a suggestion processor.
pub type SharedSuggestionProcessor = Arc<dyn SuggestionProcessor>;

/// Prefix-filtering processor.
///
/// The default configuration keeps suggestions whose text starts with the
/// partial input, comparing case-insensitively. Token alignment for greedy
/// multi-token partials is opt-in via
/// [`FilteringSuggestionProcessor::trim_before_last_space`].
#[derive(Debug, Clone)]
pub struct FilteringSuggestionProcessor {
    ignore_case: bool,
    trim_before_last_space: bool,
}

impl FilteringSuggestionProcessor {
    /// Creates a prefix filter.
    pub fn starts_with(ignore_case: bool) -> Self {
        Self {
            ignore_case,
            trim_before_last_space: false,
        }
    }

    /// Also trims each kept suggestion so the displayed completion is
    /// aligned to the token under the cursor.
    pub fn trim_before_last_space(mut self) -> Self {
        self.trim_before_last_space = true;
        self
    }

    fn keeps(&self, suggestion: &str, partial: &str) -> bool {
        if self.ignore_case {
            suggestion.to_lowercase().starts_with(&partial.to_lowercase())
        } else {
            suggestion.starts_with(partial)
        }
    }
}

impl Default for FilteringSuggestionProcessor {
    fn default() -> Self {
        Self::starts_with(true)
    }
}

impl SuggestionProcessor for FilteringSuggestionProcessor {
    fn process(&self, partial: &str, suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
        suggestions
            .into_iter()
            .filter(|s| self.keeps(s.text(), partial))
            .map(|s| {
                if self.trim_before_last_space {
                    s.map_text(|text| trim_before_last_space(text, partial))
                } else {
                    s
                }
            })
            .collect()
    }
}

/// Trims a multi-token suggestion so only the part completing the token
/// under the cursor remains.
///
/// When `partial` contains a space, the suggestion's prefix up to and
/// including the last space of `partial` is removed if it matches; a
/// suggestion that does not share the prefix is returned unchanged.
pub fn trim_before_last_space(suggestion: &str, partial: &str) -> String {
    match partial.rfind(' ') {
        Some(idx) => {
            let head = &partial[..=idx];
            match suggestion.strip_prefix(head) {
                Some(tail) => tail.to_string(),
                None => suggestion.to_string(),
            }
        }
        None => suggestion.to_string(),
    }
}
