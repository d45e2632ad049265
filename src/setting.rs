//! Per-manager behavior settings.

/// Manager-scoped parsing and suggestion settings.
///
/// A copy is taken at the start of each request; mutating the manager's
/// settings never affects requests already in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Settings {
    /// Unknown or misplaced flag tokens yield control back to a preceding
    /// flag-yielding argument instead of failing the parse.
    pub liberal_flag_parsing: bool,
    /// Empty suggestion sets are replaced with a single empty suggestion.
    pub force_suggestion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            liberal_flag_parsing: false,
            force_suggestion: false,
        }
    }
}
