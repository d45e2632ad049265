//! Per-invocation command context and flag storage.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

type Value = Box<dyn Any + Send + Sync>;

/// Mutable per-request state bag.
///
/// Created at the entry point, written only by the engine during a single
/// invocation, handed to the handler, and dropped with the
/// [`CommandResult`](crate::execution::CommandResult). Contexts are never
/// shared between requests.
pub struct CommandContext<C> {
    sender: C,
    suggestions: bool,
    bindings: HashMap<String, Value>,
    flags: FlagStore,
    scratch: HashMap<String, Value>,
}

impl<C> CommandContext<C> {
    /// Creates a context for an execution request.
    pub fn new(sender: C) -> Self {
        Self {
            sender,
            suggestions: false,
            bindings: HashMap::new(),
            flags: FlagStore::default(),
            scratch: HashMap::new(),
        }
    }

    /// Creates a context for a suggestion request.
    pub fn for_suggestions(sender: C) -> Self {
        Self {
            suggestions: true,
            ..Self::new(sender)
        }
    }

    /// Returns the sender value.
    pub fn sender(&self) -> &C {
        &self.sender
    }

    /// Returns `true` when this request produces suggestions rather than an
    /// execution.
    pub fn is_suggestions(&self) -> bool {
        self.suggestions
    }

    /// Binds a typed argument value under `name`.
    pub fn bind<T: Send + Sync + 'static>(&mut self, name: impl Into<String>, value: T) {
        self.bindings.insert(name.into(), Box::new(value));
    }

    /// Binds an already-boxed argument value under `name`.
    pub fn bind_boxed(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Returns the bound value for `name`, if present with type `T`.
    pub fn get<T: 'static>(&self, name: &str) -> Option<&T> {
        self.bindings.get(name).and_then(|v| v.downcast_ref())
    }

    /// Returns whether a value is bound under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Returns the flag store.
    pub fn flags(&self) -> &FlagStore {
        &self.flags
    }

    /// Returns the mutable flag store.
    pub fn flags_mut(&mut self) -> &mut FlagStore {
        &mut self.flags
    }

    /// Stores an ad-hoc scratch value for compound parsers.
    pub fn set_scratch<T: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.scratch.insert(key.into(), Box::new(value));
    }

    /// Returns a scratch value, if present with type `T`.
    pub fn scratch<T: 'static>(&self, key: &str) -> Option<&T> {
        self.scratch.get(key).and_then(|v| v.downcast_ref())
    }

    /// Removes a scratch value.
    pub fn clear_scratch(&mut self, key: &str) {
        self.scratch.remove(key);
    }
}

impl<C: fmt::Debug> fmt::Debug for CommandContext<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("sender", &self.sender)
            .field("suggestions", &self.suggestions)
            .field("bindings", &self.bindings.keys().collect::<Vec<_>>())
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// Multiset of parsed flag occurrences.
///
/// Presence flags record unit entries; value flags record their parsed
/// values in input order. Occurrence counts fall out of entry-list length,
/// so repeatable presence counts and repeatable value lists share one
/// representation.
#[derive(Default)]
pub struct FlagStore {
    entries: HashMap<String, Vec<Value>>,
}

impl FlagStore {
    /// Records one presence occurrence of `name`.
    pub fn record_presence(&mut self, name: &str) {
        self.entries
            .entry(name.to_string())
            .or_default()
            .push(Box::new(()));
    }

    /// Records one parsed value occurrence of `name`.
    pub fn record_value(&mut self, name: &str, value: Value) {
        self.entries.entry(name.to_string()).or_default().push(value);
    }

    /// Returns whether `name` occurred at least once.
    pub fn contains(&self, name: &str) -> bool {
        self.count(name) > 0
    }

    /// Returns how many times `name` occurred.
    pub fn count(&self, name: &str) -> usize {
        self.entries.get(name).map(Vec::len).unwrap_or(0)
    }

    /// Returns the last recorded value for `name`, if typed `T`.
    pub fn value<T: 'static>(&self, name: &str) -> Option<&T> {
        self.entries
            .get(name)?
            .iter()
            .rev()
            .find_map(|v| v.downcast_ref())
    }

    /// Returns every recorded value for `name` typed `T`, in input order.
    pub fn all<T: 'static>(&self, name: &str) -> Vec<&T> {
        self.entries
            .get(name)
            .map(|values| values.iter().filter_map(|v| v.downcast_ref()).collect())
            .unwrap_or_default()
    }
}

impl fmt::Debug for FlagStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<_> = self
            .entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.len()))
            .collect();
        counts.sort_unstable();
        f.debug_map().entries(counts).finish()
    }
}
