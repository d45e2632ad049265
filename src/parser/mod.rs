//! Argument parser protocol and suggestion provider contracts.
//!
//! Every leaf parser implements [`ArgumentParser`] with a typed output; the
//! tree stores parsers type-erased behind [`AnyParser`] so heterogeneous
//! chains share one node representation.

pub mod standard;

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::CommandContext;
use crate::error::ParserFailure;
use crate::input::CommandInput;
use crate::suggestion::Suggestion;

/// Outcome of one parser invocation.
pub type ArgumentParseResult<T> = Result<T, ParserFailure>;

/// Boxed value produced by a type-erased parser.
pub type BoxedValue = Box<dyn Any + Send + Sync>;

/// Scratch key marking that flag-yielding parsers must consume flag-like
/// tokens (liberal flag parsing handed control back to the argument).
pub(crate) const YIELD_DISABLED_KEY: &str = "__flag_yield_disabled__";

/// Typed leaf parser capability.
///
/// Contract: on success the parser consumes exactly the input it accepted;
/// on failure it leaves the cursor untouched. Parsers may suspend (an async
/// lookup) but must not block.
#[async_trait]
pub trait ArgumentParser<C>: Send + Sync {
    /// Parsed value type bound into the context.
    type Value: Send + Sync + 'static;

    /// Parses a value from the remaining input.
    async fn parse(
        &self,
        context: &mut CommandContext<C>,
        input: &mut CommandInput,
    ) -> ArgumentParseResult<Self::Value>;

    /// Returns completions for a partial token.
    ///
    /// The default offers nothing; parsers with an enumerable domain
    /// override this.
    fn suggestions(&self, context: &CommandContext<C>, partial: &str) -> Vec<Suggestion> {
        let _ = (context, partial);
        Vec::new()
    }

    /// Returns `true` when parsing depends only on the input, enabling
    /// result caching by callers.
    fn context_free(&self) -> bool {
        false
    }

    /// Returns `true` when the parser stops consuming at flag-shaped tokens
    /// so a trailing flag group can take over.
    fn yields_to_flags(&self) -> bool {
        false
    }
}

/// Object-safe, type-erased parser stored in the command tree.
#[async_trait]
pub trait AnyParser<C>: Send + Sync {
    /// Parses a value, boxing the typed output.
    async fn parse_boxed(
        &self,
        context: &mut CommandContext<C>,
        input: &mut CommandInput,
    ) -> ArgumentParseResult<BoxedValue>;

    /// See [`ArgumentParser::suggestions`].
    fn suggestions(&self, context: &CommandContext<C>, partial: &str) -> Vec<Suggestion>;

    /// See [`ArgumentParser::context_free`].
    fn context_free(&self) -> bool;

    /// See [`ArgumentParser::yields_to_flags`].
    fn yields_to_flags(&self) -> bool;
}

#[async_trait]
impl<C, P> AnyParser<C> for P
where
    C: Send + Sync,
    P: ArgumentParser<C>,
{
    async fn parse_boxed(
        &self,
        context: &mut CommandContext<C>,
        input: &mut CommandInput,
    ) -> ArgumentParseResult<BoxedValue> {
        self.parse(context, input)
            .await
            .map(|value| Box::new(value) as BoxedValue)
    }

    fn suggestions(&self, context: &CommandContext<C>, partial: &str) -> Vec<Suggestion> {
        ArgumentParser::suggestions(self, context, partial)
    }

    fn context_free(&self) -> bool {
        ArgumentParser::context_free(self)
    }

    fn yields_to_flags(&self) -> bool {
        ArgumentParser::yields_to_flags(self)
    }
}

/// Shared handle to a type-erased parser.
pub type SharedParser<C> = Arc<dyn AnyParser<C>>;

/// Completion source attached to an argument component, overriding the
/// parser's own suggestions.
///
/// Providers see the context with every binding made so far in the same
/// request, and may resolve asynchronously.
#[async_trait]
pub trait SuggestionProvider<C>: Send + Sync {
    /// Returns completions for a partial token.
    async fn suggestions(&self, context: &CommandContext<C>, partial: &str) -> Vec<Suggestion>;
}

/// Shared handle to a suggestion provider.
pub type SharedSuggestionProvider<C> = Arc<dyn SuggestionProvider<C>>;

/// Provider backed by a fixed string list.
#[derive(Debug, Clone)]
pub struct StaticSuggestionProvider {
    entries: Vec<String>,
}

impl StaticSuggestionProvider {
    /// Creates a provider suggesting the given strings.
    pub fn new(entries: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl<C: Send + Sync> SuggestionProvider<C> for StaticSuggestionProvider {
    async fn suggestions(&self, _context: &CommandContext<C>, _partial: &str) -> Vec<Suggestion> {
        self.entries.iter().map(Suggestion::new).collect()
    }
}

/// Provider backed by a synchronous closure.
pub struct FnSuggestionProvider<F> {
    provide: F,
}

impl<F> FnSuggestionProvider<F> {
    /// Creates a provider from a closure producing suggestion strings.
    pub fn new(provide: F) -> Self {
        Self { provide }
    }
}

#[async_trait]
impl<C, F> SuggestionProvider<C> for FnSuggestionProvider<F>
where
    C: Send + Sync,
    F: Fn(&CommandContext<C>, &str) -> Vec<String> + Send + Sync,
{
    async fn suggestions(&self, context: &CommandContext<C>, partial: &str) -> Vec<Suggestion> {
        (self.provide)(context, partial)
            .into_iter()
            .map(Suggestion::new)
            .collect()
    }
}

/// Per-component hook that can veto an argument before its parser runs.
pub trait ComponentPreprocessor<C>: Send + Sync {
    /// Inspects the context and the unconsumed input; an error fails the
    /// argument the same way a parser failure does.
    fn preprocess(
        &self,
        context: &mut CommandContext<C>,
        input: &CommandInput,
    ) -> Result<(), ParserFailure>;
}

impl<C, F> ComponentPreprocessor<C> for F
where
    F: Fn(&mut CommandContext<C>, &CommandInput) -> Result<(), ParserFailure> + Send + Sync,
{
    fn preprocess(
        &self,
        context: &mut CommandContext<C>,
        input: &CommandInput,
    ) -> Result<(), ParserFailure> {
        self(context, input)
    }
}
