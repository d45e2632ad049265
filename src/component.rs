//! Command path components.

use std::fmt;
use std::sync::Arc;

use crate::context::CommandContext;
use crate::flag::FlagGroup;
use crate::parser::{
    BoxedValue, ComponentPreprocessor, SharedParser, SharedSuggestionProvider,
};

/// One slot in a command path.
pub enum CommandComponent<C> {
    /// A fixed token with optional aliases.
    Literal(Literal),
    /// A typed argument consumed by a parser.
    Argument(Argument<C>),
    /// The synthetic slot accepting any remaining flags.
    Flags(FlagGroup<C>),
}

impl<C> CommandComponent<C> {
    /// Returns the component's binding or display name.
    pub fn name(&self) -> &str {
        match self {
            Self::Literal(literal) => &literal.name,
            Self::Argument(argument) => &argument.name,
            Self::Flags(_) => "flags",
        }
    }

    /// Returns the literal variant, if this is one.
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    /// Returns the argument variant, if this is one.
    pub fn as_argument(&self) -> Option<&Argument<C>> {
        match self {
            Self::Argument(argument) => Some(argument),
            _ => None,
        }
    }

    /// Returns the flag group variant, if this is one.
    pub fn as_flags(&self) -> Option<&FlagGroup<C>> {
        match self {
            Self::Flags(group) => Some(group),
            _ => None,
        }
    }

    /// Child ordering rank: literals parse first, the flag group last.
    pub(crate) fn priority(&self) -> u8 {
        match self {
            Self::Literal(_) => 0,
            Self::Argument(_) => 1,
            Self::Flags(_) => 2,
        }
    }

    /// Display label used in syntax errors and expected-token lists.
    pub(crate) fn label(&self) -> String {
        match self {
            Self::Literal(literal) => literal.name.clone(),
            Self::Argument(argument) => format!("<{}>", argument.name),
            Self::Flags(_) => "[flags]".to_string(),
        }
    }
}

impl<C> Clone for CommandComponent<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Literal(literal) => Self::Literal(literal.clone()),
            Self::Argument(argument) => Self::Argument(argument.clone()),
            Self::Flags(group) => Self::Flags(group.clone()),
        }
    }
}

impl<C> fmt::Debug for CommandComponent<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => f.debug_tuple("Literal").field(&literal.name).finish(),
            Self::Argument(argument) => f.debug_tuple("Argument").field(&argument.name).finish(),
            Self::Flags(group) => f
                .debug_tuple("Flags")
                .field(&group.flags().iter().map(|x| x.name().to_string()).collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// A literal path component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    name: String,
    aliases: Vec<String>,
}

impl Literal {
    /// Creates a literal with no aliases.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
        }
    }

    /// Creates a literal with aliases.
    pub fn aliased(
        name: impl Into<String>,
        aliases: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            aliases: aliases.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the primary name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the aliases in declaration order.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Returns `true` when `token` equals the name or any alias.
    pub fn matches(&self, token: &str) -> bool {
        self.name == token || self.aliases.iter().any(|alias| alias == token)
    }

    /// Returns every name this literal answers to.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Two literals are mergeable only when name and alias set coincide.
    pub(crate) fn equivalent(&self, other: &Literal) -> bool {
        if self.name != other.name || self.aliases.len() != other.aliases.len() {
            return false;
        }
        let mut left: Vec<&String> = self.aliases.iter().collect();
        let mut right: Vec<&String> = other.aliases.iter().collect();
        left.sort_unstable();
        right.sort_unstable();
        left == right
    }

    /// Returns `true` when the two literals share any name or alias.
    pub(crate) fn collides_with(&self, other: &Literal) -> bool {
        self.all_names().any(|name| other.matches(name))
    }
}

/// Producer of a value for an optional argument that was not supplied.
pub enum DefaultValue<C> {
    /// A constant, cloned per request.
    Constant(Arc<dyn Fn() -> BoxedValue + Send + Sync>),
    /// A string handed to the argument's parser on demand.
    Parsed(String),
    /// A closure over the request context.
    Dynamic(Arc<dyn Fn(&CommandContext<C>) -> BoxedValue + Send + Sync>),
}

impl<C> DefaultValue<C> {
    /// Creates a constant default.
    pub fn constant<T: Clone + Send + Sync + 'static>(value: T) -> Self {
        Self::Constant(Arc::new(move || Box::new(value.clone())))
    }

    /// Creates a default parsed from `input` when needed.
    pub fn parsed(input: impl Into<String>) -> Self {
        Self::Parsed(input.into())
    }

    /// Creates a default computed from the context.
    pub fn dynamic(
        produce: impl Fn(&CommandContext<C>) -> BoxedValue + Send + Sync + 'static,
    ) -> Self {
        Self::Dynamic(Arc::new(produce))
    }
}

impl<C> Clone for DefaultValue<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Constant(f) => Self::Constant(Arc::clone(f)),
            Self::Parsed(s) => Self::Parsed(s.clone()),
            Self::Dynamic(f) => Self::Dynamic(Arc::clone(f)),
        }
    }
}

impl<C> fmt::Debug for DefaultValue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(_) => f.write_str("Constant"),
            Self::Parsed(s) => f.debug_tuple("Parsed").field(s).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic"),
        }
    }
}

/// A typed argument path component.
pub struct Argument<C> {
    name: String,
    parser: SharedParser<C>,
    provider: Option<SharedSuggestionProvider<C>>,
    required: bool,
    default: Option<DefaultValue<C>>,
    preprocessors: Vec<Arc<dyn ComponentPreprocessor<C>>>,
}

impl<C> Argument<C> {
    /// Creates a required argument.
    pub fn required(name: impl Into<String>, parser: SharedParser<C>) -> Self {
        Self {
            name: name.into(),
            parser,
            provider: None,
            required: true,
            default: None,
            preprocessors: Vec::new(),
        }
    }

    /// Creates an optional argument without a default.
    pub fn optional(name: impl Into<String>, parser: SharedParser<C>) -> Self {
        Self {
            required: false,
            ..Self::required(name, parser)
        }
    }

    /// Sets the default used when the optional argument is absent.
    pub fn with_default(mut self, default: DefaultValue<C>) -> Self {
        self.default = Some(default);
        self
    }

    /// Overrides the parser's own suggestions.
    pub fn with_provider(mut self, provider: SharedSuggestionProvider<C>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Appends a preprocessor run before the parser.
    pub fn with_preprocessor(mut self, preprocessor: Arc<dyn ComponentPreprocessor<C>>) -> Self {
        self.preprocessors.push(preprocessor);
        self
    }

    /// Returns the binding name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parser.
    pub fn parser(&self) -> &SharedParser<C> {
        &self.parser
    }

    /// Returns the suggestion provider override, if any.
    pub fn provider(&self) -> Option<&SharedSuggestionProvider<C>> {
        self.provider.as_ref()
    }

    /// Returns `true` for required arguments.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the default-value producer, if any.
    pub fn default_value(&self) -> Option<&DefaultValue<C>> {
        self.default.as_ref()
    }

    /// Returns the preprocessors in registration order.
    pub fn preprocessors(&self) -> &[Arc<dyn ComponentPreprocessor<C>>] {
        &self.preprocessors
    }

    /// Returns `true` when both arguments bind the same name.
    ///
    /// Parser identity deliberately does not participate; the merger logs
    /// when identically-named arguments carry different parsers.
    pub(crate) fn equivalent(&self, other: &Argument<C>) -> bool {
        self.name == other.name
    }

    /// Returns `true` when both arguments share one parser instance.
    pub(crate) fn same_parser(&self, other: &Argument<C>) -> bool {
        Arc::ptr_eq(&self.parser, &other.parser)
    }
}

impl<C> Clone for Argument<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            parser: Arc::clone(&self.parser),
            provider: self.provider.clone(),
            required: self.required,
            default: self.default.clone(),
            preprocessors: self.preprocessors.clone(),
        }
    }
}
