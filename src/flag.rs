//! Command flags and the flag-group token grammar.
//!
//! Flag tokens come in two shapes: long form `--name` and short-form
//! clusters `-xyz` where every character is a single-character alias. A
//! bare `-` is not a flag token; `--` alone is an in-progress long prefix.

use std::sync::Arc;

use crate::context::CommandContext;
use crate::error::CommandError;
use crate::input::CommandInput;
use crate::parser::{BoxedValue, SharedParser, SharedSuggestionProvider};
use crate::permission::{Permission, PermissionChecker};
use crate::setting::Settings;
use crate::suggestion::Suggestion;

/// Value component of a flag that carries an argument.
pub struct FlagValue<C> {
    parser: SharedParser<C>,
    provider: Option<SharedSuggestionProvider<C>>,
}

impl<C> FlagValue<C> {
    /// Returns the inner parser.
    pub fn parser(&self) -> &SharedParser<C> {
        &self.parser
    }

    /// Returns the inner suggestion provider override, if any.
    pub fn provider(&self) -> Option<&SharedSuggestionProvider<C>> {
        self.provider.as_ref()
    }
}

impl<C> Clone for FlagValue<C> {
    fn clone(&self) -> Self {
        Self {
            parser: Arc::clone(&self.parser),
            provider: self.provider.clone(),
        }
    }
}

/// One declared flag: primary name, single-character aliases, optional
/// value component, repeatability, permission.
pub struct CommandFlag<C> {
    name: String,
    aliases: Vec<char>,
    value: Option<FlagValue<C>>,
    repeatable: bool,
    permission: Permission,
}

impl<C> CommandFlag<C> {
    /// Starts building a flag with the given primary name.
    pub fn builder(name: impl Into<String>) -> FlagBuilder<C> {
        FlagBuilder {
            name: name.into(),
            aliases: Vec::new(),
            value: None,
            repeatable: false,
            permission: Permission::None,
        }
    }

    /// Returns the primary name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the single-character aliases.
    pub fn aliases(&self) -> &[char] {
        &self.aliases
    }

    /// Returns the value component for value flags.
    pub fn value(&self) -> Option<&FlagValue<C>> {
        self.value.as_ref()
    }

    /// Returns `true` for presence flags.
    pub fn is_presence(&self) -> bool {
        self.value.is_none()
    }

    /// Returns `true` when the flag may be recorded more than once.
    pub fn is_repeatable(&self) -> bool {
        self.repeatable
    }

    /// Returns the flag's permission requirement.
    pub fn permission(&self) -> &Permission {
        &self.permission
    }

    fn matches_long(&self, name: &str) -> bool {
        if self.name == name {
            return true;
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(alias), None) => self.aliases.contains(&alias),
            _ => false,
        }
    }
}

/// Builder for [`CommandFlag`].
pub struct FlagBuilder<C> {
    name: String,
    aliases: Vec<char>,
    value: Option<FlagValue<C>>,
    repeatable: bool,
    permission: Permission,
}

impl<C> FlagBuilder<C> {
    /// Adds a single-character alias.
    pub fn alias(mut self, alias: char) -> Self {
        self.aliases.push(alias);
        self
    }

    /// Turns the flag into a value flag with the given parser.
    pub fn value_parser(mut self, parser: SharedParser<C>) -> Self {
        self.value = Some(FlagValue {
            parser,
            provider: None,
        });
        self
    }

    /// Overrides the value suggestions.
    ///
    /// Only meaningful after [`FlagBuilder::value_parser`].
    pub fn value_provider(mut self, provider: SharedSuggestionProvider<C>) -> Self {
        if let Some(value) = self.value.as_mut() {
            value.provider = Some(provider);
        }
        self
    }

    /// Allows the flag to be recorded repeatedly.
    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    /// Restricts the flag to senders holding `permission`.
    pub fn permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }

    /// Finishes the flag.
    pub fn build(self) -> CommandFlag<C> {
        CommandFlag {
            name: self.name,
            aliases: self.aliases,
            value: self.value,
            repeatable: self.repeatable,
            permission: self.permission,
        }
    }
}

/// Classified shape of one token at the flag group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlagTokenKind<'a> {
    /// `--name`.
    Long(&'a str),
    /// `-xyz` (single char included).
    Cluster(&'a str),
    /// A bare `--`, an in-progress long prefix.
    LongPrefix,
    /// Not a flag token.
    NotFlag,
}

/// Classifies `token` against the flag token grammar.
pub(crate) fn classify_flag_token(token: &str) -> FlagTokenKind<'_> {
    if token == "--" {
        return FlagTokenKind::LongPrefix;
    }
    if let Some(name) = token.strip_prefix("--") {
        let mut chars = name.chars();
        let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
        let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if starts_alpha && rest_ok {
            return FlagTokenKind::Long(name);
        }
        return FlagTokenKind::NotFlag;
    }
    if let Some(cluster) = token.strip_prefix('-') {
        if !cluster.is_empty() && cluster.chars().all(|c| c.is_ascii_alphabetic()) {
            return FlagTokenKind::Cluster(cluster);
        }
    }
    FlagTokenKind::NotFlag
}

/// Returns `true` when a flag-yielding parser should stop before `token`.
pub(crate) fn is_flag_shaped(token: &str) -> bool {
    !matches!(classify_flag_token(token), FlagTokenKind::NotFlag)
}

/// Outcome of a flag-group parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlagParseOutcome {
    /// Flag parsing finished; records were committed.
    Done,
    /// Liberal parsing hit an unknown flag and hands control back to the
    /// preceding flag-yielding argument. Nothing was committed.
    LiberalYield,
}

/// The synthetic component hosting every flag declared for a command.
pub struct FlagGroup<C> {
    flags: Vec<Arc<CommandFlag<C>>>,
}

impl<C> Clone for FlagGroup<C> {
    fn clone(&self) -> Self {
        Self {
            flags: self.flags.clone(),
        }
    }
}

impl<C> FlagGroup<C> {
    /// Creates a group over the given flags.
    pub fn new(flags: Vec<Arc<CommandFlag<C>>>) -> Self {
        Self { flags }
    }

    /// Returns the declared flags.
    pub fn flags(&self) -> &[Arc<CommandFlag<C>>] {
        &self.flags
    }

    /// Absorbs flags from another group, skipping names already present.
    pub(crate) fn absorb(&mut self, other: &FlagGroup<C>) {
        for flag in &other.flags {
            if !self.flags.iter().any(|f| f.name() == flag.name()) {
                self.flags.push(Arc::clone(flag));
            }
        }
    }

    pub(crate) fn find_long(&self, name: &str) -> Option<&Arc<CommandFlag<C>>> {
        self.flags.iter().find(|f| f.matches_long(name))
    }

    pub(crate) fn find_alias(&self, alias: char) -> Option<&Arc<CommandFlag<C>>> {
        self.flags.iter().find(|f| f.aliases().contains(&alias))
    }
}

impl<C: Send + Sync> FlagGroup<C> {
    /// Parses flag tokens until a non-flag token or end of input.
    ///
    /// Records are staged locally and committed only on [`Done`], so a
    /// liberal yield leaves the context untouched.
    ///
    /// [`Done`]: FlagParseOutcome::Done
    pub(crate) async fn parse(
        &self,
        context: &mut CommandContext<C>,
        input: &mut CommandInput,
        settings: Settings,
        checker: &PermissionChecker<C>,
    ) -> Result<FlagParseOutcome, CommandError> {
        let mut pending: Vec<(String, Option<BoxedValue>)> = Vec::new();

        loop {
            let resume = input.clone();
            input.skip_whitespace();
            if input.is_consumed() {
                break;
            }

            let token = input.peek_string().to_string();
            let flag_names: Vec<String> = match classify_flag_token(&token) {
                FlagTokenKind::NotFlag | FlagTokenKind::LongPrefix => {
                    *input = resume;
                    break;
                }
                FlagTokenKind::Long(name) => match self.find_long(name) {
                    Some(flag) => vec![flag.name().to_string()],
                    None => {
                        if settings.liberal_flag_parsing {
                            *input = resume;
                            return Ok(FlagParseOutcome::LiberalYield);
                        }
                        return Err(CommandError::UnknownFlag {
                            flag: name.to_string(),
                        });
                    }
                },
                FlagTokenKind::Cluster(cluster) => {
                    let mut names = Vec::new();
                    for alias in cluster.chars() {
                        match self.find_alias(alias) {
                            Some(flag) => {
                                if cluster.chars().count() > 1 && !flag.is_presence() {
                                    return Err(CommandError::ClusteredValueFlag {
                                        flag: flag.name().to_string(),
                                    });
                                }
                                names.push(flag.name().to_string());
                            }
                            None => {
                                if settings.liberal_flag_parsing {
                                    *input = resume;
                                    return Ok(FlagParseOutcome::LiberalYield);
                                }
                                return Err(CommandError::UnknownFlag {
                                    flag: alias.to_string(),
                                });
                            }
                        }
                    }
                    names
                }
            };

            input.read_string();

            for name in flag_names {
                let flag = self
                    .flags
                    .iter()
                    .find(|f| f.name() == name)
                    .expect("resolved flag name is declared");

                if !flag.permission().test(context.sender(), checker) {
                    return Err(CommandError::NoPermission {
                        command: format!("--{}", flag.name()),
                    });
                }

                let occurrences = context.flags().count(flag.name())
                    + pending.iter().filter(|(n, _)| n == flag.name()).count();
                if occurrences > 0 && !flag.is_repeatable() && !settings.liberal_flag_parsing {
                    return Err(CommandError::DuplicateFlag {
                        flag: flag.name().to_string(),
                    });
                }

                match flag.value() {
                    None => pending.push((flag.name().to_string(), None)),
                    Some(value) => {
                        input.skip_whitespace();
                        if input.is_consumed() {
                            return Err(CommandError::FlagMissingValue {
                                flag: flag.name().to_string(),
                            });
                        }
                        let raw = input.peek_string().to_string();
                        match value.parser().parse_boxed(context, input).await {
                            Ok(parsed) => pending.push((flag.name().to_string(), Some(parsed))),
                            Err(failure) => {
                                return Err(CommandError::ArgumentParse {
                                    argument: flag.name().to_string(),
                                    input: raw,
                                    source: failure,
                                });
                            }
                        }
                    }
                }
            }
        }

        for (name, value) in pending {
            match value {
                None => context.flags_mut().record_presence(&name),
                Some(value) => context.flags_mut().record_value(&name, value),
            }
        }
        Ok(FlagParseOutcome::Done)
    }

    /// Returns the flags still offerable to the sender: permitted, and not
    /// yet recorded unless repeatable.
    fn remaining<'a>(
        &'a self,
        context: &CommandContext<C>,
        checker: &PermissionChecker<C>,
    ) -> Vec<&'a Arc<CommandFlag<C>>> {
        self.flags
            .iter()
            .filter(|f| f.is_repeatable() || !context.flags().contains(f.name()))
            .filter(|f| f.permission().test(context.sender(), checker))
            .collect()
    }

    /// Completion candidates for a partial token at the flag group.
    ///
    /// The output is already aligned to the typed prefix; the engine applies
    /// no further prefix filtering to it.
    pub(crate) fn suggestions(
        &self,
        context: &CommandContext<C>,
        partial: &str,
        checker: &PermissionChecker<C>,
    ) -> Vec<Suggestion> {
        let remaining = self.remaining(context, checker);
        let mut out: Vec<Suggestion> = Vec::new();

        if partial.is_empty() || partial == "-" {
            for flag in &remaining {
                out.push(Suggestion::new(format!("--{}", flag.name())));
            }
            for flag in &remaining {
                for alias in flag.aliases() {
                    out.push(Suggestion::new(format!("-{alias}")));
                }
            }
            return out;
        }

        if let Some(typed) = partial.strip_prefix("--") {
            for flag in &remaining {
                if flag.name().starts_with(typed) {
                    out.push(Suggestion::new(format!("--{}", flag.name())));
                }
            }
            return out;
        }

        let Some(cluster) = partial.strip_prefix('-') else {
            return out;
        };
        if cluster.is_empty() || !cluster.chars().all(|c| c.is_ascii_alphabetic()) {
            return out;
        }

        let in_remaining = |name: &str| remaining.iter().any(|f| f.name() == name);
        let last = cluster.chars().next_back().expect("cluster is non-empty");
        let last_flag = self.find_alias(last).filter(|f| in_remaining(f.name()));

        if let Some(flag) = last_flag {
            out.push(Suggestion::new(format!("--{}", flag.name())));
        }
        for flag in &remaining {
            if flag.aliases().is_empty() {
                out.push(Suggestion::new(format!("--{}", flag.name())));
            }
        }
        if let Some(flag) = last_flag {
            if flag.is_presence() || cluster.chars().count() == 1 {
                for other in &remaining {
                    if other.name() == flag.name() || !other.is_presence() {
                        continue;
                    }
                    for alias in other.aliases() {
                        if !cluster.contains(*alias) {
                            out.push(Suggestion::new(format!("{partial}{alias}")));
                        }
                    }
                }
                out.push(Suggestion::new(partial.to_string()));
            }
        }
        out
    }
}
