//! The suggestion engine: replays a parse up to the cursor and asks the
//! active node for completions.

use std::collections::HashSet;
use std::sync::Arc;

use crate::component::{Argument, CommandComponent};
use crate::context::CommandContext;
use crate::flag::{classify_flag_token, CommandFlag, FlagGroup, FlagTokenKind};
use crate::input::CommandInput;
use crate::parser::{SharedParser, SharedSuggestionProvider};
use crate::setting::Settings;
use crate::suggestion::{Suggestion, SuggestionProcessor, Suggestions};
use crate::tree::node::{Accessibility, CommandNode};
use crate::tree::CommandTree;

impl<C: Send + Sync + 'static> CommandTree<C> {
    /// Walks the tree like the parse engine, diverging at the final
    /// in-progress token, where the viable children contribute completions.
    pub(crate) async fn suggest_walk(
        &self,
        context: &mut CommandContext<C>,
        input: &mut CommandInput,
        settings: Settings,
        processor: &dyn SuggestionProcessor,
    ) -> Suggestions {
        let mut node: &CommandNode<C> = self.root();

        loop {
            if input.is_final_token() {
                return self
                    .suggest_at(node, context, input.final_token(), settings, processor)
                    .await;
            }

            let token = input.peek_string().to_string();

            if let Some(child) = node.matching_literal_child(&token) {
                if !self.allowed(child, context) {
                    return Suggestions::empty();
                }
                input.read_string();
                node = child;
                continue;
            }

            if let Some(child) = node.argument_child() {
                if self.allowed(child, context) {
                    let argument = child
                        .argument()
                        .expect("argument child owns an argument component");
                    let checkpoint = input.clone();
                    if run_preprocessors(argument, context, input).is_err() {
                        return Suggestions::empty();
                    }
                    match argument.parser().parse_boxed(context, input).await {
                        Ok(value) => {
                            context.bind_boxed(argument.name(), value);
                            if input.is_consumed() {
                                // A greedy parser swallowed the token under
                                // the cursor; this argument completes it.
                                let partial = checkpoint.final_token().to_string();
                                let candidates =
                                    argument_candidates(argument, context, &partial).await;
                                return collect(processor, [(partial, candidates)]);
                            }
                            node = child;
                            continue;
                        }
                        Err(_) => {
                            *input = checkpoint;
                        }
                    }
                }
            }

            if token.starts_with('-') {
                if let Some(child) = node.flag_child() {
                    if self.allowed(child, context) {
                        let group = child.flags().expect("flag child owns a flag group");
                        return self
                            .suggest_flags(group, context, input, processor)
                            .await;
                    }
                }
            }

            return Suggestions::empty();
        }
    }

    /// Completions offered by `node`'s viable children for `partial`.
    async fn suggest_at(
        &self,
        node: &CommandNode<C>,
        context: &mut CommandContext<C>,
        partial: &str,
        settings: Settings,
        processor: &dyn SuggestionProcessor,
    ) -> Suggestions {
        // A token that already equals a literal is complete; appending
        // anything would change its meaning.
        if !partial.is_empty() && node.matching_literal_child(partial).is_some() {
            return Suggestions::empty();
        }

        let mut batches: Vec<(String, Vec<Suggestion>)> = Vec::new();
        for child in node.children() {
            if !self.allowed(child, context) {
                continue;
            }
            match child.component() {
                Some(CommandComponent::Literal(literal)) => {
                    let candidates = literal.all_names().map(Suggestion::new).collect();
                    batches.push((partial.to_string(), candidates));
                }
                Some(CommandComponent::Argument(_)) => {
                    let argument = child
                        .argument()
                        .expect("argument child owns an argument component");
                    let candidates = argument_candidates(argument, context, partial).await;
                    batches.push((partial.to_string(), candidates));

                    // Liberal flag parsing admits flags in front of the
                    // argument, so its trailing flag group also competes.
                    if settings.liberal_flag_parsing {
                        if let Some(flag_child) = child.flag_child() {
                            if self.allowed(flag_child, context)
                                && (partial.is_empty() || partial.starts_with('-'))
                            {
                                let group =
                                    flag_child.flags().expect("flag child owns a flag group");
                                let candidates =
                                    group.suggestions(context, partial, self.checker());
                                batches.push((String::new(), candidates));
                            }
                        }
                    }
                }
                Some(CommandComponent::Flags(group)) => {
                    if partial.is_empty() || partial.starts_with('-') {
                        let candidates = group.suggestions(context, partial, self.checker());
                        batches.push((String::new(), candidates));
                    }
                }
                None => {}
            }
        }
        collect(processor, batches)
    }

    /// Replays flag tokens under the flag group, then completes the final
    /// one. Unknown flags are skipped rather than failing the replay.
    async fn suggest_flags(
        &self,
        group: &FlagGroup<C>,
        context: &mut CommandContext<C>,
        input: &mut CommandInput,
        processor: &dyn SuggestionProcessor,
    ) -> Suggestions {
        let mut pending_value: Option<Arc<CommandFlag<C>>> = None;

        loop {
            if input.is_final_token() {
                let partial = input.final_token().to_string();
                if let Some(flag) = pending_value {
                    let value = flag.value().expect("pending flag carries a value");
                    let candidates = provider_or_parser(
                        value.provider().cloned(),
                        value.parser(),
                        context,
                        &partial,
                    )
                    .await;
                    return collect(processor, [(partial, candidates)]);
                }
                if partial.is_empty() || partial.starts_with('-') {
                    let candidates = group.suggestions(context, &partial, self.checker());
                    return collect(processor, [(String::new(), candidates)]);
                }
                return Suggestions::empty();
            }

            if let Some(flag) = pending_value.take() {
                let value = flag.value().expect("pending flag carries a value");
                let before = input.offset();
                match value.parser().parse_boxed(context, input).await {
                    Ok(parsed) if input.offset() > before => {
                        context.flags_mut().record_value(flag.name(), parsed);
                        continue;
                    }
                    _ => return Suggestions::empty(),
                }
            }

            input.skip_whitespace();
            let token = input.peek_string().to_string();
            match classify_flag_token(&token) {
                FlagTokenKind::Long(name) => {
                    input.read_string();
                    match group.find_long(name).cloned() {
                        Some(flag) if flag.value().is_some() => pending_value = Some(flag),
                        Some(flag) => context.flags_mut().record_presence(flag.name()),
                        None => {}
                    }
                }
                FlagTokenKind::Cluster(cluster) => {
                    input.read_string();
                    let single = cluster.chars().count() == 1;
                    for alias in cluster.chars() {
                        match group.find_alias(alias).cloned() {
                            Some(flag) if flag.value().is_some() && single => {
                                pending_value = Some(flag);
                            }
                            Some(flag) if flag.is_presence() => {
                                context.flags_mut().record_presence(flag.name());
                            }
                            _ => {}
                        }
                    }
                }
                FlagTokenKind::LongPrefix => {
                    input.read_string();
                }
                FlagTokenKind::NotFlag => return Suggestions::empty(),
            }
        }
    }

    fn allowed(&self, node: &CommandNode<C>, context: &CommandContext<C>) -> bool {
        matches!(
            node.accessibility(context.sender(), self.checker()),
            Accessibility::Allowed
        )
    }
}

/// An argument's completion source: the component provider when set, the
/// parser's own suggestions otherwise.
async fn argument_candidates<C: Send + Sync>(
    argument: &Argument<C>,
    context: &CommandContext<C>,
    partial: &str,
) -> Vec<Suggestion> {
    provider_or_parser(
        argument.provider().cloned(),
        argument.parser(),
        context,
        partial,
    )
    .await
}

async fn provider_or_parser<C: Send + Sync>(
    provider: Option<SharedSuggestionProvider<C>>,
    parser: &SharedParser<C>,
    context: &CommandContext<C>,
    partial: &str,
) -> Vec<Suggestion> {
    match provider {
        Some(provider) => provider.suggestions(context, partial).await,
        None => parser.suggestions(context, partial),
    }
}

fn run_preprocessors<C>(
    argument: &Argument<C>,
    context: &mut CommandContext<C>,
    input: &CommandInput,
) -> Result<(), ()> {
    for preprocessor in argument.preprocessors() {
        if preprocessor.preprocess(context, input).is_err() {
            return Err(());
        }
    }
    Ok(())
}

/// Runs each batch through the processor with its own effective partial,
/// then deduplicates by completion text, keeping first-seen order.
fn collect(
    processor: &dyn SuggestionProcessor,
    batches: impl IntoIterator<Item = (String, Vec<Suggestion>)>,
) -> Suggestions {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<Suggestion> = Vec::new();
    for (partial, candidates) in batches {
        for suggestion in processor.process(&partial, candidates) {
            if seen.insert(suggestion.text().to_string()) {
                out.push(suggestion);
            }
        }
    }
    Suggestions::new(out)
}
