//! End-to-end parse resolution.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cmdtree::command::Command;
use cmdtree::component::DefaultValue;
use cmdtree::context::CommandContext;
use cmdtree::error::CommandError;
use cmdtree::execution::{InlineExecutor, SharedExecutor};
use cmdtree::input::CommandInput;
use cmdtree::parser::standard::{BooleanParser, DurationParser, IntegerParser, StringParser};
use cmdtree::permission::{Permission, SenderFilter};
use cmdtree::setting::Settings;
use cmdtree::suggestion::{FilteringSuggestionProcessor, SuggestionProcessor};

use crate::common::{manager, TestSender};

#[tokio::test]
async fn multi_literal_chains_resolve_and_bind_defaults() {
    let manager = manager();
    manager
        .register(Command::builder("test").literal("one").build())
        .expect("registration");
    manager
        .register(
            Command::builder("test")
                .literal("two")
                .permission(Permission::of("no"))
                .build(),
        )
        .expect("registration");
    manager
        .register(
            Command::builder("test")
                .literal("opt")
                .optional_or("num", IntegerParser::new(), DefaultValue::constant(17_i64))
                .build(),
        )
        .expect("registration");

    let one = manager
        .execute(TestSender::new(), "test one")
        .await
        .expect("test one resolves");
    assert_eq!(
        one.command().expect("executed").display_name(),
        "test one"
    );

    match manager.execute(TestSender::new(), "test two").await {
        Err(CommandError::NoPermission { command }) => assert_eq!(command, "test two"),
        other => panic!("unexpected result: {other:?}"),
    }

    let defaulted = manager
        .execute(TestSender::new(), "test opt")
        .await
        .expect("optional default binds");
    assert_eq!(defaulted.context().get::<i64>("num"), Some(&17));
    assert_eq!(
        defaulted.command().expect("executed").display_name(),
        "test opt num"
    );

    let explicit = manager
        .execute(TestSender::new(), "test opt 12")
        .await
        .expect("explicit optional parses");
    assert_eq!(explicit.context().get::<i64>("num"), Some(&12));
}

#[tokio::test]
async fn parsed_defaults_run_through_the_argument_parser() {
    let manager = manager();
    manager
        .register(
            Command::builder("lines")
                .optional_or("count", IntegerParser::new(), DefaultValue::parsed("42"))
                .build(),
        )
        .expect("registration");

    let result = manager
        .execute(TestSender::new(), "lines")
        .await
        .expect("parsed default binds");
    assert_eq!(result.context().get::<i64>("count"), Some(&42));
}

#[tokio::test]
async fn aliases_route_like_primary_names() {
    let manager = manager();
    manager
        .register(
            Command::builder_aliased("test", ["other"])
                .literal_aliased("opt", ["öpt"])
                .optional_or("num", IntegerParser::new(), DefaultValue::constant(3_i64))
                .build(),
        )
        .expect("registration");

    let result = manager
        .execute(TestSender::new(), "other öpt 12")
        .await
        .expect("alias chain resolves");
    assert_eq!(result.context().get::<i64>("num"), Some(&12));
}

#[tokio::test]
async fn handler_receives_bound_arguments() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);

    let manager = manager();
    manager
        .register(
            Command::builder("default")
                .required("int", IntegerParser::new())
                .handler_fn(move |context| {
                    assert_eq!(context.get::<i64>("int"), Some(&5));
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .build(),
        )
        .expect("registration");

    manager
        .execute(TestSender::new(), "default 5")
        .await
        .expect("execution succeeds");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_commands_and_trailing_input_are_syntax_errors() {
    let manager = manager();
    manager
        .register(Command::builder("test").literal("one").build())
        .expect("registration");

    match manager.execute(TestSender::new(), "invalid test").await {
        Err(CommandError::InvalidSyntax { found, .. }) => assert!(found.contains("invalid")),
        other => panic!("unexpected result: {other:?}"),
    }

    match manager.execute(TestSender::new(), "test one extra").await {
        Err(CommandError::InvalidSyntax { found, .. }) => assert_eq!(found, "extra"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn literal_branch_wins_only_on_exact_tokens() {
    let manager = manager();
    manager
        .register(
            Command::builder("literalwithvariable")
                .required("variable", StringParser::single())
                .build(),
        )
        .expect("variable branch");
    manager
        .register(
            Command::builder("literalwithvariable")
                .literal_aliased("literal", ["literalalias"])
                .build(),
        )
        .expect("literal branch");

    let variable = manager
        .execute(TestSender::new(), "literalwithvariable argthatdoesnotmatch")
        .await
        .expect("variable branch resolves");
    assert_eq!(
        variable.command().expect("executed").display_name(),
        "literalwithvariable variable"
    );

    for input in ["literalwithvariable literal", "literalwithvariable literalalias"] {
        let literal = manager
            .execute(TestSender::new(), input)
            .await
            .expect("literal branch resolves");
        assert_eq!(
            literal.command().expect("executed").display_name(),
            "literalwithvariable literal"
        );
    }
}

#[tokio::test]
async fn optionals_without_defaults_bind_nothing() {
    let manager = manager();
    manager
        .register(
            Command::builder("optionals")
                .optional("opt1", StringParser::single())
                .optional("opt2", StringParser::single())
                .build(),
        )
        .expect("registration");

    let bare = manager
        .execute(TestSender::new(), "optionals")
        .await
        .expect("empty optionals resolve");
    assert!(!bare.context().contains("opt1"));
    assert!(!bare.context().contains("opt2"));

    let filled = manager
        .execute(TestSender::new(), "optionals a b")
        .await
        .expect("supplied optionals bind");
    assert_eq!(filled.context().get::<String>("opt1").map(String::as_str), Some("a"));
    assert_eq!(filled.context().get::<String>("opt2").map(String::as_str), Some("b"));
}

#[tokio::test]
async fn sender_filters_reject_with_a_sender_type_error() {
    let manager = manager();
    manager
        .register(
            Command::builder("console-only")
                .sender_filter(SenderFilter::matching("console", TestSender::is_console))
                .build(),
        )
        .expect("registration");

    match manager.execute(TestSender::new(), "console-only").await {
        Err(CommandError::SenderType { command }) => assert_eq!(command, "console-only"),
        other => panic!("unexpected result: {other:?}"),
    }

    manager
        .execute(TestSender::console(), "console-only")
        .await
        .expect("console sender accepted");
}

#[tokio::test]
async fn permitted_sender_passes_the_exact_terminal_check() {
    let manager = manager();
    manager
        .register(
            Command::builder("secured")
                .permission(Permission::of("secured.use"))
                .build(),
        )
        .expect("registration");

    manager
        .execute(TestSender::with_permission("secured.use"), "secured")
        .await
        .expect("permitted sender executes");
    match manager.execute(TestSender::new(), "secured").await {
        Err(CommandError::NoPermission { command }) => assert_eq!(command, "secured"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn argument_parse_failures_name_the_argument() {
    let manager = manager();
    manager
        .register(
            Command::builder("numbers")
                .required("num", IntegerParser::bounded(1, 95))
                .build(),
        )
        .expect("registration");

    match manager.execute(TestSender::new(), "numbers potato").await {
        Err(CommandError::ArgumentParse { argument, input, .. }) => {
            assert_eq!(argument, "num");
            assert_eq!(input, "potato");
        }
        other => panic!("unexpected result: {other:?}"),
    }

    match manager.execute(TestSender::new(), "numbers 500").await {
        Err(CommandError::ArgumentParse { argument, .. }) => assert_eq!(argument, "num"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn boolean_and_duration_arguments_bind_typed_values() {
    let manager = manager();
    manager
        .register(
            Command::builder("wait")
                .required("for", DurationParser::new())
                .optional_or(
                    "verbose",
                    BooleanParser::new(),
                    DefaultValue::constant(false),
                )
                .build(),
        )
        .expect("registration");

    let result = manager
        .execute(TestSender::new(), "wait 2h30m true")
        .await
        .expect("duration chain parses");
    assert_eq!(
        result.context().get::<Duration>("for"),
        Some(&Duration::from_secs(2 * 3_600 + 30 * 60))
    );
    assert_eq!(result.context().get::<bool>("verbose"), Some(&true));
}

#[tokio::test]
async fn the_tree_surface_runs_on_a_caller_supplied_executor() {
    let manager = manager();
    manager
        .register(
            Command::builder("direct")
                .required("num", IntegerParser::new())
                .build(),
        )
        .expect("registration");

    let tree = manager.tree();
    let executor: SharedExecutor = Arc::new(InlineExecutor);

    let (context, command) = tree
        .parse(
            CommandContext::new(TestSender::new()),
            CommandInput::new("direct 8"),
            &executor,
            Settings::default(),
        )
        .await
        .expect("tree surface parses");
    assert_eq!(context.get::<i64>("num"), Some(&8));
    assert_eq!(command.display_name(), "direct num");

    let processor: Arc<dyn SuggestionProcessor> =
        Arc::new(FilteringSuggestionProcessor::default());
    let (_context, suggestions) = tree
        .suggest(
            CommandContext::for_suggestions(TestSender::new()),
            CommandInput::new("direct "),
            &executor,
            Settings::default(),
            processor,
        )
        .await
        .expect("tree surface suggests");
    assert_eq!(suggestions.list().len(), 10);
}

#[tokio::test]
async fn greedy_strings_capture_the_remaining_input() {
    let manager = manager();
    manager
        .register(
            Command::builder("say")
                .required("message", StringParser::greedy())
                .build(),
        )
        .expect("registration");

    let result = manager
        .execute(TestSender::new(), "say hello over there")
        .await
        .expect("greedy string parses");
    assert_eq!(
        result.context().get::<String>("message").map(String::as_str),
        Some("hello over there")
    );
}
