//! Literal and provider completions.

use cmdtree::command::Command;
use cmdtree::manager::CommandManager;
use cmdtree::parser::standard::{IntegerParser, StringParser};
use cmdtree::parser::StaticSuggestionProvider;
use cmdtree::permission::{Permission, SenderFilter};
use std::sync::Arc;

use crate::common::{manager, suggest, test_enum_parser, TestSender};

fn literal_fixture() -> CommandManager<TestSender> {
    let manager = manager();
    manager
        .register(Command::builder_aliased("test", ["testalias"]).literal("one").build())
        .expect("registration");
    manager
        .register(Command::builder("test").literal("two").build())
        .expect("registration");
    manager
        .register(
            Command::builder("test")
                .literal("var")
                .required_with(
                    "str",
                    StringParser::single(),
                    Arc::new(StaticSuggestionProvider::new(["one", "two"])),
                )
                .required("enum", test_enum_parser())
                .build(),
        )
        .expect("registration");
    manager
        .register(
            Command::builder("test")
                .literal("comb")
                .required_with(
                    "str",
                    StringParser::single(),
                    Arc::new(StaticSuggestionProvider::new(["one", "two"])),
                )
                .optional("num", IntegerParser::bounded(1, 95))
                .build(),
        )
        .expect("registration");
    manager
        .register(
            Command::builder("test")
                .literal("alt")
                .required_with(
                    "num",
                    IntegerParser::new(),
                    Arc::new(StaticSuggestionProvider::new(["3", "33", "333"])),
                )
                .build(),
        )
        .expect("registration");
    manager
}

#[tokio::test]
async fn root_aliases_route_to_the_same_completions() {
    let manager = manager();
    manager
        .register(Command::builder_aliased("test", ["testalias"]).literal("one").build())
        .expect("registration");

    assert_eq!(suggest(&manager, "test ").await, vec!["one"]);
    assert_eq!(suggest(&manager, "testalias ").await, vec!["one"]);
}

#[tokio::test]
async fn literal_children_complete_by_prefix_in_name_order() {
    let manager = literal_fixture();
    assert!(suggest(&manager, "test").await.is_empty());
    assert_eq!(
        suggest(&manager, "test ").await,
        vec!["alt", "comb", "one", "two", "var"]
    );
    assert_eq!(suggest(&manager, "test a").await, vec!["alt"]);
}

#[tokio::test]
async fn unknown_roots_complete_to_nothing() {
    let manager = literal_fixture();
    assert!(suggest(&manager, "kenny").await.is_empty());
}

#[tokio::test]
async fn exact_literal_tokens_complete_to_nothing() {
    let manager = literal_fixture();
    assert!(suggest(&manager, "test var").await.is_empty());
}

#[tokio::test]
async fn provider_backed_arguments_complete_under_their_node() {
    let manager = literal_fixture();
    assert_eq!(suggest(&manager, "test var one").await, vec!["one"]);
    assert_eq!(suggest(&manager, "test var one f").await, vec!["foo"]);
    assert_eq!(suggest(&manager, "test var one ").await, vec!["foo", "bar"]);
}

#[tokio::test]
async fn later_components_complete_after_earlier_ones_parse() {
    let manager = literal_fixture();
    assert_eq!(suggest(&manager, "test comb ").await, vec!["one", "two"]);
    assert_eq!(
        suggest(&manager, "test comb one ").await,
        vec!["1", "2", "3", "4", "5", "6", "7", "8", "9"]
    );
    assert_eq!(
        suggest(&manager, "test comb one 9").await,
        vec!["9", "90", "91", "92", "93", "94", "95"]
    );
}

#[tokio::test]
async fn provider_overrides_replace_parser_suggestions() {
    let manager = literal_fixture();
    assert_eq!(suggest(&manager, "test alt ").await, vec!["3", "33", "333"]);
}

#[tokio::test]
async fn invalid_literal_tokens_stop_completion() {
    let manager = literal_fixture();
    assert_eq!(suggest(&manager, "test o").await, vec!["one"]);
    assert!(suggest(&manager, "test o ").await.is_empty());
    assert!(suggest(&manager, "test o abc123xyz").await.is_empty());
}

#[tokio::test]
async fn literal_siblings_precede_argument_provider_output() {
    let manager = manager();
    manager
        .register(
            Command::builder("literal_with_variable")
                .required_with(
                    "arg",
                    StringParser::single(),
                    Arc::new(StaticSuggestionProvider::new(["veni", "vidi"])),
                )
                .literal("now")
                .build(),
        )
        .expect("registration");
    manager
        .register(
            Command::builder("literal_with_variable")
                .literal("vici")
                .literal("later")
                .build(),
        )
        .expect("registration");

    assert_eq!(
        suggest(&manager, "literal_with_variable ").await,
        vec!["vici", "veni", "vidi"]
    );
    assert_eq!(
        suggest(&manager, "literal_with_variable v").await,
        vec!["vici", "veni", "vidi"]
    );
    assert_eq!(
        suggest(&manager, "literal_with_variable vi").await,
        vec!["vici", "vidi"]
    );
    assert_eq!(
        suggest(&manager, "literal_with_variable vidi").await,
        vec!["vidi"]
    );
    assert_eq!(
        suggest(&manager, "literal_with_variable vidi ").await,
        vec!["now"]
    );
    assert_eq!(
        suggest(&manager, "literal_with_variable vici ").await,
        vec!["later"]
    );
}

#[tokio::test]
async fn arguments_with_providers_still_accept_unsuggested_values() {
    let manager = manager();
    manager
        .register(
            Command::builder("partial")
                .required_with(
                    "arg",
                    StringParser::single(),
                    Arc::new(StaticSuggestionProvider::new([
                        "hi", "hey", "heya", "hai", "hello",
                    ])),
                )
                .literal("literal")
                .build(),
        )
        .expect("registration");

    assert!(suggest(&manager, "partial").await.is_empty());
    assert_eq!(
        suggest(&manager, "partial ").await,
        vec!["hi", "hey", "heya", "hai", "hello"]
    );
    assert_eq!(
        suggest(&manager, "partial h").await,
        vec!["hi", "hey", "heya", "hai", "hello"]
    );
    assert_eq!(suggest(&manager, "partial he").await, vec!["hey", "heya", "hello"]);
    assert_eq!(suggest(&manager, "partial hey").await, vec!["hey", "heya"]);
    assert_eq!(suggest(&manager, "partial hi").await, vec!["hi"]);
    assert!(suggest(&manager, "partial b").await.is_empty());
    assert_eq!(suggest(&manager, "partial hello ").await, vec!["literal"]);
    assert_eq!(suggest(&manager, "partial bonjour ").await, vec!["literal"]);
}

#[tokio::test]
async fn sender_filters_prune_unreachable_branches() {
    let manager = manager();
    manager
        .register(
            Command::builder("test-specific-sender")
                .sender_filter(SenderFilter::matching("console", TestSender::is_console))
                .build(),
        )
        .expect("registration");
    manager
        .register(
            Command::builder("literal")
                .literal("test-specific-sender")
                .sender_filter(SenderFilter::matching("console", TestSender::is_console))
                .build(),
        )
        .expect("registration");

    let plain = |input: &'static str| manager.suggest(TestSender::new(), input);
    let console = |input: &'static str| manager.suggest(TestSender::console(), input);

    assert!(plain("test-").await.expect("suggest").is_empty());
    assert_eq!(
        console("test-").await.expect("suggest").into_strings(),
        vec!["test-specific-sender"]
    );
    assert!(plain("l").await.expect("suggest").is_empty());
    assert_eq!(console("l").await.expect("suggest").into_strings(), vec!["literal"]);
    assert!(plain("literal ").await.expect("suggest").is_empty());
    assert_eq!(
        console("literal ").await.expect("suggest").into_strings(),
        vec!["test-specific-sender"]
    );
}

#[tokio::test]
async fn permissions_prune_unreachable_branches() {
    let manager = manager();
    manager
        .register(
            Command::builder("test-permitted")
                .permission(Permission::of("some-permission"))
                .build(),
        )
        .expect("registration");
    manager
        .register(
            Command::builder("literal")
                .literal("test-permitted")
                .permission(Permission::of("some-permission"))
                .build(),
        )
        .expect("registration");

    let denied = |input: &'static str| manager.suggest(TestSender::new(), input);
    let granted =
        |input: &'static str| manager.suggest(TestSender::with_permission("some-permission"), input);

    assert!(denied("test-").await.expect("suggest").is_empty());
    assert_eq!(
        granted("test-").await.expect("suggest").into_strings(),
        vec!["test-permitted"]
    );
    assert!(denied("literal ").await.expect("suggest").is_empty());
    assert_eq!(
        granted("literal ").await.expect("suggest").into_strings(),
        vec!["test-permitted"]
    );
}
