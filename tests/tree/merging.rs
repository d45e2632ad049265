//! Registration and merging invariants.

use cmdtree::command::Command;
use cmdtree::error::RegistrationErrorKind;
use cmdtree::parser::standard::{IntegerParser, StringParser};

use crate::common::{manager, suggest, TestSender};

#[tokio::test]
async fn reregistering_an_existing_terminal_is_a_duplicate_command() {
    let manager = manager();
    manager
        .register(Command::builder("test").literal("one").build())
        .expect("first registration");

    let error = manager
        .register(Command::builder("test").literal("one").build())
        .expect_err("identical chain must be rejected");
    assert_eq!(error.kind, RegistrationErrorKind::DuplicateCommand);
    assert_eq!(error.chain, vec!["test".to_string(), "one".to_string()]);
}

#[tokio::test]
async fn second_argument_sibling_with_a_different_name_is_ambiguous() {
    let manager = manager();
    manager
        .register(
            Command::builder("ambiguous")
                .required("string", StringParser::single())
                .build(),
        )
        .expect("first argument child");

    let error = manager
        .register(
            Command::builder("ambiguous")
                .required("integer", IntegerParser::new())
                .build(),
        )
        .expect_err("two argument siblings are ambiguous");
    assert_eq!(error.kind, RegistrationErrorKind::AmbiguousNode);
}

#[tokio::test]
async fn literals_may_shadow_an_argument_sibling() {
    let manager = manager();
    manager
        .register(
            Command::builder("ambiguous")
                .required("string", StringParser::single())
                .build(),
        )
        .expect("argument child");
    manager
        .register(Command::builder("ambiguous").literal("literal").build())
        .expect("literal sibling is allowed");
    manager
        .register(Command::builder("ambiguous").literal("literal2").build())
        .expect("second literal sibling is allowed");
}

#[tokio::test]
async fn colliding_literal_names_are_a_duplicate_chain() {
    let manager = manager();
    manager
        .register(
            Command::builder("root")
                .literal_aliased("sub", ["alias"])
                .build(),
        )
        .expect("aliased literal");

    // Same name, different alias set: not equivalent, but colliding.
    let error = manager
        .register(Command::builder("root").literal("sub").build())
        .expect_err("name collision must be rejected");
    assert_eq!(error.kind, RegistrationErrorKind::DuplicateCommandChain);

    let alias_error = manager
        .register(Command::builder("root").literal("alias").build())
        .expect_err("alias collision must be rejected");
    assert_eq!(alias_error.kind, RegistrationErrorKind::DuplicateCommandChain);
}

#[tokio::test]
async fn same_named_arguments_merge_even_with_different_parsers() {
    let manager = manager();
    manager
        .register(
            Command::builder("merge")
                .required("value", StringParser::single())
                .literal("tail")
                .build(),
        )
        .expect("string chain");
    manager
        .register(
            Command::builder("merge")
                .required("value", IntegerParser::new())
                .literal("othertail")
                .build(),
        )
        .expect("same binding name merges");

    let result = manager
        .execute(TestSender::new(), "merge anything tail")
        .await
        .expect("merged node parses");
    let command = result.command().expect("command executed");
    assert_eq!(command.display_name(), "merge value tail");
}

#[tokio::test]
async fn repeating_literals_along_one_chain_stay_distinct_nodes() {
    let manager = manager();
    manager
        .register(
            Command::builder("repeatingargscommand")
                .literal("repeat")
                .literal("middle")
                .literal("repeat")
                .build(),
        )
        .expect("repeating literal chain");

    // A prefix chain must still be registrable: the repeats were not
    // collapsed into one node.
    manager
        .register(
            Command::builder("repeatingargscommand")
                .literal("repeat")
                .literal("middle")
                .build(),
        )
        .expect("prefix chain registers without ambiguity");
}

#[tokio::test]
async fn registration_order_does_not_change_parse_results() {
    let build = |first: bool| {
        let manager = manager();
        let commands = || {
            vec![
                Command::builder("test").literal("one").build(),
                Command::builder("test").literal("two").build(),
                Command::builder("test")
                    .literal("opt")
                    .optional("num", IntegerParser::new())
                    .build(),
            ]
        };
        let mut list = commands();
        if !first {
            list.reverse();
        }
        for command in list {
            manager.register(command).expect("registration");
        }
        manager
    };

    for input in ["test one", "test two", "test opt 12"] {
        let forward = build(true);
        let reversed = build(false);
        let a = forward
            .execute(TestSender::new(), input)
            .await
            .expect("forward order parses")
            .command()
            .expect("command resolved")
            .display_name();
        let b = reversed
            .execute(TestSender::new(), input)
            .await
            .expect("reversed order parses")
            .command()
            .expect("command resolved")
            .display_name();
        assert_eq!(a, b, "order-dependent resolution for `{input}`");
    }
}

#[tokio::test]
async fn failed_registration_leaves_the_tree_usable() {
    let manager = manager();
    manager
        .register(
            Command::builder("ambiguous")
                .required("string", StringParser::single())
                .build(),
        )
        .expect("first registration");
    manager
        .register(
            Command::builder("ambiguous")
                .required("integer", IntegerParser::new())
                .build(),
        )
        .expect_err("ambiguous registration");

    // The snapshot swap discards the partial insert.
    let result = manager
        .execute(TestSender::new(), "ambiguous hello")
        .await
        .expect("original command still parses");
    assert_eq!(
        result.context().get::<String>("string").map(String::as_str),
        Some("hello")
    );
}

#[tokio::test]
async fn walk_visits_every_registered_node() {
    let manager = manager();
    manager
        .register(Command::builder("test").literal("one").build())
        .expect("registration");
    manager
        .register(Command::builder("test").literal("two").build())
        .expect("registration");

    let mut names = Vec::new();
    manager.tree().walk(&mut |node| {
        names.push(node.name().to_string());
    });
    assert_eq!(names, vec!["", "test", "one", "two"]);

    // The trie shares the `test` prefix: both chains hang off one child.
    assert_eq!(manager.tree().root().children().len(), 1);
    assert_eq!(suggest(&manager, "test ").await, vec!["one", "two"]);
}
