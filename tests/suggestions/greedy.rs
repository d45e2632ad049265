//! Greedy and flag-yielding argument completions.

use cmdtree::command::Command;
use cmdtree::flag::CommandFlag;
use cmdtree::manager::CommandManager;
use cmdtree::parser::standard::{StringArrayParser, StringParser};
use cmdtree::parser::StaticSuggestionProvider;
use cmdtree::setting::Settings;
use cmdtree::suggestion::FilteringSuggestionProcessor;
use std::sync::Arc;

use crate::common::{manager_with_settings, suggest, TestSender};

fn sorted(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values
}

fn yielding_string_fixture(settings: Settings) -> CommandManager<TestSender> {
    let manager = manager_with_settings(settings);
    manager
        .register(
            Command::builder("command")
                .required_with(
                    "string",
                    StringParser::greedy_flag_yielding(),
                    Arc::new(StaticSuggestionProvider::new(["hello"])),
                )
                .flag(CommandFlag::builder("flag").alias('f').build())
                .flag(CommandFlag::builder("flag2").build())
                .build(),
        )
        .expect("registration");
    manager
}

fn yielding_array_fixture(settings: Settings) -> CommandManager<TestSender> {
    let manager = manager_with_settings(settings);
    manager
        .register(
            Command::builder("command")
                .required("array", StringArrayParser::flag_yielding())
                .flag(CommandFlag::builder("flag").alias('f').build())
                .flag(CommandFlag::builder("flag2").build())
                .build(),
        )
        .expect("registration");
    manager
}

#[tokio::test]
async fn a_yielding_string_stops_so_flags_can_complete() {
    let manager = yielding_string_fixture(Settings::default());

    assert_eq!(suggest(&manager, "command ").await, vec!["hello"]);
    assert_eq!(suggest(&manager, "command hel").await, vec!["hello"]);
    assert_eq!(
        suggest(&manager, "command hello --").await,
        vec!["--flag", "--flag2"]
    );
    assert_eq!(
        suggest(&manager, "command hello --f").await,
        vec!["--flag", "--flag2"]
    );
    assert_eq!(
        sorted(suggest(&manager, "command hello -f").await),
        vec!["--flag", "--flag2", "-f"]
    );
    assert!(suggest(&manager, "command hello -").await.is_empty());
}

#[tokio::test]
async fn a_yielding_array_has_no_completions_of_its_own() {
    let manager = yielding_array_fixture(Settings::default());

    assert!(suggest(&manager, "command ").await.is_empty());
    assert!(suggest(&manager, "command hello").await.is_empty());
    assert_eq!(
        suggest(&manager, "command hello --").await,
        vec!["--flag", "--flag2"]
    );
    assert_eq!(
        suggest(&manager, "command hello --f").await,
        vec!["--flag", "--flag2"]
    );
    assert_eq!(
        sorted(suggest(&manager, "command hello -f").await),
        vec!["--flag", "--flag2", "-f"]
    );
    assert!(suggest(&manager, "command hello -").await.is_empty());
}

#[tokio::test]
async fn liberal_parsing_offers_flags_alongside_the_argument() {
    let liberal = Settings {
        liberal_flag_parsing: true,
        ..Settings::default()
    };
    let manager = yielding_string_fixture(liberal);

    assert_eq!(
        sorted(suggest(&manager, "command ").await),
        vec!["--flag", "--flag2", "-f", "hello"]
    );
    assert_eq!(suggest(&manager, "command hel").await, vec!["hello"]);
    assert_eq!(
        suggest(&manager, "command hello --").await,
        vec!["--flag", "--flag2"]
    );
    assert!(suggest(&manager, "command hello -").await.is_empty());
}

#[tokio::test]
async fn liberal_parsing_offers_flags_for_an_empty_array() {
    let liberal = Settings {
        liberal_flag_parsing: true,
        ..Settings::default()
    };
    let manager = yielding_array_fixture(liberal);

    assert_eq!(
        sorted(suggest(&manager, "command ").await),
        vec!["--flag", "--flag2", "-f"]
    );
    assert!(suggest(&manager, "command hello").await.is_empty());
}

#[tokio::test]
async fn greedy_suggestions_trim_to_the_token_under_the_cursor() {
    let manager = cmdtree::manager::CommandManager::builder()
        .suggestion_processor(Arc::new(
            FilteringSuggestionProcessor::starts_with(true).trim_before_last_space(),
        ))
        .build();
    manager
        .register(
            Command::builder("command")
                .required_with(
                    "string",
                    StringParser::greedy(),
                    Arc::new(StaticSuggestionProvider::new(["hello world"])),
                )
                .build(),
        )
        .expect("registration");

    assert_eq!(suggest(&manager, "command ").await, vec!["hello world"]);
    assert_eq!(suggest(&manager, "command hello").await, vec!["hello world"]);
    assert_eq!(suggest(&manager, "command hello ").await, vec!["world"]);
    assert_eq!(suggest(&manager, "command hello wo").await, vec!["world"]);
    assert_eq!(suggest(&manager, "command hello world").await, vec!["world"]);
    assert!(suggest(&manager, "command hello world ").await.is_empty());
}
