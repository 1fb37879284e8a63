//! Replay scripts end to end.

use std::io::Write;

use pagecraft_cli::replay::{self, Script, Step};
use pagecraft_store::Settings;

const SESSION: &str = r#"
[transitions]
popup_ms = 200
menu_ms = 100

[[step]]
action = "open"
layer = "menu"
id = "blockColor"

[[step]]
action = "open"
layer = "popup"
id = "settings"
data = { page = "account" }

[[step]]
action = "advance"
ms = 150

[[step]]
action = "close"
layer = "popup"
id = "settings"

[[step]]
action = "advance"
ms = 300
"#;

#[test]
fn popup_open_closes_menus_and_waits_for_transitions() {
    let script = Script::parse(SESSION).unwrap();
    assert_eq!(script.steps.len(), 5);

    let result = replay::run(&script, &Settings::default());
    insta::assert_snapshot!(result.timeline_text(), @r"
    t=0ms step 1: menu blockColor opened
    t=0ms step 2: popup settings opened
    t=0ms step 2: menu blockColor closing
    t=100ms step 3: menu blockColor closed
    t=150ms step 4: popup settings closing
    t=350ms step 5: popup settings closed
    t=350ms step 5: popup settings callback
    ");
    assert!(result.open_popups.is_empty());
    assert!(result.open_menus.is_empty());
}

#[test]
fn missing_targets_and_close_all() {
    let script = Script::parse(
        r#"
[transitions]
popup_ms = 0
menu_ms = 0

[[step]]
action = "close"
layer = "popup"
id = "missing"

[[step]]
action = "update"
layer = "menu"
id = "ghost"
data = { a = 1 }

[[step]]
action = "open"
layer = "menu"
id = "select1"

[[step]]
action = "close_all"
layer = "menu"

[[step]]
action = "advance"
ms = 0
"#,
    )
    .unwrap();

    let result = replay::run(&script, &Settings::default());
    insta::assert_snapshot!(result.timeline_text(), @r"
    t=0ms step 1: popup missing callback
    t=0ms step 2: menu ghost not open
    t=0ms step 3: menu select1 opened
    t=0ms step 4: menu select1 closing
    t=0ms step 5: menu select1 closed
    t=0ms step 5: menu all callback
    ");
}

#[test]
fn entries_left_open_are_reported() {
    let script = Script::parse(
        r#"
[[step]]
action = "open"
layer = "popup"
id = "search"

[[step]]
action = "open"
layer = "menu"
id = "select1"
"#,
    )
    .unwrap();
    assert_eq!(script.transitions, None);

    let result = replay::run(&script, &Settings::default());
    assert_eq!(result.open_popups, vec!["search"]);
    assert_eq!(result.open_menus, vec!["select1"]);
}

#[test]
fn script_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"[[step]]\naction = \"advance\"\nms = 50\n").unwrap();

    let script = Script::load(file.path()).unwrap();
    assert_eq!(script.steps, vec![Step::Advance { ms: 50 }]);
    assert!(replay::run(&script, &Settings::default()).timeline.is_empty());
}

#[test]
fn unknown_action_is_rejected() {
    let err = Script::parse("[[step]]\naction = \"jump\"\n").unwrap_err();
    assert!(format!("{err:#}").contains("parse replay script"));
}
