//! Unit tests for ShortcutTable

use core_types::LoaderError;
use resource_loader::{ShortcutTable, MAX_DEPTH};

#[test]
fn nested_aliases_expand_fully() {
    let mut table = ShortcutTable::for_queries();
    table.add([("A", "X/{B}")]);
    table.add([("B", "y")]);
    assert_eq!(table.replace_in("A").unwrap(), "X/y");
}

#[test]
fn bare_nested_alias_expands_at_boundary() {
    let mut table = ShortcutTable::for_queries();
    table.add([("jQuery", "libs/jquery"), ("$", "jQuery"), ("CLS", "qb/classes")]);
    assert_eq!(
        table.replace_in("$; CLS: base,list").unwrap(),
        "libs/jquery; qb/classes: base,list"
    );
}

#[test]
fn dollar_expands_to_the_jquery_library() {
    let mut table = ShortcutTable::for_queries();
    table.add([("jQuery", "libs/jquery"), ("$", "jQuery")]);
    assert_eq!(table.replace_in("$; app").unwrap(), "libs/jquery; app");
    assert_eq!(table.replace_in("jquery/ui").unwrap(), "jquery/ui");
}

#[test]
fn two_alias_cycle_names_both_aliases() {
    let mut table = ShortcutTable::for_queries();
    table.add([("A", "B"), ("B", "A")]);

    let err = table.replace_in("A").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("endless recursion"));
    assert!(message.contains("A => B"));
    assert!(message.contains("B => A"));
    assert!(message.contains("B: B"));
}

#[test]
fn self_reference_is_a_cycle() {
    let mut table = ShortcutTable::for_exports();
    table.add([("app", "app.core")]);
    match table.replace_in("app") {
        Err(LoaderError::ShortcutRecursion { trail, .. }) => {
            assert_eq!(trail.len(), MAX_DEPTH + 1);
            assert!(trail.iter().all(|crumb| crumb.ends_with(": app")));
        }
        other => panic!("expected recursion error, got {:?}", other),
    }
}

#[test]
fn export_boundaries_exclude_slash() {
    let mut table = ShortcutTable::for_exports();
    table.add([("ui", "app.widgets")]);
    assert_eq!(table.replace_in("x/ui").unwrap(), "x/ui");
    assert_eq!(table.replace_in("x.ui").unwrap(), "x.app.widgets");
}

#[test]
fn unmatched_text_is_untouched() {
    let mut table = ShortcutTable::for_queries();
    table.add([("a", "b")]);
    assert_eq!(table.replace_in("{nothing} abc").unwrap(), "{nothing} abc");
    assert_eq!(table.get("A"), Some("b"));
}
