//! Registry persistence and identity-operation behavior through the public
//! API, backed by real files where round-trip fidelity matters.

mod common;

use common::window;
use std::fs;
use winrecall::{
    JsonFileStore, MemoryStore, RecallError, Registry, SaveOutcome, StateStore,
};

fn file_registry(dir: &tempfile::TempDir) -> Registry {
    let path = dir.path().join("saved_windows.json");
    Registry::load(Box::new(JsonFileStore::new(path)))
}

#[test]
fn save_and_reload_round_trip() {
    let dir = tempfile::tempdir().unwrap();

    let mut registry = file_registry(&dir);
    registry
        .save(
            "builds",
            &window(11, "kitty", "user@host: ~/proj"),
            Some("/home/user/proj".into()),
        )
        .unwrap();
    registry
        .save("notes", &window(12, "Code", "notes - Code"), None)
        .unwrap();
    registry.add_alias("builds", "compiler").unwrap();
    registry.set_command("builds", "run tests").unwrap();

    let reloaded = file_registry(&dir);
    assert_eq!(reloaded.active().len(), 2);
    let builds = reloaded.get("builds").unwrap();
    assert_eq!(builds.id, Some(11));
    assert_eq!(builds.app, "kitty");
    assert_eq!(builds.path.as_deref(), Some(std::path::Path::new("/home/user/proj")));
    assert_eq!(builds.aliases, vec!["compiler"]);
    assert_eq!(builds.command.as_deref(), Some("run tests"));
    assert_eq!(reloaded.get("notes").unwrap().id, Some(12));
}

#[test]
fn reserved_document_keys_survive_active_entries() {
    let dir = tempfile::tempdir().unwrap();

    let mut registry = file_registry(&dir);
    registry.save("one", &window(1, "kitty", "t"), None).unwrap();
    registry.save("two", &window(2, "kitty", "t"), None).unwrap();
    registry.forget("two").unwrap();
    registry.toggle_persistent_highlight();

    let reloaded = file_registry(&dir);
    assert!(reloaded.get("one").is_some());
    assert!(reloaded.archived().contains_key("two"));
    assert!(reloaded.settings().persistent_highlight);
    // Archived entries lose their window id but keep everything else.
    assert_eq!(reloaded.archived()["two"].entry.id, None);
    assert!(reloaded.archived()["two"].forgotten_at > 0.0);
}

#[test]
fn malformed_document_degrades_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved_windows.json");
    fs::write(&path, "{ not json").unwrap();

    let mut registry = Registry::load(Box::new(JsonFileStore::new(path.clone())));
    assert!(registry.active().is_empty());
    assert!(registry.archived().is_empty());

    // The next successful mutation rewrites the file wholesale.
    registry.save("fresh", &window(5, "kitty", "t"), None).unwrap();
    let doc = JsonFileStore::new(path).load().unwrap().unwrap();
    assert!(doc.active.contains_key("fresh"));
}

#[test]
fn saving_registered_window_under_new_name_folds_alias() {
    let mut registry = Registry::load(Box::new(MemoryStore::new()));
    let win = window(7, "kitty", "t");
    registry.save("deploy", &win, None).unwrap();

    let outcome = registry.save("ship", &win, None).unwrap();
    assert_eq!(outcome, SaveOutcome::AliasedTo("deploy".to_string()));
    assert_eq!(registry.get("deploy").unwrap().aliases, vec!["ship"]);
    assert!(registry.get("ship").is_none());

    // Saying it again changes nothing.
    let again = registry.save("ship", &win, None).unwrap();
    assert_eq!(again, SaveOutcome::AliasedTo("deploy".to_string()));
    assert_eq!(registry.get("deploy").unwrap().aliases, vec!["ship"]);
}

#[test]
fn duplicate_spoken_forms_are_rejected_globally() {
    let mut registry = Registry::load(Box::new(MemoryStore::new()));
    registry.save("alpha", &window(1, "kitty", "t"), None).unwrap();
    registry.add_alias("alpha", "first").unwrap();
    registry.save("beta", &window(2, "kitty", "t"), None).unwrap();

    // Re-saving an existing canonical name overwrites that entry in place,
    // keeping its aliases; the namespace stays unambiguous.
    let outcome = registry.save("alpha", &window(3, "kitty", "t"), None).unwrap();
    assert_eq!(outcome, SaveOutcome::Saved);
    assert_eq!(registry.get("alpha").unwrap().id, Some(3));
    assert_eq!(registry.get("alpha").unwrap().aliases, vec!["first"]);
    // A different window may not take an existing alias, via save, rename,
    // or add_alias.
    assert!(registry.save("first", &window(4, "kitty", "t"), None).is_err());
    assert!(registry.rename("beta", "first").is_err());
    assert!(registry.add_alias("beta", "ALPHA").is_err());
    assert_eq!(registry.get("beta").unwrap().aliases.len(), 0);
}

#[test]
fn underscore_names_are_reserved() {
    let mut registry = Registry::load(Box::new(MemoryStore::new()));
    registry.save("ok", &window(1, "kitty", "t"), None).unwrap();

    let err = registry.save("_archive", &window(2, "kitty", "t"), None).unwrap_err();
    assert_eq!(err, RecallError::ReservedName("_archive".to_string()));
    assert!(registry.rename("ok", "_settings").is_err());
    assert!(registry.add_alias("ok", "_x").is_err());
}

#[test]
fn save_purges_same_named_archive_entry() {
    let mut registry = Registry::load(Box::new(MemoryStore::new()));
    registry.save("logs", &window(1, "kitty", "t"), None).unwrap();
    registry.forget("logs").unwrap();
    assert!(registry.archived().contains_key("logs"));

    registry.save("logs", &window(2, "kitty", "t"), None).unwrap();
    assert!(!registry.archived().contains_key("logs"));
    assert_eq!(registry.get("logs").unwrap().id, Some(2));
}

#[test]
fn rename_and_combine_keep_spoken_forms_consistent() {
    let mut registry = Registry::load(Box::new(MemoryStore::new()));
    registry
        .save("work", &window(1, "kitty", "t"), Some("/tmp/work".into()))
        .unwrap();
    registry.add_alias("work", "coding").unwrap();
    registry.save("scratch", &window(2, "kitty", "t"), None).unwrap();
    registry.add_alias("scratch", "spare").unwrap();

    registry.rename("work", "main").unwrap();
    assert!(registry.get("work").is_none());
    assert_eq!(registry.get("main").unwrap().aliases, vec!["coding"]);

    registry.combine("main", "scratch").unwrap();
    assert!(registry.get("scratch").is_none());
    let main = registry.get("main").unwrap();
    assert_eq!(main.aliases, vec!["coding", "scratch", "spare"]);

    let spoken = registry.spoken_name_map();
    assert_eq!(spoken["coding"], "main");
    assert_eq!(spoken["scratch"], "main");
    assert_eq!(spoken["spare"], "main");
    assert_eq!(spoken["main"], "main");
}

#[test]
fn rename_to_own_alias_moves_it_to_canonical() {
    let mut registry = Registry::load(Box::new(MemoryStore::new()));
    registry.save("edgar", &window(1, "kitty", "t"), None).unwrap();
    registry.add_alias("edgar", "ed").unwrap();

    registry.rename("edgar", "ed").unwrap();
    assert!(registry.get("edgar").is_none());
    let entry = registry.get("ed").unwrap();
    // The spoken form moved to the canonical slot; it must not linger as an
    // alias of itself.
    assert!(entry.aliases.is_empty());
    assert_eq!(registry.spoken_name_map()["ed"], "ed");
}

#[test]
fn combine_with_itself_is_a_no_op() {
    let store = MemoryStore::new();
    let mut registry = Registry::load(Box::new(store.clone()));
    registry
        .save("main", &window(1, "kitty", "t"), Some("/tmp/work".into()))
        .unwrap();
    registry.add_alias("main", "core").unwrap();
    let saves = store.save_count();

    registry.combine("main", "main").unwrap();
    let entry = registry.get("main").unwrap();
    assert_eq!(entry.id, Some(1));
    assert_eq!(entry.aliases, vec!["core"]);
    assert_eq!(store.save_count(), saves);
}

#[test]
fn promote_swaps_alias_with_canonical_name() {
    let mut registry = Registry::load(Box::new(MemoryStore::new()));
    registry.save("editor", &window(9, "Code", "t"), None).unwrap();
    registry.add_alias("editor", "vscode").unwrap();

    let previous = registry.promote("vscode").unwrap();
    assert_eq!(previous.as_deref(), Some("editor"));
    let entry = registry.get("vscode").unwrap();
    assert_eq!(entry.id, Some(9));
    assert_eq!(entry.aliases, vec!["editor"]);

    // Promoting the canonical name is a no-op.
    assert_eq!(registry.promote("vscode").unwrap(), None);
    // Promoting an unknown spoken form fails.
    assert!(matches!(
        registry.promote("nothing").unwrap_err(),
        RecallError::NotAnAlias(_)
    ));
}

#[test]
fn remove_alias_reports_its_owner() {
    let mut registry = Registry::load(Box::new(MemoryStore::new()));
    registry.save("mail", &window(4, "kitty", "t"), None).unwrap();
    registry.add_alias("mail", "inbox").unwrap();

    let owner = registry.remove_alias("Inbox").unwrap();
    assert_eq!(owner, "mail");
    assert!(registry.get("mail").unwrap().aliases.is_empty());
    assert!(matches!(
        registry.remove_alias("inbox").unwrap_err(),
        RecallError::NotAnAlias(_)
    ));
}

#[test]
fn detach_clears_id_but_keeps_entry() {
    let mut registry = Registry::load(Box::new(MemoryStore::new()));
    registry
        .save("term", &window(3, "kitty", "t"), Some("/tmp".into()))
        .unwrap();

    registry.detach("term").unwrap();
    let entry = registry.get("term").unwrap();
    assert_eq!(entry.id, None);
    assert_eq!(entry.path.as_deref(), Some(std::path::Path::new("/tmp")));
}

#[test]
fn forget_all_archives_everything() {
    let store = MemoryStore::new();
    let mut registry = Registry::load(Box::new(store.clone()));
    registry.save("a", &window(1, "kitty", "t"), None).unwrap();
    registry.save("b", &window(2, "kitty", "t"), None).unwrap();

    assert_eq!(registry.forget_all(), 2);
    assert!(registry.active().is_empty());
    assert_eq!(registry.archived().len(), 2);

    let doc = store.saved_doc().unwrap();
    assert!(doc.active.is_empty());
    assert_eq!(doc.archive.len(), 2);
}
