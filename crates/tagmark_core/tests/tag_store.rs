use tagmark_core::{Tag, TagStore, ValidationError};

#[test]
fn case_at_and_whitespace_variants_normalize_to_one_tag() {
    let variants = ["alice", "Alice", "@alice", "  @ALICE  ", "\taLiCe\n"];
    for first in variants {
        let mut store = TagStore::new();
        let tag = store.add(first).expect("first add succeeds");
        assert_eq!(tag.as_str(), "alice");
        for second in variants {
            assert_eq!(
                store.add(second),
                Err(ValidationError::Duplicate(tag.clone())),
                "{first:?} then {second:?}"
            );
        }
        assert_eq!(store.len(), 1);
    }
}

#[test]
fn rejected_add_leaves_store_untouched() {
    let mut store = TagStore::new();
    store.add("alice").unwrap();
    let version = store.version();

    assert!(store.add("").is_err());
    assert!(store.add("x").is_err());
    assert!(store.add("way_too_long_username").is_err());

    assert_eq!(store.version(), version);
    assert_eq!(store.to_strings(), vec!["alice".to_string()]);
}

#[test]
fn insertion_order_is_kept() {
    let mut store = TagStore::new();
    store.add("zed").unwrap();
    store.add("amy").unwrap();
    store.add("mo").unwrap();
    assert_eq!(store.to_strings(), vec!["zed", "amy", "mo"]);
}

#[test]
fn remove_and_clear_bump_version() {
    let mut store = TagStore::new();
    store.add("alice").unwrap();
    store.add("bob").unwrap();
    let v = store.version();

    assert!(store.remove(&Tag::parse("bob").unwrap()));
    assert!(store.version() > v);
    assert!(!store.remove(&Tag::parse("bob").unwrap()));

    let v = store.version();
    assert_eq!(store.clear(), 1);
    assert!(store.is_empty());
    assert!(store.version() > v);
}

#[test]
fn replace_all_merges_and_counts_only_new() {
    let mut store = TagStore::new();
    store.add("alice").unwrap();

    let added = store.replace_all(["alice", "bob", "@Bob", "!", "carol"]);

    assert_eq!(added, 2);
    assert_eq!(store.to_strings(), vec!["alice", "bob", "carol"]);
}

#[test]
fn from_raw_drops_invalid_and_duplicate_entries() {
    let store = TagStore::from_raw(["Alice", "alice", "a", "bob_99"]);
    assert_eq!(store.to_strings(), vec!["alice", "bob_99"]);
    assert!(store.contains("@ALICE"));
}

#[test]
fn snapshot_is_case_insensitive_and_detached() {
    let mut store = TagStore::new();
    store.add("alice").unwrap();
    let snapshot = store.snapshot();
    store.add("bob").unwrap();

    assert!(snapshot.is_tagged("Alice"));
    assert!(!snapshot.is_tagged("bob"));
    assert!(store.snapshot().is_tagged("BOB"));
    assert!(store.snapshot().version() > snapshot.version());
}
