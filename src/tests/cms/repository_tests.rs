use super::*;
use crate::store::MemoryStore;

fn loc() -> FileLocation {
    FileLocation::new("AfterlifeOS", "AfterlifeOS.github.io", "js/data_changelogs.js", "main")
}

fn entry(version: &str, date: &str, is_latest: bool) -> ChangelogEntry {
    ChangelogEntry::new(version, date, is_latest, "\n- change\n")
}

fn seeded(entries: &[ChangelogEntry]) -> MemoryStore {
    let store = MemoryStore::new();
    store.insert(&loc(), &codec::encode_changelog(entries).unwrap());
    store
}

fn loaded(store: &MemoryStore) -> ChangelogRepository<&MemoryStore> {
    let mut repo = ChangelogRepository::new(store, loc());
    repo.load().unwrap();
    repo
}

#[test]
fn load_decodes_entries_and_holds_sha() {
    let store = seeded(&[entry("1.0", "Jan 1", true)]);
    let repo = loaded(&store);
    assert_eq!(repo.len(), 1);
    assert_eq!(repo.sha(), Some(store.get(&loc()).unwrap().sha.as_str()));
    assert_eq!(repo.handle().path, "js/data_changelogs.js");
    assert_eq!(repo.latest().unwrap().version, "1.0");
}

#[test]
fn load_failure_leaves_collection_empty() {
    let store = seeded(&[entry("1.0", "Jan 1", true)]);
    let mut repo = loaded(&store);

    let mut missing = ChangelogRepository::new(&store, FileLocation::new("o", "r", "nope.js", "main"));
    let err = missing.load().unwrap_err();
    assert!(matches!(err, CmsError::Fetch { status: 404, .. }));
    assert!(missing.is_empty());
    assert_eq!(missing.sha(), None);

    store.insert(&loc(), "window.changelogsData = not json;");
    let err = repo.load().unwrap_err();
    assert!(matches!(err, CmsError::Decode(_)));
    assert!(repo.is_empty());
    assert_eq!(repo.sha(), None);
}

#[test]
fn latest_upsert_on_head_clears_previous_latest() {
    let store = seeded(&[entry("1.0", "Jan 1", true)]);
    let mut repo = loaded(&store);

    let outcome = repo.upsert(entry("1.1", "Feb 1", true), None);
    assert_eq!(outcome, UpsertOutcome::Created);
    let flags: Vec<(&str, bool)> = repo
        .entries()
        .iter()
        .map(|e| (e.version.as_str(), e.is_latest))
        .collect();
    assert_eq!(flags, vec![("1.1", true), ("1.0", false)]);
}

#[test]
fn upsert_with_existing_index_keeps_length() {
    let store = seeded(&[entry("1.1", "Feb 1", true), entry("1.0", "Jan 1", false)]);
    let mut repo = loaded(&store);

    let outcome = repo.upsert(entry("1.0-hotfix", "Jan 2", false), Some(1));
    assert_eq!(outcome, UpsertOutcome::Updated(1));
    assert_eq!(repo.len(), 2);
    assert_eq!(repo.entries()[1].version, "1.0-hotfix");
    assert!(repo.entries()[0].is_latest);
}

#[test]
fn upsert_with_out_of_range_index_prepends() {
    let store = seeded(&[entry("1.0", "Jan 1", false)]);
    let mut repo = loaded(&store);

    assert_eq!(repo.upsert(entry("2.0", "Mar 1", false), Some(7)), UpsertOutcome::Created);
    assert_eq!(repo.len(), 2);
    assert_eq!(repo.entries()[0].version, "2.0");
}

#[test]
fn editing_an_entry_to_latest_leaves_exactly_one_latest() {
    let store = seeded(&[
        entry("1.2", "Mar 1", true),
        entry("1.1", "Feb 1", false),
        entry("1.0", "Jan 1", false),
    ]);
    let mut repo = loaded(&store);

    repo.upsert(entry("1.1", "Feb 1", true), Some(1));
    assert_eq!(repo.entries().iter().filter(|e| e.is_latest).count(), 1);
    assert_eq!(repo.latest().unwrap().version, "1.1");
}

#[test]
fn remove_drops_exactly_that_entry() {
    let store = seeded(&[
        entry("1.1", "Feb 1", true),
        entry("1.0", "Jan 1", false),
        entry("0.9", "Dec 1", false),
    ]);
    let mut repo = loaded(&store);

    let removed = repo.remove(1).unwrap();
    assert_eq!(removed.identity(), ("1.0", "Jan 1"));
    assert_eq!(repo.len(), 2);
    assert!(repo.entries().iter().all(|e| e.identity() != ("1.0", "Jan 1")));
}

#[test]
fn remove_out_of_range_is_rejected_without_change() {
    let store = seeded(&[entry("1.0", "Jan 1", true)]);
    let mut repo = loaded(&store);

    assert!(matches!(repo.remove(3), Err(CmsError::Validation(_))));
    assert_eq!(repo.len(), 1);
}

#[test]
fn successful_commit_hands_new_sha_to_next_commit() {
    let store = seeded(&[entry("1.0", "Jan 1", true)]);
    let mut repo = loaded(&store);
    let original = repo.sha().unwrap().to_string();

    repo.upsert(entry("1.1", "Feb 1", true), None);
    let first = repo
        .commit(&commit_message(CommitKind::Release, "1.1"))
        .unwrap();
    assert_ne!(first, original);
    assert_eq!(repo.sha(), Some(first.as_str()));

    repo.remove(1).unwrap();
    let second = repo
        .commit(&commit_message(CommitKind::Delete, "1.0"))
        .unwrap();
    assert_ne!(second, first);

    let messages: Vec<String> = store.commits().into_iter().map(|c| c.message).collect();
    assert_eq!(messages, vec!["[CMS] Release 1.1", "[CMS] Delete 1.0"]);

    let stored = codec::decode_changelog(&store.get(&loc()).unwrap().text).unwrap();
    assert_eq!(stored, repo.entries());
}

#[test]
fn committed_collection_has_single_latest() {
    let store = seeded(&[entry("1.1", "Feb 1", true), entry("1.0", "Jan 1", true)]);
    let mut repo = loaded(&store);

    repo.upsert(entry("1.2", "Mar 1", true), None);
    repo.commit("[CMS] Release 1.2").unwrap();

    let stored = codec::decode_changelog(&store.get(&loc()).unwrap().text).unwrap();
    assert_eq!(stored.iter().filter(|e| e.is_latest).count(), 1);
    assert!(stored[0].is_latest);
}

#[test]
fn stale_sha_commit_is_a_conflict_and_keeps_memory() {
    let store = seeded(&[entry("1.0", "Jan 1", true)]);
    let mut repo = loaded(&store);

    // Someone else edits the file after our load.
    store.insert(&loc(), &codec::encode_changelog(&[entry("9.9", "Dec 9", true)]).unwrap());

    repo.upsert(entry("1.1", "Feb 1", true), None);
    let before = repo.entries().to_vec();
    let sha_before = repo.sha().map(str::to_string);

    let err = repo.commit("[CMS] Release 1.1").unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(repo.entries(), before.as_slice());
    assert_eq!(repo.sha().map(str::to_string), sha_before);
    assert!(store.commits().is_empty());

    // Reload-and-reapply path.
    repo.load().unwrap();
    assert_eq!(repo.entries()[0].version, "9.9");
    repo.upsert(entry("1.1", "Feb 1", true), None);
    repo.commit("[CMS] Release 1.1").unwrap();
    assert_eq!(store.commits().len(), 1);
}

#[test]
fn commit_messages_follow_cms_convention() {
    assert_eq!(commit_message(CommitKind::Release, "2.0"), "[CMS] Release 2.0");
    assert_eq!(commit_message(CommitKind::Update, "2.0"), "[CMS] Update 2.0");
    assert_eq!(commit_message(CommitKind::Delete, "1.0"), "[CMS] Delete 1.0");
}
