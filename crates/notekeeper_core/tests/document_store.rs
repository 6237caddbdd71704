use notekeeper_core::db::{open_db, open_db_in_memory};
use notekeeper_core::{
    Clock, DocumentStore, KvRepository, NewNote, NotePatch, Snapshot, SqliteKvRepository,
    StoreError, SNAPSHOT_KEY, UNTITLED_NAME,
};
use std::cell::Cell;
use std::collections::HashSet;

/// Clock that advances by `step` milliseconds after every reading.
struct StepClock {
    now: Cell<i64>,
    step: i64,
}

impl StepClock {
    fn new(start: i64, step: i64) -> Self {
        Self {
            now: Cell::new(start),
            step,
        }
    }
}

impl Clock for StepClock {
    fn now_ms(&self) -> i64 {
        let now = self.now.get();
        self.now.set(now + self.step);
        now
    }
}

fn titles(notes: &[notekeeper_core::Note]) -> Vec<&str> {
    notes.iter().map(|note| note.title.as_str()).collect()
}

#[test]
fn work_notebook_scenario() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    let mut store = DocumentStore::open(repo).unwrap();

    let work = store.add_notebook("Work").unwrap();
    assert_eq!(store.fetch_notebooks().unwrap().len(), 1);
    assert!(store.fetch_notes(&work.id).unwrap().is_empty());

    let a = store.add_note(&work.id, NewNote::new("A", "x")).unwrap();
    let notes = store.fetch_notes(&work.id).unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "A");
    assert_eq!(notes[0].body, "x");
    assert_eq!(notes[0].parent_notebook_id, work.id);

    store.add_note(&work.id, NewNote::new("B", "")).unwrap();
    assert_eq!(titles(store.fetch_notes(&work.id).unwrap()), vec!["B", "A"]);

    let remaining = store.delete_note(&work.id, &a.id).unwrap();
    assert_eq!(titles(remaining), vec!["B"]);
    assert!(!store.find_notebook(&work.id).unwrap().is_empty());
    assert_eq!(titles(store.fetch_notes(&work.id).unwrap()), vec!["B"]);

    store.delete_notebook(&work.id).unwrap();
    assert!(store.fetch_notebooks().unwrap().is_empty());
}

#[test]
fn notebooks_append_and_notes_prepend() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    let mut store = DocumentStore::with_clock(repo, StepClock::new(1_000, 1)).unwrap();

    let first = store.add_notebook("One").unwrap();
    store.add_notebook("Two").unwrap();
    store.add_notebook("Three").unwrap();
    let names: Vec<_> = store
        .fetch_notebooks()
        .unwrap()
        .iter()
        .map(|notebook| notebook.name.clone())
        .collect();
    assert_eq!(names, vec!["One", "Two", "Three"]);

    for title in ["n1", "n2", "n3", "n4"] {
        store.add_note(&first.id, NewNote::new(title, "")).unwrap();
    }
    assert_eq!(
        titles(store.fetch_notes(&first.id).unwrap()),
        vec!["n4", "n3", "n2", "n1"]
    );
}

#[test]
fn ids_stay_unique_under_same_millisecond_creation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    let mut store = DocumentStore::with_clock(repo, StepClock::new(5_000, 0)).unwrap();

    let mut seen = HashSet::new();
    for idx in 0..3 {
        let notebook = store.add_notebook(&format!("nb{idx}")).unwrap();
        assert!(seen.insert(notebook.id.clone()));
        for _ in 0..5 {
            let note = store.add_note(&notebook.id, NewNote::default()).unwrap();
            assert_eq!(note.posted_at, 5_000);
            assert!(seen.insert(note.id));
        }
    }
    assert_eq!(seen.len(), 18);
}

#[test]
fn later_ids_compare_larger() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    let mut store = DocumentStore::with_clock(repo, StepClock::new(1_700_000_000_000, 0)).unwrap();

    let a = store.add_notebook("a").unwrap();
    let b = store.add_notebook("b").unwrap();
    assert!(b.id.parse::<i64>().unwrap() > a.id.parse::<i64>().unwrap());
}

#[test]
fn delete_notebook_cascades_to_notes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    let mut store = DocumentStore::open(repo).unwrap();

    let doomed = store.add_notebook("Doomed").unwrap();
    let kept = store.add_notebook("Kept").unwrap();
    let doomed_note = store.add_note(&doomed.id, NewNote::new("gone", "")).unwrap();
    store.add_note(&kept.id, NewNote::new("stays", "")).unwrap();

    store.delete_notebook(&doomed.id).unwrap();

    let err = store.fetch_notes(&doomed.id).unwrap_err();
    assert!(matches!(err, StoreError::NotebookNotFound(ref id) if *id == doomed.id));
    assert!(store.find_note(&doomed_note.id).is_none());
    assert_eq!(store.snapshot().note_count(), 1);
    assert_eq!(titles(store.fetch_notes(&kept.id).unwrap()), vec!["stays"]);
}

#[test]
fn updates_never_change_identity() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    let mut store = DocumentStore::open(repo).unwrap();

    let notebook = store.add_notebook("Draft").unwrap();
    let note = store.add_note(&notebook.id, NewNote::new("old", "body")).unwrap();

    let renamed = store.update_notebook_name(&notebook.id, "Final").unwrap();
    assert_eq!(renamed.id, notebook.id);
    assert_eq!(renamed.name, "Final");

    let merged = store
        .update_note(&note.id, NotePatch::default().title("new"))
        .unwrap();
    assert_eq!(merged.id, note.id);
    assert_eq!(merged.parent_notebook_id, notebook.id);
    assert_eq!(merged.posted_at, note.posted_at);
    assert_eq!(merged.title, "new");
    assert_eq!(merged.body, "body");

    let stored = &store.fetch_notes(&notebook.id).unwrap()[0];
    assert_eq!(stored, &merged);
}

#[test]
fn blank_names_become_placeholder() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    let mut store = DocumentStore::open(repo).unwrap();

    let notebook = store.add_notebook("   ").unwrap();
    assert_eq!(notebook.name, UNTITLED_NAME);

    store.update_notebook_name(&notebook.id, "Named").unwrap();
    let cleared = store.update_notebook_name(&notebook.id, "").unwrap();
    assert_eq!(cleared.name, UNTITLED_NAME);
}

#[test]
fn lookup_misses_are_explicit_errors() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    let mut store = DocumentStore::open(repo).unwrap();
    let notebook = store.add_notebook("Only").unwrap();

    assert!(matches!(
        store.update_notebook_name("missing", "x"),
        Err(StoreError::NotebookNotFound(_))
    ));
    assert!(matches!(
        store.update_note("missing", NotePatch::default()),
        Err(StoreError::NoteNotFound(_))
    ));
    assert!(matches!(
        store.delete_notebook("missing"),
        Err(StoreError::NotebookNotFound(_))
    ));
    assert!(matches!(
        store.delete_note(&notebook.id, "missing"),
        Err(StoreError::NoteNotFound(_))
    ));
    assert!(matches!(
        store.delete_note("missing", "missing"),
        Err(StoreError::NotebookNotFound(_))
    ));
    assert!(store.find_notebook("missing").is_none());
    assert_eq!(store.fetch_notebooks().unwrap().len(), 1);
}

#[test]
fn persisted_snapshot_round_trips() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    let mut store = DocumentStore::open(&repo).unwrap();

    let work = store.add_notebook("Work").unwrap();
    let home = store.add_notebook("Home").unwrap();
    store.add_note(&work.id, NewNote::new("A", "x")).unwrap();
    store.add_note(&work.id, NewNote::new("B", "y\nz")).unwrap();
    store.add_note(&home.id, NewNote::new("C", "")).unwrap();

    let raw = repo.get_item(SNAPSHOT_KEY).unwrap().unwrap();
    let decoded = Snapshot::from_json(&raw).unwrap();
    assert_eq!(&decoded, store.snapshot());

    let reopened = DocumentStore::open(&repo).unwrap();
    assert_eq!(reopened.snapshot(), store.snapshot());
}

#[test]
fn persisted_document_uses_expected_layout() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    let mut store = DocumentStore::with_clock(&repo, StepClock::new(100, 0)).unwrap();

    let notebook = store.add_notebook("Work").unwrap();
    store.add_note(&notebook.id, NewNote::new("A", "x")).unwrap();

    let raw = repo.get_item(SNAPSHOT_KEY).unwrap().unwrap();
    assert_eq!(
        raw,
        r#"{"notebooks":[{"id":"100","name":"Work","notes":[{"id":"101","parentNotebookID":"100","title":"A","body":"x","postedAt":100}]}]}"#
    );
}

#[test]
fn malformed_snapshot_is_replaced_with_empty_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    repo.set_item(SNAPSHOT_KEY, "{not json").unwrap();

    let store = DocumentStore::open(&repo).unwrap();
    assert!(store.snapshot().notebooks.is_empty());
    assert_eq!(
        repo.get_item(SNAPSHOT_KEY).unwrap().as_deref(),
        Some(r#"{"notebooks":[]}"#)
    );
}

#[test]
fn note_without_body_loads_and_keeps_other_notebooks() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    repo.set_item(
        SNAPSHOT_KEY,
        r#"{"notebooks":[{"id":"1","name":"Work","notes":[{"id":"2","parentNotebookID":"1","title":"B","postedAt":5}]},{"id":"3","name":"Home","notes":[]}]}"#,
    )
    .unwrap();

    let mut store = DocumentStore::open(&repo).unwrap();
    assert_eq!(store.fetch_notebooks().unwrap().len(), 2);
    let notes = store.fetch_notes("1").unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "B");
    assert_eq!(notes[0].body, "");
    assert!(store.find_notebook("3").unwrap().is_empty());

    let remaining = store.delete_note("1", "2").unwrap();
    assert!(remaining.is_empty());
    assert!(store.find_notebook("1").unwrap().is_empty());
}

#[test]
fn existing_snapshot_is_loaded_not_overwritten() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    let seeded = r#"{"notebooks":[{"id":"7","name":"Seed","notes":[]}]}"#;
    repo.set_item(SNAPSHOT_KEY, seeded).unwrap();

    let mut store = DocumentStore::with_clock(&repo, StepClock::new(1, 0)).unwrap();
    assert_eq!(store.find_notebook("7").unwrap().name, "Seed");
    assert_eq!(repo.get_item(SNAPSHOT_KEY).unwrap().as_deref(), Some(seeded));

    // Seeded ids push the generator past a clock that lags behind them.
    let next = store.add_notebook("Next").unwrap();
    assert_eq!(next.id, "8");
}

#[test]
fn writes_from_another_store_are_seen_after_reload() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    let mut tab_a = DocumentStore::with_clock(&repo, StepClock::new(1_000, 0)).unwrap();
    let mut tab_b = DocumentStore::with_clock(&repo, StepClock::new(1_000, 0)).unwrap();

    let from_a = tab_a.add_notebook("from A").unwrap();
    assert!(tab_b.find_notebook(&from_a.id).is_none());

    // Renaming reloads first, so tab B sees tab A's notebook.
    let renamed = tab_b.update_notebook_name(&from_a.id, "renamed by B").unwrap();
    assert_eq!(renamed.id, from_a.id);

    // Same clock reading, yet B's next id skips past A's.
    let from_b = tab_b.add_notebook("from B").unwrap();
    assert_ne!(from_b.id, from_a.id);

    let names: Vec<_> = tab_a
        .fetch_notebooks()
        .unwrap()
        .iter()
        .map(|notebook| notebook.name.clone())
        .collect();
    assert_eq!(names, vec!["renamed by B", "from B"]);
}

#[test]
fn explicit_reload_picks_up_external_changes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    let mut store = DocumentStore::open(&repo).unwrap();
    store.add_notebook("Local").unwrap();

    repo.set_item(
        SNAPSHOT_KEY,
        r#"{"notebooks":[{"id":"1","name":"External","notes":[]}]}"#,
    )
    .unwrap();
    assert_eq!(store.snapshot().notebooks[0].name, "Local");

    store.reload().unwrap();
    assert_eq!(store.snapshot().notebooks.len(), 1);
    assert_eq!(store.snapshot().notebooks[0].name, "External");
}

#[test]
fn removed_snapshot_entry_resets_on_next_operation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    let mut store = DocumentStore::open(&repo).unwrap();
    store.add_notebook("Soon gone").unwrap();

    assert!(repo.remove_item(SNAPSHOT_KEY).unwrap());

    assert!(store.fetch_notebooks().unwrap().is_empty());
    assert!(repo.get_item(SNAPSHOT_KEY).unwrap().is_some());
}

#[test]
fn data_survives_reopening_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notekeeper.sqlite3");

    let (notebook_id, note_id) = {
        let conn = open_db(&path).unwrap();
        let repo = SqliteKvRepository::try_new(&conn).unwrap();
        let mut store = DocumentStore::open(repo).unwrap();
        let notebook = store.add_notebook("Persistent").unwrap();
        let note = store
            .add_note(&notebook.id, NewNote::new("kept", "across restarts"))
            .unwrap();
        (notebook.id, note.id)
    };

    let conn = open_db(&path).unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    let mut store = DocumentStore::open(repo).unwrap();
    let notes = store.fetch_notes(&notebook_id).unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, note_id);
    assert_eq!(notes[0].body, "across restarts");
}
