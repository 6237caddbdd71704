//! Notebook/note document store.
//!
//! # Responsibility
//! - Own the in-memory snapshot of every notebook and note.
//! - Mirror the full snapshot to durable storage after every mutation.
//! - Expose CRUD keyed by generated ids.
//!
//! # Invariants
//! - Every operation calls [`DocumentStore::reload`] before touching the
//!   snapshot, so writes from another store on the same substrate are seen.
//! - A successful write has been persisted before the call returns.
//! - A failed lookup never writes.
//! - Ids, parent references and `posted_at` are never rewritten.

use crate::model::id::{Clock, IdGenerator, SystemClock};
use crate::model::notebook::{
    normalize_name, NewNote, Note, NotePatch, Notebook, NotebookId, NoteId, Snapshot,
};
use crate::repo::kv_repo::{KvRepository, RepoError};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the serialized snapshot.
pub const SNAPSHOT_KEY: &str = "noteKeeperDB";

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for document store operations.
#[derive(Debug)]
pub enum StoreError {
    /// No notebook carries the requested id.
    NotebookNotFound(NotebookId),
    /// No note carries the requested id (in the given notebook, when scoped).
    NoteNotFound(NoteId),
    /// No id greater than every stored id remains.
    IdSpaceExhausted,
    /// Durable storage failure.
    Repo(RepoError),
    /// Snapshot could not be serialized.
    Encode(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotebookNotFound(id) => write!(f, "notebook not found: {id}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::IdSpaceExhausted => write!(f, "no unused id remains"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode snapshot: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Single source of truth for notebooks and notes.
pub struct DocumentStore<R: KvRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
    ids: IdGenerator,
    snapshot: Snapshot,
}

impl<R: KvRepository> DocumentStore<R> {
    /// Opens the store on `repo` using the wall clock.
    pub fn open(repo: R) -> StoreResult<Self> {
        Self::with_clock(repo, SystemClock)
    }
}

impl<R: KvRepository, C: Clock> DocumentStore<R, C> {
    /// Opens the store on `repo` with a caller-provided clock.
    ///
    /// Loads the persisted snapshot. A missing or malformed snapshot is
    /// replaced by an empty one, which is persisted immediately.
    pub fn with_clock(repo: R, clock: C) -> StoreResult<Self> {
        let mut store = Self {
            repo,
            clock,
            ids: IdGenerator::new(),
            snapshot: Snapshot::default(),
        };
        store.reload()?;
        info!(
            "event=store_open module=store status=ok notebooks={} notes={}",
            store.snapshot.notebooks.len(),
            store.snapshot.note_count()
        );
        Ok(store)
    }

    /// Replaces the in-memory snapshot with the persisted one.
    ///
    /// The id generator is re-seeded above every id found, so ids written by
    /// another store on the same substrate are never handed out again.
    pub fn reload(&mut self) -> StoreResult<()> {
        let raw = self.repo.get_item(SNAPSHOT_KEY)?;
        self.snapshot = match raw.as_deref().map(Snapshot::from_json) {
            Some(Ok(snapshot)) => snapshot,
            Some(Err(err)) => {
                warn!("event=store_reload module=store status=reset reason=malformed error={err}");
                self.reset()?
            }
            None => {
                debug!("event=store_reload module=store status=reset reason=missing");
                self.reset()?
            }
        };
        self.ids.observe(self.snapshot.ids());
        Ok(())
    }

    /// Borrows the current in-memory snapshot without reloading.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Looks a notebook up in the current in-memory snapshot.
    pub fn find_notebook(&self, notebook_id: &str) -> Option<&Notebook> {
        self.snapshot.notebook(notebook_id)
    }

    /// Looks a note up across all notebooks in the current in-memory snapshot.
    pub fn find_note(&self, note_id: &str) -> Option<&Note> {
        self.snapshot.note(note_id)
    }

    /// Returns every notebook in creation order.
    pub fn fetch_notebooks(&mut self) -> StoreResult<&[Notebook]> {
        self.reload()?;
        Ok(self.snapshot.notebooks.as_slice())
    }

    /// Returns the notes of one notebook, newest first.
    pub fn fetch_notes(&mut self, notebook_id: &str) -> StoreResult<&[Note]> {
        self.reload()?;
        self.snapshot
            .notebook(notebook_id)
            .map(|notebook| notebook.notes.as_slice())
            .ok_or_else(|| StoreError::NotebookNotFound(notebook_id.to_string()))
    }

    /// Appends a new, empty notebook.
    pub fn add_notebook(&mut self, name: &str) -> StoreResult<Notebook> {
        self.reload()?;
        let id = self.next_id(self.clock.now_ms())?;
        let notebook = Notebook::new(id, name);
        self.snapshot.notebooks.push(notebook.clone());
        self.persist()?;
        info!("event=notebook_add module=store status=ok notebook_id={}", notebook.id);
        Ok(notebook)
    }

    /// Inserts a note at the front of its notebook.
    ///
    /// # Errors
    /// - `NotebookNotFound` when `notebook_id` is unknown; nothing is written.
    pub fn add_note(&mut self, notebook_id: &str, new_note: NewNote) -> StoreResult<Note> {
        self.reload()?;
        let now_ms = self.clock.now_ms();
        let id = self.next_id(now_ms)?;
        let notebook = self
            .snapshot
            .notebook_mut(notebook_id)
            .ok_or_else(|| StoreError::NotebookNotFound(notebook_id.to_string()))?;

        let note = Note {
            id,
            parent_notebook_id: notebook.id.clone(),
            title: new_note.title,
            body: new_note.body,
            posted_at: now_ms,
        };
        notebook.notes.insert(0, note.clone());
        self.persist()?;
        info!(
            "event=note_add module=store status=ok notebook_id={notebook_id} note_id={}",
            note.id
        );
        Ok(note)
    }

    /// Renames a notebook. A blank name becomes the placeholder.
    pub fn update_notebook_name(&mut self, notebook_id: &str, name: &str) -> StoreResult<Notebook> {
        self.reload()?;
        let notebook = self
            .snapshot
            .notebook_mut(notebook_id)
            .ok_or_else(|| StoreError::NotebookNotFound(notebook_id.to_string()))?;
        notebook.name = normalize_name(name);
        let updated = notebook.clone();
        self.persist()?;
        info!("event=notebook_rename module=store status=ok notebook_id={notebook_id}");
        Ok(updated)
    }

    /// Shallow-merges `patch` into the note with `note_id`, wherever it lives.
    pub fn update_note(&mut self, note_id: &str, patch: NotePatch) -> StoreResult<Note> {
        self.reload()?;
        let merged = self
            .snapshot
            .merge_note(note_id, patch)
            .cloned()
            .ok_or_else(|| StoreError::NoteNotFound(note_id.to_string()))?;
        self.persist()?;
        info!("event=note_update module=store status=ok note_id={note_id}");
        Ok(merged)
    }

    /// Removes a notebook together with all of its notes.
    pub fn delete_notebook(&mut self, notebook_id: &str) -> StoreResult<()> {
        self.reload()?;
        let index = self
            .snapshot
            .notebook_index(notebook_id)
            .ok_or_else(|| StoreError::NotebookNotFound(notebook_id.to_string()))?;
        let removed = self.snapshot.notebooks.remove(index);
        self.persist()?;
        info!(
            "event=notebook_delete module=store status=ok notebook_id={notebook_id} cascaded_notes={}",
            removed.notes.len()
        );
        Ok(())
    }

    /// Removes one note and returns the notes left in its notebook.
    ///
    /// Callers use an empty result to switch the notebook view to its empty
    /// state.
    pub fn delete_note(&mut self, notebook_id: &str, note_id: &str) -> StoreResult<&[Note]> {
        self.reload()?;
        let notebook = self
            .snapshot
            .notebook_mut(notebook_id)
            .ok_or_else(|| StoreError::NotebookNotFound(notebook_id.to_string()))?;
        let index = notebook
            .notes
            .iter()
            .position(|note| note.id == note_id)
            .ok_or_else(|| StoreError::NoteNotFound(note_id.to_string()))?;
        notebook.notes.remove(index);
        self.persist()?;
        info!("event=note_delete module=store status=ok notebook_id={notebook_id} note_id={note_id}");

        self.snapshot
            .notebook(notebook_id)
            .map(|notebook| notebook.notes.as_slice())
            .ok_or_else(|| StoreError::NotebookNotFound(notebook_id.to_string()))
    }

    fn next_id(&mut self, now_ms: i64) -> StoreResult<String> {
        self.ids.next_id(now_ms).ok_or_else(|| {
            warn!("event=id_generate module=store status=error error_code=id_space_exhausted");
            StoreError::IdSpaceExhausted
        })
    }

    fn reset(&mut self) -> StoreResult<Snapshot> {
        let empty = Snapshot::default();
        self.repo.set_item(SNAPSHOT_KEY, &empty.to_json()?)?;
        Ok(empty)
    }

    fn persist(&self) -> StoreResult<()> {
        let encoded = self.snapshot.to_json()?;
        self.repo.set_item(SNAPSHOT_KEY, &encoded)?;
        debug!("event=store_persist module=store status=ok bytes={}", encoded.len());
        Ok(())
    }
}
