//! Notebook, note and snapshot records.
//!
//! # Invariants
//! - `Snapshot::notebooks` keeps creation order.
//! - `Notebook::notes` keeps newest-first order.
//! - Serialized field names match the persisted document exactly
//!   (`parentNotebookID`, `postedAt`).

use crate::model::elapsed::format_elapsed;
use serde::{Deserialize, Serialize};

/// Opaque notebook identifier.
pub type NotebookId = String;
/// Opaque note identifier, unique across all notebooks.
pub type NoteId = String;

/// Placeholder used when a notebook name is empty.
pub const UNTITLED_NAME: &str = "Untitled";

/// Named container owning an ordered collection of notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
    pub id: NotebookId,
    pub name: String,
    /// Newest note first.
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Notebook {
    pub(crate) fn new(id: NotebookId, name: &str) -> Self {
        Self {
            id,
            name: normalize_name(name),
            notes: Vec::new(),
        }
    }

    /// Returns the note with `note_id` inside this notebook.
    pub fn note(&self, note_id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == note_id)
    }

    /// True when the notebook holds no notes.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Titled, bodied, timestamped leaf record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    #[serde(rename = "parentNotebookID")]
    pub parent_notebook_id: NotebookId,
    /// Absent in documents written without the field; reads as empty.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Unix epoch milliseconds; never rewritten after creation.
    #[serde(rename = "postedAt")]
    pub posted_at: i64,
}

impl Note {
    /// Human-readable age of the note relative to `now_ms`.
    pub fn elapsed_since_posted(&self, now_ms: i64) -> String {
        format_elapsed(self.posted_at, now_ms)
    }

    fn apply(&mut self, patch: NotePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(body) = patch.body {
            self.body = body;
        }
    }
}

/// Caller-supplied content for a new note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub body: String,
}

impl NewNote {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Shallow merge applied by note updates. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl NotePatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Complete persisted state: every notebook and, through them, every note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub notebooks: Vec<Notebook>,
}

impl Snapshot {
    /// Parses a stored snapshot document.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Serializes the full snapshot for storage.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn notebook(&self, notebook_id: &str) -> Option<&Notebook> {
        self.notebooks
            .iter()
            .find(|notebook| notebook.id == notebook_id)
    }

    pub(crate) fn notebook_mut(&mut self, notebook_id: &str) -> Option<&mut Notebook> {
        self.notebooks
            .iter_mut()
            .find(|notebook| notebook.id == notebook_id)
    }

    pub(crate) fn notebook_index(&self, notebook_id: &str) -> Option<usize> {
        self.notebooks
            .iter()
            .position(|notebook| notebook.id == notebook_id)
    }

    /// Finds a note by id across all notebooks (first match wins).
    pub fn note(&self, note_id: &str) -> Option<&Note> {
        self.notebooks
            .iter()
            .find_map(|notebook| notebook.note(note_id))
    }

    pub(crate) fn merge_note(&mut self, note_id: &str, patch: NotePatch) -> Option<&Note> {
        let note = self
            .notebooks
            .iter_mut()
            .flat_map(|notebook| notebook.notes.iter_mut())
            .find(|note| note.id == note_id)?;
        note.apply(patch);
        Some(&*note)
    }

    /// Iterates every id held by the snapshot, notebooks and notes alike.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.notebooks.iter().flat_map(|notebook| {
            std::iter::once(notebook.id.as_str())
                .chain(notebook.notes.iter().map(|note| note.id.as_str()))
        })
    }

    pub fn note_count(&self) -> usize {
        self.notebooks.iter().map(|notebook| notebook.notes.len()).sum()
    }
}

/// Trims a notebook name, falling back to [`UNTITLED_NAME`] when blank.
pub fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        UNTITLED_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}
