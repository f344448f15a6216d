//! Note aggregate and its identifying value types.
//!
//! # Responsibility
//! - Model one note as id + title + folder path + optional markdown payload.
//! - Keep payload mutation and the emitted event in lockstep.
//!
//! # Invariants
//! - `id`, `title` and `folder_path` never change after construction.
//! - `set_payload` always returns an event carrying exactly the stored payload.

use crate::event::{NoteCreated, NotePayloadChanged};
use std::fmt::{Display, Formatter};

/// Separator used inside note ids and folder path strings.
pub const PATH_DELIMITER: char = '/';

/// Stable identifier of a note.
///
/// For the filesystem backend this is the note file path relative to the
/// notebook root, joined with `/` (for example `folder/sub/Title.md`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Ordered folder-name segments locating a note. Empty means root.
///
/// Segments are not validated: consecutive delimiters yield empty segments
/// and `.`/`..` are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FolderPath {
    elements: Vec<String>,
}

impl FolderPath {
    pub fn new<I, S>(elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            elements: elements.into_iter().map(Into::into).collect(),
        }
    }

    /// Root folder path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a `/`-delimited path string.
    ///
    /// `None` and blank strings map to the root path.
    pub fn from_string(value: Option<&str>) -> Self {
        Self::from_delimited(value, PATH_DELIMITER)
    }

    /// Parses a path string split on an arbitrary delimiter.
    pub fn from_delimited(value: Option<&str>, delimiter: char) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::root(),
            Some(trimmed) => Self::new(trimmed.split(delimiter)),
        }
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    pub fn is_root(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Display for FolderPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.elements.join("/"))
    }
}

/// Aggregate root for one notebook note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    id: NoteId,
    title: String,
    folder_path: FolderPath,
    payload: Option<String>,
}

impl Note {
    /// Creates a metadata-only note (payload not loaded).
    pub fn new(id: NoteId, title: impl Into<String>, folder_path: FolderPath) -> Self {
        Self {
            id,
            title: title.into(),
            folder_path,
            payload: None,
        }
    }

    /// Returns this note with the given payload attached.
    ///
    /// Used by loaders that read the payload alongside metadata; no event is
    /// produced because nothing changed from the notebook's point of view.
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn id(&self) -> &NoteId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn folder_path(&self) -> &FolderPath {
        &self.folder_path
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    /// Emits the event announcing this note became known.
    pub fn create(&self) -> NoteCreated {
        NoteCreated { note: self.clone() }
    }

    /// Replaces the payload and returns the matching change event.
    pub fn set_payload(&mut self, payload: impl Into<String>) -> NotePayloadChanged {
        let payload = payload.into();
        self.payload = Some(payload.clone());
        NotePayloadChanged {
            note_id: self.id.clone(),
            new_payload: payload,
        }
    }
}
