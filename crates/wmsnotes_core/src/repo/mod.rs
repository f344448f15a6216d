//! Repository layer: one contract over every note backend.
//!
//! # Responsibility
//! - Define the backend-agnostic `NoteRepository` contract.
//! - Provide the in-memory, storage-backed and delayed-persistence
//!   implementations.
//!
//! # Invariants
//! - `get_note` fails with `RepoError::NoteDoesNotExist` for unknown ids.
//! - `get_all_notes` re-reads its source on every call; no cursor is cached.
//! - Repository errors are never swallowed.

use crate::model::note::{Note, NoteId};
use crate::storage::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod delayed_persist;
pub mod mem;
pub mod storage_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Lazy, finite sequence of notes produced by `get_all_notes`.
pub type NoteIter<'a> = Box<dyn Iterator<Item = RepoResult<Note>> + 'a>;

/// Repository error for note access and persistence.
#[derive(Debug)]
pub enum RepoError {
    NoteDoesNotExist(NoteId),
    Storage(StorageError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteDoesNotExist(note_id) => write!(f, "note does not exist: {note_id}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::NoteDoesNotExist(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::NoteDoesNotExist(note_id) => Self::NoteDoesNotExist(note_id),
            other => Self::Storage(other),
        }
    }
}

/// Uniform CRUD-style access to a note collection.
pub trait NoteRepository {
    /// Inserts the note or replaces the stored version with the same id.
    fn add_or_update_note(&mut self, note: &Note) -> RepoResult<()>;
    /// Enumerates every note, restarting from scratch on each call.
    fn get_all_notes(&self) -> NoteIter<'_>;
    fn get_note(&self, note_id: &NoteId) -> RepoResult<Note>;
    fn has_note(&self, note_id: &NoteId) -> bool;
}

/// Repositories that buffer writes until an explicit flush.
pub trait PersistingNoteRepository: NoteRepository {
    /// Flushes buffered writes and returns how many notes were written.
    fn persist(&mut self) -> RepoResult<usize>;
    fn has_unsaved_changes(&self) -> bool;
}
