//! Repository adapter over a `NotebookStorage` backend.
//!
//! # Invariants
//! - `get_note` returns metadata plus the decoded `main` payload.
//! - `get_all_notes` returns metadata only.
//! - Writing a note without a loaded payload changes nothing on disk, since
//!   metadata is derived from the storage location.

use super::{NoteIter, NoteRepository, RepoError, RepoResult};
use crate::model::note::{Note, NoteId};
use crate::storage::{NotebookStorage, StorageError, MAIN_PAYLOAD};
use log::debug;
use std::io::Read;

#[derive(Debug, Clone)]
pub struct StorageNoteRepository<S: NotebookStorage> {
    storage: S,
}

impl<S: NotebookStorage> StorageNoteRepository<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn read_main_payload(&self, note_id: &NoteId) -> RepoResult<String> {
        let mut reader = self.storage.get_note_payload(note_id, MAIN_PAYLOAD)?;
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(StorageError::from)?;
        String::from_utf8(bytes).map_err(|err| {
            RepoError::InvalidData(format!("payload of {note_id} is not UTF-8: {err}"))
        })
    }
}

impl<S: NotebookStorage> NoteRepository for StorageNoteRepository<S> {
    fn add_or_update_note(&mut self, note: &Note) -> RepoResult<()> {
        let Some(payload) = note.payload() else {
            debug!(
                "event=repo_write module=repo status=skipped reason=no_payload note_id={}",
                note.id()
            );
            return Ok(());
        };
        self.storage
            .set_note_payload(note.id(), MAIN_PAYLOAD, payload.as_bytes())?;
        Ok(())
    }

    fn get_all_notes(&self) -> NoteIter<'_> {
        Box::new(
            self.storage
                .get_all_notes()
                .map(|note| note.map_err(RepoError::from)),
        )
    }

    fn get_note(&self, note_id: &NoteId) -> RepoResult<Note> {
        let note = self.storage.get_note(note_id)?;
        let payload = self.read_main_payload(note_id)?;
        Ok(note.with_payload(payload))
    }

    fn has_note(&self, note_id: &NoteId) -> bool {
        self.storage.has_note(note_id)
    }
}
