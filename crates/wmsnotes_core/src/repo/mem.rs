//! In-memory note repository, used as the fast tier of delayed persistence.
//!
//! Enumeration order is unspecified.

use super::{NoteIter, NoteRepository, RepoError, RepoResult};
use crate::model::note::{Note, NoteId};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct InMemoryNoteRepository {
    notes: HashMap<NoteId, Note>,
}

impl InMemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl NoteRepository for InMemoryNoteRepository {
    fn add_or_update_note(&mut self, note: &Note) -> RepoResult<()> {
        self.notes.insert(note.id().clone(), note.clone());
        Ok(())
    }

    fn get_all_notes(&self) -> NoteIter<'_> {
        Box::new(self.notes.values().cloned().map(Ok))
    }

    fn get_note(&self, note_id: &NoteId) -> RepoResult<Note> {
        self.notes
            .get(note_id)
            .cloned()
            .ok_or_else(|| RepoError::NoteDoesNotExist(note_id.clone()))
    }

    fn has_note(&self, note_id: &NoteId) -> bool {
        self.notes.contains_key(note_id)
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryNoteRepository;
    use crate::model::note::{FolderPath, Note, NoteId};
    use crate::repo::{NoteRepository, RepoError};

    #[test]
    fn upsert_replaces_existing_note() {
        let mut repo = InMemoryNoteRepository::new();
        let note = Note::new(NoteId::from("a.md"), "a", FolderPath::root()).with_payload("one");
        repo.add_or_update_note(&note).unwrap();
        repo.add_or_update_note(&note.clone().with_payload("two"))
            .unwrap();

        assert_eq!(repo.len(), 1);
        let loaded = repo.get_note(&NoteId::from("a.md")).unwrap();
        assert_eq!(loaded.payload(), Some("two"));
    }

    #[test]
    fn missing_note_is_reported() {
        let repo = InMemoryNoteRepository::new();
        let missing = NoteId::from("missing");
        assert!(!repo.has_note(&missing));
        let err = repo.get_note(&missing).unwrap_err();
        assert!(matches!(err, RepoError::NoteDoesNotExist(id) if id == missing));
        assert_eq!(repo.get_all_notes().count(), 0);
    }
}
