use std::fs;
use wmsnotes_core::{
    DelayedPersistNoteRepository, FolderPath, InMemoryNoteRepository, Note, NoteId,
    NoteRepository, PersistingNoteRepository, RepoError, SimpleFileSystemStorage,
    StorageNoteRepository,
};

fn note(id: &str, payload: &str) -> Note {
    let title = id.trim_end_matches(".md");
    Note::new(NoteId::from(id), title, FolderPath::root()).with_payload(payload)
}

fn durable_with(notes: &[Note]) -> InMemoryNoteRepository {
    let mut repo = InMemoryNoteRepository::new();
    for note in notes {
        repo.add_or_update_note(note).unwrap();
    }
    repo
}

#[test]
fn writes_stay_in_fast_tier_until_persist() {
    let mut repo =
        DelayedPersistNoteRepository::new(InMemoryNoteRepository::new(), durable_with(&[]))
            .unwrap();

    repo.add_or_update_note(&note("a.md", "one")).unwrap();

    assert!(repo.fast_tier().has_note(&NoteId::from("a.md")));
    assert!(!repo.durable_tier().has_note(&NoteId::from("a.md")));
    assert!(repo.has_unsaved_changes());
    assert_eq!(
        repo.get_note(&NoteId::from("a.md")).unwrap().payload(),
        Some("one")
    );
}

#[test]
fn fast_tier_shadows_durable_copy_in_enumeration() {
    let durable = durable_with(&[note("a.md", "stale"), note("b.md", "durable only")]);
    let mut repo = DelayedPersistNoteRepository::new(InMemoryNoteRepository::new(), durable)
        .unwrap();
    repo.add_or_update_note(&note("a.md", "fresh")).unwrap();

    let notes: Vec<Note> = repo.get_all_notes().collect::<Result<_, _>>().unwrap();

    assert_eq!(notes.len(), 2);
    let a: Vec<&Note> = notes
        .iter()
        .filter(|n| n.id().as_str() == "a.md")
        .collect();
    assert_eq!(a.len(), 1);
    assert_eq!(a[0].payload(), Some("fresh"));
    assert!(notes.iter().any(|n| n.payload() == Some("durable only")));
}

#[test]
fn get_note_falls_through_to_durable_tier() {
    let durable = durable_with(&[note("b.md", "durable")]);
    let repo =
        DelayedPersistNoteRepository::new(InMemoryNoteRepository::new(), durable).unwrap();

    assert_eq!(
        repo.get_note(&NoteId::from("b.md")).unwrap().payload(),
        Some("durable")
    );
    let err = repo.get_note(&NoteId::from("missing")).unwrap_err();
    assert!(matches!(err, RepoError::NoteDoesNotExist(id) if id.as_str() == "missing"));
}

#[test]
fn has_note_is_true_when_either_tier_has_it() {
    let durable = durable_with(&[note("durable.md", "d")]);
    let mut repo = DelayedPersistNoteRepository::new(InMemoryNoteRepository::new(), durable)
        .unwrap();
    repo.add_or_update_note(&note("fast.md", "f")).unwrap();

    assert!(repo.has_note(&NoteId::from("fast.md")));
    assert!(repo.has_note(&NoteId::from("durable.md")));
    assert!(!repo.has_note(&NoteId::from("neither.md")));
}

#[test]
fn persist_copies_fast_tier_into_durable_tier() {
    let durable = durable_with(&[note("a.md", "old")]);
    let mut repo = DelayedPersistNoteRepository::new(InMemoryNoteRepository::new(), durable)
        .unwrap();
    repo.add_or_update_note(&note("a.md", "new")).unwrap();
    repo.add_or_update_note(&note("b.md", "bee")).unwrap();

    assert_eq!(repo.persist().unwrap(), 2);

    assert!(!repo.has_unsaved_changes());
    let durable = repo.durable_tier();
    assert_eq!(
        durable.get_note(&NoteId::from("a.md")).unwrap().payload(),
        Some("new")
    );
    assert_eq!(
        durable.get_note(&NoteId::from("b.md")).unwrap().payload(),
        Some("bee")
    );
    assert_eq!(repo.persist().unwrap(), 0);
}

#[test]
fn notes_present_in_fast_tier_at_construction_are_flushed() {
    let fast = durable_with(&[note("pre.md", "preloaded")]);
    let mut repo = DelayedPersistNoteRepository::new(fast, InMemoryNoteRepository::new()).unwrap();

    let dirty: Vec<&NoteId> = repo.dirty_note_ids().collect();
    assert_eq!(dirty, [&NoteId::from("pre.md")]);
    repo.persist().unwrap();

    let (_, durable) = repo.into_parts();
    assert_eq!(
        durable.get_note(&NoteId::from("pre.md")).unwrap().payload(),
        Some("preloaded")
    );
}

#[test]
fn failed_persist_keeps_dirty_set_for_retry() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.md"), "old").unwrap();
    let storage = SimpleFileSystemStorage::open(dir.path()).unwrap();
    let mut repo = DelayedPersistNoteRepository::new(
        InMemoryNoteRepository::new(),
        StorageNoteRepository::new(storage),
    )
    .unwrap();

    repo.add_or_update_note(&note("a.md", "new")).unwrap();
    repo.add_or_update_note(&note("b.md", "not on disk")).unwrap();

    let err = repo.persist().unwrap_err();
    assert!(matches!(err, RepoError::NoteDoesNotExist(id) if id.as_str() == "b.md"));
    assert_eq!(repo.dirty_note_ids().count(), 2);
    assert_eq!(repo.fast_tier().len(), 2);
    // Writes before the failure are not rolled back.
    assert_eq!(fs::read_to_string(dir.path().join("a.md")).unwrap(), "new");

    fs::write(dir.path().join("b.md"), "").unwrap();
    assert_eq!(repo.persist().unwrap(), 2);
    assert_eq!(
        fs::read_to_string(dir.path().join("b.md")).unwrap(),
        "not on disk"
    );
    assert!(!repo.has_unsaved_changes());
}
