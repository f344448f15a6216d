//! Core domain logic for WMS Notes.
//! Notes live as markdown files; this crate owns their invariants, the
//! buffered repository stack and the events that drive the UI.

pub mod event;
pub mod logging;
pub mod model;
pub mod projection;
pub mod repo;
pub mod service;
pub mod settings;
pub mod storage;

pub use event::{
    EventBus, Message, NoteCommand, NoteCreated, NoteOpened, NotePayloadChanged,
    OpenNoteCommand, SubscriptionId, Topic, UpdateNotePayloadCommand,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{FolderPath, Note, NoteId};
pub use projection::{window_title, NotebookTree, TreeEntry, WindowTitle};
pub use repo::delayed_persist::DelayedPersistNoteRepository;
pub use repo::mem::InMemoryNoteRepository;
pub use repo::storage_repo::StorageNoteRepository;
pub use repo::{NoteIter, NoteRepository, PersistingNoteRepository, RepoError, RepoResult};
pub use service::note_service::{NoteService, NoteServiceError, NoteServiceResult};
pub use service::settings_service::SettingsService;
pub use settings::{Settings, SettingsError, SettingsRepository, WindowState};
pub use storage::{
    NotebookStorage, PayloadHash, SimpleFileSystemStorage, StorageError, StorageResult,
    MAIN_PAYLOAD,
};

/// Buffered repository stack used by the application: in-memory edits over
/// the markdown files on disk.
pub type NotebookRepository = DelayedPersistNoteRepository<
    InMemoryNoteRepository,
    StorageNoteRepository<SimpleFileSystemStorage>,
>;

/// Opens the notebook rooted at `dir` as the application repository stack.
pub fn open_notebook(dir: impl Into<std::path::PathBuf>) -> RepoResult<NotebookRepository> {
    let storage = SimpleFileSystemStorage::open(dir)?;
    DelayedPersistNoteRepository::new(
        InMemoryNoteRepository::new(),
        StorageNoteRepository::new(storage),
    )
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
