//! Filesystem storage: one markdown file per note under a root directory.
//!
//! # Responsibility
//! - Map the file tree under `dir` to note metadata and payload bytes.
//! - Derive id, title and folder path purely from the relative file path.
//!
//! # Invariants
//! - Note id = relative path joined with `/`, e.g. `folder/sub/Title.md`.
//! - Ids that are absolute or climb out of `dir` never resolve.
//! - Payload writes replace the file via a temp sibling + rename.

use super::{
    NotebookStorage, PayloadHash, StorageError, StorageResult, StoredNotes, MAIN_PAYLOAD,
    NOTE_EXTENSION,
};
use crate::model::note::{FolderPath, Note, NoteId, PATH_DELIMITER};
use log::{debug, error, info};
use std::fs::File;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Markdown-file notebook rooted at a directory.
#[derive(Debug, Clone)]
pub struct SimpleFileSystemStorage {
    dir: PathBuf,
}

impl SimpleFileSystemStorage {
    /// Opens a notebook directory, creating it when missing.
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        if let Err(err) = std::fs::create_dir_all(&dir) {
            error!(
                "event=storage_open module=storage status=error dir={} error={}",
                dir.display(),
                err
            );
            return Err(err.into());
        }
        info!(
            "event=storage_open module=storage status=ok dir={}",
            dir.display()
        );
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolves an id in the normalized form produced by the scan.
    ///
    /// Ids with empty, `.` or `..` segments, or absolute ids, have no file.
    fn note_file_path(&self, note_id: &NoteId) -> Option<PathBuf> {
        let normalized = note_id
            .as_str()
            .split(PATH_DELIMITER)
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");
        let relative = Path::new(note_id.as_str());
        let plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !normalized || !plain || relative.is_absolute() {
            return None;
        }
        Some(self.dir.join(relative))
    }

    fn note_id_for(&self, path: &Path) -> StorageResult<NoteId> {
        let relative = path
            .strip_prefix(&self.dir)
            .map_err(|_| StorageError::InvalidPath(path.display().to_string()))?;
        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => {
                    let segment = segment
                        .to_str()
                        .ok_or_else(|| StorageError::InvalidPath(path.display().to_string()))?;
                    segments.push(segment);
                }
                Component::CurDir => {}
                _ => return Err(StorageError::InvalidPath(path.display().to_string())),
            }
        }
        Ok(NoteId::new(segments.join("/")))
    }

    fn ensure_note(&self, note_id: &NoteId) -> StorageResult<PathBuf> {
        match self.note_file_path(note_id) {
            Some(path) if is_note_file(note_id, &path) => Ok(path),
            _ => Err(StorageError::NoteDoesNotExist(note_id.clone())),
        }
    }

    fn ensure_payload_name(note_id: &NoteId, payload_name: &str) -> StorageResult<()> {
        if payload_name == MAIN_PAYLOAD {
            return Ok(());
        }
        Err(StorageError::PayloadDoesNotExist {
            note_id: note_id.clone(),
            payload_name: payload_name.to_string(),
        })
    }
}

impl NotebookStorage for SimpleFileSystemStorage {
    type PayloadReader = File;

    fn get_all_notes(&self) -> StoredNotes<'_> {
        debug!(
            "event=storage_scan module=storage status=start dir={}",
            self.dir.display()
        );
        let walk = WalkDir::new(&self.dir)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter();

        Box::new(walk.filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    error!(
                        "event=storage_scan module=storage status=error error={}",
                        err
                    );
                    return Some(Err(StorageError::Walk(err)));
                }
            };
            let is_markdown = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(NOTE_EXTENSION));
            // `Path::is_file` follows links, matching `has_note`.
            if !is_markdown || !entry.path().is_file() {
                return None;
            }
            Some(self.note_id_for(entry.path()).map(|note_id| {
                debug!(
                    "event=storage_scan module=storage status=found note_id={}",
                    note_id
                );
                note_from_id(note_id)
            }))
        }))
    }

    fn get_note(&self, note_id: &NoteId) -> StorageResult<Note> {
        debug!(
            "event=storage_get_note module=storage status=start note_id={}",
            note_id
        );
        self.ensure_note(note_id)?;
        Ok(note_from_id(note_id.clone()))
    }

    fn has_note(&self, note_id: &NoteId) -> bool {
        self.ensure_note(note_id).is_ok()
    }

    fn get_note_payload(&self, note_id: &NoteId, payload_name: &str) -> StorageResult<File> {
        debug!(
            "event=storage_read module=storage status=start note_id={} payload={}",
            note_id, payload_name
        );
        let path = self.ensure_note(note_id)?;
        Self::ensure_payload_name(note_id, payload_name)?;
        Ok(File::open(path)?)
    }

    fn set_note_payload(
        &self,
        note_id: &NoteId,
        payload_name: &str,
        data: &[u8],
    ) -> StorageResult<PayloadHash> {
        let started_at = Instant::now();
        let path = self.ensure_note(note_id)?;
        Self::ensure_payload_name(note_id, payload_name)?;

        let result = write_replacing(&path, data);
        match result {
            Ok(()) => {
                let hash = PayloadHash::of(data);
                debug!(
                    "event=storage_write module=storage status=ok note_id={} payload={} bytes={} hash={} duration_ms={}",
                    note_id,
                    payload_name,
                    data.len(),
                    hash,
                    started_at.elapsed().as_millis()
                );
                Ok(hash)
            }
            Err(err) => {
                error!(
                    "event=storage_write module=storage status=error note_id={} payload={} duration_ms={} error={}",
                    note_id,
                    payload_name,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }
}

/// Replaces the file behind `path`, following links so a linked note keeps
/// its link, and keeping the previous permissions.
fn write_replacing(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let target = std::fs::canonicalize(path)?;
    let permissions = std::fs::metadata(&target)?.permissions();
    let parent = target.parent().unwrap_or(Path::new("."));

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(data)?;
    file.as_file().set_permissions(permissions)?;
    file.as_file().sync_all()?;
    file.persist(&target).map_err(|err| err.error)?;
    Ok(())
}

fn is_note_file(note_id: &NoteId, path: &Path) -> bool {
    note_id.as_str().ends_with(NOTE_EXTENSION) && path.is_file()
}

/// Builds metadata from an id: parent segments are the folder path and the
/// file name without extension is the title.
fn note_from_id(note_id: NoteId) -> Note {
    let (folder, file_name) = match note_id.as_str().rsplit_once(PATH_DELIMITER) {
        Some((folder, file_name)) => (Some(folder), file_name),
        None => (None, note_id.as_str()),
    };
    let title = file_name
        .strip_suffix(NOTE_EXTENSION)
        .unwrap_or(file_name)
        .to_string();
    let folder_path = FolderPath::from_string(folder);
    Note::new(note_id, title, folder_path)
}

#[cfg(test)]
mod tests {
    use super::{note_from_id, SimpleFileSystemStorage};
    use crate::model::note::{FolderPath, NoteId};

    #[test]
    fn note_metadata_is_derived_from_id() {
        let note = note_from_id(NoteId::from("folder/sub/Title.md"));
        assert_eq!(note.title(), "Title");
        assert_eq!(note.folder_path(), &FolderPath::new(["folder", "sub"]));
        assert!(note.payload().is_none());

        let root_note = note_from_id(NoteId::from("a.md"));
        assert_eq!(root_note.title(), "a");
        assert!(root_note.folder_path().is_root());
    }

    #[test]
    fn ids_escaping_the_root_do_not_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SimpleFileSystemStorage::open(dir.path().join("book")).unwrap();

        assert!(storage.note_file_path(&NoteId::from("../outside.md")).is_none());
        assert!(storage.note_file_path(&NoteId::from("/etc/passwd")).is_none());
        assert!(storage.note_file_path(&NoteId::from("")).is_none());
        assert!(storage.note_file_path(&NoteId::from("ok/a.md")).is_some());
    }

    #[test]
    fn only_normalized_ids_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SimpleFileSystemStorage::open(dir.path()).unwrap();

        assert!(storage.note_file_path(&NoteId::from("./a.md")).is_none());
        assert!(storage.note_file_path(&NoteId::from("f/./a.md")).is_none());
        assert!(storage.note_file_path(&NoteId::from("f//a.md")).is_none());
        assert!(storage.note_file_path(&NoteId::from("f/")).is_none());
        assert!(storage.note_file_path(&NoteId::from("f/a.md")).is_some());
    }
}
