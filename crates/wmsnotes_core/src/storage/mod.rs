//! Durable note storage backends.
//!
//! # Responsibility
//! - Define the contract a backend offers: metadata scan, lookup, existence
//!   check and raw payload read/write.
//! - Provide the filesystem backend (`SimpleFileSystemStorage`).
//!
//! # Invariants
//! - Storage never creates notes through payload writes.
//! - I/O failures are surfaced unmodified; nothing is swallowed.
//! - Only the `main` payload exists per note.

use crate::model::note::{Note, NoteId};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Read;

mod simple_fs;

pub use simple_fs::SimpleFileSystemStorage;

/// Name of the single payload every note carries.
pub const MAIN_PAYLOAD: &str = "main";

/// File extension that marks a markdown note.
pub const NOTE_EXTENSION: &str = ".md";

pub type StorageResult<T> = Result<T, StorageError>;

/// Lazy, finite sequence of metadata-only notes.
pub type StoredNotes<'a> = Box<dyn Iterator<Item = StorageResult<Note>> + 'a>;

/// Errors raised by storage backends.
#[derive(Debug)]
pub enum StorageError {
    NoteDoesNotExist(NoteId),
    PayloadDoesNotExist {
        note_id: NoteId,
        payload_name: String,
    },
    Io(std::io::Error),
    Walk(walkdir::Error),
    InvalidPath(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteDoesNotExist(note_id) => write!(f, "note does not exist: {note_id}"),
            Self::PayloadDoesNotExist {
                note_id,
                payload_name,
            } => write!(f, "payload `{payload_name}` does not exist for note {note_id}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Walk(err) => write!(f, "{err}"),
            Self::InvalidPath(path) => write!(f, "invalid note path: {path}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Walk(err) => Some(err),
            Self::NoteDoesNotExist(_) | Self::PayloadDoesNotExist { .. } | Self::InvalidPath(_) => {
                None
            }
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<walkdir::Error> for StorageError {
    fn from(value: walkdir::Error) -> Self {
        Self::Walk(value)
    }
}

/// Content hash of a stored payload, formatted as `sha256:<hex>`.
///
/// Not consumed anywhere yet; kept for future integrity checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PayloadHash(String);

impl PayloadHash {
    pub fn of(data: &[u8]) -> Self {
        use sha2::{Digest, Sha256};
        Self(format!("sha256:{}", hex::encode(Sha256::digest(data))))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for PayloadHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contract implemented by durable note stores.
pub trait NotebookStorage {
    /// Reader handed out by `get_note_payload`; dropping it releases the handle.
    type PayloadReader: Read;

    /// Walks the whole store from scratch and yields metadata-only notes.
    fn get_all_notes(&self) -> StoredNotes<'_>;
    /// Loads note metadata (no payload).
    fn get_note(&self, note_id: &NoteId) -> StorageResult<Note>;
    fn has_note(&self, note_id: &NoteId) -> bool;
    /// Opens a payload for reading.
    fn get_note_payload(
        &self,
        note_id: &NoteId,
        payload_name: &str,
    ) -> StorageResult<Self::PayloadReader>;
    /// Fully overwrites a payload of an existing note.
    fn set_note_payload(
        &self,
        note_id: &NoteId,
        payload_name: &str,
        data: &[u8],
    ) -> StorageResult<PayloadHash>;
}

#[cfg(test)]
mod tests {
    use super::PayloadHash;

    #[test]
    fn payload_hash_is_prefixed_sha256_hex() {
        let hash = PayloadHash::of(b"abc");
        assert_eq!(
            hash.as_str(),
            "sha256:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
