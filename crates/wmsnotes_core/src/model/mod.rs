//! Domain model for notebook notes.
//!
//! # Responsibility
//! - Define the value types that locate a note (`NoteId`, `FolderPath`).
//! - Define the `Note` aggregate and the events its transitions produce.
//!
//! # Invariants
//! - A `NoteId` is stable for the lifetime of the note; renames are not modeled.
//! - Metadata (id/title/folder path) is always present for a known note.
//! - `payload` is `None` until explicitly loaded or set.

pub mod note;
