//! Domain events, commands and the in-process event bus.
//!
//! # Responsibility
//! - Define the immutable notifications and instructions exchanged between
//!   the core and UI collaborators.
//! - Route them through an explicit, application-owned `EventBus`.
//!
//! # Invariants
//! - Every message kind is a variant of a closed enum; dispatch is exhaustive.
//! - Events carry snapshots; subscribers never share state with the sender.

mod bus;

pub use bus::{EventBus, SubscriptionId};

use crate::model::note::{Note, NoteId};
use crate::settings::Settings;

/// Logical channel a message travels on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Open/update commands, opened-note and payload-change events, layout.
    Application,
    /// Notebook structure events consumed by tree projections.
    NodeEvents,
}

impl Topic {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::NodeEvents => "node_events",
        }
    }
}

/// A note became known to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCreated {
    pub note: Note,
}

/// A note payload was replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePayloadChanged {
    pub note_id: NoteId,
    pub new_payload: String,
}

/// The currently open note changed. Both fields are `None` when closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteOpened {
    pub note: Option<Note>,
    pub payload: Option<String>,
}

/// Request to open a note, or to close the open one when `note_id` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenNoteCommand {
    pub note_id: Option<NoteId>,
}

/// Request to replace a note payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateNotePayloadCommand {
    pub note_id: NoteId,
    pub payload: String,
}

/// Commands handled by `NoteService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteCommand {
    OpenNote(OpenNoteCommand),
    UpdateNotePayload(UpdateNotePayloadCommand),
}

/// Everything that can be published on the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    NoteCreated(NoteCreated),
    NotePayloadChanged(NotePayloadChanged),
    NoteOpened(NoteOpened),
    LayoutRequested(Settings),
    Command(NoteCommand),
}

impl Message {
    /// Topic the message is delivered on.
    pub fn topic(&self) -> Topic {
        match self {
            Self::NoteCreated(_) => Topic::NodeEvents,
            Self::NotePayloadChanged(_)
            | Self::NoteOpened(_)
            | Self::LayoutRequested(_)
            | Self::Command(_) => Topic::Application,
        }
    }

    /// Stable name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoteCreated(_) => "note_created",
            Self::NotePayloadChanged(_) => "note_payload_changed",
            Self::NoteOpened(_) => "note_opened",
            Self::LayoutRequested(_) => "layout_requested",
            Self::Command(NoteCommand::OpenNote(_)) => "open_note_command",
            Self::Command(NoteCommand::UpdateNotePayload(_)) => "update_note_payload_command",
        }
    }
}

impl From<NoteCreated> for Message {
    fn from(value: NoteCreated) -> Self {
        Self::NoteCreated(value)
    }
}

impl From<NotePayloadChanged> for Message {
    fn from(value: NotePayloadChanged) -> Self {
        Self::NotePayloadChanged(value)
    }
}

impl From<NoteOpened> for Message {
    fn from(value: NoteOpened) -> Self {
        Self::NoteOpened(value)
    }
}

impl From<NoteCommand> for Message {
    fn from(value: NoteCommand) -> Self {
        Self::Command(value)
    }
}
