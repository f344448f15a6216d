//! Note use-case service.
//!
//! # Responsibility
//! - Populate UI projections (`load_notebook`) and answer open/update
//!   commands with domain events.
//! - Flush buffered changes on `save`.
//!
//! # Invariants
//! - `NotePayloadChanged` is published only after the repository accepted the
//!   updated note, so subscribers never observe an unrecorded change.
//! - Commands arriving on the application topic are queued and executed by
//!   `process_commands`; handlers never run while a repository call is open.

use crate::event::{
    EventBus, Message, NoteCommand, NoteOpened, NotePayloadChanged, OpenNoteCommand,
    SubscriptionId, Topic, UpdateNotePayloadCommand,
};
use crate::model::note::NoteId;
use crate::repo::{PersistingNoteRepository, RepoError};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub type NoteServiceResult<T> = Result<T, NoteServiceError>;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Target note does not exist in any tier.
    NoteNotFound(NoteId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(note_id) => write!(f, "note not found: {note_id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::NoteNotFound(_) => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NoteDoesNotExist(note_id) => Self::NoteNotFound(note_id),
            other => Self::Repo(other),
        }
    }
}

/// Note service facade over a buffering repository and the event bus.
pub struct NoteService<R: PersistingNoteRepository> {
    repo: R,
    bus: Rc<EventBus>,
    inbox: Rc<RefCell<VecDeque<NoteCommand>>>,
    subscription: SubscriptionId,
}

impl<R: PersistingNoteRepository> NoteService<R> {
    /// Creates the service and subscribes its command inbox to the bus.
    ///
    /// Commands published on [`Topic::Application`] are only queued here.
    /// They run when the owner calls [`NoteService::process_commands`],
    /// typically once per UI event loop turn.
    pub fn new(repo: R, bus: Rc<EventBus>) -> Self {
        let inbox = Rc::new(RefCell::new(VecDeque::new()));
        let handler_inbox = Rc::clone(&inbox);
        let subscription = bus.subscribe(Topic::Application, move |message| {
            if let Message::Command(command) = message {
                handler_inbox.borrow_mut().push_back(command.clone());
            }
        });
        Self {
            repo,
            bus,
            inbox,
            subscription,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Publishes `NoteCreated` for every known note. Call once at startup.
    pub fn load_notebook(&self) -> NoteServiceResult<usize> {
        info!("event=notebook_load module=service status=start");
        let mut published = 0;
        for note in self.repo.get_all_notes() {
            let note = note?;
            self.bus.publish(note.create());
            published += 1;
        }
        info!(
            "event=notebook_load module=service status=ok notes={}",
            published
        );
        Ok(published)
    }

    /// Opens `note_id`, or closes the open note when `None`.
    pub fn set_open_note(&self, note_id: Option<&NoteId>) -> NoteServiceResult<()> {
        let opened = match note_id {
            Some(note_id) => {
                let note = self.repo.get_note(note_id)?;
                let payload = note.payload().map(str::to_string);
                NoteOpened {
                    note: Some(note),
                    payload,
                }
            }
            None => NoteOpened {
                note: None,
                payload: None,
            },
        };
        debug!(
            "event=note_open module=service status=ok note_id={} payload_len={}",
            note_id.map(NoteId::as_str).unwrap_or("none"),
            opened.payload.as_ref().map_or(0, String::len)
        );
        self.bus.publish(opened);
        Ok(())
    }

    /// Replaces a note payload, records it and then announces the change.
    pub fn update_note_payload(
        &mut self,
        note_id: &NoteId,
        payload: impl Into<String>,
    ) -> NoteServiceResult<NotePayloadChanged> {
        let mut note = self.repo.get_note(note_id)?;
        let event = note.set_payload(payload);
        self.repo.add_or_update_note(&note)?;
        debug!(
            "event=note_update module=service status=ok note_id={} payload_len={}",
            note_id,
            event.new_payload.len()
        );
        self.bus.publish(event.clone());
        Ok(event)
    }

    /// Flushes unsaved changes and returns how many notes were written.
    pub fn save(&mut self) -> NoteServiceResult<usize> {
        Ok(self.repo.persist()?)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.repo.has_unsaved_changes()
    }

    /// Executes one command.
    pub fn handle(&mut self, command: NoteCommand) -> NoteServiceResult<()> {
        match command {
            NoteCommand::OpenNote(OpenNoteCommand { note_id }) => {
                self.set_open_note(note_id.as_ref())
            }
            NoteCommand::UpdateNotePayload(UpdateNotePayloadCommand { note_id, payload }) => {
                self.update_note_payload(&note_id, payload).map(|_| ())
            }
        }
    }

    pub fn pending_commands(&self) -> usize {
        self.inbox.borrow().len()
    }

    /// Executes queued commands in arrival order.
    ///
    /// Stops at the first failing command, which is dropped; later commands
    /// stay queued.
    pub fn process_commands(&mut self) -> NoteServiceResult<usize> {
        let mut processed = 0;
        loop {
            let next = self.inbox.borrow_mut().pop_front();
            let Some(command) = next else {
                return Ok(processed);
            };
            if let Err(err) = self.handle(command) {
                warn!(
                    "event=command_failed module=service status=error processed={} remaining={} error={}",
                    processed,
                    self.pending_commands(),
                    err
                );
                return Err(err);
            }
            processed += 1;
        }
    }
}

impl<R: PersistingNoteRepository> Drop for NoteService<R> {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscription);
    }
}
