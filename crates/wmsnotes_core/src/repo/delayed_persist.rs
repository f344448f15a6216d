//! Two-tier repository that defers durable writes until `persist`.
//!
//! # Responsibility
//! - Route every write to the fast tier and remember the written ids.
//! - Merge reads across both tiers, preferring the fast tier.
//! - Flush the remembered ids to the durable tier on demand.
//!
//! # Invariants
//! - The durable tier is untouched until `persist` is called.
//! - A fast-tier note always shadows a durable note with the same id.
//! - A failed `persist` leaves the dirty set and fast tier unchanged, so the
//!   whole flush can be retried.
//! - Single owner, single thread: `get_note` checks existence and then
//!   fetches without locking.

use super::{NoteIter, NoteRepository, PersistingNoteRepository, RepoResult};
use crate::model::note::{Note, NoteId};
use log::{error, info};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;
use std::time::Instant;

#[derive(Debug)]
pub struct DelayedPersistNoteRepository<F: NoteRepository, D: NoteRepository> {
    fast: F,
    durable: D,
    dirty: BTreeSet<NoteId>,
}

impl<F: NoteRepository, D: NoteRepository> DelayedPersistNoteRepository<F, D> {
    /// Composes `fast` over `durable`.
    ///
    /// Notes already present in `fast` count as unsaved.
    pub fn new(fast: F, durable: D) -> RepoResult<Self> {
        let mut dirty = BTreeSet::new();
        for note in fast.get_all_notes() {
            dirty.insert(note?.id().clone());
        }
        Ok(Self {
            fast,
            durable,
            dirty,
        })
    }

    pub fn fast_tier(&self) -> &F {
        &self.fast
    }

    pub fn durable_tier(&self) -> &D {
        &self.durable
    }

    /// Ids written since the last successful `persist`, in id order.
    pub fn dirty_note_ids(&self) -> impl Iterator<Item = &NoteId> {
        self.dirty.iter()
    }

    pub fn into_parts(self) -> (F, D) {
        (self.fast, self.durable)
    }
}

impl<F: NoteRepository, D: NoteRepository> NoteRepository for DelayedPersistNoteRepository<F, D> {
    fn add_or_update_note(&mut self, note: &Note) -> RepoResult<()> {
        self.fast.add_or_update_note(note)?;
        self.dirty.insert(note.id().clone());
        Ok(())
    }

    fn get_all_notes(&self) -> NoteIter<'_> {
        // The chain drains the fast tier completely before the durable tier
        // is polled, so `seen` is complete when filtering starts.
        let seen = Rc::new(RefCell::new(HashSet::new()));
        let fast_seen = Rc::clone(&seen);
        let fast = self.fast.get_all_notes().inspect(move |note| {
            if let Ok(note) = note {
                fast_seen.borrow_mut().insert(note.id().clone());
            }
        });
        let durable = self.durable.get_all_notes().filter(move |note| match note {
            Ok(note) => !seen.borrow().contains(note.id()),
            Err(_) => true,
        });
        Box::new(fast.chain(durable))
    }

    fn get_note(&self, note_id: &NoteId) -> RepoResult<Note> {
        if self.fast.has_note(note_id) {
            self.fast.get_note(note_id)
        } else {
            self.durable.get_note(note_id)
        }
    }

    fn has_note(&self, note_id: &NoteId) -> bool {
        self.fast.has_note(note_id) || self.durable.has_note(note_id)
    }
}

impl<F: NoteRepository, D: NoteRepository> PersistingNoteRepository
    for DelayedPersistNoteRepository<F, D>
{
    fn persist(&mut self) -> RepoResult<usize> {
        let started_at = Instant::now();
        info!(
            "event=repo_persist module=repo status=start dirty={}",
            self.dirty.len()
        );

        for note_id in &self.dirty {
            let flushed = self
                .fast
                .get_note(note_id)
                .and_then(|note| self.durable.add_or_update_note(&note));
            if let Err(err) = flushed {
                error!(
                    "event=repo_persist module=repo status=error note_id={} duration_ms={} error={}",
                    note_id,
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        }

        let flushed = self.dirty.len();
        self.dirty.clear();
        info!(
            "event=repo_persist module=repo status=ok flushed={} duration_ms={}",
            flushed,
            started_at.elapsed().as_millis()
        );
        Ok(flushed)
    }

    fn has_unsaved_changes(&self) -> bool {
        !self.dirty.is_empty()
    }
}
