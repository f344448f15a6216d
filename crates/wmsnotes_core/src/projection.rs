//! Headless read models maintained from bus events.
//!
//! These mirror what the tree view and window chrome display; they hold no
//! authoritative state and are rebuilt from `NoteCreated`/`NoteOpened`.

use crate::event::{EventBus, Message, SubscriptionId, Topic};
use crate::model::note::{FolderPath, Note, NoteId};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub const APPLICATION_TITLE: &str = "WMS Notes";

/// Window title for the currently open note.
pub fn window_title(note: Option<&Note>) -> String {
    match note {
        Some(note) => format!("{APPLICATION_TITLE} - {}", note.title()),
        None => APPLICATION_TITLE.to_string(),
    }
}

/// One note entry in the tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TreeEntry {
    pub title: String,
    pub note_id: NoteId,
}

type Folders = BTreeMap<FolderPath, Vec<TreeEntry>>;

/// Folder tree built from `NoteCreated` events.
pub struct NotebookTree {
    folders: Rc<RefCell<Folders>>,
    bus: Rc<EventBus>,
    subscription: SubscriptionId,
}

impl NotebookTree {
    pub fn attach(bus: Rc<EventBus>) -> Self {
        let folders: Rc<RefCell<Folders>> = Rc::default();
        let sink = Rc::clone(&folders);
        let subscription = bus.subscribe(Topic::NodeEvents, move |message| match message {
            Message::NoteCreated(created) => {
                let note = &created.note;
                let mut folders = sink.borrow_mut();
                let entries = folders.entry(note.folder_path().clone()).or_default();
                entries.retain(|entry| &entry.note_id != note.id());
                entries.push(TreeEntry {
                    title: note.title().to_string(),
                    note_id: note.id().clone(),
                });
                entries.sort();
            }
            Message::NotePayloadChanged(_)
            | Message::NoteOpened(_)
            | Message::LayoutRequested(_)
            | Message::Command(_) => {}
        });
        Self {
            folders,
            bus,
            subscription,
        }
    }

    /// Folders sorted by path, each with its entries sorted by title.
    pub fn snapshot(&self) -> Vec<(FolderPath, Vec<TreeEntry>)> {
        self.folders
            .borrow()
            .iter()
            .map(|(path, entries)| (path.clone(), entries.clone()))
            .collect()
    }

    pub fn note_count(&self) -> usize {
        self.folders.borrow().values().map(Vec::len).sum()
    }
}

impl Drop for NotebookTree {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscription);
    }
}

/// Tracks the window title from `NoteOpened` events.
pub struct WindowTitle {
    title: Rc<RefCell<String>>,
    bus: Rc<EventBus>,
    subscription: SubscriptionId,
}

impl WindowTitle {
    pub fn attach(bus: Rc<EventBus>) -> Self {
        let title = Rc::new(RefCell::new(window_title(None)));
        let sink = Rc::clone(&title);
        let subscription = bus.subscribe(Topic::Application, move |message| {
            if let Message::NoteOpened(opened) = message {
                *sink.borrow_mut() = window_title(opened.note.as_ref());
            }
        });
        Self {
            title,
            bus,
            subscription,
        }
    }

    pub fn current(&self) -> String {
        self.title.borrow().clone()
    }
}

impl Drop for WindowTitle {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscription);
    }
}

#[cfg(test)]
mod tests {
    use super::{window_title, NotebookTree, WindowTitle};
    use crate::event::{EventBus, NoteOpened};
    use crate::model::note::{FolderPath, Note, NoteId};
    use std::rc::Rc;

    fn note(id: &str, title: &str, folder: &[&str]) -> Note {
        Note::new(NoteId::from(id), title, FolderPath::new(folder.iter().copied()))
    }

    #[test]
    fn title_reflects_open_note() {
        assert_eq!(window_title(None), "WMS Notes");
        let a = note("a.md", "a", &[]);
        assert_eq!(window_title(Some(&a)), "WMS Notes - a");
    }

    #[test]
    fn tree_groups_notes_by_folder_and_ignores_duplicates() {
        let bus = Rc::new(EventBus::new());
        let tree = NotebookTree::attach(Rc::clone(&bus));

        bus.publish(note("folder/b.md", "b", &["folder"]).create());
        bus.publish(note("a.md", "a", &[]).create());
        bus.publish(note("folder/a.md", "a", &["folder"]).create());
        bus.publish(note("a.md", "a", &[]).create());

        let snapshot = tree.snapshot();
        assert_eq!(tree.note_count(), 3);
        assert_eq!(snapshot[0].0, FolderPath::root());
        assert_eq!(snapshot[1].0, FolderPath::new(["folder"]));
        let titles: Vec<&str> = snapshot[1].1.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["a", "b"]);
    }

    #[test]
    fn window_title_follows_note_opened_events() {
        let bus = Rc::new(EventBus::new());
        let title = WindowTitle::attach(Rc::clone(&bus));
        let b = note("folder/b.md", "b", &["folder"]);

        bus.publish(NoteOpened {
            note: Some(b),
            payload: Some("text".to_string()),
        });
        assert_eq!(title.current(), "WMS Notes - b");

        bus.publish(NoteOpened {
            note: None,
            payload: None,
        });
        assert_eq!(title.current(), "WMS Notes");
    }
}
