//! Layout settings use-cases.

use crate::event::{EventBus, Message};
use crate::settings::{Settings, SettingsRepository, SettingsResult};
use std::rc::Rc;

pub struct SettingsService {
    repo: SettingsRepository,
    bus: Rc<EventBus>,
}

impl SettingsService {
    pub fn new(repo: SettingsRepository, bus: Rc<EventBus>) -> Self {
        Self { repo, bus }
    }

    /// Loads the stored layout and asks the UI to apply it.
    pub fn load_settings(&self) -> SettingsResult<Settings> {
        let settings = self.repo.load()?;
        self.bus.publish(Message::LayoutRequested(settings.clone()));
        Ok(settings)
    }

    pub fn save_layout(&self, settings: &Settings) -> SettingsResult<()> {
        self.repo.save(settings)
    }
}
