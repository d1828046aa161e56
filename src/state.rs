use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;

use crate::events::{HabitView, StatePayload};
use crate::models::{Settings, SettingsFile};
use crate::store::HabitStore;

pub const SCHEMA_VERSION: u32 = 1;

/// Shared application state: the habit store plus the current settings.
#[derive(Clone)]
pub struct AppState {
    store: HabitStore,
    settings: Arc<Mutex<Settings>>,
}

impl AppState {
    pub fn new(store: HabitStore, settings: Settings) -> Self {
        Self {
            store,
            settings: Arc::new(Mutex::new(settings)),
        }
    }

    pub fn store(&self) -> &HabitStore {
        &self.store
    }

    pub fn settings(&self) -> Settings {
        self.lock_settings().clone()
    }

    pub fn update_settings(&self, settings: Settings) {
        *self.lock_settings() = settings;
    }

    pub fn settings_file(&self) -> SettingsFile {
        SettingsFile {
            schema_version: SCHEMA_VERSION,
            settings: self.settings(),
        }
    }

    pub fn views(&self, today: NaiveDate) -> Vec<HabitView> {
        let mode = self.settings().streak_mode;
        self.store
            .habits()
            .into_iter()
            .map(|habit| HabitView::new(habit, today, mode))
            .collect()
    }

    pub fn payload(&self, today: NaiveDate) -> StatePayload {
        StatePayload {
            habits: self.views(today),
            settings: self.settings(),
        }
    }

    fn lock_settings(&self) -> MutexGuard<'_, Settings> {
        self.settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
